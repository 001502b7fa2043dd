//! In-flight fragment records produced by the rasterizer

use crate::math::Vec4;

/// Maximum number of multisample slots per fragment
pub const MAX_SAMPLES: usize = 4;

/// One multisample slot
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub covered: bool,
    pub depth: f32,
}

/// Multisample state of one fragment
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Samples {
    pub slots: [Sample; MAX_SAMPLES],
    pub any_covered: bool,
}

impl Samples {
    pub fn covered_count(&self) -> usize {
        self.slots.iter().filter(|s| s.covered).count()
    }

    /// Covered slots with their sample index
    pub fn covered(&self) -> impl Iterator<Item = (usize, &Sample)> {
        self.slots.iter().enumerate().filter(|(_, s)| s.covered)
    }
}

/// Position of a fragment within its 2x2 quad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentQuadLocation {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Processing record for one candidate pixel
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub x: i32,
    pub y: i32,
    pub quad_location: FragmentQuadLocation,
    pub samples: Samples,
    /// Interpolated pixel shader inputs, indexed by input register
    pub data: Vec<Vec4>,
}

impl Fragment {
    pub fn new(x: i32, y: i32, quad_location: FragmentQuadLocation) -> Self {
        Self {
            x,
            y,
            quad_location,
            samples: Samples::default(),
            data: Vec::new(),
        }
    }

    pub fn is_covered(&self) -> bool {
        self.samples.any_covered
    }
}

/// Four fragments forming a 2x2 block whose top-left corner has even
/// coordinates. Fragments are always ordered top-left, top-right,
/// bottom-left, bottom-right.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentQuad {
    pub fragments: [Fragment; 4],
}

impl FragmentQuad {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            fragments: [
                Fragment::new(x, y, FragmentQuadLocation::TopLeft),
                Fragment::new(x + 1, y, FragmentQuadLocation::TopRight),
                Fragment::new(x, y + 1, FragmentQuadLocation::BottomLeft),
                Fragment::new(x + 1, y + 1, FragmentQuadLocation::BottomRight),
            ],
        }
    }

    pub fn top_left(&self) -> &Fragment {
        &self.fragments[0]
    }

    pub fn top_right(&self) -> &Fragment {
        &self.fragments[1]
    }

    pub fn bottom_left(&self) -> &Fragment {
        &self.fragments[2]
    }

    pub fn bottom_right(&self) -> &Fragment {
        &self.fragments[3]
    }

    pub fn any_covered(&self) -> bool {
        self.fragments.iter().any(Fragment::is_covered)
    }
}
