//! Triangle scan conversion
//!
//! Walks a 2x2-aligned quad grid over the triangle's bounding box, tests
//! coverage (at the pixel center, or per multisample) and interpolates the
//! pixel shader inputs for every quad that has at least one covered fragment.
//! Quads come out lazily through [`FragmentQuads`], in increasing y then
//! increasing x.

use crate::math::{Vec2, Vec4};
use crate::pipeline::interpolation;
use crate::pipeline::primitive::Primitive;

use super::barycentric::{BarycentricCoordinates, BarycentricEvaluator};
use super::fragment::{Fragment, FragmentQuad, Sample};
use super::state::{sample_position, FillMode, RasterizerState};

/// Wireframe keeps samples whose smallest weight is below this
pub const WIREFRAME_THRESHOLD: f32 = 0.00001;

/// Inclusive integer pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl PixelBounds {
    /// Smallest rectangle containing all three positions (floor of the
    /// minimum, ceiling of the maximum)
    pub fn enclosing(p0: Vec4, p1: Vec4, p2: Vec4) -> Self {
        Self {
            min_x: p0.x.min(p1.x).min(p2.x).floor() as i32,
            min_y: p0.y.min(p1.y).min(p2.y).floor() as i32,
            max_x: p0.x.max(p1.x).max(p2.x).ceil() as i32,
            max_y: p0.y.max(p1.y).max(p2.y).ceil() as i32,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn intersect(self, other: PixelBounds) -> Self {
        Self {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        }
    }
}

/// Round down to the nearest even number (also for negatives)
#[inline]
fn nearest_even(value: i32) -> i32 {
    value - value.rem_euclid(2)
}

/// Per-triangle cache, rebuilt whenever a primitive is assigned
#[derive(Debug, Clone)]
struct TriangleSetup {
    primitive: Primitive,
    evaluator: BarycentricEvaluator,
}

/// Scan converter for one triangle at a time.
///
/// Assigning a primitive overwrites the cached positions and edge-function
/// denominators, so a [`FragmentQuads`] sequence cannot outlive the next
/// assignment (the borrow checker enforces this).
#[derive(Debug, Clone, Default)]
pub struct TriangleRasterizer {
    state: RasterizerState,
    /// For each pixel shader input register, the vertex output register feeding it
    register_mappings: Vec<usize>,
    scissor: Option<PixelBounds>,
    setup: Option<TriangleSetup>,
}

impl TriangleRasterizer {
    pub fn new(state: RasterizerState, register_mappings: Vec<usize>) -> Self {
        Self {
            state,
            register_mappings,
            scissor: None,
            setup: None,
        }
    }

    pub fn set_state(&mut self, state: RasterizerState) {
        self.state = state;
    }

    pub fn state(&self) -> &RasterizerState {
        &self.state
    }

    pub fn set_register_mappings(&mut self, register_mappings: Vec<usize>) {
        self.register_mappings = register_mappings;
    }

    /// Restrict the scan to a pixel rectangle (typically the render target)
    pub fn set_scissor(&mut self, scissor: Option<PixelBounds>) {
        self.scissor = scissor;
    }

    /// Cache the primitive's screen positions and precompute the
    /// barycentric denominators
    pub fn set_primitive(&mut self, primitive: Primitive) {
        let [v0, v1, v2] = &primitive.vertices;
        let evaluator = BarycentricEvaluator::new(v0.position, v1.position, v2.position);
        self.setup = Some(TriangleSetup { primitive, evaluator });
    }

    /// Assign `primitive` and start scanning it
    pub fn rasterize_primitive(&mut self, primitive: Primitive) -> FragmentQuads<'_> {
        self.set_primitive(primitive);
        self.rasterize()
    }

    /// Lazy sequence of covered quads for the current primitive; empty when
    /// none is assigned
    pub fn rasterize(&self) -> FragmentQuads<'_> {
        let Some(setup) = self.setup.as_ref() else {
            return FragmentQuads::empty(self);
        };

        let (p0, p1, p2) = setup.evaluator.positions();
        let mut bounds = PixelBounds::enclosing(p0, p1, p2);
        if let Some(scissor) = self.scissor {
            bounds = bounds.intersect(scissor);
        }

        // Derivatives in the pixel shader need every quad's top-left
        // fragment on even coordinates.
        let start_x = nearest_even(bounds.min_x);
        let start_y = nearest_even(bounds.min_y);

        FragmentQuads {
            rasterizer: self,
            setup: Some(setup),
            bounds,
            start_x,
            x: start_x,
            y: start_y,
        }
    }

    /// Coverage test for one sample, given its barycentric coordinates
    fn sample_coverage(&self, setup: &TriangleSetup, coordinates: &BarycentricCoordinates) -> Sample {
        let (p0, p1, p2) = setup.evaluator.positions();

        let depth = interpolation::linear(
            coordinates.alpha,
            coordinates.beta,
            coordinates.gamma,
            p0.z,
            p1.z,
            p2.z,
        );

        if coordinates.is_outside_triangle() {
            return Sample { covered: false, depth: 0.0 };
        }

        let covered = match self.state.description().fill_mode {
            FillMode::Solid => true,
            FillMode::Wireframe => coordinates.min() < WIREFRAME_THRESHOLD,
        };
        Sample { covered, depth }
    }

    /// Quad snapping can put fragments outside the scissor; those stay
    /// uncovered but still receive data for derivatives
    fn in_scissor(&self, fragment: &Fragment) -> bool {
        self.scissor.map_or(true, |s| s.contains(fragment.x, fragment.y))
    }

    /// Evaluate every configured multisample of `fragment`
    fn multisample_coverage(&self, setup: &TriangleSetup, fragment: &mut Fragment) -> bool {
        if !self.in_scissor(fragment) {
            return false;
        }
        let count = self.state.description().multisample_count;
        let mut any_covered = false;
        for index in 0..count as usize {
            let position = sample_position(fragment.x, fragment.y, index, count);
            let sample = self.sample_coverage(setup, &setup.evaluator.evaluate(position));
            any_covered |= sample.covered;
            fragment.samples.slots[index] = sample;
        }
        fragment.samples.any_covered = any_covered;
        any_covered
    }

    /// Single-sample coverage at the pixel center; the coordinates are
    /// returned for reuse by interpolation
    fn center_coverage(&self, setup: &TriangleSetup, fragment: &mut Fragment) -> BarycentricCoordinates {
        let coordinates = setup.evaluator.evaluate(pixel_center(fragment));
        if !self.in_scissor(fragment) {
            return coordinates;
        }
        let sample = self.sample_coverage(setup, &coordinates);
        if sample.covered {
            fragment.samples.slots[0] = sample;
            fragment.samples.any_covered = true;
        }
        coordinates
    }

    /// Interpolated pixel shader inputs at the given weights
    fn interpolate(&self, setup: &TriangleSetup, coordinates: &BarycentricCoordinates) -> Vec<Vec4> {
        let BarycentricCoordinates { alpha, beta, gamma } = *coordinates;
        let (p0, p1, p2) = setup.evaluator.positions();
        let [v0, v1, v2] = &setup.primitive.vertices;
        let perspective_correct = self.state.description().perspective_correct;
        let w = interpolation::precalculate_w(alpha, beta, gamma, p0.w, p1.w, p2.w);

        self.register_mappings
            .iter()
            .map(|&register| {
                // Registers the vertex stage never wrote read as zero.
                let a = v0.data.get(register).copied().unwrap_or_default();
                let b = v1.data.get(register).copied().unwrap_or_default();
                let c = v2.data.get(register).copied().unwrap_or_default();
                if perspective_correct {
                    interpolation::perspective(alpha, beta, gamma, a, b, c, p0.w, p1.w, p2.w, w)
                } else {
                    interpolation::linear_vec4(alpha, beta, gamma, a, b, c)
                }
            })
            .collect()
    }

    /// Fill in coverage and data for a quad; `None` if nothing is covered
    fn shade_quad(&self, setup: &TriangleSetup, mut quad: FragmentQuad) -> Option<FragmentQuad> {
        if self.state.description().multisample_enabled {
            let mut any_covered = false;
            for fragment in quad.fragments.iter_mut() {
                any_covered |= self.multisample_coverage(setup, fragment);
            }
            if !any_covered {
                return None;
            }

            // All four fragments get data, covered or not: derivatives need
            // the whole quad.
            for fragment in quad.fragments.iter_mut() {
                let coordinates = setup.evaluator.evaluate(pixel_center(fragment));
                fragment.data = self.interpolate(setup, &coordinates);
            }
        } else {
            let coordinates = [
                self.center_coverage(setup, &mut quad.fragments[0]),
                self.center_coverage(setup, &mut quad.fragments[1]),
                self.center_coverage(setup, &mut quad.fragments[2]),
                self.center_coverage(setup, &mut quad.fragments[3]),
            ];
            if !quad.any_covered() {
                return None;
            }

            for (fragment, coordinates) in quad.fragments.iter_mut().zip(coordinates.iter()) {
                fragment.data = self.interpolate(setup, coordinates);
            }
        }
        Some(quad)
    }
}

#[inline]
fn pixel_center(fragment: &Fragment) -> Vec2 {
    Vec2::new(fragment.x as f32 + 0.5, fragment.y as f32 + 0.5)
}

/// Pull-based sequence of covered quads for one triangle
pub struct FragmentQuads<'a> {
    rasterizer: &'a TriangleRasterizer,
    setup: Option<&'a TriangleSetup>,
    bounds: PixelBounds,
    start_x: i32,
    x: i32,
    y: i32,
}

impl<'a> FragmentQuads<'a> {
    fn empty(rasterizer: &'a TriangleRasterizer) -> Self {
        Self {
            rasterizer,
            setup: None,
            bounds: PixelBounds { min_x: 0, min_y: 0, max_x: -1, max_y: -1 },
            start_x: 0,
            x: 0,
            y: 0,
        }
    }
}

impl Iterator for FragmentQuads<'_> {
    type Item = FragmentQuad;

    fn next(&mut self) -> Option<FragmentQuad> {
        let setup = self.setup?;

        while self.y <= self.bounds.max_y {
            if self.x > self.bounds.max_x {
                self.x = self.start_x;
                self.y += 2;
                continue;
            }

            let quad = FragmentQuad::new(self.x, self.y);
            self.x += 2;

            if let Some(quad) = self.rasterizer.shade_quad(setup, quad) {
                return Some(quad);
            }
        }

        self.setup = None;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::primitive::ShadedVertex;
    use crate::pipeline::rasterizer::state::RasterizerStateDescription;

    fn vertex(x: f32, y: f32, z: f32, w: f32, data: Vec<Vec4>) -> ShadedVertex {
        ShadedVertex::new(Vec4::new(x, y, z, w), data)
    }

    fn right_triangle() -> Primitive {
        Primitive::new(
            vertex(0.0, 0.0, 0.0, 1.0, vec![Vec4::new(1.0, 0.0, 0.0, 1.0)]),
            vertex(4.0, 0.0, 0.0, 1.0, vec![Vec4::new(0.0, 1.0, 0.0, 1.0)]),
            vertex(0.0, 4.0, 0.0, 1.0, vec![Vec4::new(0.0, 0.0, 1.0, 1.0)]),
        )
    }

    fn rasterizer(desc: RasterizerStateDescription) -> TriangleRasterizer {
        TriangleRasterizer::new(RasterizerState::new(desc).unwrap(), vec![0])
    }

    fn covered_pixels(quads: &[FragmentQuad]) -> Vec<(i32, i32)> {
        quads
            .iter()
            .flat_map(|q| q.fragments.iter())
            .filter(|f| f.is_covered())
            .map(|f| (f.x, f.y))
            .collect()
    }

    #[test]
    fn test_nearest_even() {
        assert_eq!(nearest_even(0), 0);
        assert_eq!(nearest_even(3), 2);
        assert_eq!(nearest_even(4), 4);
        assert_eq!(nearest_even(-1), -2);
        assert_eq!(nearest_even(-3), -4);
    }

    #[test]
    fn test_right_triangle_solid() {
        let mut r = rasterizer(RasterizerStateDescription::default());
        let quads: Vec<_> = r.rasterize_primitive(right_triangle()).collect();

        let origins: Vec<_> = quads.iter().map(|q| (q.top_left().x, q.top_left().y)).collect();
        assert_eq!(origins, vec![(0, 0), (2, 0), (0, 2)]);

        let covered = covered_pixels(&quads);
        assert!(covered.contains(&(1, 1)));
        assert!(!covered.contains(&(3, 3)));
        // Pixel centers on the hypotenuse count as inside
        assert!(covered.contains(&(3, 0)));
        assert!(!covered.contains(&(3, 1)));
        assert_eq!(covered.len(), 10);
    }

    #[test]
    fn test_all_quad_fragments_get_data() {
        let mut r = rasterizer(RasterizerStateDescription::default());
        for quad in r.rasterize_primitive(right_triangle()) {
            for fragment in &quad.fragments {
                assert_eq!(fragment.data.len(), 1);
            }
        }
    }

    #[test]
    fn test_covered_sample_depth() {
        let tri = Primitive::new(
            vertex(0.0, 0.0, 0.25, 1.0, vec![]),
            vertex(8.0, 0.0, 0.25, 1.0, vec![]),
            vertex(0.0, 8.0, 0.25, 1.0, vec![]),
        );
        let mut r = rasterizer(RasterizerStateDescription::default());
        for quad in r.rasterize_primitive(tri) {
            for fragment in quad.fragments.iter().filter(|f| f.is_covered()) {
                assert!((fragment.samples.slots[0].depth - 0.25).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_uncovered_fragments_have_zero_depth() {
        let mut r = rasterizer(RasterizerStateDescription::default());
        for quad in r.rasterize_primitive(right_triangle()) {
            for fragment in quad.fragments.iter().filter(|f| !f.is_covered()) {
                assert_eq!(fragment.samples.slots[0], Sample::default());
            }
        }
    }

    #[test]
    fn test_multisample_single_covered_slot() {
        // Tiny triangle around sample 0 of pixel (0, 0) at (0.375, 0.125)
        let tri = Primitive::new(
            vertex(0.3, 0.05, 0.5, 1.0, vec![Vec4::ONE]),
            vertex(0.45, 0.05, 0.5, 1.0, vec![Vec4::ONE]),
            vertex(0.375, 0.2, 0.5, 1.0, vec![Vec4::ONE]),
        );
        let mut r = rasterizer(RasterizerStateDescription {
            multisample_enabled: true,
            multisample_count: 4,
            ..Default::default()
        });
        let quads: Vec<_> = r.rasterize_primitive(tri).collect();
        assert_eq!(quads.len(), 1);

        let quad = &quads[0];
        let fragment = quad.top_left();
        assert!(fragment.samples.any_covered);
        assert_eq!(fragment.samples.covered_count(), 1);
        assert!(fragment.samples.slots[0].covered);
        assert!((fragment.samples.slots[0].depth - 0.5).abs() < 1e-5);
        for other in &quad.fragments[1..] {
            assert!(!other.is_covered());
            assert_eq!(other.data.len(), 1);
        }
    }

    #[test]
    fn test_multisample_evaluates_every_slot() {
        let mut r = rasterizer(RasterizerStateDescription {
            multisample_enabled: true,
            multisample_count: 4,
            ..Default::default()
        });
        let quads: Vec<_> = r.rasterize_primitive(right_triangle()).collect();
        let interior = quads
            .iter()
            .flat_map(|q| q.fragments.iter())
            .find(|f| (f.x, f.y) == (1, 1))
            .unwrap();
        assert_eq!(interior.samples.covered_count(), 4);
    }

    #[test]
    fn test_multisample_zero_samples_covers_nothing() {
        let mut r = rasterizer(RasterizerStateDescription {
            multisample_enabled: true,
            multisample_count: 0,
            ..Default::default()
        });
        assert_eq!(r.rasterize_primitive(right_triangle()).count(), 0);
    }

    #[test]
    fn test_wireframe_only_edges() {
        let mut r = rasterizer(RasterizerStateDescription {
            fill_mode: FillMode::Wireframe,
            ..Default::default()
        });
        let covered = covered_pixels(&r.rasterize_primitive(right_triangle()).collect::<Vec<_>>());
        // Only centers exactly on the hypotenuse survive
        assert_eq!(covered, vec![(3, 0), (2, 1), (1, 2), (0, 3)]);
    }

    #[test]
    fn test_perspective_vs_affine() {
        let tri = || {
            Primitive::new(
                vertex(0.0, 0.0, 0.0, 1.0, vec![Vec4::splat(1.0)]),
                vertex(8.0, 0.0, 0.0, 4.0, vec![Vec4::splat(0.0)]),
                vertex(0.0, 8.0, 0.0, 4.0, vec![Vec4::splat(0.0)]),
            )
        };
        let mut perspective = rasterizer(RasterizerStateDescription::default());
        let mut affine = rasterizer(RasterizerStateDescription {
            perspective_correct: false,
            ..Default::default()
        });
        let p: Vec<_> = perspective.rasterize_primitive(tri()).collect();
        let a: Vec<_> = affine.rasterize_primitive(tri()).collect();
        assert_eq!(p.len(), a.len());

        // Pixel (2, 2): the near vertex dominates under perspective
        let value = |quads: &[FragmentQuad]| quads[0].fragments[0].data[0].x;
        let (pq, aq): (Vec<_>, Vec<_>) = (
            p.into_iter().filter(|q| q.top_left().x == 2 && q.top_left().y == 2).collect(),
            a.into_iter().filter(|q| q.top_left().x == 2 && q.top_left().y == 2).collect(),
        );
        assert!(value(&pq) > value(&aq));
    }

    #[test]
    fn test_scissor_clamps_scan() {
        let mut r = rasterizer(RasterizerStateDescription::default());
        r.set_scissor(Some(PixelBounds { min_x: 0, min_y: 0, max_x: 1, max_y: 1 }));
        let quads: Vec<_> = r.rasterize_primitive(right_triangle()).collect();
        assert_eq!(quads.len(), 1);
        assert_eq!((quads[0].top_left().x, quads[0].top_left().y), (0, 0));
    }

    #[test]
    fn test_scissor_masks_snapped_fragments() {
        // Odd scissor edges: quads start at (0, 0) and reach x = 3, y = 3
        let scissor = PixelBounds { min_x: 1, min_y: 1, max_x: 2, max_y: 2 };
        let big = Primitive::new(
            vertex(-4.0, -4.0, 0.0, 1.0, vec![Vec4::ONE]),
            vertex(12.0, -4.0, 0.0, 1.0, vec![Vec4::ONE]),
            vertex(-4.0, 12.0, 0.0, 1.0, vec![Vec4::ONE]),
        );
        for desc in [
            RasterizerStateDescription::default(),
            RasterizerStateDescription { multisample_enabled: true, multisample_count: 4, ..Default::default() },
        ] {
            let mut r = rasterizer(desc);
            r.set_scissor(Some(scissor));
            let quads: Vec<_> = r.rasterize_primitive(big.clone()).collect();
            assert_eq!(quads.len(), 4);
            assert_eq!(covered_pixels(&quads), vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
            for fragment in quads.iter().flat_map(|q| q.fragments.iter()) {
                assert!(fragment.data[0].max_abs_diff(Vec4::ONE) < 1e-5);
            }
        }
    }

    #[test]
    fn test_negative_coordinates_stay_even() {
        let tri = Primitive::new(
            vertex(-5.3, -3.7, 0.0, 1.0, vec![]),
            vertex(2.0, -3.0, 0.0, 1.0, vec![]),
            vertex(-1.0, 4.0, 0.0, 1.0, vec![]),
        );
        let mut r = rasterizer(RasterizerStateDescription::default());
        let quads: Vec<_> = r.rasterize_primitive(tri).collect();
        assert!(!quads.is_empty());
        for quad in &quads {
            assert_eq!(quad.top_left().x.rem_euclid(2), 0);
            assert_eq!(quad.top_left().y.rem_euclid(2), 0);
        }
    }

    #[test]
    fn test_no_primitive_is_empty() {
        let r = TriangleRasterizer::default();
        assert_eq!(r.rasterize().count(), 0);
    }
}
