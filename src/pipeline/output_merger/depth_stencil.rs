use serde::{Deserialize, Serialize};

/// Ordering predicate applied as `new <op> current`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

impl ComparisonFunc {
    pub fn compare(self, new: f32, current: f32) -> bool {
        match self {
            ComparisonFunc::Never => false,
            ComparisonFunc::Less => new < current,
            ComparisonFunc::Equal => new == current,
            ComparisonFunc::LessEqual => new <= current,
            ComparisonFunc::Greater => new > current,
            ComparisonFunc::NotEqual => new != current,
            ComparisonFunc::GreaterEqual => new >= current,
            ComparisonFunc::Always => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthStencilStateDescription {
    pub depth_enabled: bool,
    pub depth_comparison: ComparisonFunc,
}

impl Default for DepthStencilStateDescription {
    fn default() -> Self {
        Self {
            depth_enabled: true,
            depth_comparison: ComparisonFunc::Less,
        }
    }
}

/// Immutable depth test configuration, shared by every draw that uses it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepthStencilState {
    description: DepthStencilStateDescription,
}

impl DepthStencilState {
    pub fn new(description: DepthStencilStateDescription) -> Self {
        Self { description }
    }

    pub fn description(&self) -> &DepthStencilStateDescription {
        &self.description
    }

    /// Whether a fragment at `new_depth` may overwrite `current_depth`.
    /// A disabled depth test always passes.
    pub fn depth_test_passes(&self, new_depth: f32, current_depth: f32) -> bool {
        if !self.description.depth_enabled {
            return true;
        }
        self.description.depth_comparison.compare(new_depth, current_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(depth_enabled: bool, depth_comparison: ComparisonFunc) -> DepthStencilState {
        DepthStencilState::new(DepthStencilStateDescription { depth_enabled, depth_comparison })
    }

    #[test]
    fn test_depth_less() {
        let s = state(true, ComparisonFunc::Less);
        assert!(s.depth_test_passes(0.3, 0.5));
        assert!(!s.depth_test_passes(0.7, 0.5));
        assert!(!s.depth_test_passes(0.5, 0.5));
    }

    #[test]
    fn test_depth_disabled() {
        let s = state(false, ComparisonFunc::Never);
        for (new, current) in [(0.0, 1.0), (1.0, 0.0), (0.5, 0.5), (f32::MAX, -1.0)] {
            assert!(s.depth_test_passes(new, current));
        }
    }

    #[test]
    fn test_comparison_funcs() {
        assert!(!ComparisonFunc::Never.compare(0.5, 1.0));
        assert!(ComparisonFunc::Always.compare(0.5, 1.0));
        assert!(ComparisonFunc::Equal.compare(0.5, 0.5));
        assert!(!ComparisonFunc::Equal.compare(0.5, 0.6));
        assert!(ComparisonFunc::LessEqual.compare(0.5, 0.5));
        assert!(!ComparisonFunc::LessEqual.compare(0.6, 0.5));
        assert!(ComparisonFunc::Greater.compare(0.6, 0.5));
        assert!(!ComparisonFunc::Greater.compare(0.5, 0.5));
        assert!(ComparisonFunc::NotEqual.compare(0.3, 0.5));
        assert!(!ComparisonFunc::NotEqual.compare(0.5, 0.5));
        assert!(ComparisonFunc::GreaterEqual.compare(0.5, 0.5));
        assert!(!ComparisonFunc::GreaterEqual.compare(0.3, 0.5));
    }
}
