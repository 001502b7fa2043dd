//! Barycentric coordinates by edge-function ratios

use crate::math::{Vec2, Vec4};

/// Triangle-relative weights for one sample position
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BarycentricCoordinates {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
}

impl BarycentricCoordinates {
    /// True if any weight is negative
    #[inline]
    pub fn is_outside_triangle(&self) -> bool {
        self.alpha < 0.0 || self.beta < 0.0 || self.gamma < 0.0
    }

    pub fn sum(&self) -> f32 {
        self.alpha + self.beta + self.gamma
    }

    pub fn min(&self) -> f32 {
        self.alpha.min(self.beta).min(self.gamma)
    }
}

/// Edge function of the line through `pa` and `pb`, evaluated at (x, y)
#[inline]
fn edge_function(x: f32, y: f32, pa: Vec4, pb: Vec4) -> f32 {
    (pa.y - pb.y) * x + (pb.x - pa.x) * y + pa.x * pb.y - pb.x * pa.y
}

/// Evaluates barycentric coordinates for a fixed triangle.
///
/// The three denominators (each edge function evaluated at the opposite
/// vertex) are computed once in [`BarycentricEvaluator::new`] and reused for
/// every sample. Zero-area triangles are not special-cased: their
/// denominators are zero and the weights come out non-finite.
#[derive(Debug, Clone, Copy)]
pub struct BarycentricEvaluator {
    p0: Vec4,
    p1: Vec4,
    p2: Vec4,
    alpha_denominator: f32,
    beta_denominator: f32,
    gamma_denominator: f32,
}

impl BarycentricEvaluator {
    pub fn new(p0: Vec4, p1: Vec4, p2: Vec4) -> Self {
        Self {
            p0,
            p1,
            p2,
            alpha_denominator: edge_function(p0.x, p0.y, p1, p2),
            beta_denominator: edge_function(p1.x, p1.y, p2, p0),
            gamma_denominator: edge_function(p2.x, p2.y, p0, p1),
        }
    }

    pub fn positions(&self) -> (Vec4, Vec4, Vec4) {
        (self.p0, self.p1, self.p2)
    }

    /// Weights such that `position = alpha*p0 + beta*p1 + gamma*p2` in 2D
    #[inline]
    pub fn evaluate(&self, position: Vec2) -> BarycentricCoordinates {
        BarycentricCoordinates {
            alpha: edge_function(position.x, position.y, self.p1, self.p2) / self.alpha_denominator,
            beta: edge_function(position.x, position.y, self.p2, self.p0) / self.beta_denominator,
            gamma: edge_function(position.x, position.y, self.p0, self.p1) / self.gamma_denominator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> BarycentricEvaluator {
        BarycentricEvaluator::new(
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(4.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 4.0, 0.0, 1.0),
        )
    }

    #[test]
    fn test_barycentric_at_vertices() {
        let e = triangle();
        let c = e.evaluate(Vec2::new(0.0, 0.0));
        assert_eq!((c.alpha, c.beta, c.gamma), (1.0, 0.0, 0.0));
        let c = e.evaluate(Vec2::new(4.0, 0.0));
        assert_eq!((c.alpha, c.beta, c.gamma), (0.0, 1.0, 0.0));
        let c = e.evaluate(Vec2::new(0.0, 4.0));
        assert_eq!((c.alpha, c.beta, c.gamma), (0.0, 0.0, 1.0));
    }

    #[test]
    fn test_barycentric_inside() {
        let c = triangle().evaluate(Vec2::new(1.5, 1.5));
        assert!(!c.is_outside_triangle());
        assert!((c.sum() - 1.0).abs() < 1e-5);
        assert!((c.beta - 0.375).abs() < 1e-6);
        assert!((c.gamma - 0.375).abs() < 1e-6);
    }

    #[test]
    fn test_barycentric_outside() {
        let c = triangle().evaluate(Vec2::new(3.5, 3.5));
        assert!(c.is_outside_triangle());
        assert!(c.alpha < 0.0);
    }

    #[test]
    fn test_barycentric_either_winding() {
        // Clockwise ordering flips numerators and denominators together
        let e = BarycentricEvaluator::new(
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 4.0, 0.0, 1.0),
            Vec4::new(4.0, 0.0, 0.0, 1.0),
        );
        let c = e.evaluate(Vec2::new(1.0, 1.0));
        assert!(!c.is_outside_triangle());
        assert!((c.sum() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_triangle_is_not_finite() {
        let p = Vec4::new(1.0, 1.0, 0.0, 1.0);
        let c = BarycentricEvaluator::new(p, p, p).evaluate(Vec2::new(0.5, 0.5));
        assert!(!c.alpha.is_finite());
    }
}
