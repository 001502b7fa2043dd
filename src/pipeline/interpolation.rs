//! Attribute interpolation across a triangle

use crate::math::Vec4;

/// Barycentric-weighted sum of three scalars
#[inline]
pub fn linear(alpha: f32, beta: f32, gamma: f32, v0: f32, v1: f32, v2: f32) -> f32 {
    alpha * v0 + beta * v1 + gamma * v2
}

/// Affine interpolation of a register value (no perspective correction)
#[inline]
pub fn linear_vec4(alpha: f32, beta: f32, gamma: f32, v0: Vec4, v1: Vec4, v2: Vec4) -> Vec4 {
    v0 * alpha + v1 * beta + v2 * gamma
}

/// Interpolated clip-space w at a sample.
///
/// This is the reciprocal of the perspective-weighted barycentric sum and is
/// shared by every attribute interpolated at the same sample.
#[inline]
pub fn precalculate_w(alpha: f32, beta: f32, gamma: f32, w0: f32, w1: f32, w2: f32) -> f32 {
    1.0 / (alpha / w0 + beta / w1 + gamma / w2)
}

/// Perspective-correct interpolation of a register value.
///
/// `w` must come from [`precalculate_w`] for the same weights.
#[inline]
#[allow(clippy::too_many_arguments)]
pub fn perspective(
    alpha: f32,
    beta: f32,
    gamma: f32,
    v0: Vec4,
    v1: Vec4,
    v2: Vec4,
    w0: f32,
    w1: f32,
    w2: f32,
    w: f32,
) -> Vec4 {
    (v0 * (alpha / w0) + v1 * (beta / w1) + v2 * (gamma / w2)) * w
}
