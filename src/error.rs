use thiserror::Error;

pub type Result<T> = std::result::Result<T, RasterError>;

/// Errors raised while configuring or executing a draw.
///
/// Every variant is fatal for the draw that raised it. Pixels written before
/// the error stay written; there is no rollback.
#[derive(Debug, Error, PartialEq)]
pub enum RasterError {
    #[error("unsupported fill mode: {0}")]
    UnsupportedFillMode(u32),

    #[error("unsupported multisample count {0} (expected 0..=4)")]
    UnsupportedSampleCount(u32),

    #[error("pixel shader input {semantic} is not written by the previous stage")]
    MissingRegisterMapping { semantic: String },

    #[error("no {0} shader bound")]
    MissingShader(&'static str),

    #[error("index {index} out of range for {len} vertices")]
    IndexOutOfRange { index: u32, len: usize },

    #[error("expected {expected} samples per pixel, found {found}")]
    SampleCountMismatch { expected: u32, found: u32 },

    #[error("depth buffer is {depth:?}, render target is {target:?}")]
    TargetSizeMismatch {
        target: (usize, usize),
        depth: (usize, usize),
    },
}
