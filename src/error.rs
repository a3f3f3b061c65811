use thiserror::Error;

/// Errors produced by the optical model and its parsers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OpticsError {
    /// The Abbe formula divides by NA, so it must be a finite positive number
    #[error("numerical aperture must be positive and finite, got {0}")]
    NonPositiveAperture(f64),

    #[error("no objective with {0}x magnification (expected 10, 40, 60 or 100)")]
    UnknownMagnification(u32),

    #[error("unknown observation method '{0}'")]
    UnknownMethod(String),

    #[error("unknown model policy '{0}'")]
    UnknownPolicy(String),
}

pub type Result<T> = std::result::Result<T, OpticsError>;
