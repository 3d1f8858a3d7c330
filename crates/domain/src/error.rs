use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    EmptyImage,
    PixelBufferMismatch { expected: usize, actual: usize },
    EmptyRenderArea,
    NonFiniteClick(&'static str),
    NoImageLoaded,
    PreconditionNotMet,
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyImage => write!(f, "image must have non-zero dimensions"),
            Self::PixelBufferMismatch { expected, actual } => write!(
                f,
                "pixel buffer length {actual} does not match dimensions (expected {expected})"
            ),
            Self::EmptyRenderArea => {
                write!(f, "rendered dimensions must be positive and finite")
            }
            Self::NonFiniteClick(axis) => write!(f, "click coordinate {axis} must be finite"),
            Self::NoImageLoaded => write!(f, "no image loaded"),
            Self::PreconditionNotMet => {
                write!(f, "please upload an image and select a color point")
            }
        }
    }
}

impl std::error::Error for DomainError {}
