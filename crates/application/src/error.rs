use std::fmt::{Display, Formatter};

use color_probe_domain::DomainError;

#[derive(Debug)]
pub enum ApplicationError {
    Domain(DomainError),
    InvalidType(String),
    TooLarge { size: u64, limit: u64 },
    Io(String),
    Decode(String),
    Gateway(String),
}

impl Display for ApplicationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Domain(error) => write!(f, "{error}"),
            Self::InvalidType(media_type) => {
                write!(f, "not a supported image type: {media_type}")
            }
            Self::TooLarge { size, limit } => {
                write!(f, "file is {size} bytes, limit is {limit}")
            }
            Self::Io(msg) => write!(f, "io error: {msg}"),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
            Self::Gateway(msg) => write!(f, "gateway error: {msg}"),
        }
    }
}

impl std::error::Error for ApplicationError {}

impl From<DomainError> for ApplicationError {
    fn from(value: DomainError) -> Self {
        Self::Domain(value)
    }
}
