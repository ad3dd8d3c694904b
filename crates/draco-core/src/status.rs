use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DracoError {
    #[error("General error: {0}")]
    DracoError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),
    #[error("Buffer decode error: {0}")]
    BufferError(String),
}

pub type Status = Result<(), DracoError>;

/// Value-or-error result, the counterpart of `Status` for calls that produce something.
pub type StatusOr<T> = Result<T, DracoError>;

impl From<std::io::Error> for DracoError {
    fn from(err: std::io::Error) -> Self {
        DracoError::IoError(err.to_string())
    }
}

pub fn ok_status() -> Status {
    Ok(())
}

pub fn error_status(msg: impl Into<String>) -> DracoError {
    DracoError::DracoError(msg.into())
}
