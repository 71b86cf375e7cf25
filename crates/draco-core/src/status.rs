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
    #[error("Unknown version: {0}")]
    UnknownVersion(String),
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),
    #[error("Bitstream version unsupported")]
    BitstreamVersionUnsupported,
    /// Ran out of bytes while decoding (a.k.a. buffer underrun).
    #[error("Buffer decode error: {0}")]
    BufferError(String),
    /// Input geometry violates a documented invariant.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Options request a combination the encoder does not support.
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),
    /// Header magic bytes did not match or were truncated.
    #[error("Corrupted header: {0}")]
    CorruptedHeader(String),
    /// Header is well-formed but names an unknown encoding method id.
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),
    /// Bitstream violates an internal invariant past the header.
    #[error("Malformed bitstream: {0}")]
    MalformedBitstream(String),
}

pub type Status = Result<(), DracoError>;

impl From<()> for DracoError {
    fn from(_: ()) -> Self {
        DracoError::DracoError("Unknown error".to_string())
    }
}

pub fn ok_status() -> Status {
    Ok(())
}

pub fn error_status(msg: impl Into<String>) -> DracoError {
    DracoError::DracoError(msg.into())
}
