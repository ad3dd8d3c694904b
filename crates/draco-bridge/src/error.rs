use std::io;

use draco_core::{DracoError, GeometryKind};
use thiserror::Error;

use crate::utilities::OutputFormat;

/// Broad class of a [`BridgeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any file was touched.
    Argument,
    /// The input could not be read or the output could not be written.
    Io,
    /// The codec or a format reader/writer reported a failure.
    Codec,
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Input or output file name is empty")]
    EmptyPath,

    #[error("The maximum number of quantization bits for the {attribute} attribute is {max}, got {bits}")]
    QuantizationBitsTooLarge {
        attribute: &'static str,
        bits: i32,
        max: i32,
    },

    #[error("Position attribute cannot be skipped")]
    PositionSkipped,

    #[error("Compression level {0} is outside 0..=10")]
    CompressionLevelOutOfRange(i32),

    #[error("Unsupported output file extension in {0}, expected .obj or .ply")]
    UnsupportedOutputExtension(String),

    #[error("Failed to read {path}: {source}")]
    Read { path: String, source: DracoError },

    #[error("Failed to write {path}: {source}")]
    Write { path: String, source: DracoError },

    #[error("Failed loading the input {kind} from {path}: {source}")]
    Load {
        path: String,
        kind: GeometryKind,
        source: DracoError,
    },

    #[error("Unknown geometry type in {path}: {source}")]
    UnknownGeometryType { path: String, source: DracoError },

    #[error("Failed to encode the {kind}: {source}")]
    Encode { kind: GeometryKind, source: DracoError },

    #[error("Failed to decode {path}: {source}")]
    Decode { path: String, source: DracoError },

    #[error("Failed to write {path} as {format}: {source}")]
    OutputEncode {
        path: String,
        format: OutputFormat,
        source: io::Error,
    },
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::EmptyPath
            | BridgeError::QuantizationBitsTooLarge { .. }
            | BridgeError::PositionSkipped
            | BridgeError::CompressionLevelOutOfRange(_)
            | BridgeError::UnsupportedOutputExtension(_) => ErrorKind::Argument,
            BridgeError::Read { .. } | BridgeError::Write { .. } => ErrorKind::Io,
            BridgeError::Load { .. }
            | BridgeError::UnknownGeometryType { .. }
            | BridgeError::Encode { .. }
            | BridgeError::Decode { .. }
            | BridgeError::OutputEncode { .. } => ErrorKind::Codec,
        }
    }
}
