//! Draco Core Library
//!
//! Geometry model, bitstream buffers and a sequential Draco codec for meshes
//! and point clouds, plus the pluggable file reader/writer factories every
//! file-backed call goes through.

// =============================================================================
// Core modules - always available
// =============================================================================

pub mod compression_config;
pub mod data_buffer;
pub mod draco_types;
pub mod file_reader_factory;
pub mod file_utils;
pub mod file_writer_factory;
pub mod geometry;
pub mod geometry_attribute;
pub mod geometry_indices;
pub mod mesh;
pub mod point_cloud;
pub mod quantization_utils;
pub mod status;
pub mod version;

// =============================================================================
// Decoder-only modules
// =============================================================================

#[cfg(feature = "decoder")]
pub mod decode;
#[cfg(feature = "decoder")]
pub mod decoder_buffer;

// =============================================================================
// Encoder-only modules
// =============================================================================

#[cfg(feature = "encoder")]
pub mod encode;
#[cfg(feature = "encoder")]
pub mod encoder_buffer;
#[cfg(feature = "encoder")]
pub mod encoder_options;

// =============================================================================
// Core re-exports - always available
// =============================================================================

pub use compression_config::EncodedGeometryType;
pub use data_buffer::DataBuffer;
pub use draco_types::DataType;
pub use file_reader_factory::{FileReaderFactory, FileReaderInterface};
pub use file_writer_factory::{FileWriterFactory, FileWriterInterface};
pub use geometry::{Geometry, GeometryKind};
pub use geometry_attribute::{GeometryAttribute, GeometryAttributeType, PointAttribute};
pub use geometry_indices::{AttributeValueIndex, FaceIndex, PointIndex};
pub use mesh::Mesh;
pub use point_cloud::PointCloud;
pub use status::{DracoError, Status, StatusOr};

// =============================================================================
// Decoder re-exports
// =============================================================================

#[cfg(feature = "decoder")]
pub use decode::Decoder;
#[cfg(feature = "decoder")]
pub use decoder_buffer::DecoderBuffer;

// =============================================================================
// Encoder re-exports
// =============================================================================

#[cfg(feature = "encoder")]
pub use encode::{Encoder, MAX_QUANTIZATION_BITS};
#[cfg(feature = "encoder")]
pub use encoder_buffer::EncoderBuffer;
#[cfg(feature = "encoder")]
pub use encoder_options::EncoderOptions;
