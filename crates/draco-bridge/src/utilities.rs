//! Encode and decode between files.
//!
//! [`encode`] and [`decode`] are the boolean entry points; they log the
//! failure reason and never return an error. [`encode_file`] and
//! [`decode_file`] do the work and return the reason, plus a report on
//! success.

use std::fmt;
use std::io;
use std::time::{Duration, Instant};

use draco_core::compression_config::EncodedGeometryType;
use draco_core::file_utils::{read_file_to_buffer, write_buffer_to_file};
use draco_core::{Decoder, DecoderBuffer, DracoError, EncoderBuffer, Geometry, GeometryKind};
use draco_io::mesh_io::{read_mesh_from_file, read_point_cloud_from_file};
use draco_io::{ObjWriter, PlyWriter, PointCloudWriter, Writer};
use tracing::{debug, info, instrument, warn};

use crate::error::BridgeError;
use crate::file_helper::register_file_io;
use crate::options::{EncodeOptions, MAX_COMPRESSION_LEVEL};

/// Non-fatal notes attached to a successful encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// The compression level was below the maximum.
    IncreaseCompressionLevel { current: i32 },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::IncreaseCompressionLevel { current } => write!(
                f,
                "For better compression, increase the compression level up to '-cl {}' (currently {})",
                MAX_COMPRESSION_LEVEL, current
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeReport {
    /// Which codec path was taken.
    pub geometry: GeometryKind,
    pub encoded_size: usize,
    pub speed: i32,
    pub elapsed: Duration,
    pub advisories: Vec<Advisory>,
}

/// Text format written by [`decode_file`], chosen from the output extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Obj,
    Ply,
}

impl OutputFormat {
    /// Looks at the last four characters of `path`, ignoring case.
    pub fn from_path(path: &str) -> Option<Self> {
        let chars: Vec<char> = path.chars().collect();
        if chars.len() < 4 {
            return None;
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        match tail.to_lowercase().as_str() {
            ".obj" => Some(OutputFormat::Obj),
            ".ply" => Some(OutputFormat::Ply),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Obj => write!(f, "OBJ"),
            OutputFormat::Ply => write!(f, "PLY"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    pub geometry: GeometryKind,
    pub num_points: usize,
    pub num_faces: usize,
    pub format: OutputFormat,
    pub elapsed: Duration,
}

fn load_error(path: &str, kind: GeometryKind, source: DracoError) -> BridgeError {
    match source {
        DracoError::IoError(_) => BridgeError::Read {
            path: path.to_string(),
            source,
        },
        _ => BridgeError::Load {
            path: path.to_string(),
            kind,
            source,
        },
    }
}

fn load_geometry(input: &str, is_point_cloud: bool) -> Result<Geometry, BridgeError> {
    if is_point_cloud {
        read_point_cloud_from_file(input)
            .map(Geometry::PointCloud)
            .map_err(|e| load_error(input, GeometryKind::PointCloud, e))
    } else {
        read_mesh_from_file(input)
            .map(Geometry::Mesh)
            .map_err(|e| load_error(input, GeometryKind::Mesh, e))
    }
}

/// Loads `input`, applies `options` and writes the Draco encoding to `output`.
///
/// The file shim is registered first, so every file goes through it.
/// Options are validated before anything is read. Attributes whose bits are
/// negative are removed from the loaded geometry; the caller's options are
/// left untouched and the deletion flags are only tracked internally.
#[instrument(skip(options))]
pub fn encode_file(input: &str, output: &str, options: &EncodeOptions) -> Result<EncodeReport, BridgeError> {
    register_file_io();
    options.validate()?;
    if input.is_empty() || output.is_empty() {
        return Err(BridgeError::EmptyPath);
    }

    let mut options = options.clone();
    let mut geometry = load_geometry(input, options.is_point_cloud)?;
    debug!(
        kind = %geometry.kind(),
        points = geometry.point_cloud().num_points(),
        faces = geometry.num_faces(),
        "loaded input"
    );

    if options.apply_attribute_deletions(geometry.point_cloud_mut()) && options.deduplicate_point_ids {
        let before = geometry.point_cloud().num_points();
        geometry.deduplicate_point_ids();
        debug!(before, after = geometry.point_cloud().num_points(), "deduplicated point ids");
    }

    let encoder = options.configure_encoder();
    let start = Instant::now();
    let mut buffer = EncoderBuffer::new();
    let kind = if geometry.num_faces() > 0 {
        GeometryKind::Mesh
    } else {
        GeometryKind::PointCloud
    };
    encoder
        .encode_geometry_to_buffer(&geometry, &mut buffer)
        .map_err(|source| BridgeError::Encode { kind, source })?;
    let elapsed = start.elapsed();

    write_buffer_to_file(buffer.data(), output).map_err(|source| BridgeError::Write {
        path: output.to_string(),
        source,
    })?;
    info!(
        "Encoded {} saved to {} ({} ms to encode)",
        kind,
        output,
        elapsed.as_millis()
    );
    info!("Encoded size = {} bytes", buffer.size());

    let mut advisories = Vec::new();
    if options.compression_level < MAX_COMPRESSION_LEVEL {
        let advisory = Advisory::IncreaseCompressionLevel {
            current: options.compression_level,
        };
        info!("{}", advisory);
        advisories.push(advisory);
    }

    Ok(EncodeReport {
        geometry: kind,
        encoded_size: buffer.size(),
        speed: options.speed(),
        elapsed,
        advisories,
    })
}

/// Encodes `input` into `output`. False on any failure; the reason is logged.
pub fn encode(input: &str, output: &str, options: &EncodeOptions) -> bool {
    match encode_file(input, output, options) {
        Ok(_) => true,
        Err(err) => {
            warn!(kind = ?err.kind(), "{}", err);
            false
        }
    }
}

fn write_geometry(geometry: &Geometry, output: &str, format: OutputFormat) -> io::Result<()> {
    match (geometry, format) {
        (Geometry::Mesh(mesh), OutputFormat::Obj) => {
            let mut writer = ObjWriter::new();
            writer.add_mesh(mesh, None)?;
            writer.write(output)
        }
        (Geometry::PointCloud(pc), OutputFormat::Obj) => {
            let mut writer = ObjWriter::new();
            writer.add_point_cloud(pc)?;
            writer.write(output)
        }
        (Geometry::Mesh(mesh), OutputFormat::Ply) => {
            let mut writer = PlyWriter::new();
            writer.add_mesh(mesh, None)?;
            writer.write(output)
        }
        (Geometry::PointCloud(pc), OutputFormat::Ply) => {
            let mut writer = PlyWriter::new();
            writer.add_point_cloud(pc)?;
            writer.write(output)
        }
    }
}

/// Decodes the Draco file `input` and writes it as OBJ or PLY to `output`.
///
/// The output format comes from the extension of `output` and is checked
/// before anything is read, so an unsupported extension produces no file.
#[instrument]
pub fn decode_file(input: &str, output: &str) -> Result<DecodeReport, BridgeError> {
    register_file_io();
    if input.is_empty() || output.is_empty() {
        return Err(BridgeError::EmptyPath);
    }
    let format = OutputFormat::from_path(output)
        .ok_or_else(|| BridgeError::UnsupportedOutputExtension(output.to_string()))?;

    let data = read_file_to_buffer(input).map_err(|source| BridgeError::Read {
        path: input.to_string(),
        source,
    })?;

    let mut buffer = DecoderBuffer::new(&data);
    let geometry_type = Decoder::get_encoded_geometry_type(&buffer).map_err(|source| {
        BridgeError::UnknownGeometryType {
            path: input.to_string(),
            source,
        }
    })?;

    let start = Instant::now();
    let decoder = Decoder::new();
    let decoded = match geometry_type {
        EncodedGeometryType::TriangularMesh => decoder.decode_mesh_from_buffer(&mut buffer).map(Geometry::Mesh),
        EncodedGeometryType::PointCloud => decoder
            .decode_point_cloud_from_buffer(&mut buffer)
            .map(Geometry::PointCloud),
        EncodedGeometryType::InvalidGeometryType => {
            return Err(BridgeError::UnknownGeometryType {
                path: input.to_string(),
                source: DracoError::DracoError("Invalid geometry type".into()),
            })
        }
    };
    let geometry = decoded.map_err(|source| BridgeError::Decode {
        path: input.to_string(),
        source,
    })?;
    let elapsed = start.elapsed();

    write_geometry(&geometry, output, format).map_err(|source| BridgeError::OutputEncode {
        path: output.to_string(),
        format,
        source,
    })?;

    let report = DecodeReport {
        geometry: geometry.kind(),
        num_points: geometry.point_cloud().num_points(),
        num_faces: geometry.num_faces(),
        format,
        elapsed,
    };
    info!(
        "Decoded {} saved to {} ({} ms to decode)",
        report.geometry,
        output,
        elapsed.as_millis()
    );
    Ok(report)
}

/// Decodes `input` into `output`. False on any failure; the reason is logged.
pub fn decode(input: &str, output: &str) -> bool {
    match decode_file(input, output) {
        Ok(_) => true,
        Err(err) => {
            warn!(kind = ?err.kind(), "{}", err);
            false
        }
    }
}
