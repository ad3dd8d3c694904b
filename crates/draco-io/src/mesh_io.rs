//! Format-agnostic loading.
//!
//! The format is picked from the file content: a `DRACO` header is decoded,
//! a `ply` magic goes to the PLY reader and anything else is parsed as OBJ.

use tracing::debug;

use draco_core::decoder_buffer::DecoderBuffer;
use draco_core::file_utils::read_file_to_buffer;
use draco_core::mesh::Mesh;
use draco_core::point_cloud::PointCloud;
use draco_core::status::{DracoError, StatusOr};
use draco_core::version::DRACO_MAGIC;
use draco_core::Decoder;

use crate::obj_reader::ObjReader;
use crate::ply_reader::PlyReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Draco,
    Ply,
    Obj,
}

impl InputFormat {
    pub fn sniff(data: &[u8]) -> Self {
        if data.starts_with(DRACO_MAGIC) {
            InputFormat::Draco
        } else if data.starts_with(b"ply") {
            InputFormat::Ply
        } else {
            InputFormat::Obj
        }
    }
}

fn load_error(file_name: &str, err: std::io::Error) -> DracoError {
    DracoError::DracoError(format!("Failed to load {}: {}", file_name, err))
}

fn parse_mesh(file_name: &str, data: Vec<u8>, format: InputFormat) -> StatusOr<Mesh> {
    match format {
        InputFormat::Draco => {
            let mut buffer = DecoderBuffer::new(&data);
            Decoder::new().decode_mesh_from_buffer(&mut buffer)
        }
        InputFormat::Ply => PlyReader::from_bytes(data)
            .read_mesh()
            .map_err(|e| load_error(file_name, e)),
        InputFormat::Obj => ObjReader::from_bytes(&data)
            .read_mesh()
            .map_err(|e| load_error(file_name, e)),
    }
}

/// Loads a mesh from an OBJ, PLY or Draco file. A file without faces yields a
/// mesh with zero faces.
pub fn read_mesh_from_file(file_name: &str) -> StatusOr<Mesh> {
    let data = read_file_to_buffer(file_name)?;
    let format = InputFormat::sniff(&data);
    debug!(file = file_name, ?format, bytes = data.len(), "loading mesh");
    parse_mesh(file_name, data, format)
}

/// Loads every point of an OBJ, PLY or Draco file, dropping connectivity.
pub fn read_point_cloud_from_file(file_name: &str) -> StatusOr<PointCloud> {
    let data = read_file_to_buffer(file_name)?;
    let format = InputFormat::sniff(&data);
    debug!(file = file_name, ?format, bytes = data.len(), "loading point cloud");
    if format == InputFormat::Draco {
        let mut buffer = DecoderBuffer::new(&data);
        return Decoder::new().decode_point_cloud_from_buffer(&mut buffer);
    }
    Ok(parse_mesh(file_name, data, format)?.into_point_cloud())
}
