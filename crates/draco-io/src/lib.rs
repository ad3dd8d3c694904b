//! Draco I/O library for reading and writing 3D mesh formats.
//!
//! Every reader and writer goes through `draco_core::file_utils`, so a file
//! opener registered with the core factories sees all format I/O as well.
//!
//! # Supported Formats
//!
//! | Format | Read | Write |
//! |--------|------|-------|
//! | OBJ    | ✓    | ✓     |
//! | PLY    | ✓ (ascii, binary) | ✓ (ascii) |
//! | DRC    | ✓ (via [`mesh_io`]) | - |
//!
//! ```ignore
//! use draco_io::mesh_io::read_mesh_from_file;
//! use draco_io::{ObjWriter, Writer};
//!
//! let mesh = read_mesh_from_file("bunny.ply")?;
//! let mut writer = ObjWriter::new();
//! writer.add_mesh(&mesh, None)?;
//! writer.write("bunny.obj")?;
//! ```

use std::io;
use std::path::Path;

use draco_core::file_utils;

pub mod mesh_io;
pub mod obj_reader;
pub mod obj_writer;
pub mod ply_reader;
pub mod ply_writer;
pub mod traits;

pub use obj_reader::ObjReader;
pub use obj_writer::ObjWriter;
pub use ply_reader::PlyReader;
pub use ply_writer::PlyWriter;
pub use traits::{PointCloudReader, PointCloudWriter, Reader, Writer};

fn path_str(path: &Path) -> io::Result<&str> {
    path.to_str().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Path is not valid UTF-8: {}", path.display()),
        )
    })
}

pub(crate) fn read_file(path: &Path) -> io::Result<Vec<u8>> {
    file_utils::read_file_to_buffer(path_str(path)?)
        .map_err(|e| io::Error::new(io::ErrorKind::NotFound, e.to_string()))
}

pub(crate) fn write_file(path: &Path, data: &[u8]) -> io::Result<()> {
    file_utils::write_buffer_to_file(data, path_str(path)?)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}
