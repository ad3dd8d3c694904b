//! Common traits for readers and writers.
//!
//! These traits define consistent interfaces for all format implementations.
//!
//! ```ignore
//! use draco_io::{Reader, Writer, ObjReader, PlyWriter};
//!
//! fn convert<R: Reader, W: Writer>(input: &str, output: &str) -> io::Result<()> {
//!     let mesh = R::open(input)?.read_mesh()?;
//!     let mut writer = W::new();
//!     writer.add_mesh(&mesh, Some("Model"))?;
//!     writer.write(output)
//! }
//! ```

use std::io;
use std::path::Path;

use draco_core::mesh::Mesh;
use draco_core::point_cloud::PointCloud;

/// Common interface for mesh writers.
pub trait Writer: Sized {
    /// Create a new writer instance.
    fn new() -> Self;

    /// Add a mesh to be written.
    ///
    /// Formats that hold a single object replace whatever was added before.
    fn add_mesh(&mut self, mesh: &Mesh, name: Option<&str>) -> io::Result<()>;

    /// Write the added geometry to `path` through the registered file writers.
    fn write<P: AsRef<Path>>(&self, path: P) -> io::Result<()>;

    /// Number of vertices that will be written.
    fn vertex_count(&self) -> usize;

    /// Number of faces that will be written.
    fn face_count(&self) -> usize {
        0
    }
}

/// Common interface for mesh readers.
pub trait Reader: Sized {
    /// Open a file for reading through the registered file readers.
    fn open<P: AsRef<Path>>(path: P) -> io::Result<Self>;

    /// Read every mesh in the file.
    fn read_meshes(&mut self) -> io::Result<Vec<Mesh>>;

    /// Read a single mesh from the file.
    ///
    /// Default implementation returns the first mesh from `read_meshes()`.
    fn read_mesh(&mut self) -> io::Result<Mesh> {
        let meshes = self.read_meshes()?;
        if let Some(m) = meshes.into_iter().next() {
            Ok(m)
        } else {
            Err(io::Error::new(io::ErrorKind::InvalidData, "No mesh found"))
        }
    }
}

/// Writers that can output point clouds (without faces).
pub trait PointCloudWriter: Writer {
    fn add_point_cloud(&mut self, pc: &PointCloud) -> io::Result<()>;
}

/// Readers that can produce point clouds.
pub trait PointCloudReader: Reader {
    /// Read every point of the file, ignoring connectivity.
    fn read_point_cloud(&mut self) -> io::Result<PointCloud> {
        Ok(self.read_mesh()?.into_point_cloud())
    }
}
