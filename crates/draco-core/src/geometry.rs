//! Owned result of loading or decoding: either a mesh or a bare point cloud.

use crate::mesh::Mesh;
use crate::point_cloud::PointCloud;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Mesh,
    PointCloud,
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryKind::Mesh => write!(f, "mesh"),
            GeometryKind::PointCloud => write!(f, "point cloud"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Geometry {
    Mesh(Mesh),
    PointCloud(PointCloud),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Mesh(_) => GeometryKind::Mesh,
            Geometry::PointCloud(_) => GeometryKind::PointCloud,
        }
    }

    pub fn point_cloud(&self) -> &PointCloud {
        match self {
            Geometry::Mesh(mesh) => mesh,
            Geometry::PointCloud(pc) => pc,
        }
    }

    pub fn point_cloud_mut(&mut self) -> &mut PointCloud {
        match self {
            Geometry::Mesh(mesh) => mesh,
            Geometry::PointCloud(pc) => pc,
        }
    }

    pub fn num_faces(&self) -> usize {
        match self {
            Geometry::Mesh(mesh) => mesh.num_faces(),
            Geometry::PointCloud(_) => 0,
        }
    }

    /// Deduplicates attribute values, then point ids. Faces are remapped for meshes.
    pub fn deduplicate_point_ids(&mut self) -> bool {
        match self {
            Geometry::Mesh(mesh) => {
                mesh.deduplicate_attribute_values();
                mesh.deduplicate_point_ids()
            }
            Geometry::PointCloud(pc) => {
                pc.deduplicate_attribute_values();
                pc.deduplicate_point_ids().is_some()
            }
        }
    }
}

impl From<Mesh> for Geometry {
    fn from(mesh: Mesh) -> Self {
        Geometry::Mesh(mesh)
    }
}

impl From<PointCloud> for Geometry {
    fn from(pc: PointCloud) -> Self {
        Geometry::PointCloud(pc)
    }
}
