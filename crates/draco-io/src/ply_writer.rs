//! ASCII PLY writer.
//!
//! One vertex per point, with whichever of position, normal, colour and
//! texture coordinate the geometry carries. Faces are written when present.

use std::fmt::Write as _;
use std::io;
use std::path::Path;

use draco_core::draco_types::DataType;
use draco_core::geometry_attribute::{GeometryAttributeType, PointAttribute};
use draco_core::geometry_indices::PointIndex;
use draco_core::mesh::Mesh;
use draco_core::point_cloud::PointCloud;

use crate::traits::{PointCloudWriter, Writer};

/// PLY format writer. Holds a single mesh; adding another replaces it.
#[derive(Debug, Default)]
pub struct PlyWriter {
    mesh: Option<Mesh>,
}

impl PlyWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the held geometry as ASCII PLY. Empty when nothing was added.
    pub fn to_ply_string(&self) -> String {
        let mesh = match &self.mesh {
            Some(mesh) => mesh,
            None => return String::new(),
        };
        let pos = mesh.named_attribute(GeometryAttributeType::Position);
        let normal = mesh
            .named_attribute(GeometryAttributeType::Normal)
            .filter(|a| a.num_components() == 3);
        let color = mesh
            .named_attribute(GeometryAttributeType::Color)
            .filter(|a| (3..=4).contains(&a.num_components()));
        let tex = mesh
            .named_attribute(GeometryAttributeType::TexCoord)
            .filter(|a| a.num_components() == 2);

        let mut out = String::new();
        out.push_str("ply\nformat ascii 1.0\ncomment Decoded by draco-bridge\n");
        let _ = writeln!(out, "element vertex {}", mesh.num_points());
        if pos.is_some() {
            out.push_str("property float x\nproperty float y\nproperty float z\n");
        }
        if normal.is_some() {
            out.push_str("property float nx\nproperty float ny\nproperty float nz\n");
        }
        if let Some(att) = color {
            out.push_str("property uchar red\nproperty uchar green\nproperty uchar blue\n");
            if att.num_components() == 4 {
                out.push_str("property uchar alpha\n");
            }
        }
        if tex.is_some() {
            out.push_str("property float s\nproperty float t\n");
        }
        if mesh.num_faces() > 0 {
            let _ = writeln!(out, "element face {}", mesh.num_faces());
            out.push_str("property list uchar int vertex_indices\n");
        }
        out.push_str("end_header\n");

        for p in 0..mesh.num_points() {
            let point = PointIndex(p as u32);
            let mut fields: Vec<String> = Vec::new();
            for att in [pos, normal].into_iter().flatten() {
                fields.extend(float_fields(att, point));
            }
            if let Some(att) = color {
                fields.extend(color_bytes(att, point).iter().map(|c| c.to_string()));
            }
            if let Some(att) = tex {
                fields.extend(float_fields(att, point));
            }
            out.push_str(&fields.join(" "));
            out.push('\n');
        }
        for face in mesh.faces() {
            let _ = writeln!(out, "3 {} {} {}", face[0].0, face[1].0, face[2].0);
        }
        out
    }
}

fn float_fields(att: &PointAttribute, point: PointIndex) -> impl Iterator<Item = String> {
    att.value_f32(att.mapped_index(point)).into_iter().map(|v| v.to_string())
}

fn color_bytes(att: &PointAttribute, point: PointIndex) -> Vec<u8> {
    let index = att.mapped_index(point);
    match att.data_type() {
        DataType::Uint8 => att.value_bytes(index).to_vec(),
        dt if dt.is_float() && att.normalized() => att
            .value_f32(index)
            .iter()
            .map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
            .collect(),
        _ => att
            .value_f32(index)
            .iter()
            .map(|v| v.clamp(0.0, 255.0) as u8)
            .collect(),
    }
}

impl Writer for PlyWriter {
    fn new() -> Self {
        PlyWriter::new()
    }

    fn add_mesh(&mut self, mesh: &Mesh, _name: Option<&str>) -> io::Result<()> {
        if mesh.named_attribute(GeometryAttributeType::Position).is_none() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "Mesh has no positions"));
        }
        self.mesh = Some(mesh.clone());
        Ok(())
    }

    fn write<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        if self.mesh.is_none() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "Nothing to write"));
        }
        crate::write_file(path.as_ref(), self.to_ply_string().as_bytes())
    }

    fn vertex_count(&self) -> usize {
        self.mesh.as_ref().map_or(0, |m| m.num_points())
    }

    fn face_count(&self) -> usize {
        self.mesh.as_ref().map_or(0, |m| m.num_faces())
    }
}

impl PointCloudWriter for PlyWriter {
    fn add_point_cloud(&mut self, pc: &PointCloud) -> io::Result<()> {
        self.add_mesh(&Mesh::from_point_cloud(pc.clone()), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ply_reader::PlyReader;
    use draco_core::geometry_indices::AttributeValueIndex;

    fn colored_triangle() -> Mesh {
        let text = "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\nproperty float y\n\
                    property float z\nproperty uchar red\nproperty uchar green\nproperty uchar blue\n\
                    property float s\nproperty float t\n\
                    element face 1\nproperty list uchar int vertex_indices\nend_header\n\
                    0 0 0 10 20 30 0 0\n1 0 0 40 50 60 1 0\n0 1 0 70 80 90 0 1\n3 0 1 2\n";
        PlyReader::from_bytes(text.as_bytes().to_vec()).read_mesh().unwrap()
    }

    #[test]
    fn test_write_header_and_rows() {
        let mut writer = PlyWriter::new();
        Writer::add_mesh(&mut writer, &colored_triangle(), None).unwrap();
        let text = writer.to_ply_string();
        assert!(text.starts_with("ply\nformat ascii 1.0\n"));
        assert!(text.contains("element vertex 3\n"));
        assert!(text.contains("element face 1\n"));
        assert!(text.contains("\n1 0 0 40 50 60 1 0\n"));
        assert!(text.ends_with("3 0 1 2\n"));
    }

    #[test]
    fn test_round_trip_through_reader() {
        let mut writer = PlyWriter::new();
        Writer::add_mesh(&mut writer, &colored_triangle(), None).unwrap();
        let mesh = PlyReader::from_bytes(writer.to_ply_string().into_bytes())
            .read_mesh()
            .unwrap();
        assert_eq!(mesh.num_faces(), 1);
        let colors = mesh.named_attribute(GeometryAttributeType::Color).unwrap();
        assert_eq!(colors.value_bytes(AttributeValueIndex(2)), &[70, 80, 90]);
        let tex = mesh.named_attribute(GeometryAttributeType::TexCoord).unwrap();
        assert_eq!(tex.value_f32(AttributeValueIndex(2)), vec![0.0, 1.0]);
    }

    #[test]
    fn test_point_cloud_has_no_face_element() {
        let mut pc = PointCloud::new();
        pc.add_attribute(PointAttribute::from_f32_values(
            GeometryAttributeType::Position,
            3,
            &[0.0, 0.0, 0.0],
        ));
        let mut writer = PlyWriter::new();
        writer.add_point_cloud(&pc).unwrap();
        let text = writer.to_ply_string();
        assert!(!text.contains("element face"));
        assert!(text.ends_with("end_header\n0 0 0\n"));
    }

    #[test]
    fn test_write_without_mesh_fails() {
        let writer = PlyWriter::new();
        assert!(writer.write("unused.ply").is_err());
    }
}
