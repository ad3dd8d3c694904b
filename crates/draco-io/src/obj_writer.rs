//! OBJ format writer.
//!
//! Attribute values are written once each (`v`, `vt`, `vn`) and faces refer
//! to them through the point mapping, so explicitly mapped meshes keep their
//! shared positions. Point clouds are written as one `v` per point.

use std::fmt::Write as _;
use std::io;
use std::path::Path;

use draco_core::geometry_attribute::{GeometryAttributeType, PointAttribute};
use draco_core::geometry_indices::{AttributeValueIndex, PointIndex};
use draco_core::mesh::Mesh;
use draco_core::point_cloud::PointCloud;

use crate::traits::{PointCloudWriter, Writer};

/// OBJ format writer. Every added mesh becomes an `o` object in one file.
#[derive(Debug, Default)]
pub struct ObjWriter {
    objects: Vec<(Option<String>, Mesh)>,
}

impl ObjWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render everything added so far as OBJ text.
    pub fn to_obj_string(&self) -> String {
        let mut out = String::from("# Decoded by draco-bridge\n");
        let mut offsets = Offsets::default();
        for (name, mesh) in &self.objects {
            if let Some(name) = name {
                let _ = writeln!(out, "o {}", name);
            }
            if mesh.num_faces() == 0 {
                write_points(&mut out, mesh);
                offsets.position += mesh.num_points();
            } else {
                write_mesh(&mut out, mesh, &mut offsets);
            }
        }
        out
    }
}

#[derive(Debug, Default)]
struct Offsets {
    position: usize,
    tex_coord: usize,
    normal: usize,
}

fn write_values(out: &mut String, keyword: &str, att: &PointAttribute) {
    for i in 0..att.size() {
        let _ = write!(out, "{}", keyword);
        for v in att.value_f32(AttributeValueIndex(i as u32)) {
            let _ = write!(out, " {}", v);
        }
        out.push('\n');
    }
}

fn write_points(out: &mut String, pc: &PointCloud) {
    if let Some(pos) = pc.named_attribute(GeometryAttributeType::Position) {
        for p in 0..pc.num_points() {
            out.push('v');
            for v in pos.value_f32(pos.mapped_index(PointIndex(p as u32))) {
                let _ = write!(out, " {}", v);
            }
            out.push('\n');
        }
    }
}

fn write_mesh(out: &mut String, mesh: &Mesh, offsets: &mut Offsets) {
    let pos = mesh.named_attribute(GeometryAttributeType::Position);
    let tex = mesh.named_attribute(GeometryAttributeType::TexCoord);
    let normal = mesh.named_attribute(GeometryAttributeType::Normal);

    if let Some(att) = pos {
        write_values(out, "v", att);
    }
    if let Some(att) = tex {
        write_values(out, "vt", att);
    }
    if let Some(att) = normal {
        write_values(out, "vn", att);
    }

    let index = |att: Option<&PointAttribute>, p: PointIndex, offset: usize| {
        att.map(|a| a.mapped_index(p).0 as usize + offset + 1)
    };
    for face in mesh.faces() {
        out.push('f');
        for &p in face {
            let v = index(pos, p, offsets.position).unwrap_or(p.0 as usize + offsets.position + 1);
            let _ = match (index(tex, p, offsets.tex_coord), index(normal, p, offsets.normal)) {
                (None, None) => write!(out, " {}", v),
                (Some(t), None) => write!(out, " {}/{}", v, t),
                (None, Some(n)) => write!(out, " {}//{}", v, n),
                (Some(t), Some(n)) => write!(out, " {}/{}/{}", v, t, n),
            };
        }
        out.push('\n');
    }

    offsets.position += pos.map_or(0, |a| a.size());
    offsets.tex_coord += tex.map_or(0, |a| a.size());
    offsets.normal += normal.map_or(0, |a| a.size());
}

impl Writer for ObjWriter {
    fn new() -> Self {
        ObjWriter::new()
    }

    fn add_mesh(&mut self, mesh: &Mesh, name: Option<&str>) -> io::Result<()> {
        if mesh.named_attribute(GeometryAttributeType::Position).is_none() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "Mesh has no positions"));
        }
        self.objects.push((name.map(str::to_string), mesh.clone()));
        Ok(())
    }

    fn write<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        crate::write_file(path.as_ref(), self.to_obj_string().as_bytes())
    }

    fn vertex_count(&self) -> usize {
        self.objects
            .iter()
            .map(|(_, mesh)| match mesh.num_faces() {
                0 => mesh.num_points(),
                _ => mesh
                    .named_attribute(GeometryAttributeType::Position)
                    .map_or(0, |a| a.size()),
            })
            .sum()
    }

    fn face_count(&self) -> usize {
        self.objects.iter().map(|(_, mesh)| mesh.num_faces()).sum()
    }
}

impl PointCloudWriter for ObjWriter {
    fn add_point_cloud(&mut self, pc: &PointCloud) -> io::Result<()> {
        self.add_mesh(&Mesh::from_point_cloud(pc.clone()), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj_reader::ObjReader;

    fn textured_quad() -> Mesh {
        ObjReader::from_bytes(
            b"v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\nf 1/1 2/2 3/3 4/4\n",
        )
        .read_mesh()
        .unwrap()
    }

    #[test]
    fn test_write_textured_mesh() {
        let mut writer = ObjWriter::new();
        Writer::add_mesh(&mut writer, &textured_quad(), Some("quad")).unwrap();
        assert_eq!(writer.vertex_count(), 4);
        assert_eq!(writer.face_count(), 2);

        let text = writer.to_obj_string();
        assert!(text.contains("o quad\n"));
        assert!(text.contains("v 1 1 0\n"));
        assert!(text.contains("vt 0 1\n"));
        assert!(text.contains("f 1/1 2/2 3/3\n"));
        assert!(text.contains("f 1/1 3/3 4/4\n"));
    }

    #[test]
    fn test_second_object_indices_are_offset() {
        let mut writer = ObjWriter::new();
        Writer::add_mesh(&mut writer, &textured_quad(), None).unwrap();
        Writer::add_mesh(&mut writer, &textured_quad(), None).unwrap();
        let text = writer.to_obj_string();
        assert!(text.contains("f 5/5 6/6 7/7\n"));
    }

    #[test]
    fn test_write_point_cloud() {
        let mut pc = PointCloud::new();
        pc.add_attribute(PointAttribute::from_f32_values(
            GeometryAttributeType::Position,
            3,
            &[0.5, 1.0, 1.5, 2.0, 2.5, 3.0],
        ));
        let mut writer = ObjWriter::new();
        writer.add_point_cloud(&pc).unwrap();
        let text = writer.to_obj_string();
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 2);
        assert!(!text.contains("\nf "));
    }

    #[test]
    fn test_round_trip_through_reader() {
        let mut writer = ObjWriter::new();
        Writer::add_mesh(&mut writer, &textured_quad(), None).unwrap();
        let mesh = ObjReader::from_bytes(writer.to_obj_string().as_bytes())
            .read_mesh()
            .unwrap();
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_points(), 4);
    }

    #[test]
    fn test_rejects_mesh_without_positions() {
        let mut writer = ObjWriter::new();
        assert!(Writer::add_mesh(&mut writer, &Mesh::new(), None).is_err());
    }
}
