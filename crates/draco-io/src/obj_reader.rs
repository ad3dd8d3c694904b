//! OBJ format reader for meshes and point clouds.
//!
//! Understands `v`, `vt`, `vn` and `f` statements. Faces with more than three
//! corners are fan triangulated. Every distinct `v/vt/vn` corner tuple becomes
//! one point; positions, texture coordinates and normals are stored once each
//! and reached through an explicit point mapping. A file without faces is read
//! as a point cloud with one point per `v`.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use draco_core::geometry_attribute::{GeometryAttributeType, PointAttribute};
use draco_core::geometry_indices::{AttributeValueIndex, PointIndex};
use draco_core::mesh::Mesh;

use crate::traits::{PointCloudReader, Reader};

/// OBJ format reader.
#[derive(Debug)]
pub struct ObjReader {
    source: String,
}

impl ObjReader {
    /// Open an OBJ file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let bytes = crate::read_file(path.as_ref())?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Wrap OBJ text already in memory.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            source: String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    /// Read all `v` positions, ignoring faces.
    pub fn read_positions(&mut self) -> io::Result<Vec<[f32; 3]>> {
        Ok(parse_obj(&self.source)?.positions)
    }

    /// Read a mesh with positions, texture coordinates, normals and faces.
    pub fn read_mesh(&mut self) -> io::Result<Mesh> {
        build_mesh(parse_obj(&self.source)?)
    }
}

impl Reader for ObjReader {
    fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        ObjReader::open(path)
    }

    fn read_meshes(&mut self) -> io::Result<Vec<Mesh>> {
        Ok(vec![ObjReader::read_mesh(self)?])
    }
}

impl PointCloudReader for ObjReader {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Corner {
    position: u32,
    tex_coord: Option<u32>,
    normal: Option<u32>,
}

#[derive(Debug, Default)]
struct ObjData {
    positions: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    faces: Vec<[Corner; 3]>,
}

fn invalid(line_no: usize, msg: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("OBJ line {}: {}", line_no, msg))
}

fn parse_floats<'a, const N: usize>(
    parts: impl Iterator<Item = &'a str>,
    required: usize,
    line_no: usize,
) -> io::Result<[f32; N]> {
    let mut out = [0.0f32; N];
    let mut count = 0;
    for (slot, token) in out.iter_mut().zip(parts) {
        *slot = token
            .parse()
            .map_err(|_| invalid(line_no, format!("bad number '{}'", token)))?;
        count += 1;
    }
    if count < required {
        return Err(invalid(line_no, format!("expected {} values, found {}", required, count)));
    }
    Ok(out)
}

/// Resolves a 1-based (or negative, relative) OBJ index against `count` entries.
fn resolve_index(token: &str, count: usize, line_no: usize) -> io::Result<u32> {
    let index: i64 = token
        .parse()
        .map_err(|_| invalid(line_no, format!("bad index '{}'", token)))?;
    let resolved = match index {
        i if i > 0 => i - 1,
        i if i < 0 => count as i64 + i,
        _ => return Err(invalid(line_no, "index 0 is not valid")),
    };
    if resolved < 0 || resolved >= count as i64 {
        return Err(invalid(line_no, format!("index {} out of range", index)));
    }
    Ok(resolved as u32)
}

fn parse_corner(token: &str, data: &ObjData, line_no: usize) -> io::Result<Corner> {
    let mut parts = token.split('/');
    let position = resolve_index(parts.next().unwrap_or(""), data.positions.len(), line_no)?;
    let tex_coord = match parts.next() {
        Some(t) if !t.is_empty() => Some(resolve_index(t, data.tex_coords.len(), line_no)?),
        _ => None,
    };
    let normal = match parts.next() {
        Some(n) if !n.is_empty() => Some(resolve_index(n, data.normals.len(), line_no)?),
        _ => None,
    };
    Ok(Corner { position, tex_coord, normal })
}

fn parse_obj(source: &str) -> io::Result<ObjData> {
    let mut data = ObjData::default();
    for (i, line) in source.lines().enumerate() {
        let line_no = i + 1;
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => data.positions.push(parse_floats(parts, 3, line_no)?),
            Some("vt") => data.tex_coords.push(parse_floats(parts, 1, line_no)?),
            Some("vn") => data.normals.push(parse_floats(parts, 3, line_no)?),
            Some("f") => {
                let corners = parts
                    .map(|token| parse_corner(token, &data, line_no))
                    .collect::<io::Result<Vec<_>>>()?;
                if corners.len() < 3 {
                    return Err(invalid(line_no, "face needs at least three corners"));
                }
                for k in 1..corners.len() - 1 {
                    data.faces.push([corners[0], corners[k], corners[k + 1]]);
                }
            }
            // Comments, groups, materials and smoothing are not needed.
            _ => {}
        }
    }
    if data.positions.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "No vertices found"));
    }
    Ok(data)
}

fn mapped_attribute<const N: usize>(
    att_type: GeometryAttributeType,
    values: &[[f32; N]],
    points: &[Corner],
    select: impl Fn(&Corner) -> u32,
) -> PointAttribute {
    let flat: Vec<f32> = values.iter().flatten().copied().collect();
    let mut att = PointAttribute::from_f32_values(att_type, N as u8, &flat);
    att.set_explicit_mapping(points.len());
    for (p, corner) in points.iter().enumerate() {
        att.set_point_map_entry(PointIndex(p as u32), AttributeValueIndex(select(corner)));
    }
    att
}

fn build_mesh(data: ObjData) -> io::Result<Mesh> {
    let mut mesh = Mesh::new();

    if data.faces.is_empty() {
        let flat: Vec<f32> = data.positions.iter().flatten().copied().collect();
        mesh.add_attribute(PointAttribute::from_f32_values(GeometryAttributeType::Position, 3, &flat));
        return Ok(mesh);
    }

    let mut point_of: HashMap<Corner, PointIndex> = HashMap::new();
    let mut points: Vec<Corner> = Vec::new();
    for face in &data.faces {
        let mut indices = [PointIndex(0); 3];
        for (slot, corner) in indices.iter_mut().zip(face.iter()) {
            *slot = *point_of.entry(*corner).or_insert_with(|| {
                points.push(*corner);
                PointIndex(points.len() as u32 - 1)
            });
        }
        mesh.add_face(indices);
    }
    mesh.set_num_points(points.len());

    mesh.add_attribute(mapped_attribute(
        GeometryAttributeType::Position,
        &data.positions,
        &points,
        |c| c.position,
    ));
    if !data.tex_coords.is_empty() && points.iter().any(|c| c.tex_coord.is_some()) {
        mesh.add_attribute(mapped_attribute(
            GeometryAttributeType::TexCoord,
            &data.tex_coords,
            &points,
            |c| c.tex_coord.unwrap_or(0),
        ));
    }
    if !data.normals.is_empty() && points.iter().any(|c| c.normal.is_some()) {
        mesh.add_attribute(mapped_attribute(
            GeometryAttributeType::Normal,
            &data.normals,
            &points,
            |c| c.normal.unwrap_or(0),
        ));
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use draco_core::geometry_indices::FaceIndex;

    fn read(text: &str) -> io::Result<Mesh> {
        ObjReader::from_bytes(text.as_bytes()).read_mesh()
    }

    #[test]
    fn test_read_obj_positions() {
        let mut reader = ObjReader::from_bytes(
            b"# comment\nv 1.0 2.0 3.0\nv 4.5 5.5 6.5\nvn 0 1 0\nvt 0.5 0.5\nv -1.0 -2.0 -3.0\n",
        );
        let positions = reader.read_positions().unwrap();
        assert_eq!(positions, vec![[1.0, 2.0, 3.0], [4.5, 5.5, 6.5], [-1.0, -2.0, -3.0]]);
    }

    #[test]
    fn test_quad_is_fan_triangulated() {
        let mesh = read("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").unwrap();
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_points(), 4);
        assert_eq!(mesh.face(FaceIndex(0)), [PointIndex(0), PointIndex(1), PointIndex(2)]);
        assert_eq!(mesh.face(FaceIndex(1)), [PointIndex(0), PointIndex(2), PointIndex(3)]);
    }

    #[test]
    fn test_corner_tuples_become_points() {
        // Two triangles share positions 1 and 3 but not their texture coordinates.
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
vt 0 0
vt 1 0
vt 0 1
vt 1 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
f 2/4/1 4/4/1 3/3/1
";
        let mesh = read(text).unwrap();
        assert_eq!(mesh.num_faces(), 2);
        // 1/1, 2/2, 3/3, 2/4, 4/4; 3/3 is shared.
        assert_eq!(mesh.num_points(), 5);
        assert_eq!(mesh.num_attributes(), 3);

        let pos = mesh.named_attribute(GeometryAttributeType::Position).unwrap();
        let tex = mesh.named_attribute(GeometryAttributeType::TexCoord).unwrap();
        let p = mesh.face(FaceIndex(1))[0];
        assert_eq!(pos.value_f32(pos.mapped_index(p)), vec![1.0, 0.0, 0.0]);
        assert_eq!(tex.value_f32(tex.mapped_index(p)), vec![1.0, 1.0]);
        assert!(mesh.named_attribute(GeometryAttributeType::Normal).is_some());
    }

    #[test]
    fn test_negative_indices() {
        let mesh = read("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        assert_eq!(mesh.face(FaceIndex(0)), [PointIndex(0), PointIndex(1), PointIndex(2)]);
    }

    #[test]
    fn test_vertices_only_is_point_cloud() {
        let mesh = read("v 0 0 0\nv 1 0 0\n").unwrap();
        assert_eq!(mesh.num_faces(), 0);
        assert_eq!(mesh.num_points(), 2);
    }

    #[test]
    fn test_invalid_input() {
        assert!(read("").is_err());
        assert!(read("v 0 0\n").is_err());
        assert!(read("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n").is_err());
        assert!(read("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").is_err());
        assert!(read("v 0 0 0\nv 1 0 0\nf 1 2\n").is_err());
    }

    #[test]
    fn test_open_missing_file() {
        assert!(ObjReader::open("/no/such/dir/model.obj").is_err());
    }

    proptest::proptest! {
        #[test]
        fn polygon_fan_has_n_minus_two_triangles(n in 3usize..16) {
            let mut text = String::new();
            for i in 0..n {
                let angle = i as f32 / n as f32 * std::f32::consts::TAU;
                text.push_str(&format!("v {} {} 0\n", angle.cos(), angle.sin()));
            }
            let corners: Vec<String> = (1..=n).map(|i| i.to_string()).collect();
            text.push_str(&format!("f {}\n", corners.join(" ")));

            let mesh = ObjReader::from_bytes(text.as_bytes()).read_mesh().unwrap();
            proptest::prop_assert_eq!(mesh.num_faces(), n - 2);
            proptest::prop_assert_eq!(mesh.num_points(), n);
        }
    }
}
