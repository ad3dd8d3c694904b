//! PLY format reader for meshes and point clouds.
//!
//! Handles `ascii`, `binary_little_endian` and `binary_big_endian` bodies.
//! Vertex properties `x y z`, `nx ny nz`, `red green blue [alpha]` and
//! `s t` (or `u v`) become attributes with identity mapping; the face
//! `vertex_indices` (or `vertex_index`) list is fan triangulated. Unknown
//! elements and properties are skipped.

use std::io::{self, Cursor};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};

use draco_core::draco_types::DataType;
use draco_core::geometry_attribute::{GeometryAttributeType, PointAttribute};
use draco_core::geometry_indices::{AttributeValueIndex, PointIndex};
use draco_core::mesh::Mesh;

use crate::traits::{PointCloudReader, Reader};

/// PLY format reader.
#[derive(Debug)]
pub struct PlyReader {
    data: Vec<u8>,
}

impl PlyReader {
    /// Open a PLY file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::from_bytes(crate::read_file(path.as_ref())?))
    }

    /// Wrap PLY bytes already in memory.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Read all vertex positions.
    pub fn read_positions(&mut self) -> io::Result<Vec<[f32; 3]>> {
        let ply = parse_ply(&self.data)?;
        let (x, y, z) = position_columns(&ply)?;
        Ok(ply
            .vertices
            .iter()
            .map(|row| [row[x] as f32, row[y] as f32, row[z] as f32])
            .collect())
    }

    /// Read a mesh with every recognised vertex attribute and faces (if present).
    pub fn read_mesh(&mut self) -> io::Result<Mesh> {
        build_mesh(parse_ply(&self.data)?)
    }
}

impl Reader for PlyReader {
    fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        PlyReader::open(path)
    }

    fn read_meshes(&mut self) -> io::Result<Vec<Mesh>> {
        Ok(vec![PlyReader::read_mesh(self)?])
    }
}

impl PointCloudReader for PlyReader {}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlyType {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl PlyType {
    fn parse(name: &str) -> io::Result<Self> {
        Ok(match name {
            "char" | "int8" => PlyType::Int8,
            "uchar" | "uint8" => PlyType::Uint8,
            "short" | "int16" => PlyType::Int16,
            "ushort" | "uint16" => PlyType::Uint16,
            "int" | "int32" => PlyType::Int32,
            "uint" | "uint32" => PlyType::Uint32,
            "float" | "float32" => PlyType::Float32,
            "double" | "float64" => PlyType::Float64,
            other => return Err(invalid(format!("Unknown PLY type '{}'", other))),
        })
    }
}

#[derive(Debug, Clone)]
enum Property {
    Scalar { name: String, ty: PlyType },
    List { name: String, count_ty: PlyType, item_ty: PlyType },
}

impl Property {
    fn name(&self) -> &str {
        match self {
            Property::Scalar { name, .. } | Property::List { name, .. } => name,
        }
    }
}

#[derive(Debug)]
struct Element {
    name: String,
    count: usize,
    properties: Vec<Property>,
}

struct Header {
    format: Format,
    elements: Vec<Element>,
    body_offset: usize,
}

#[derive(Debug, Default)]
struct PlyData {
    vertex_properties: Vec<String>,
    vertices: Vec<Vec<f64>>,
    faces: Vec<Vec<i64>>,
}

impl PlyData {
    fn column(&self, name: &str) -> Option<usize> {
        self.vertex_properties.iter().position(|p| p == name)
    }

    fn columns<const N: usize>(&self, names: [&str; N]) -> Option<[usize; N]> {
        let mut out = [0usize; N];
        for (slot, name) in out.iter_mut().zip(names) {
            *slot = self.column(name)?;
        }
        Some(out)
    }
}

fn parse_header(data: &[u8]) -> io::Result<Header> {
    if !data.starts_with(b"ply") {
        return Err(invalid("Missing 'ply' magic"));
    }
    let marker = b"end_header";
    let end = data
        .windows(marker.len())
        .position(|w| w == marker)
        .ok_or_else(|| invalid("Missing end_header"))?;
    let mut body_offset = end + marker.len();
    if data.get(body_offset) == Some(&b'\r') {
        body_offset += 1;
    }
    if data.get(body_offset) == Some(&b'\n') {
        body_offset += 1;
    }

    let text = String::from_utf8_lossy(&data[..end]);
    let mut format = None;
    let mut elements: Vec<Element> = Vec::new();
    for line in text.lines().skip(1) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["format", fmt, ..] => {
                format = Some(match *fmt {
                    "ascii" => Format::Ascii,
                    "binary_little_endian" => Format::BinaryLittleEndian,
                    "binary_big_endian" => Format::BinaryBigEndian,
                    other => return Err(invalid(format!("Unknown PLY format '{}'", other))),
                })
            }
            ["element", name, count] => elements.push(Element {
                name: name.to_string(),
                count: count.parse().map_err(|_| invalid(format!("Bad element count '{}'", count)))?,
                properties: Vec::new(),
            }),
            ["property", "list", count_ty, item_ty, name] => {
                let element = elements
                    .last_mut()
                    .ok_or_else(|| invalid("Property before any element"))?;
                element.properties.push(Property::List {
                    name: name.to_string(),
                    count_ty: PlyType::parse(count_ty)?,
                    item_ty: PlyType::parse(item_ty)?,
                });
            }
            ["property", ty, name] => {
                let element = elements
                    .last_mut()
                    .ok_or_else(|| invalid("Property before any element"))?;
                element.properties.push(Property::Scalar {
                    name: name.to_string(),
                    ty: PlyType::parse(ty)?,
                });
            }
            _ => {}
        }
    }

    Ok(Header {
        format: format.ok_or_else(|| invalid("Missing format line"))?,
        elements,
        body_offset,
    })
}

trait ValueSource {
    fn read(&mut self, ty: PlyType) -> io::Result<f64>;
}

struct AsciiSource<'a> {
    tokens: std::str::SplitAsciiWhitespace<'a>,
}

impl ValueSource for AsciiSource<'_> {
    fn read(&mut self, _ty: PlyType) -> io::Result<f64> {
        let token = self
            .tokens
            .next()
            .ok_or_else(|| invalid("Unexpected end of PLY data"))?;
        token
            .parse()
            .map_err(|_| invalid(format!("Bad PLY value '{}'", token)))
    }
}

struct BinarySource<'a, B: ByteOrder> {
    cursor: Cursor<&'a [u8]>,
    _order: std::marker::PhantomData<B>,
}

impl<B: ByteOrder> ValueSource for BinarySource<'_, B> {
    fn read(&mut self, ty: PlyType) -> io::Result<f64> {
        let c = &mut self.cursor;
        Ok(match ty {
            PlyType::Int8 => c.read_i8()? as f64,
            PlyType::Uint8 => c.read_u8()? as f64,
            PlyType::Int16 => c.read_i16::<B>()? as f64,
            PlyType::Uint16 => c.read_u16::<B>()? as f64,
            PlyType::Int32 => c.read_i32::<B>()? as f64,
            PlyType::Uint32 => c.read_u32::<B>()? as f64,
            PlyType::Float32 => c.read_f32::<B>()? as f64,
            PlyType::Float64 => c.read_f64::<B>()?,
        })
    }
}

fn read_body(header: &Header, source: &mut dyn ValueSource) -> io::Result<PlyData> {
    let mut ply = PlyData::default();
    for element in &header.elements {
        let is_vertex = element.name == "vertex";
        let is_face = element.name == "face";
        if is_vertex {
            ply.vertex_properties = element.properties.iter().map(|p| p.name().to_string()).collect();
            ply.vertices.reserve(element.count.min(1 << 20));
        }
        for _ in 0..element.count {
            let mut row = Vec::with_capacity(element.properties.len());
            for property in &element.properties {
                match property {
                    Property::Scalar { ty, .. } => row.push(source.read(*ty)?),
                    Property::List { name, count_ty, item_ty } => {
                        let count = source.read(*count_ty)?;
                        if !(0.0..=u32::MAX as f64).contains(&count) {
                            return Err(invalid("Bad list length"));
                        }
                        let mut items = Vec::with_capacity((count as usize).min(64));
                        for _ in 0..count as usize {
                            items.push(source.read(*item_ty)? as i64);
                        }
                        if is_face && (name == "vertex_indices" || name == "vertex_index") {
                            ply.faces.push(items);
                        }
                        row.push(0.0);
                    }
                }
            }
            if is_vertex {
                ply.vertices.push(row);
            }
        }
    }
    Ok(ply)
}

fn parse_ply(data: &[u8]) -> io::Result<PlyData> {
    let header = parse_header(data)?;
    let body = &data[header.body_offset..];
    match header.format {
        Format::Ascii => {
            let text = String::from_utf8_lossy(body);
            let mut source = AsciiSource {
                tokens: text.split_ascii_whitespace(),
            };
            read_body(&header, &mut source)
        }
        Format::BinaryLittleEndian => read_body(
            &header,
            &mut BinarySource::<LittleEndian> {
                cursor: Cursor::new(body),
                _order: std::marker::PhantomData,
            },
        ),
        Format::BinaryBigEndian => read_body(
            &header,
            &mut BinarySource::<BigEndian> {
                cursor: Cursor::new(body),
                _order: std::marker::PhantomData,
            },
        ),
    }
}

fn position_columns(ply: &PlyData) -> io::Result<(usize, usize, usize)> {
    let [x, y, z] = ply
        .columns(["x", "y", "z"])
        .ok_or_else(|| invalid("PLY vertices have no x/y/z properties"))?;
    Ok((x, y, z))
}

fn float_attribute<const N: usize>(
    att_type: GeometryAttributeType,
    ply: &PlyData,
    columns: [usize; N],
) -> PointAttribute {
    let values: Vec<f32> = ply
        .vertices
        .iter()
        .flat_map(|row| columns.iter().map(move |&c| row[c] as f32))
        .collect();
    PointAttribute::from_f32_values(att_type, N as u8, &values)
}

fn build_mesh(ply: PlyData) -> io::Result<Mesh> {
    let (x, y, z) = position_columns(&ply)?;
    let num_vertices = ply.vertices.len();
    if num_vertices == 0 {
        return Err(invalid("PLY file has no vertices"));
    }

    let mut mesh = Mesh::new();
    mesh.add_attribute(float_attribute(GeometryAttributeType::Position, &ply, [x, y, z]));

    if let Some(cols) = ply.columns(["nx", "ny", "nz"]) {
        mesh.add_attribute(float_attribute(GeometryAttributeType::Normal, &ply, cols));
    }

    if let Some(rgb) = ply.columns(["red", "green", "blue"]) {
        let mut cols = rgb.to_vec();
        cols.extend(ply.column("alpha"));
        let mut colors = PointAttribute::new();
        colors.init(GeometryAttributeType::Color, cols.len() as u8, DataType::Uint8, true, num_vertices);
        for (i, row) in ply.vertices.iter().enumerate() {
            let bytes: Vec<u8> = cols.iter().map(|&c| row[c].clamp(0.0, 255.0) as u8).collect();
            colors.set_value_bytes(AttributeValueIndex(i as u32), &bytes);
        }
        mesh.add_attribute(colors);
    }

    if let Some(cols) = ply.columns(["s", "t"]).or_else(|| ply.columns(["u", "v"])) {
        mesh.add_attribute(float_attribute(GeometryAttributeType::TexCoord, &ply, cols));
    }

    for polygon in &ply.faces {
        if polygon.iter().any(|&i| i < 0 || i as usize >= num_vertices) {
            return Err(invalid("PLY face references a missing vertex"));
        }
        for k in 1..polygon.len().saturating_sub(1) {
            mesh.add_face([
                PointIndex(polygon[0] as u32),
                PointIndex(polygon[k] as u32),
                PointIndex(polygon[k + 1] as u32),
            ]);
        }
    }
    Ok(mesh)
}
