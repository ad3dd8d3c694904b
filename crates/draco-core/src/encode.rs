//! Encoder facade: configure per-attribute quantization and speed, then
//! serialize a point cloud or mesh into a Draco bitstream.
//!
//! The body is sequential. Float attributes with quantization configured are
//! stored as bit-packed offsets from a per-attribute frame; everything else is
//! stored verbatim. Mesh connectivity is either raw or delta coded depending on
//! the encoding speed.

use tracing::debug;

use crate::compression_config::{EncodedGeometryType, MeshEncodingMethod, PointCloudEncodingMethod};
use crate::encoder_buffer::EncoderBuffer;
use crate::encoder_options::EncoderOptions;
use crate::geometry::Geometry;
use crate::geometry_attribute::{GeometryAttributeType, PointAttribute};
use crate::geometry_indices::{AttributeValueIndex, PointIndex};
use crate::mesh::Mesh;
use crate::point_cloud::PointCloud;
use crate::quantization_utils::{max_quantized_value, QuantizationFrame, Quantizer};
use crate::status::{DracoError, Status, StatusOr};
use crate::version::{DRACO_BITSTREAM_VERSION_MAJOR, DRACO_BITSTREAM_VERSION_MINOR, DRACO_MAGIC};

/// Upper bound accepted for any attribute's quantization bits.
pub const MAX_QUANTIZATION_BITS: i32 = 30;

#[derive(Debug, Clone, Default)]
pub struct Encoder {
    options: EncoderOptions,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Quantize every attribute of `att_type` with `bits` bits.
    pub fn set_attribute_quantization(&mut self, att_type: GeometryAttributeType, bits: i32) {
        self.options.set_attribute_int(att_type, "quantization_bits", bits);
    }

    /// Speeds run from 0 (best compression) to 10 (fastest).
    pub fn set_speed_options(&mut self, encoding_speed: i32, decoding_speed: i32) {
        self.options.set_speed(encoding_speed, decoding_speed);
    }

    pub fn encode_point_cloud_to_buffer(&self, pc: &PointCloud, out_buffer: &mut EncoderBuffer) -> Status {
        check_point_cloud(pc)?;
        encode_header(
            out_buffer,
            EncodedGeometryType::PointCloud,
            PointCloudEncodingMethod::PointCloudSequentialEncoding as u8,
        );
        self.encode_attributes(pc, out_buffer)?;
        debug!(
            points = pc.num_points(),
            attributes = pc.num_attributes(),
            bytes = out_buffer.size(),
            "encoded point cloud"
        );
        Ok(())
    }

    pub fn encode_mesh_to_buffer(&self, mesh: &Mesh, out_buffer: &mut EncoderBuffer) -> Status {
        check_point_cloud(mesh)?;
        let num_points = mesh.num_points() as u32;
        if let Some(face) = mesh.faces().iter().find(|f| f.iter().any(|p| p.0 >= num_points)) {
            return Err(DracoError::InvalidParameter(format!(
                "Face {:?} references a point outside 0..{}",
                face, num_points
            )));
        }

        let method = MeshEncodingMethod::for_speed(self.options.get_encoding_speed());
        encode_header(out_buffer, EncodedGeometryType::TriangularMesh, method as u8);
        self.encode_attributes(mesh, out_buffer)?;
        encode_connectivity(mesh, method, out_buffer);
        debug!(
            points = mesh.num_points(),
            faces = mesh.num_faces(),
            method = ?method,
            bytes = out_buffer.size(),
            "encoded mesh"
        );
        Ok(())
    }

    /// Mesh path when the geometry has at least one face, point cloud otherwise.
    pub fn encode_geometry_to_buffer(&self, geometry: &Geometry, out_buffer: &mut EncoderBuffer) -> StatusOr<EncodedGeometryType> {
        match geometry {
            Geometry::Mesh(mesh) if mesh.num_faces() > 0 => {
                self.encode_mesh_to_buffer(mesh, out_buffer)?;
                Ok(EncodedGeometryType::TriangularMesh)
            }
            other => {
                self.encode_point_cloud_to_buffer(other.point_cloud(), out_buffer)?;
                Ok(EncodedGeometryType::PointCloud)
            }
        }
    }

    fn encode_attributes(&self, pc: &PointCloud, out_buffer: &mut EncoderBuffer) -> Status {
        out_buffer.encode_varint(pc.num_points() as u64);
        out_buffer.encode_varint(pc.num_attributes() as u64);
        for att in pc.attributes() {
            let bits = self.options.get_quantization_bits(att.attribute_type());
            if bits > MAX_QUANTIZATION_BITS {
                return Err(DracoError::InvalidParameter(format!(
                    "Quantization bits {} for {} attribute exceed {}",
                    bits,
                    att.attribute_type().name(),
                    MAX_QUANTIZATION_BITS
                )));
            }
            encode_attribute(att, pc.num_points(), bits, out_buffer);
        }
        Ok(())
    }
}

fn check_point_cloud(pc: &PointCloud) -> Status {
    if pc.named_attribute_id(GeometryAttributeType::Position) < 0 {
        return Err(DracoError::InvalidParameter("Missing position attribute".into()));
    }
    if pc.num_points() == 0 {
        return Err(DracoError::InvalidParameter("Geometry has no points".into()));
    }
    for att in pc.attributes() {
        if att.num_components() == 0 {
            return Err(DracoError::InvalidParameter(format!(
                "The {} attribute has no components",
                att.attribute_type().name()
            )));
        }
        let in_range = (0..pc.num_points())
            .map(|p| att.mapped_index(PointIndex(p as u32)))
            .all(|v| (v.0 as usize) < att.size());
        if !in_range {
            return Err(DracoError::InvalidParameter(format!(
                "The {} attribute maps points to missing values",
                att.attribute_type().name()
            )));
        }
    }
    Ok(())
}

fn encode_header(out_buffer: &mut EncoderBuffer, geometry_type: EncodedGeometryType, method: u8) {
    out_buffer.encode_bytes(DRACO_MAGIC);
    out_buffer.encode_u8(DRACO_BITSTREAM_VERSION_MAJOR);
    out_buffer.encode_u8(DRACO_BITSTREAM_VERSION_MINOR);
    out_buffer.encode_u8(geometry_type as u8);
    out_buffer.encode_u8(method);
    out_buffer.encode_u16(0);
}

fn encode_attribute(att: &PointAttribute, num_points: usize, bits: i32, out_buffer: &mut EncoderBuffer) {
    out_buffer.encode_u8(att.attribute_type() as i8 as u8);
    out_buffer.encode_u8(att.data_type() as u8);
    out_buffer.encode_u8(att.num_components());
    out_buffer.encode_u8(att.normalized() as u8);
    out_buffer.encode_varint(att.unique_id() as u64);
    out_buffer.encode_varint(att.size() as u64);

    let quantize = bits > 0 && att.data_type().is_float();
    if quantize {
        out_buffer.encode_u8(bits as u8);
        let values: Vec<f32> = (0..att.size())
            .flat_map(|i| att.value_f32(AttributeValueIndex(i as u32)))
            .collect();
        let frame = QuantizationFrame::from_values(&values, att.num_components() as usize);
        for &min in &frame.min_values {
            out_buffer.encode_f32(min);
        }
        out_buffer.encode_f32(frame.range);

        let mut quantizer = Quantizer::new();
        quantizer.init(frame.range, max_quantized_value(bits));
        let num_components = att.num_components() as usize;
        let quantized: Vec<u32> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                quantizer
                    .quantize_float(v - frame.min_values[i % num_components])
                    .min(max_quantized_value(bits))
            })
            .collect();
        out_buffer.encode_packed_bits(&quantized, bits as u32);
    } else {
        out_buffer.encode_u8(0);
        out_buffer.encode_bytes(&att.buffer().data()[..att.size() * att.byte_stride()]);
    }

    if att.is_mapping_identity() {
        out_buffer.encode_u8(0);
    } else {
        out_buffer.encode_u8(1);
        for p in 0..num_points {
            out_buffer.encode_varint(att.mapped_index(PointIndex(p as u32)).0 as u64);
        }
    }
}

fn encode_connectivity(mesh: &Mesh, method: MeshEncodingMethod, out_buffer: &mut EncoderBuffer) {
    out_buffer.encode_varint(mesh.num_faces() as u64);
    match method {
        MeshEncodingMethod::MeshSequentialEncoding => {
            for face in mesh.faces() {
                for corner in face {
                    out_buffer.encode_u32(corner.0);
                }
            }
        }
        MeshEncodingMethod::MeshDeltaEncoding => {
            let mut last = 0i64;
            for face in mesh.faces() {
                for corner in face {
                    let value = corner.0 as i64;
                    out_buffer.encode_signed_varint(value - last);
                    last = value;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_attribute(PointAttribute::from_f32_values(
            GeometryAttributeType::Position,
            3,
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        ));
        mesh.add_face([PointIndex(0), PointIndex(1), PointIndex(2)]);
        mesh
    }

    #[test]
    fn test_header_layout() {
        let mut encoder = Encoder::new();
        encoder.set_speed_options(10, 10);
        let mut buffer = EncoderBuffer::new();
        encoder.encode_mesh_to_buffer(&triangle(), &mut buffer).unwrap();

        let data = buffer.data();
        assert_eq!(&data[..5], b"DRACO");
        assert_eq!(data[5], DRACO_BITSTREAM_VERSION_MAJOR);
        assert_eq!(data[7], EncodedGeometryType::TriangularMesh as u8);
        assert_eq!(data[8], MeshEncodingMethod::MeshSequentialEncoding as u8);
    }

    #[test]
    fn test_face_out_of_range_is_rejected() {
        let mut mesh = triangle();
        mesh.add_face([PointIndex(0), PointIndex(1), PointIndex(9)]);
        let mut buffer = EncoderBuffer::new();
        assert!(Encoder::new().encode_mesh_to_buffer(&mesh, &mut buffer).is_err());
    }

    #[test]
    fn test_missing_position_is_rejected() {
        let mut pc = PointCloud::new();
        pc.add_attribute(PointAttribute::from_f32_values(GeometryAttributeType::Normal, 3, &[0.0, 0.0, 1.0]));
        let mut buffer = EncoderBuffer::new();
        let err = Encoder::new().encode_point_cloud_to_buffer(&pc, &mut buffer).unwrap_err();
        assert!(err.to_string().contains("position"));
    }

    #[test]
    fn test_too_many_quantization_bits_is_rejected() {
        let mut encoder = Encoder::new();
        encoder.set_attribute_quantization(GeometryAttributeType::Position, 31);
        let mut buffer = EncoderBuffer::new();
        assert!(encoder.encode_mesh_to_buffer(&triangle(), &mut buffer).is_err());
    }

    #[test]
    fn test_quantization_shrinks_output() {
        let mut raw = EncoderBuffer::new();
        Encoder::new().encode_mesh_to_buffer(&triangle(), &mut raw).unwrap();

        let mut encoder = Encoder::new();
        encoder.set_attribute_quantization(GeometryAttributeType::Position, 4);
        let mut quantized = EncoderBuffer::new();
        encoder.encode_mesh_to_buffer(&triangle(), &mut quantized).unwrap();
        assert!(quantized.size() < raw.size());
    }

    #[test]
    fn test_faceless_mesh_takes_point_cloud_path() {
        let mut mesh = triangle();
        mesh.set_num_faces(0);
        let mut buffer = EncoderBuffer::new();
        let kind = Encoder::new()
            .encode_geometry_to_buffer(&Geometry::Mesh(mesh), &mut buffer)
            .unwrap();
        assert_eq!(kind, EncodedGeometryType::PointCloud);
    }
}
