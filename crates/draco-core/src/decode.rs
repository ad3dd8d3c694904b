use tracing::debug;

use crate::compression_config::{EncodedGeometryType, MeshEncodingMethod};
use crate::decoder_buffer::DecoderBuffer;
use crate::draco_types::DataType;
use crate::geometry::Geometry;
use crate::geometry_attribute::{GeometryAttributeType, PointAttribute};
use crate::geometry_indices::{AttributeValueIndex, PointIndex};
use crate::mesh::Mesh;
use crate::point_cloud::PointCloud;
use crate::quantization_utils::{max_quantized_value, Dequantizer};
use crate::status::{DracoError, StatusOr};
use crate::version::{is_version_supported, DRACO_MAGIC};

/// Parsed fixed-size bitstream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DracoHeader {
    pub version_major: u8,
    pub version_minor: u8,
    pub encoder_type: EncodedGeometryType,
    pub encoder_method: u8,
    pub flags: u16,
}

#[derive(Debug, Default)]
pub struct Decoder;

impl Decoder {
    pub fn new() -> Self {
        Self
    }

    /// Classifies the buffer from its header alone. The buffer position is left untouched.
    pub fn get_encoded_geometry_type(in_buffer: &DecoderBuffer) -> StatusOr<EncodedGeometryType> {
        let mut peek = DecoderBuffer::new(in_buffer.remaining_bytes());
        let header = decode_header(&mut peek)?;
        if header.encoder_type == EncodedGeometryType::InvalidGeometryType {
            return Err(DracoError::DracoError("Unsupported geometry type".into()));
        }
        Ok(header.encoder_type)
    }

    pub fn decode_point_cloud_from_buffer(&self, in_buffer: &mut DecoderBuffer) -> StatusOr<PointCloud> {
        match self.decode_geometry(in_buffer)? {
            Geometry::Mesh(mesh) => Ok(mesh.into_point_cloud()),
            Geometry::PointCloud(pc) => Ok(pc),
        }
    }

    pub fn decode_mesh_from_buffer(&self, in_buffer: &mut DecoderBuffer) -> StatusOr<Mesh> {
        match self.decode_geometry(in_buffer)? {
            Geometry::Mesh(mesh) => Ok(mesh),
            Geometry::PointCloud(_) => Err(DracoError::DracoError(
                "Input is a point cloud, not a mesh".into(),
            )),
        }
    }

    pub fn decode_geometry(&self, in_buffer: &mut DecoderBuffer) -> StatusOr<Geometry> {
        let header = decode_header(in_buffer)?;
        if !is_version_supported(header.version_major, header.version_minor) {
            return Err(DracoError::UnsupportedVersion(format!(
                "{}.{}",
                header.version_major, header.version_minor
            )));
        }

        match header.encoder_type {
            EncodedGeometryType::PointCloud => {
                let mut pc = PointCloud::new();
                decode_attributes(in_buffer, &mut pc)?;
                debug!(points = pc.num_points(), "decoded point cloud");
                Ok(Geometry::PointCloud(pc))
            }
            EncodedGeometryType::TriangularMesh => {
                let method = MeshEncodingMethod::from_u8(header.encoder_method).ok_or_else(|| {
                    DracoError::UnsupportedFeature(format!(
                        "Mesh encoding method {}",
                        header.encoder_method
                    ))
                })?;
                let mut mesh = Mesh::new();
                decode_attributes(in_buffer, &mut mesh)?;
                decode_connectivity(in_buffer, method, &mut mesh)?;
                debug!(points = mesh.num_points(), faces = mesh.num_faces(), "decoded mesh");
                Ok(Geometry::Mesh(mesh))
            }
            EncodedGeometryType::InvalidGeometryType => {
                Err(DracoError::DracoError("Unsupported geometry type".into()))
            }
        }
    }
}

pub fn decode_header(buffer: &mut DecoderBuffer) -> StatusOr<DracoHeader> {
    let mut magic = [0u8; 5];
    buffer.decode_bytes(&mut magic)?;
    if &magic != DRACO_MAGIC {
        return Err(DracoError::DracoError("Not a Draco file".into()));
    }
    Ok(DracoHeader {
        version_major: buffer.decode_u8()?,
        version_minor: buffer.decode_u8()?,
        encoder_type: EncodedGeometryType::from_u8(buffer.decode_u8()?),
        encoder_method: buffer.decode_u8()?,
        flags: buffer.decode_u16()?,
    })
}

fn decode_attributes(buffer: &mut DecoderBuffer, pc: &mut PointCloud) -> StatusOr<()> {
    let num_points = buffer.decode_count(0)?;
    let num_attributes = buffer.decode_count(1)?;
    if num_points > 0 && num_attributes == 0 {
        return Err(DracoError::DracoError("Points without attributes".into()));
    }
    pc.set_num_points(num_points);
    for _ in 0..num_attributes {
        let att = decode_attribute(buffer, num_points)?;
        pc.add_attribute(att);
    }
    pc.set_num_points(num_points);
    Ok(())
}

fn decode_attribute(buffer: &mut DecoderBuffer, num_points: usize) -> StatusOr<PointAttribute> {
    let attribute_type = GeometryAttributeType::from_i8(buffer.decode_u8()? as i8);
    let data_type = DataType::from_u8(buffer.decode_u8()?)
        .filter(|dt| *dt != DataType::Invalid)
        .ok_or_else(|| DracoError::DracoError("Invalid attribute data type".into()))?;
    let num_components = buffer.decode_u8()?;
    if num_components == 0 {
        return Err(DracoError::DracoError("Attribute has no components".into()));
    }
    let normalized = buffer.decode_u8()? != 0;
    let _unique_id = buffer.decode_varint()?;
    let num_values = buffer.decode_count(0)?;
    let bits = buffer.decode_u8()? as i32;

    let mut att = PointAttribute::new();
    if bits > 0 {
        if !data_type.is_float() || bits > 30 {
            return Err(DracoError::DracoError("Invalid quantized attribute".into()));
        }
        let mut min_values = Vec::with_capacity(num_components as usize);
        for _ in 0..num_components {
            min_values.push(buffer.decode_f32()?);
        }
        let range = buffer.decode_f32()?;
        let count = num_values
            .checked_mul(num_components as usize)
            .ok_or_else(|| DracoError::BufferError("Attribute too large".into()))?;
        let quantized = buffer.decode_packed_bits(count, bits as u32)?;

        let mut dequantizer = Dequantizer::new();
        if !dequantizer.init(range, max_quantized_value(bits)) {
            return Err(DracoError::DracoError("Invalid quantization range".into()));
        }
        att.init(attribute_type, num_components, data_type, normalized, num_values);
        let mut value = vec![0f32; num_components as usize];
        for (i, entry) in quantized.chunks_exact(num_components as usize).enumerate() {
            for (c, &q) in entry.iter().enumerate() {
                value[c] = min_values[c] + dequantizer.dequantize_float(q);
            }
            att.set_value_f32(AttributeValueIndex(i as u32), &value);
        }
    } else {
        let stride = num_components as usize * data_type.byte_length();
        let len = num_values
            .checked_mul(stride)
            .ok_or_else(|| DracoError::BufferError("Attribute too large".into()))?;
        let bytes = buffer.decode_slice(len)?;
        att.init(attribute_type, num_components, data_type, normalized, num_values);
        att.buffer_mut().write(0, bytes);
    }

    match buffer.decode_u8()? {
        0 => {
            if num_values < num_points {
                return Err(DracoError::DracoError("Attribute has fewer values than points".into()));
            }
        }
        1 => {
            if num_points > buffer.remaining_size() {
                return Err(DracoError::BufferError("Point mapping exceeds remaining input".into()));
            }
            att.set_explicit_mapping(num_points);
            for p in 0..num_points {
                let index = buffer.decode_varint()?;
                if index >= num_values as u64 {
                    return Err(DracoError::DracoError("Point maps to a missing value".into()));
                }
                att.set_point_map_entry(PointIndex(p as u32), AttributeValueIndex(index as u32));
            }
        }
        other => {
            return Err(DracoError::DracoError(format!("Unknown point mapping {}", other)));
        }
    }
    Ok(att)
}

fn decode_connectivity(buffer: &mut DecoderBuffer, method: MeshEncodingMethod, mesh: &mut Mesh) -> StatusOr<()> {
    let num_faces = buffer.decode_count(3)?;
    let num_points = mesh.num_points() as i64;
    let mut last = 0i64;
    for _ in 0..num_faces {
        let mut face = [PointIndex(0); 3];
        for corner in face.iter_mut() {
            let value = match method {
                MeshEncodingMethod::MeshSequentialEncoding => buffer.decode_u32()? as i64,
                MeshEncodingMethod::MeshDeltaEncoding => {
                    let delta = buffer.decode_signed_varint()?;
                    last.checked_add(delta)
                        .ok_or_else(|| DracoError::DracoError("Corner overflow".into()))?
                }
            };
            if value < 0 || value >= num_points {
                return Err(DracoError::DracoError(format!(
                    "Face corner {} outside 0..{}",
                    value, num_points
                )));
            }
            last = value;
            *corner = PointIndex(value as u32);
        }
        mesh.add_face(face);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_magic() {
        let buffer = DecoderBuffer::new(b"DRACX\x02\x02\x01\x00\x00\x00");
        assert!(Decoder::get_encoded_geometry_type(&buffer).is_err());
    }

    #[test]
    fn test_invalid_geometry_type() {
        let buffer = DecoderBuffer::new(b"DRACO\x02\x02\x07\x00\x00\x00");
        assert!(Decoder::get_encoded_geometry_type(&buffer).is_err());
    }

    #[test]
    fn test_header_only_classification() {
        let buffer = DecoderBuffer::new(b"DRACO\x02\x02\x00\x00\x00\x00");
        assert_eq!(
            Decoder::get_encoded_geometry_type(&buffer).unwrap(),
            EncodedGeometryType::PointCloud
        );
        assert_eq!(buffer.position(), 0);
    }

    #[test]
    fn test_unsupported_version() {
        let mut buffer = DecoderBuffer::new(b"DRACO\x01\x03\x00\x00\x00\x00");
        let err = Decoder::new().decode_geometry(&mut buffer).unwrap_err();
        assert!(matches!(err, DracoError::UnsupportedVersion(_)));
    }
}
