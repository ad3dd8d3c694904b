//! Encoding options and their validation.

use draco_core::{Encoder, GeometryAttributeType, PointCloud, MAX_QUANTIZATION_BITS};
use tracing::debug;

use crate::error::BridgeError;

pub const MAX_COMPRESSION_LEVEL: i32 = 10;

/// Encoder settings, with the same defaults as the `draco_encoder` tool.
///
/// A negative quantization value for texture coordinates, normals or generic
/// attributes removes those attributes before encoding. Zero keeps them
/// unquantized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    pub is_point_cloud: bool,
    pub pos_quantization_bits: i32,
    pub tex_coords_quantization_bits: i32,
    pub tex_coords_deleted: bool,
    pub normals_quantization_bits: i32,
    pub normals_deleted: bool,
    pub generic_quantization_bits: i32,
    pub generic_deleted: bool,
    /// 0 (fastest) to 10 (smallest output).
    pub compression_level: i32,
    /// Merge points that became identical after attribute deletion.
    pub deduplicate_point_ids: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            is_point_cloud: false,
            pos_quantization_bits: 11,
            tex_coords_quantization_bits: 10,
            tex_coords_deleted: false,
            normals_quantization_bits: 8,
            normals_deleted: false,
            generic_quantization_bits: 8,
            generic_deleted: false,
            compression_level: 7,
            deduplicate_point_ids: true,
        }
    }
}

impl EncodeOptions {
    fn quantized_attributes(&self) -> [(GeometryAttributeType, i32); 4] {
        [
            (GeometryAttributeType::Position, self.pos_quantization_bits),
            (GeometryAttributeType::TexCoord, self.tex_coords_quantization_bits),
            (GeometryAttributeType::Normal, self.normals_quantization_bits),
            (GeometryAttributeType::Generic, self.generic_quantization_bits),
        ]
    }

    /// Checks every option that can be judged without the geometry. Stops at
    /// the first problem.
    pub fn validate(&self) -> Result<(), BridgeError> {
        for (att_type, bits) in self.quantized_attributes() {
            if bits > MAX_QUANTIZATION_BITS {
                return Err(BridgeError::QuantizationBitsTooLarge {
                    attribute: att_type.name(),
                    bits,
                    max: MAX_QUANTIZATION_BITS,
                });
            }
        }
        if self.pos_quantization_bits < 0 {
            return Err(BridgeError::PositionSkipped);
        }
        if !(0..=MAX_COMPRESSION_LEVEL).contains(&self.compression_level) {
            return Err(BridgeError::CompressionLevelOutOfRange(self.compression_level));
        }
        Ok(())
    }

    /// Deletes every texture coordinate, normal and generic attribute whose
    /// bits are negative and records the deletion in the matching flag.
    /// Returns whether any attribute was removed.
    pub fn apply_attribute_deletions(&mut self, pc: &mut PointCloud) -> bool {
        let mut any = false;
        let targets = [
            (GeometryAttributeType::TexCoord, self.tex_coords_quantization_bits, &mut self.tex_coords_deleted),
            (GeometryAttributeType::Normal, self.normals_quantization_bits, &mut self.normals_deleted),
            (GeometryAttributeType::Generic, self.generic_quantization_bits, &mut self.generic_deleted),
        ];
        for (att_type, bits, deleted) in targets {
            if bits >= 0 {
                continue;
            }
            if pc.num_named_attributes(att_type) > 0 {
                *deleted = true;
                any = true;
            }
            while pc.num_named_attributes(att_type) > 0 {
                pc.delete_attribute(pc.named_attribute_id_at(att_type, 0));
            }
            debug!(attribute = att_type.name(), "attribute skipped");
        }
        any
    }

    pub fn any_attribute_deleted(&self) -> bool {
        self.tex_coords_deleted || self.normals_deleted || self.generic_deleted
    }

    /// Codec speed for the configured compression level.
    pub fn speed(&self) -> i32 {
        MAX_COMPRESSION_LEVEL - self.compression_level
    }

    /// An encoder with quantization set for every attribute type whose bits
    /// are positive, and both speeds set to [`speed`](Self::speed).
    pub fn configure_encoder(&self) -> Encoder {
        let mut encoder = Encoder::new();
        for (att_type, bits) in self.quantized_attributes() {
            if bits > 0 {
                encoder.set_attribute_quantization(att_type, bits);
            }
        }
        encoder.set_speed_options(self.speed(), self.speed());
        encoder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draco_core::PointAttribute;
    use proptest::prelude::*;

    fn cloud_with(types: &[GeometryAttributeType]) -> PointCloud {
        let mut pc = PointCloud::new();
        pc.add_attribute(PointAttribute::from_f32_values(
            GeometryAttributeType::Position,
            3,
            &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        ));
        for &t in types {
            pc.add_attribute(PointAttribute::from_f32_values(t, 2, &[0.0, 0.5, 1.0, 0.5]));
        }
        pc
    }

    #[test]
    fn test_defaults() {
        let options = EncodeOptions::default();
        assert_eq!(options.pos_quantization_bits, 11);
        assert_eq!(options.tex_coords_quantization_bits, 10);
        assert_eq!(options.normals_quantization_bits, 8);
        assert_eq!(options.generic_quantization_bits, 8);
        assert_eq!(options.compression_level, 7);
        assert!(!options.any_attribute_deleted());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_first_violation_wins() {
        let options = EncodeOptions {
            tex_coords_quantization_bits: 31,
            normals_quantization_bits: 40,
            ..Default::default()
        };
        match options.validate() {
            Err(BridgeError::QuantizationBitsTooLarge { attribute, bits, .. }) => {
                assert_eq!(attribute, "texture coordinate");
                assert_eq!(bits, 31);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_negative_position_bits() {
        let options = EncodeOptions {
            pos_quantization_bits: -1,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(BridgeError::PositionSkipped)));
    }

    #[test]
    fn test_compression_level_range() {
        for level in [-1, 11] {
            let options = EncodeOptions {
                compression_level: level,
                ..Default::default()
            };
            assert!(matches!(
                options.validate(),
                Err(BridgeError::CompressionLevelOutOfRange(l)) if l == level
            ));
        }
    }

    #[test]
    fn test_deletes_every_tex_coord_attribute() {
        let mut pc = cloud_with(&[
            GeometryAttributeType::TexCoord,
            GeometryAttributeType::Normal,
            GeometryAttributeType::TexCoord,
        ]);
        let mut options = EncodeOptions {
            tex_coords_quantization_bits: -1,
            ..Default::default()
        };
        assert!(options.apply_attribute_deletions(&mut pc));
        assert_eq!(pc.num_named_attributes(GeometryAttributeType::TexCoord), 0);
        assert_eq!(pc.num_named_attributes(GeometryAttributeType::Normal), 1);
        assert!(options.tex_coords_deleted);
        assert!(!options.normals_deleted);
        assert!(options.any_attribute_deleted());
    }

    #[test]
    fn test_negative_bits_without_attribute_sets_no_flag() {
        let mut pc = cloud_with(&[]);
        let mut options = EncodeOptions {
            normals_quantization_bits: -1,
            generic_quantization_bits: -1,
            ..Default::default()
        };
        assert!(!options.apply_attribute_deletions(&mut pc));
        assert!(!options.any_attribute_deleted());
        assert_eq!(pc.num_attributes(), 1);
    }

    #[test]
    fn test_configure_encoder() {
        let options = EncodeOptions {
            tex_coords_quantization_bits: 0,
            normals_quantization_bits: -1,
            ..Default::default()
        };
        let encoder = options.configure_encoder();
        let opts = encoder.options();
        assert_eq!(opts.get_quantization_bits(GeometryAttributeType::Position), 11);
        assert_eq!(opts.get_quantization_bits(GeometryAttributeType::TexCoord), 0);
        assert_eq!(opts.get_quantization_bits(GeometryAttributeType::Normal), 0);
        assert_eq!(opts.get_quantization_bits(GeometryAttributeType::Generic), 8);
        assert_eq!(opts.get_encoding_speed(), 3);
        assert_eq!(opts.get_decoding_speed(), 3);
    }

    proptest! {
        #[test]
        fn speed_is_ten_minus_level(level in 0i32..=10) {
            let options = EncodeOptions { compression_level: level, ..Default::default() };
            prop_assert!(options.validate().is_ok());
            prop_assert_eq!(options.speed(), 10 - level);
            prop_assert_eq!(options.configure_encoder().options().get_encoding_speed(), 10 - level);
        }

        #[test]
        fn bits_above_thirty_are_rejected(bits in 31i32..1000, which in 0usize..4) {
            let mut options = EncodeOptions::default();
            match which {
                0 => options.pos_quantization_bits = bits,
                1 => options.tex_coords_quantization_bits = bits,
                2 => options.normals_quantization_bits = bits,
                _ => options.generic_quantization_bits = bits,
            }
            let rejected = matches!(
                options.validate(),
                Err(BridgeError::QuantizationBitsTooLarge { .. })
            );
            prop_assert!(rejected);
        }
    }
}
