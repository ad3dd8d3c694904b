use std::collections::HashMap;

use crate::geometry_attribute::GeometryAttributeType;

#[derive(Debug, Clone, Default)]
pub struct EncoderOptions {
    global_options: HashMap<String, i32>,
    attribute_options: HashMap<GeometryAttributeType, HashMap<String, i32>>,
}

impl EncoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_encoding_speed(&self) -> i32 {
        self.get_global_int("encoding_speed", 5)
    }

    pub fn get_decoding_speed(&self) -> i32 {
        self.get_global_int("decoding_speed", 5)
    }

    pub fn set_speed(&mut self, encoding_speed: i32, decoding_speed: i32) {
        self.set_global_int("encoding_speed", encoding_speed);
        self.set_global_int("decoding_speed", decoding_speed);
    }

    /// Quantization bits configured for `att_type`, 0 when none.
    pub fn get_quantization_bits(&self, att_type: GeometryAttributeType) -> i32 {
        self.get_attribute_int(att_type, "quantization_bits", 0)
    }

    pub fn set_global_int(&mut self, key: &str, value: i32) {
        self.global_options.insert(key.to_string(), value);
    }

    pub fn get_global_int(&self, key: &str, default_val: i32) -> i32 {
        *self.global_options.get(key).unwrap_or(&default_val)
    }

    pub fn set_attribute_int(&mut self, att_type: GeometryAttributeType, key: &str, value: i32) {
        self.attribute_options
            .entry(att_type)
            .or_default()
            .insert(key.to_string(), value);
    }

    pub fn get_attribute_int(&self, att_type: GeometryAttributeType, key: &str, default_val: i32) -> i32 {
        if let Some(opts) = self.attribute_options.get(&att_type) {
            if let Some(val) = opts.get(key) {
                return *val;
            }
        }
        self.get_global_int(key, default_val)
    }
}
