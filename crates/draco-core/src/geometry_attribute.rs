use std::collections::HashMap;

use num_traits::{NumCast, ToPrimitive};

use crate::data_buffer::DataBuffer;
use crate::draco_types::DataType;
use crate::geometry_indices::{AttributeValueIndex, PointIndex, INVALID_ATTRIBUTE_VALUE_INDEX};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryAttributeType {
    Invalid = -1,
    Position = 0,
    Normal,
    Color,
    TexCoord,
    Generic,
}

impl GeometryAttributeType {
    pub fn from_i8(value: i8) -> Self {
        match value {
            0 => GeometryAttributeType::Position,
            1 => GeometryAttributeType::Normal,
            2 => GeometryAttributeType::Color,
            3 => GeometryAttributeType::TexCoord,
            4 => GeometryAttributeType::Generic,
            _ => GeometryAttributeType::Invalid,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GeometryAttributeType::Invalid => "invalid",
            GeometryAttributeType::Position => "position",
            GeometryAttributeType::Normal => "normal",
            GeometryAttributeType::Color => "color",
            GeometryAttributeType::TexCoord => "texture coordinate",
            GeometryAttributeType::Generic => "generic",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeometryAttribute {
    attribute_type: GeometryAttributeType,
    data_type: DataType,
    num_components: u8,
    normalized: bool,
    byte_stride: usize,
    unique_id: u32,
}

impl Default for GeometryAttribute {
    fn default() -> Self {
        Self {
            attribute_type: GeometryAttributeType::Invalid,
            data_type: DataType::Invalid,
            num_components: 0,
            normalized: false,
            byte_stride: 0,
            unique_id: 0,
        }
    }
}

impl GeometryAttribute {
    pub fn init(&mut self, attribute_type: GeometryAttributeType, num_components: u8, data_type: DataType, normalized: bool) {
        self.attribute_type = attribute_type;
        self.num_components = num_components;
        self.data_type = data_type;
        self.normalized = normalized;
        self.byte_stride = num_components as usize * data_type.byte_length();
    }

    pub fn attribute_type(&self) -> GeometryAttributeType {
        self.attribute_type
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn num_components(&self) -> u8 {
        self.num_components
    }

    pub fn normalized(&self) -> bool {
        self.normalized
    }

    pub fn byte_stride(&self) -> usize {
        self.byte_stride
    }

    pub fn unique_id(&self) -> u32 {
        self.unique_id
    }

    pub fn set_unique_id(&mut self, id: u32) {
        self.unique_id = id;
    }
}

/// Attribute values plus the mapping from points to those values.
///
/// With identity mapping point `i` reads value `i`. Explicit mapping lets many
/// points share one value, which is how OBJ vertices with different texture
/// coordinates end up as separate points over a single position entry.
#[derive(Debug, Clone)]
pub struct PointAttribute {
    base: GeometryAttribute,
    buffer: DataBuffer,
    indices_map: Vec<AttributeValueIndex>,
    identity_mapping: bool,
    num_unique_entries: usize,
}

impl Default for PointAttribute {
    fn default() -> Self {
        Self {
            base: GeometryAttribute::default(),
            buffer: DataBuffer::new(),
            indices_map: Vec::new(),
            identity_mapping: true,
            num_unique_entries: 0,
        }
    }
}

impl PointAttribute {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self, attribute_type: GeometryAttributeType, num_components: u8, data_type: DataType, normalized: bool, num_attribute_values: usize) {
        self.base.init(attribute_type, num_components, data_type, normalized);
        self.buffer.resize(num_attribute_values * self.base.byte_stride());
        self.num_unique_entries = num_attribute_values;
        self.identity_mapping = true;
        self.indices_map.clear();
    }

    /// Builds a float attribute from tightly packed component values.
    pub fn from_f32_values(attribute_type: GeometryAttributeType, num_components: u8, values: &[f32]) -> Self {
        let num_values = if num_components == 0 { 0 } else { values.len() / num_components as usize };
        let mut att = Self::new();
        att.init(attribute_type, num_components, DataType::Float32, false, num_values);
        if num_components == 0 {
            return att;
        }
        for (i, chunk) in values.chunks_exact(num_components as usize).enumerate() {
            att.set_value_f32(AttributeValueIndex(i as u32), chunk);
        }
        att
    }

    pub fn mapped_index(&self, point_index: PointIndex) -> AttributeValueIndex {
        if self.identity_mapping {
            AttributeValueIndex(point_index.0)
        } else if (point_index.0 as usize) < self.indices_map.len() {
            self.indices_map[point_index.0 as usize]
        } else {
            INVALID_ATTRIBUTE_VALUE_INDEX
        }
    }

    pub fn is_mapping_identity(&self) -> bool {
        self.identity_mapping
    }

    pub fn indices_map(&self) -> &[AttributeValueIndex] {
        &self.indices_map
    }

    pub fn set_identity_mapping(&mut self) {
        self.identity_mapping = true;
        self.indices_map.clear();
    }

    pub fn set_explicit_mapping(&mut self, num_points: usize) {
        self.identity_mapping = false;
        self.indices_map.resize(num_points, INVALID_ATTRIBUTE_VALUE_INDEX);
    }

    pub fn set_point_map_entry(&mut self, point_index: PointIndex, entry_index: AttributeValueIndex) {
        if self.identity_mapping {
            return;
        }
        let idx = point_index.0 as usize;
        if idx >= self.indices_map.len() {
            self.indices_map.resize(idx + 1, INVALID_ATTRIBUTE_VALUE_INDEX);
        }
        self.indices_map[idx] = entry_index;
    }

    /// Number of stored attribute values (not points).
    pub fn size(&self) -> usize {
        self.num_unique_entries
    }

    pub fn buffer(&self) -> &DataBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut DataBuffer {
        &mut self.buffer
    }

    pub fn value_bytes(&self, index: AttributeValueIndex) -> &[u8] {
        let stride = self.byte_stride();
        self.buffer.slice(index.0 as usize * stride, stride)
    }

    pub fn set_value_bytes(&mut self, index: AttributeValueIndex, bytes: &[u8]) {
        let stride = self.byte_stride();
        self.buffer.write(index.0 as usize * stride, &bytes[..stride]);
    }

    /// Reads the value at `index` converted to `f32` components.
    pub fn value_f32(&self, index: AttributeValueIndex) -> Vec<f32> {
        let data_type = self.data_type();
        let width = data_type.byte_length();
        self.value_bytes(index)
            .chunks_exact(width)
            .map(|bytes| component_to_f32(data_type, bytes))
            .collect()
    }

    /// Writes `values` at `index`, converting to the attribute's data type.
    pub fn set_value_f32(&mut self, index: AttributeValueIndex, values: &[f32]) {
        let data_type = self.data_type();
        let mut bytes = Vec::with_capacity(self.byte_stride());
        for &v in values.iter().take(self.num_components() as usize) {
            bytes.extend_from_slice(&component_from_f32(data_type, v));
        }
        bytes.resize(self.byte_stride(), 0);
        self.set_value_bytes(index, &bytes);
    }

    /// Merges byte-identical values and rewrites the point mapping to match.
    ///
    /// Returns the number of values left.
    pub fn deduplicate_values(&mut self, num_points: usize) -> usize {
        let stride = self.byte_stride();
        let mut unique: HashMap<Vec<u8>, AttributeValueIndex> = HashMap::new();
        let mut remap = Vec::with_capacity(self.num_unique_entries);
        let mut new_buffer = DataBuffer::new();
        for i in 0..self.num_unique_entries {
            let bytes = self.value_bytes(AttributeValueIndex(i as u32)).to_vec();
            let next = AttributeValueIndex(unique.len() as u32);
            let entry = *unique.entry(bytes.clone()).or_insert_with(|| {
                new_buffer.write(next.0 as usize * stride, &bytes);
                next
            });
            remap.push(entry);
        }
        if unique.len() == self.num_unique_entries {
            return self.num_unique_entries;
        }

        let old_map: Vec<AttributeValueIndex> = (0..num_points)
            .map(|p| self.mapped_index(PointIndex(p as u32)))
            .collect();
        self.buffer = new_buffer;
        self.num_unique_entries = unique.len();
        self.set_explicit_mapping(num_points);
        for (p, old) in old_map.into_iter().enumerate() {
            let new_index = remap.get(old.0 as usize).copied().unwrap_or(INVALID_ATTRIBUTE_VALUE_INDEX);
            self.indices_map[p] = new_index;
        }
        self.num_unique_entries
    }

    pub fn base(&self) -> &GeometryAttribute {
        &self.base
    }

    pub fn attribute_type(&self) -> GeometryAttributeType {
        self.base.attribute_type()
    }

    pub fn unique_id(&self) -> u32 {
        self.base.unique_id()
    }

    pub fn set_unique_id(&mut self, id: u32) {
        self.base.set_unique_id(id);
    }

    pub fn data_type(&self) -> DataType {
        self.base.data_type()
    }

    pub fn normalized(&self) -> bool {
        self.base.normalized()
    }

    pub fn num_components(&self) -> u8 {
        self.base.num_components()
    }

    pub fn byte_stride(&self) -> usize {
        self.base.byte_stride()
    }
}

fn component_to_f32(data_type: DataType, bytes: &[u8]) -> f32 {
    let value = match data_type {
        DataType::Int8 => (bytes[0] as i8).to_f32(),
        DataType::Uint8 | DataType::Bool => bytes[0].to_f32(),
        DataType::Int16 => i16::from_le_bytes([bytes[0], bytes[1]]).to_f32(),
        DataType::Uint16 => u16::from_le_bytes([bytes[0], bytes[1]]).to_f32(),
        DataType::Int32 => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]).to_f32(),
        DataType::Uint32 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]).to_f32(),
        DataType::Float32 => Some(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
        DataType::Int64 | DataType::Uint64 | DataType::Float64 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&bytes[..8]);
            match data_type {
                DataType::Int64 => i64::from_le_bytes(raw).to_f32(),
                DataType::Uint64 => u64::from_le_bytes(raw).to_f32(),
                _ => f64::from_le_bytes(raw).to_f32(),
            }
        }
        DataType::Invalid => None,
    };
    value.unwrap_or(0.0)
}

fn component_from_f32(data_type: DataType, value: f32) -> Vec<u8> {
    fn cast<T: NumCast + Default>(value: f32) -> T {
        <T as NumCast>::from(value.round()).unwrap_or_default()
    }
    match data_type {
        DataType::Int8 => cast::<i8>(value).to_le_bytes().to_vec(),
        DataType::Uint8 | DataType::Bool => cast::<u8>(value).to_le_bytes().to_vec(),
        DataType::Int16 => cast::<i16>(value).to_le_bytes().to_vec(),
        DataType::Uint16 => cast::<u16>(value).to_le_bytes().to_vec(),
        DataType::Int32 => cast::<i32>(value).to_le_bytes().to_vec(),
        DataType::Uint32 => cast::<u32>(value).to_le_bytes().to_vec(),
        DataType::Int64 => cast::<i64>(value).to_le_bytes().to_vec(),
        DataType::Uint64 => cast::<u64>(value).to_le_bytes().to_vec(),
        DataType::Float32 => value.to_le_bytes().to_vec(),
        DataType::Float64 => (value as f64).to_le_bytes().to_vec(),
        DataType::Invalid => Vec::new(),
    }
}
