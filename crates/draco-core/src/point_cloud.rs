use std::collections::HashMap;

use crate::geometry_attribute::{GeometryAttributeType, PointAttribute};
use crate::geometry_indices::{AttributeValueIndex, PointIndex};

#[derive(Debug, Default, Clone)]
pub struct PointCloud {
    attributes: Vec<PointAttribute>,
    num_points: usize,
    next_unique_id: u32,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_num_points(&mut self, num_points: usize) {
        self.num_points = num_points;
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Adds an attribute and returns its id. Unique ids are never reused.
    pub fn add_attribute(&mut self, mut attribute: PointAttribute) -> i32 {
        if self.num_points == 0 && attribute.size() > 0 && attribute.is_mapping_identity() {
            self.num_points = attribute.size();
        }
        attribute.set_unique_id(self.next_unique_id);
        self.next_unique_id += 1;
        let id = self.attributes.len() as i32;
        self.attributes.push(attribute);
        id
    }

    /// Removes the attribute with `att_id`. Ids of later attributes shift down by one.
    pub fn delete_attribute(&mut self, att_id: i32) {
        if att_id < 0 || att_id as usize >= self.attributes.len() {
            return;
        }
        self.attributes.remove(att_id as usize);
    }

    pub fn num_attributes(&self) -> i32 {
        self.attributes.len() as i32
    }

    pub fn attribute(&self, att_id: i32) -> &PointAttribute {
        &self.attributes[att_id as usize]
    }

    pub fn attribute_mut(&mut self, att_id: i32) -> &mut PointAttribute {
        &mut self.attributes[att_id as usize]
    }

    pub fn attributes(&self) -> &[PointAttribute] {
        &self.attributes
    }

    pub fn num_named_attributes(&self, att_type: GeometryAttributeType) -> i32 {
        self.attributes
            .iter()
            .filter(|att| att.attribute_type() == att_type)
            .count() as i32
    }

    /// Id of the `i`-th attribute of `att_type`, or -1.
    pub fn named_attribute_id_at(&self, att_type: GeometryAttributeType, i: i32) -> i32 {
        self.attributes
            .iter()
            .enumerate()
            .filter(|(_, att)| att.attribute_type() == att_type)
            .nth(i.max(0) as usize)
            .map(|(id, _)| id as i32)
            .unwrap_or(-1)
    }

    pub fn named_attribute_id(&self, att_type: GeometryAttributeType) -> i32 {
        self.named_attribute_id_at(att_type, 0)
    }

    pub fn named_attribute(&self, att_type: GeometryAttributeType) -> Option<&PointAttribute> {
        let id = self.named_attribute_id(att_type);
        if id >= 0 {
            Some(&self.attributes[id as usize])
        } else {
            None
        }
    }

    /// Merges identical values inside every attribute.
    pub fn deduplicate_attribute_values(&mut self) {
        let num_points = self.num_points;
        for att in &mut self.attributes {
            att.deduplicate_values(num_points);
        }
    }

    /// Merges points whose attribute value indices are identical across all
    /// attributes.
    ///
    /// Returns the old-to-new point map when any points were merged, `None`
    /// otherwise. Callers owning connectivity must remap through it.
    pub fn deduplicate_point_ids(&mut self) -> Option<Vec<PointIndex>> {
        let mut unique: HashMap<Vec<u32>, PointIndex> = HashMap::new();
        let mut representatives = Vec::new();
        let mut point_map = Vec::with_capacity(self.num_points);
        for p in 0..self.num_points {
            let point = PointIndex(p as u32);
            let key: Vec<u32> = self.attributes.iter().map(|att| att.mapped_index(point).0).collect();
            let next = PointIndex(unique.len() as u32);
            let new_point = *unique.entry(key).or_insert_with(|| {
                representatives.push(point);
                next
            });
            point_map.push(new_point);
        }
        if representatives.len() == self.num_points {
            return None;
        }

        for att in &mut self.attributes {
            let values: Vec<AttributeValueIndex> =
                representatives.iter().map(|&p| att.mapped_index(p)).collect();
            att.set_explicit_mapping(representatives.len());
            for (new_point, value) in values.into_iter().enumerate() {
                att.set_point_map_entry(PointIndex(new_point as u32), value);
            }
        }
        self.num_points = representatives.len();
        Some(point_map)
    }
}
