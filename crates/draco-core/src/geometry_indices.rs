#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeValueIndex(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointIndex(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceIndex(pub u32);

pub const INVALID_ATTRIBUTE_VALUE_INDEX: AttributeValueIndex = AttributeValueIndex(u32::MAX);

impl From<u32> for AttributeValueIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl From<usize> for AttributeValueIndex {
    fn from(v: usize) -> Self {
        Self(v as u32)
    }
}

impl From<u32> for PointIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl From<usize> for PointIndex {
    fn from(v: usize) -> Self {
        Self(v as u32)
    }
}

impl From<PointIndex> for usize {
    fn from(v: PointIndex) -> Self {
        v.0 as usize
    }
}
