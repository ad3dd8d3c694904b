#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodedGeometryType {
    InvalidGeometryType = -1,
    PointCloud = 0,
    TriangularMesh = 1,
}

impl EncodedGeometryType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => EncodedGeometryType::PointCloud,
            1 => EncodedGeometryType::TriangularMesh,
            _ => EncodedGeometryType::InvalidGeometryType,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointCloudEncodingMethod {
    PointCloudSequentialEncoding = 0,
}

/// How triangle corners are stored in a mesh bitstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshEncodingMethod {
    /// Fixed-width 32-bit point ids.
    MeshSequentialEncoding = 0,
    /// Zig-zag varint deltas between consecutive corners.
    MeshDeltaEncoding = 1,
}

impl MeshEncodingMethod {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(MeshEncodingMethod::MeshSequentialEncoding),
            1 => Some(MeshEncodingMethod::MeshDeltaEncoding),
            _ => None,
        }
    }

    /// Only the fastest setting skips the delta coding.
    pub fn for_speed(encoding_speed: i32) -> Self {
        if encoding_speed >= 10 {
            MeshEncodingMethod::MeshSequentialEncoding
        } else {
            MeshEncodingMethod::MeshDeltaEncoding
        }
    }
}
