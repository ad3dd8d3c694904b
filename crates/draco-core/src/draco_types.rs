#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Invalid = 0,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float32,
    Float64,
    Bool,
}

impl DataType {
    pub fn from_u8(value: u8) -> Option<Self> {
        let data_type = match value {
            0 => DataType::Invalid,
            1 => DataType::Int8,
            2 => DataType::Uint8,
            3 => DataType::Int16,
            4 => DataType::Uint16,
            5 => DataType::Int32,
            6 => DataType::Uint32,
            7 => DataType::Int64,
            8 => DataType::Uint64,
            9 => DataType::Float32,
            10 => DataType::Float64,
            11 => DataType::Bool,
            _ => return None,
        };
        Some(data_type)
    }

    pub fn byte_length(&self) -> usize {
        match self {
            DataType::Invalid => 0,
            DataType::Int8 | DataType::Uint8 | DataType::Bool => 1,
            DataType::Int16 | DataType::Uint16 => 2,
            DataType::Int32 | DataType::Uint32 | DataType::Float32 => 4,
            DataType::Int64 | DataType::Uint64 | DataType::Float64 => 8,
        }
    }

    pub fn is_integral(&self) -> bool {
        !matches!(self, DataType::Float32 | DataType::Float64 | DataType::Invalid)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u8_matches_discriminant() {
        for value in 0u8..=11 {
            let data_type = DataType::from_u8(value).unwrap();
            assert_eq!(data_type as u8, value);
        }
        assert_eq!(DataType::from_u8(12), None);
    }

    #[test]
    fn test_byte_length() {
        assert_eq!(DataType::Uint8.byte_length(), 1);
        assert_eq!(DataType::Float32.byte_length(), 4);
        assert_eq!(DataType::Float64.byte_length(), 8);
        assert!(DataType::Float32.is_float());
        assert!(!DataType::Float32.is_integral());
        assert!(DataType::Uint16.is_integral());
    }
}
