use byteorder::{ByteOrder, LittleEndian};

use crate::status::DracoError;

/// Input buffer for reading compressed Draco data.
///
/// Every read is bounds checked and reports `DracoError::BufferError` instead
/// of panicking on truncated input.
///
/// # Example
///
/// ```
/// use draco_core::DecoderBuffer;
///
/// let data = &[0x44, 0x52, 0x41, 0x43, 0x4F]; // "DRACO" header
/// let mut buffer = DecoderBuffer::new(data);
///
/// assert_eq!(buffer.decode_u8().unwrap(), 0x44);
/// assert_eq!(buffer.remaining_size(), 4);
/// ```
pub struct DecoderBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DecoderBuffer<'a> {
    /// Creates a new `DecoderBuffer` from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current read position in bytes.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of bytes remaining in the buffer.
    pub fn remaining_size(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// The unread tail of the buffer.
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DracoError> {
        if len > self.remaining_size() {
            return Err(DracoError::BufferError(format!(
                "Need {} bytes at offset {}, only {} left",
                len,
                self.pos,
                self.remaining_size()
            )));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn decode_u8(&mut self) -> Result<u8, DracoError> {
        Ok(self.take(1)?[0])
    }

    pub fn decode_u16(&mut self) -> Result<u16, DracoError> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn decode_u32(&mut self) -> Result<u32, DracoError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn decode_f32(&mut self) -> Result<f32, DracoError> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    pub fn decode_bytes(&mut self, out: &mut [u8]) -> Result<(), DracoError> {
        let src = self.take(out.len())?;
        out.copy_from_slice(src);
        Ok(())
    }

    /// Borrows the next `len` bytes.
    pub fn decode_slice(&mut self, len: usize) -> Result<&'a [u8], DracoError> {
        self.take(len)
    }

    pub fn decode_varint(&mut self) -> Result<u64, DracoError> {
        let mut result = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.decode_u8()?;
            if shift >= 64 {
                return Err(DracoError::BufferError("Varint too long".into()));
            }
            result |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    pub fn decode_signed_varint(&mut self) -> Result<i64, DracoError> {
        let raw = self.decode_varint()?;
        Ok(((raw >> 1) as i64) ^ -((raw & 1) as i64))
    }

    /// Reads a count and rejects values that could not possibly fit in the
    /// remaining input, given `min_bytes_each` per element.
    pub fn decode_count(&mut self, min_bytes_each: usize) -> Result<usize, DracoError> {
        let count = self.decode_varint()?;
        let count = usize::try_from(count)
            .map_err(|_| DracoError::BufferError("Count does not fit in memory".into()))?;
        if min_bytes_each > 0 && count > self.remaining_size() / min_bytes_each {
            return Err(DracoError::BufferError(format!(
                "Count {} exceeds remaining input",
                count
            )));
        }
        Ok(count)
    }

    /// Inverse of `EncoderBuffer::encode_packed_bits`.
    pub fn decode_packed_bits(&mut self, count: usize, bits: u32) -> Result<Vec<u32>, DracoError> {
        let num_bytes = self.decode_varint()? as usize;
        let needed = (count as u64 * bits as u64 + 7) / 8;
        if num_bytes as u64 != needed {
            return Err(DracoError::BufferError(format!(
                "Packed block has {} bytes, expected {}",
                num_bytes, needed
            )));
        }
        let block = self.take(num_bytes)?;
        let mut values = Vec::with_capacity(count);
        let mut bit_offset = 0usize;
        for _ in 0..count {
            let mut value = 0u32;
            for b in 0..bits {
                let pos = bit_offset + b as usize;
                if (block[pos / 8] >> (pos % 8)) & 1 == 1 {
                    value |= 1 << b;
                }
            }
            values.push(value);
            bit_offset += bits as usize;
        }
        Ok(values)
    }
}
