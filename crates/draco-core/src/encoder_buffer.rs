use byteorder::{ByteOrder, LittleEndian};

/// Growable output buffer for Draco serialization.
#[derive(Debug, Clone, Default)]
pub struct EncoderBuffer {
    buffer: Vec<u8>,
}

impl EncoderBuffer {
    /// Create a new empty encoder buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer with initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buffer: Vec::with_capacity(capacity) }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buffer
    }

    pub fn encode_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn encode_u16(&mut self, value: u16) {
        let mut bytes = [0u8; 2];
        LittleEndian::write_u16(&mut bytes, value);
        self.buffer.extend_from_slice(&bytes);
    }

    pub fn encode_u32(&mut self, value: u32) {
        let mut bytes = [0u8; 4];
        LittleEndian::write_u32(&mut bytes, value);
        self.buffer.extend_from_slice(&bytes);
    }

    pub fn encode_f32(&mut self, value: f32) {
        let mut bytes = [0u8; 4];
        LittleEndian::write_f32(&mut bytes, value);
        self.buffer.extend_from_slice(&bytes);
    }

    pub fn encode_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// LEB128-style unsigned varint.
    pub fn encode_varint(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buffer.push(byte);
                break;
            }
            self.buffer.push(byte | 0x80);
        }
    }

    /// Zig-zag maps signed values onto the unsigned varint.
    pub fn encode_signed_varint(&mut self, value: i64) {
        self.encode_varint(((value << 1) ^ (value >> 63)) as u64);
    }

    /// Packs `values` at `bits` bits each, least significant bit first.
    ///
    /// The packed block is prefixed by its byte length so decoders can skip it.
    pub fn encode_packed_bits(&mut self, values: &[u32], bits: u32) {
        let total_bits = values.len() as u64 * bits as u64;
        let num_bytes = ((total_bits + 7) / 8) as usize;
        self.encode_varint(num_bytes as u64);

        let start = self.buffer.len();
        self.buffer.resize(start + num_bytes, 0);
        let mut bit_offset = 0usize;
        for &value in values {
            for b in 0..bits {
                if (value >> b) & 1 == 1 {
                    let pos = bit_offset + b as usize;
                    self.buffer[start + pos / 8] |= 1 << (pos % 8);
                }
            }
            bit_offset += bits as usize;
        }
    }
}
