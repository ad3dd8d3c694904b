/// Raw byte storage backing a point attribute.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DataBuffer {
    data: Vec<u8>,
}

impl DataBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn resize(&mut self, new_size: usize) {
        self.data.resize(new_size, 0);
    }

    pub fn read(&self, byte_pos: usize, out_data: &mut [u8]) {
        let len = out_data.len();
        out_data.copy_from_slice(&self.data[byte_pos..byte_pos + len]);
    }

    pub fn write(&mut self, byte_pos: usize, in_data: &[u8]) {
        let end = byte_pos + in_data.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[byte_pos..end].copy_from_slice(in_data);
    }

    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn slice(&self, byte_pos: usize, len: usize) -> &[u8] {
        &self.data[byte_pos..byte_pos + len]
    }
}
