/// Largest quantized value representable with `bits` bits.
pub fn max_quantized_value(bits: i32) -> u32 {
    if bits <= 0 {
        0
    } else if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Quantizer {
    inverse_delta: f32,
}

impl Quantizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self, range: f32, max_quantized_value: u32) {
        if range > 0.0 {
            self.inverse_delta = max_quantized_value as f32 / range;
        } else {
            self.inverse_delta = 0.0;
        }
    }

    pub fn quantize_float(&self, val: f32) -> u32 {
        let val = val * self.inverse_delta;
        let q = (val + 0.5).floor();
        if q <= 0.0 {
            0
        } else {
            q as u32
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Dequantizer {
    delta: f32,
}

impl Dequantizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self, range: f32, max_quantized_value: u32) -> bool {
        if max_quantized_value > 0 {
            self.delta = range / max_quantized_value as f32;
            true
        } else {
            false
        }
    }

    pub fn dequantize_float(&self, val: u32) -> f32 {
        val as f32 * self.delta
    }
}

/// Per-attribute quantization frame: component minimums and one shared range.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizationFrame {
    pub min_values: Vec<f32>,
    pub range: f32,
}

impl QuantizationFrame {
    /// Bounding frame of `values`, laid out `num_components` per entry.
    pub fn from_values(values: &[f32], num_components: usize) -> Self {
        let mut min_values = vec![f32::MAX; num_components];
        let mut max_values = vec![f32::MIN; num_components];
        for entry in values.chunks_exact(num_components.max(1)) {
            for (c, &v) in entry.iter().enumerate() {
                min_values[c] = min_values[c].min(v);
                max_values[c] = max_values[c].max(v);
            }
        }
        if values.is_empty() {
            min_values.iter_mut().for_each(|v| *v = 0.0);
            max_values.iter_mut().for_each(|v| *v = 0.0);
        }
        let range = min_values
            .iter()
            .zip(&max_values)
            .map(|(lo, hi)| hi - lo)
            .fold(0.0f32, f32::max);
        Self { min_values, range }
    }
}
