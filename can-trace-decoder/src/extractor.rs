//! Signal extraction
//!
//! Reads a bit window out of a frame payload and converts it to a physical
//! value. Both steps are pure and total: a window that runs past the end of
//! the payload reads the missing bits as zero.

/// Bit window decoder
pub struct SignalExtractor;

impl SignalExtractor {
    /// Extract an unscaled value from `length` bits starting at `start_bit`
    ///
    /// Bits are numbered from the least significant bit of `payload[0]`:
    /// absolute bit `k` lives in byte `k / 8` at position `k % 8`. The bit at
    /// `start_bit + i` becomes bit `i` of the result, so the value is
    /// little-endian with respect to the window regardless of byte
    /// boundaries. Only the first 64 bits of a window can contribute.
    ///
    /// # Example
    /// ```
    /// use can_trace_decoder::SignalExtractor;
    ///
    /// let payload = [0x00, 0x10, 0x34, 0x12];
    /// assert_eq!(SignalExtractor::extract_raw(&payload, 0, 16), 0x1000);
    /// assert_eq!(SignalExtractor::extract_raw(&payload, 16, 16), 0x1234);
    /// ```
    pub fn extract_raw(payload: &[u8], start_bit: u16, length: u16) -> u64 {
        let start_bit = start_bit as usize;
        let width = (length as usize).min(u64::BITS as usize);
        let mut result: u64 = 0;

        for i in 0..width {
            let bit_pos = start_bit + i;
            let byte_idx = bit_pos / 8;
            let bit_in_byte = bit_pos % 8;

            if let Some(byte) = payload.get(byte_idx) {
                let bit_value = (byte >> bit_in_byte) & 0x01;
                result |= (bit_value as u64) << i;
            }
        }

        result
    }

    /// Apply linear scaling: `raw * scale + offset`
    pub fn physical_value(raw: u64, scale: f64, offset: f64) -> f64 {
        raw as f64 * scale + offset
    }

    /// Number of payload bytes a window needs to be fully present
    pub fn required_bytes(start_bit: u16, length: u16) -> usize {
        (start_bit as usize + length as usize).div_ceil(8)
    }
}
