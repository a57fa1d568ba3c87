//! Tiny byte-level reader/writer pair used by [`super::Frame`] implementations. Not
//! public API on its own — every caller goes through `encode_frame`/`decode_frame`.

use crate::basic_types::BranchConeError;
use crate::basic_types::Result;

pub struct Writer<'a> {
    buffer: &'a mut Vec<u8>,
}

impl<'a> Writer<'a> {
    pub fn new(buffer: &'a mut Vec<u8>) -> Self {
        Writer { buffer }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_string(&mut self, value: &str) {
        self.write_u32(value.len() as u32);
        self.buffer.extend_from_slice(value.as_bytes());
    }
}

pub struct Cursor<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Cursor { buffer, position: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.position + len;
        let slice = self
            .buffer
            .get(self.position..end)
            .ok_or_else(|| BranchConeError::DecodeError(format!("expected {len} more bytes at offset {}", self.position)))?;
        self.position = end;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn read_string(&mut self) -> Result<String> {
        let length = self.read_u32()? as usize;
        let bytes = self.take(length)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| BranchConeError::DecodeError("string field is not valid UTF-8".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_primitive() {
        let mut bytes = Vec::new();
        {
            let mut writer = Writer::new(&mut bytes);
            writer.write_u8(7);
            writer.write_u32(1_000_000);
            writer.write_u64(u64::MAX - 1);
            writer.write_f64(std::f64::consts::PI);
            writer.write_string("cone");
        }
        let mut cursor = Cursor::new(&bytes);
        assert_eq!(cursor.read_u8().unwrap(), 7);
        assert_eq!(cursor.read_u32().unwrap(), 1_000_000);
        assert_eq!(cursor.read_u64().unwrap(), u64::MAX - 1);
        assert_eq!(cursor.read_f64().unwrap(), std::f64::consts::PI);
        assert_eq!(cursor.read_string().unwrap(), "cone");
    }

    #[test]
    fn reading_past_the_end_is_an_error() {
        let bytes = vec![1, 2];
        let mut cursor = Cursor::new(&bytes);
        assert!(cursor.read_u32().is_err());
    }
}
