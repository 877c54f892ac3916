use arch::catalog::Peek;

use crate::error::Error;

/// Read position into the input at bit granularity.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    byte: usize,
    bit: u8,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Cursor {
            bytes,
            byte: 0,
            bit: 0,
        }
    }

    /// Index of the byte under the cursor.
    pub fn offset(&self) -> usize {
        self.byte
    }

    pub fn is_end(&self) -> bool {
        self.byte >= self.bytes.len()
    }

    pub fn ensure_aligned(&self) -> Result<(), Error> {
        match self.bit {
            0 => Ok(()),
            bit => Err(Error::Misaligned {
                offset: self.byte,
                bit,
            }),
        }
    }

    /// Next `count` (1..=8) bits starting `offset` bits ahead, MSB first.
    pub fn peek(&self, count: u8, offset: u8) -> Result<u8, Error> {
        debug_assert!((1..=8).contains(&count));
        let start = self.byte * 8 + (self.bit + offset) as usize;
        let mut value = 0u8;
        for pos in start..start + count as usize {
            let byte = self.bytes.get(pos / 8).ok_or(Error::Truncated {
                offset: pos / 8,
                len: self.bytes.len(),
            })?;
            value = (value << 1) | ((byte >> (7 - pos % 8)) & 1);
        }
        Ok(value)
    }

    pub fn consume_bits(&mut self, count: u8) -> Result<u8, Error> {
        let value = self.peek(count, 0)?;
        let bit = self.bit as usize + count as usize;
        self.byte += bit / 8;
        self.bit = (bit % 8) as u8;
        Ok(value)
    }

    pub fn consume_byte(&mut self) -> Result<u8, Error> {
        self.ensure_aligned()?;
        let byte = *self.bytes.get(self.byte).ok_or(Error::Truncated {
            offset: self.byte,
            len: self.bytes.len(),
        })?;
        self.byte += 1;
        Ok(byte)
    }

    /// Two bytes, low byte first.
    pub fn consume_word(&mut self) -> Result<u16, Error> {
        let lo = self.consume_byte()?;
        let hi = self.consume_byte()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }
}

impl Peek for Cursor<'_> {
    type Error = Error;

    fn peek(&self, count: u8, offset: u8) -> Result<u8, Error> {
        Cursor::peek(self, count, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_does_not_advance() {
        let cursor = Cursor::new(&[0b1011_0110]);
        assert_eq!(cursor.peek(4, 0).unwrap(), 0b1011);
        assert_eq!(cursor.peek(4, 0).unwrap(), 0b1011);
        assert_eq!(cursor.peek(3, 4).unwrap(), 0b011);
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_peek_across_bytes() {
        let cursor = Cursor::new(&[0b1000_0011, 0b11_101_001]);
        assert_eq!(cursor.peek(3, 10).unwrap(), 0b101);
        assert_eq!(cursor.peek(8, 4).unwrap(), 0b0011_1110);
    }

    #[test]
    fn test_consume_bits_carries() {
        let mut cursor = Cursor::new(&[0b100010_0_1, 0b11_011_001]);
        assert_eq!(cursor.consume_bits(6).unwrap(), 0b100010);
        assert_eq!(cursor.consume_bits(1).unwrap(), 0);
        assert_eq!(cursor.consume_bits(1).unwrap(), 1);
        assert_eq!(cursor.offset(), 1);
        assert!(cursor.ensure_aligned().is_ok());
        assert_eq!(cursor.consume_bits(2).unwrap(), 0b11);
        assert_eq!(cursor.consume_bits(3).unwrap(), 0b011);
        assert_eq!(cursor.consume_bits(3).unwrap(), 0b001);
        assert!(cursor.is_end());
    }

    #[test]
    fn test_consume_byte_requires_alignment() {
        let mut cursor = Cursor::new(&[0xFF, 0x01]);
        cursor.consume_bits(3).unwrap();
        assert!(matches!(
            cursor.consume_byte(),
            Err(Error::Misaligned { offset: 0, bit: 3 })
        ));
    }

    #[test]
    fn test_consume_word_little_endian() {
        let mut cursor = Cursor::new(&[0x34, 0x12]);
        assert_eq!(cursor.consume_word().unwrap(), 0x1234);
        assert!(cursor.is_end());
    }

    #[test]
    fn test_truncated() {
        let mut cursor = Cursor::new(&[0x34]);
        assert!(matches!(
            cursor.consume_word(),
            Err(Error::Truncated { offset: 1, len: 1 })
        ));
        let cursor = Cursor::new(&[0x80]);
        assert!(matches!(
            cursor.peek(3, 6),
            Err(Error::Truncated { offset: 1, len: 1 })
        ));
    }
}
