/// Bounds-checked big-endian field reader
///
/// Cursor over one message span. The input is a raw mapped region with no
/// trailing sentinel, so every read is checked against the remaining bytes
/// instead of trusting the declared layout.

use byteorder::{BigEndian, ByteOrder};

use crate::decoder::{DecodeError, DecodeResult};

pub struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        FieldReader { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, width: usize) -> DecodeResult<&'a [u8]> {
        if self.remaining() < width {
            return Err(DecodeError::OutOfBounds {
                need: width,
                have: self.remaining(),
            });
        }
        let span = &self.buf[self.pos..self.pos + width];
        self.pos += width;
        Ok(span)
    }

    /// Advance past fields the caller does not extract.
    pub fn skip(&mut self, width: usize) -> DecodeResult<()> {
        self.take(width).map(|_| ())
    }

    pub fn u8(&mut self) -> DecodeResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> DecodeResult<u16> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    pub fn u32(&mut self) -> DecodeResult<u32> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    /// 6-byte unsigned integer; the wire's timestamp width.
    pub fn u48(&mut self) -> DecodeResult<u64> {
        Ok(BigEndian::read_uint(self.take(6)?, 6))
    }

    pub fn u64(&mut self) -> DecodeResult<u64> {
        Ok(BigEndian::read_u64(self.take(8)?))
    }

    /// Fixed-width text field with trailing blank padding stripped.
    pub fn text(&mut self, width: usize) -> DecodeResult<&'a str> {
        let span = self.take(width)?;
        let trimmed = match span.iter().rposition(|&b| b != b' ') {
            Some(last) => &span[..=last],
            None => &span[..0],
        };
        std::str::from_utf8(trimmed).map_err(|_| DecodeError::InvalidText)
    }
}
