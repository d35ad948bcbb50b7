//! Read and write extension traits for Java primitive types, as found in
//! `DataInput`/`DataOutput`, which is how the NBT binary format is laid out.

use byteorder::{ReadBytesExt, WriteBytesExt, BE};
use std::io::{self, Read, Write};


/// Extension trait with Java `DataInput` read methods.
pub trait ReadJavaExt: Read {

    #[inline]
    fn read_java_byte(&mut self) -> io::Result<i8> {
        ReadBytesExt::read_i8(self)
    }

    #[inline]
    fn read_java_short(&mut self) -> io::Result<i16> {
        ReadBytesExt::read_i16::<BE>(self)
    }

    #[inline]
    fn read_java_int(&mut self) -> io::Result<i32> {
        ReadBytesExt::read_i32::<BE>(self)
    }

    #[inline]
    fn read_java_long(&mut self) -> io::Result<i64> {
        ReadBytesExt::read_i64::<BE>(self)
    }

    #[inline]
    fn read_java_float(&mut self) -> io::Result<f32> {
        ReadBytesExt::read_f32::<BE>(self)
    }

    #[inline]
    fn read_java_double(&mut self) -> io::Result<f64> {
        ReadBytesExt::read_f64::<BE>(self)
    }

    /// Read a string in the modified UTF-8 encoding of `DataInput::readUTF`, prefixed
    /// by its unsigned 16-bit byte length.
    fn read_java_utf(&mut self) -> io::Result<String> {

        let len = self.read_u16::<BE>()?;
        let mut buf = vec![0u8; len as usize];
        self.read_exact(&mut buf)?;

        let mut units = Vec::with_capacity(buf.len());
        let mut bytes = buf.into_iter();

        while let Some(b0) = bytes.next() {
            let unit = match b0 {
                0x00..=0x7F => b0 as u16,
                0xC0..=0xDF => {
                    let b1 = next_continuation(&mut bytes)?;
                    ((b0 as u16 & 0x1F) << 6) | b1
                }
                0xE0..=0xEF => {
                    let b1 = next_continuation(&mut bytes)?;
                    let b2 = next_continuation(&mut bytes)?;
                    ((b0 as u16 & 0x0F) << 12) | (b1 << 6) | b2
                }
                _ => return Err(new_invalid_data_err("malformed modified utf-8 string")),
            };
            units.push(unit);
        }

        String::from_utf16(&units).map_err(|_| new_invalid_data_err("unpaired surrogate in string"))

    }

}

/// Extension trait with Java `DataOutput` write methods.
pub trait WriteJavaExt: Write {

    #[inline]
    fn write_java_byte(&mut self, b: i8) -> io::Result<()> {
        WriteBytesExt::write_i8(self, b)
    }

    #[inline]
    fn write_java_short(&mut self, s: i16) -> io::Result<()> {
        WriteBytesExt::write_i16::<BE>(self, s)
    }

    #[inline]
    fn write_java_int(&mut self, i: i32) -> io::Result<()> {
        WriteBytesExt::write_i32::<BE>(self, i)
    }

    #[inline]
    fn write_java_long(&mut self, l: i64) -> io::Result<()> {
        WriteBytesExt::write_i64::<BE>(self, l)
    }

    #[inline]
    fn write_java_float(&mut self, f: f32) -> io::Result<()> {
        WriteBytesExt::write_f32::<BE>(self, f)
    }

    #[inline]
    fn write_java_double(&mut self, d: f64) -> io::Result<()> {
        WriteBytesExt::write_f64::<BE>(self, d)
    }

    /// Write a string in the modified UTF-8 encoding of `DataOutput::writeUTF`: the nul
    /// character takes two bytes and supplementary characters are written as two
    /// encoded surrogates.
    fn write_java_utf(&mut self, s: &str) -> io::Result<()> {

        let mut buf = Vec::with_capacity(s.len());
        for unit in s.encode_utf16() {
            match unit {
                0x0001..=0x007F => buf.push(unit as u8),
                0x0000 | 0x0080..=0x07FF => {
                    buf.push(0xC0 | (unit >> 6) as u8);
                    buf.push(0x80 | (unit & 0x3F) as u8);
                }
                _ => {
                    buf.push(0xE0 | (unit >> 12) as u8);
                    buf.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                    buf.push(0x80 | (unit & 0x3F) as u8);
                }
            }
        }

        if buf.len() > u16::MAX as usize {
            return Err(new_invalid_data_err("string too big"));
        }

        self.write_u16::<BE>(buf.len() as u16)?;
        self.write_all(&buf)

    }

}

impl<R: Read> ReadJavaExt for R {}
impl<W: Write> WriteJavaExt for W {}


fn next_continuation(bytes: &mut impl Iterator<Item = u8>) -> io::Result<u16> {
    match bytes.next() {
        Some(b) if b & 0xC0 == 0x80 => Ok((b & 0x3F) as u16),
        _ => Err(new_invalid_data_err("malformed modified utf-8 string")),
    }
}

/// Return an invalid data io error with specific message.
fn new_invalid_data_err(message: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn modified_utf8() {

        let mut buf = Vec::new();
        buf.write_java_utf("a\0§").unwrap();
        assert_eq!(buf, [0x00, 0x05, b'a', 0xC0, 0x80, 0xC2, 0xA7]);

        // Supplementary characters are written as two 3-byte surrogates.
        buf.clear();
        buf.write_java_utf("😀").unwrap();
        assert_eq!(buf, [0x00, 0x06, 0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80]);

        assert_eq!((&buf[..]).read_java_utf().unwrap(), "😀");

    }

    #[test]
    fn malformed_utf8() {
        let buf = [0x00, 0x02, 0xC2, 0x41];
        assert_eq!((&buf[..]).read_java_utf().unwrap_err().kind(), io::ErrorKind::InvalidData);
    }

}
