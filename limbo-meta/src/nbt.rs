//! NBT tag tree and its binary serialization.

use std::io::{self, Read, Write};
use std::fmt;

use indexmap::IndexMap;

use crate::java::{ReadJavaExt, WriteJavaExt};


const NBT_END        : i8 = 0;
const NBT_BYTE       : i8 = 1;
const NBT_SHORT      : i8 = 2;
const NBT_INT        : i8 = 3;
const NBT_LONG       : i8 = 4;
const NBT_FLOAT      : i8 = 5;
const NBT_DOUBLE     : i8 = 6;
const NBT_BYTE_ARRAY : i8 = 7;
const NBT_STRING     : i8 = 8;
const NBT_LIST       : i8 = 9;
const NBT_COMPOUND   : i8 = 10;
const NBT_INT_ARRAY  : i8 = 11;
const NBT_LONG_ARRAY : i8 = 12;

/// Decoded lengths are untrusted, vectors grow past this as elements are read.
const MAX_PREALLOC: usize = 1024;


/// A generic NBT tag.
#[derive(Clone, PartialEq)]
pub enum Nbt {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    String(String),
    /// A list of tags, all of the same type when serialized.
    List(Vec<Nbt>),
    Compound(NbtCompound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

/// A NBT compound, keys are unique and kept in insertion order so that the serialized
/// output is exactly the order in which the compound was built.
#[derive(Clone, PartialEq, Default)]
pub struct NbtCompound {
    inner: IndexMap<String, Nbt>,
}


/// Deserialize a NBT tag from a reader, the root tag being named (the name is ignored).
pub fn from_reader(mut reader: impl Read) -> Result<Nbt, NbtError> {

    let type_id = reader.read_java_byte()?;
    if type_id == NBT_END {
        // We should not get a end tag directly.
        return Err(NbtError::IllegalTagType);
    }

    let _key = reader.read_java_utf()?;
    from_reader_with_type(&mut reader, type_id)

}

/// Deserialize a NBT tag from a reader, the root tag having no name, as used by the
/// network protocol since 1.20.2.
pub fn from_reader_nameless(mut reader: impl Read) -> Result<Nbt, NbtError> {

    let type_id = reader.read_java_byte()?;
    if type_id == NBT_END {
        return Err(NbtError::IllegalTagType);
    }

    from_reader_with_type(&mut reader, type_id)

}

/// Internal function to read a NBT tag of a specific type.
fn from_reader_with_type(reader: &mut impl Read, type_id: i8) -> Result<Nbt, NbtError> {
    Ok(match type_id {
        NBT_BYTE => Nbt::Byte(reader.read_java_byte()?),
        NBT_SHORT => Nbt::Short(reader.read_java_short()?),
        NBT_INT => Nbt::Int(reader.read_java_int()?),
        NBT_LONG => Nbt::Long(reader.read_java_long()?),
        NBT_FLOAT => Nbt::Float(reader.read_java_float()?),
        NBT_DOUBLE => Nbt::Double(reader.read_java_double()?),
        NBT_BYTE_ARRAY => {
            let len = read_len(reader)?;
            let mut buf = Vec::with_capacity(len.min(MAX_PREALLOC));
            Read::take(&mut *reader, len as u64).read_to_end(&mut buf)?;
            if buf.len() != len {
                return Err(NbtError::Io(io::ErrorKind::UnexpectedEof.into()));
            }
            Nbt::ByteArray(buf)
        }
        NBT_STRING => Nbt::String(reader.read_java_utf()?),
        NBT_LIST => {

            let type_id = reader.read_java_byte()?;
            let len = read_len(reader)?;
            if type_id == NBT_END && len != 0 {
                return Err(NbtError::IllegalTagType);
            }

            let mut list = Vec::with_capacity(len.min(MAX_PREALLOC));
            for _ in 0..len {
                list.push(from_reader_with_type(reader, type_id)?);
            }

            Nbt::List(list)

        }
        NBT_COMPOUND => Nbt::Compound(compound_from_reader(reader)?),
        NBT_INT_ARRAY => {
            let len = read_len(reader)?;
            let mut arr = Vec::with_capacity(len.min(MAX_PREALLOC));
            for _ in 0..len {
                arr.push(reader.read_java_int()?);
            }
            Nbt::IntArray(arr)
        }
        NBT_LONG_ARRAY => {
            let len = read_len(reader)?;
            let mut arr = Vec::with_capacity(len.min(MAX_PREALLOC));
            for _ in 0..len {
                arr.push(reader.read_java_long()?);
            }
            Nbt::LongArray(arr)
        }
        _ => return Err(NbtError::IllegalTagType),
    })
}

fn read_len(reader: &mut impl Read) -> Result<usize, NbtError> {
    reader.read_java_int()?.try_into().map_err(|_| NbtError::IllegalLength)
}

fn compound_from_reader(reader: &mut impl Read) -> Result<NbtCompound, NbtError> {

    let mut map = IndexMap::new();

    loop {

        let type_id = reader.read_java_byte()?;
        if type_id == NBT_END {
            break Ok(NbtCompound { inner: map });
        }

        let key = reader.read_java_utf()?;
        map.insert(key, from_reader_with_type(reader, type_id)?);

    }

}

/// Serialize a NBT tag into a writer, the root tag has an empty name.
pub fn to_writer(mut writer: impl Write, tag: &Nbt) -> Result<(), NbtError> {
    writer.write_java_byte(tag.type_id())?;
    writer.write_java_utf("")?;
    to_writer_raw(&mut writer, tag)
}

/// Serialize a NBT tag into a writer without root name, as expected by the network
/// protocol since 1.20.2.
pub fn to_writer_nameless(mut writer: impl Write, tag: &Nbt) -> Result<(), NbtError> {
    writer.write_java_byte(tag.type_id())?;
    to_writer_raw(&mut writer, tag)
}

/// Internal function to write a NBT tag content.
fn to_writer_raw(writer: &mut impl Write, tag: &Nbt) -> Result<(), NbtError> {

    match *tag {
        Nbt::Byte(n) => writer.write_java_byte(n)?,
        Nbt::Short(n) => writer.write_java_short(n)?,
        Nbt::Int(n) => writer.write_java_int(n)?,
        Nbt::Long(n) => writer.write_java_long(n)?,
        Nbt::Float(n) => writer.write_java_float(n)?,
        Nbt::Double(n) => writer.write_java_double(n)?,
        Nbt::ByteArray(ref buf) => {
            write_len(writer, buf.len())?;
            writer.write_all(buf)?;
        }
        Nbt::String(ref string) => writer.write_java_utf(string)?,
        Nbt::List(ref list) => {

            // An empty list has no element type.
            let type_id = list.first().map(Nbt::type_id).unwrap_or(NBT_END);
            if list.iter().any(|tag| tag.type_id() != type_id) {
                return Err(NbtError::MixedList);
            }

            writer.write_java_byte(type_id)?;
            write_len(writer, list.len())?;
            for tag in list {
                to_writer_raw(writer, tag)?;
            }

        }
        Nbt::Compound(ref compound) => compound_to_writer(writer, compound)?,
        Nbt::IntArray(ref arr) => {
            write_len(writer, arr.len())?;
            for &n in arr {
                writer.write_java_int(n)?;
            }
        }
        Nbt::LongArray(ref arr) => {
            write_len(writer, arr.len())?;
            for &n in arr {
                writer.write_java_long(n)?;
            }
        }
    }

    Ok(())

}

fn write_len(writer: &mut impl Write, len: usize) -> Result<(), NbtError> {
    let len: i32 = len.try_into().map_err(|_| NbtError::IllegalLength)?;
    writer.write_java_int(len)?;
    Ok(())
}

fn compound_to_writer(writer: &mut impl Write, compound: &NbtCompound) -> Result<(), NbtError> {

    for (key, tag) in &compound.inner {
        writer.write_java_byte(tag.type_id())?;
        writer.write_java_utf(key)?;
        to_writer_raw(writer, tag)?;
    }

    writer.write_java_byte(NBT_END)?;
    Ok(())

}


/// Basic methods to interpret a tag as its inner type if possible.
impl Nbt {

    /// Get the binary type id of this tag.
    pub fn type_id(&self) -> i8 {
        match self {
            Nbt::Byte(_) => NBT_BYTE,
            Nbt::Short(_) => NBT_SHORT,
            Nbt::Int(_) => NBT_INT,
            Nbt::Long(_) => NBT_LONG,
            Nbt::Float(_) => NBT_FLOAT,
            Nbt::Double(_) => NBT_DOUBLE,
            Nbt::ByteArray(_) => NBT_BYTE_ARRAY,
            Nbt::String(_) => NBT_STRING,
            Nbt::List(_) => NBT_LIST,
            Nbt::Compound(_) => NBT_COMPOUND,
            Nbt::IntArray(_) => NBT_INT_ARRAY,
            Nbt::LongArray(_) => NBT_LONG_ARRAY,
        }
    }

    #[inline]
    pub fn as_byte(&self) -> Option<i8> {
        match *self {
            Self::Byte(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_short(&self) -> Option<i16> {
        match *self {
            Self::Short(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Self::Int(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_long(&self) -> Option<i64> {
        match *self {
            Self::Long(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(string) => Some(string.as_str()),
            _ => None
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Nbt]> {
        match self {
            Self::List(list) => Some(&list[..]),
            _ => None
        }
    }

    #[inline]
    pub fn as_compound(&self) -> Option<&NbtCompound> {
        match self {
            Self::Compound(comp) => Some(comp),
            _ => None
        }
    }

    #[inline]
    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            Self::IntArray(arr) => Some(&arr[..]),
            _ => None
        }
    }

}

/// Basic methods to create and manage keys in a compound.
impl NbtCompound {

    pub fn new() -> Self {
        Self { inner: IndexMap::new() }
    }

    /// Insert a tag, replacing any previous tag with the same key while keeping its
    /// original position.
    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, tag: impl Into<Nbt>) {
        self.inner.insert(key.into(), tag.into());
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Nbt> {
        self.inner.get(key)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over keys in insertion order.
    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.keys().map(String::as_str)
    }

    #[inline]
    pub fn get_short(&self, key: &str) -> Option<i16> {
        self.get(key).and_then(Nbt::as_short)
    }

    #[inline]
    pub fn get_int(&self, key: &str) -> Option<i32> {
        self.get(key).and_then(Nbt::as_int)
    }

    #[inline]
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Nbt::as_string)
    }

    #[inline]
    pub fn get_list(&self, key: &str) -> Option<&[Nbt]> {
        self.get(key).and_then(Nbt::as_list)
    }

    #[inline]
    pub fn get_compound(&self, key: &str) -> Option<&NbtCompound> {
        self.get(key).and_then(Nbt::as_compound)
    }

    #[inline]
    pub fn get_int_array(&self, key: &str) -> Option<&[i32]> {
        self.get(key).and_then(Nbt::as_int_array)
    }

}


macro_rules! impl_from {
    ( $($ty:ty => $variant:ident),* $(,)? ) => {
        $(impl From<$ty> for Nbt {
            #[inline]
            fn from(value: $ty) -> Self {
                Self::$variant(value)
            }
        })*
    };
}

impl_from! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    Vec<Nbt> => List,
    NbtCompound => Compound,
}

impl From<&str> for Nbt {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}


/// Manual debug implement to shrink the potential huge arrays.
impl fmt::Debug for Nbt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(n) => f.debug_tuple("Byte").field(n).finish(),
            Self::Short(n) => f.debug_tuple("Short").field(n).finish(),
            Self::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Self::Long(n) => f.debug_tuple("Long").field(n).finish(),
            Self::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Self::Double(n) => f.debug_tuple("Double").field(n).finish(),
            Self::ByteArray(buf) => {
                f.debug_tuple("ByteArray")
                    .field(&format_args!("({}) {:X?}...", buf.len(), &buf[..buf.len().min(10)]))
                    .finish()
            }
            Self::String(string) => f.debug_tuple("String").field(string).finish(),
            Self::List(list) => f.debug_tuple("List").field(list).finish(),
            Self::Compound(compound) => fmt::Debug::fmt(compound, f),
            Self::IntArray(arr) => f.debug_tuple("IntArray").field(arr).finish(),
            Self::LongArray(arr) => f.debug_tuple("LongArray").field(arr).finish(),
        }
    }
}

impl fmt::Debug for NbtCompound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Compound").field(&self.inner).finish()
    }
}


/// Error type returned when reading or writing NBT.
#[derive(thiserror::Error, Debug)]
pub enum NbtError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("Illegal tag type.")]
    IllegalTagType,
    #[error("Illegal decoded length.")]
    IllegalLength,
    #[error("List elements must all have the same tag type.")]
    MixedList,
}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn compound_order() {

        let mut comp = NbtCompound::new();
        comp.insert("z", 1i32);
        comp.insert("a", 2i32);
        comp.insert("m", 3i32);
        comp.insert("z", 4i32);

        assert_eq!(comp.keys().collect::<Vec<_>>(), ["z", "a", "m"]);
        assert_eq!(comp.get_int("z"), Some(4));

    }

    #[test]
    fn write_bytes() {

        let mut comp = NbtCompound::new();
        comp.insert("a", 1i16);
        comp.insert("b", Nbt::IntArray(vec![7]));

        let mut buf = Vec::new();
        to_writer(&mut buf, &Nbt::Compound(comp.clone())).unwrap();
        assert_eq!(buf, [
            10, 0, 0,
            2, 0, 1, b'a', 0, 1,
            11, 0, 1, b'b', 0, 0, 0, 1, 0, 0, 0, 7,
            0,
        ]);

        let mut nameless = Vec::new();
        to_writer_nameless(&mut nameless, &Nbt::Compound(comp.clone())).unwrap();
        assert_eq!(&nameless[..], &[&buf[..1], &buf[3..]].concat()[..]);

        assert_eq!(from_reader(&buf[..]).unwrap(), Nbt::Compound(comp.clone()));
        assert_eq!(from_reader_nameless(&nameless[..]).unwrap(), Nbt::Compound(comp));

    }

    #[test]
    fn list_type() {

        let mut buf = Vec::new();
        to_writer(&mut buf, &Nbt::List(vec![])).unwrap();
        assert_eq!(buf, [9, 0, 0, 0, 0, 0, 0, 0]);

        let mixed = Nbt::List(vec![Nbt::Int(1), Nbt::Short(1)]);
        assert!(matches!(to_writer(Vec::new(), &mixed), Err(NbtError::MixedList)));

    }

    #[test]
    fn truncated_length() {

        // Huge lengths with no content must fail to read, not allocate.
        let list = [9, 0, 0, 10, 0x7F, 0xFF, 0xFF, 0xFF];
        assert!(matches!(from_reader(&list[..]), Err(NbtError::Io(_))));

        let bytes = [7, 0, 0, 0x7F, 0xFF, 0xFF, 0xFF, 1, 2];
        assert!(matches!(from_reader(&bytes[..]), Err(NbtError::Io(_))));

        let ints = [11, 0x7F, 0xFF, 0xFF, 0xFF, 0, 0, 0, 1];
        assert!(matches!(from_reader_nameless(&ints[..]), Err(NbtError::Io(_))));

    }

    #[test]
    fn illegal_root() {
        assert!(matches!(from_reader(&[0u8][..]), Err(NbtError::IllegalTagType)));
    }

}
