//! Binary codec for the native call protocol
//!
//! Every value that crosses the boundary is serialized into a contiguous
//! byte buffer with a fixed layout:
//! - integers and floats: fixed width, big-endian
//! - bool: one byte, 0 or 1
//! - string: i32 byte-length prefix + UTF-8 bytes
//! - option: u8 discriminant (0 absent, 1 present) + inner value
//! - sequence: i32 count prefix + elements
//! - record: field encodings concatenated in declared order, no prefix
//! - tagged union: i32 variant index (1-based) + variant fields
//!
//! Reads are strict: a short read, a bad discriminant, or an unknown variant
//! index means the bindings and the native build disagree about the schema.
//! Decoding surfaces these as [`CodecError`]; the top-level lift path
//! escalates them to panics since no call-specific recovery is possible.

use thiserror::Error;

/// Decoding failures. All of these indicate schema or version skew rather
/// than conditions a caller can handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("buffer too short: needed {needed} more bytes, {remaining} remaining")]
    ShortRead { needed: usize, remaining: usize },

    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("negative length prefix: {0}")]
    NegativeLength(i32),

    #[error("invalid option discriminant: {0}")]
    InvalidDiscriminant(u8),

    #[error("unknown variant index {index} for {type_name}")]
    UnknownVariant { type_name: &'static str, index: i32 },

    #[error("{0} trailing bytes left after decoding")]
    TrailingBytes(usize),
}

/// Cursor over the bytes of a single serialized value.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

macro_rules! read_be {
    ($name:ident, $ty:ty) => {
        pub fn $name(&mut self) -> Result<$ty, CodecError> {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            let bytes: [u8; WIDTH] = self.take(WIDTH)?.try_into().expect("width checked");
            Ok(<$ty>::from_be_bytes(bytes))
        }
    };
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::ShortRead {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, CodecError> {
        Ok(self.take(1)?[0] as i8)
    }

    read_be!(read_u16, u16);
    read_be!(read_i16, i16);
    read_be!(read_u32, u32);
    read_be!(read_i32, i32);
    read_be!(read_u64, u64);
    read_be!(read_i64, i64);
    read_be!(read_f32, f32);
    read_be!(read_f64, f64);

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_string(&mut self) -> Result<String, CodecError> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(CodecError::NegativeLength(len));
        }
        let bytes = self.take(len as usize)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }

    /// Assert that the whole buffer was consumed. Trailing bytes mean the
    /// decoded schema does not match the one the bytes were produced with.
    pub fn finish(self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}

/// Append-only encoder, the inverse of [`Reader`].
#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

macro_rules! write_be {
    ($name:ident, $ty:ty) => {
        pub fn $name(&mut self, value: $ty) {
            self.buf.extend_from_slice(&value.to_be_bytes());
        }
    };
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buf.push(value as u8);
    }

    write_be!(write_u16, u16);
    write_be!(write_i16, i16);
    write_be!(write_u32, u32);
    write_be!(write_i32, i32);
    write_be!(write_u64, u64);
    write_be!(write_i64, i64);
    write_be!(write_f32, f32);
    write_be!(write_f64, f64);

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    /// Write an i32-length-prefixed UTF-8 string. A payload over `i32::MAX`
    /// bytes cannot be represented on the wire and is a programming fault.
    pub fn write_string(&mut self, value: &str) {
        let len = i32::try_from(value.len()).unwrap_or_else(|_| {
            panic!(
                "string of {} bytes exceeds the i32 length prefix",
                value.len()
            )
        });
        self.write_i32(len);
        self.buf.extend_from_slice(value.as_bytes());
    }
}

/// Serialize a value into wire form.
pub trait Lower {
    fn lower(&self, writer: &mut Writer);
}

/// Deserialize a value from wire form.
pub trait Lift: Sized {
    fn lift(reader: &mut Reader<'_>) -> Result<Self, CodecError>;
}

/// Encode a single value into a fresh byte vector.
pub fn lower_into_vec<T: Lower + ?Sized>(value: &T) -> Vec<u8> {
    let mut writer = Writer::new();
    value.lower(&mut writer);
    writer.into_vec()
}

/// Decode a complete buffer into a value, requiring exact consumption.
///
/// Any decode error, including leftover bytes, means the generated bindings
/// and the native build disagree about the schema; that integrity violation
/// is not recoverable, so this panics rather than returning an error.
pub fn lift_from_slice<T: Lift>(bytes: &[u8]) -> T {
    let mut reader = Reader::new(bytes);
    let value = match T::lift(&mut reader) {
        Ok(value) => value,
        Err(err) => panic!(
            "protocol fault decoding {}: {err}",
            std::any::type_name::<T>()
        ),
    };
    if let Err(err) = reader.finish() {
        panic!(
            "protocol fault decoding {}: {err}",
            std::any::type_name::<T>()
        );
    }
    value
}

macro_rules! scalar_codec {
    ($ty:ty, $write:ident, $read:ident) => {
        impl Lower for $ty {
            fn lower(&self, writer: &mut Writer) {
                writer.$write(*self);
            }
        }

        impl Lift for $ty {
            fn lift(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
                reader.$read()
            }
        }
    };
}

scalar_codec!(u8, write_u8, read_u8);
scalar_codec!(i8, write_i8, read_i8);
scalar_codec!(u16, write_u16, read_u16);
scalar_codec!(i16, write_i16, read_i16);
scalar_codec!(u32, write_u32, read_u32);
scalar_codec!(i32, write_i32, read_i32);
scalar_codec!(u64, write_u64, read_u64);
scalar_codec!(i64, write_i64, read_i64);
scalar_codec!(f32, write_f32, read_f32);
scalar_codec!(f64, write_f64, read_f64);
scalar_codec!(bool, write_bool, read_bool);

impl Lower for String {
    fn lower(&self, writer: &mut Writer) {
        writer.write_string(self);
    }
}

impl Lift for String {
    fn lift(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        reader.read_string()
    }
}

impl Lower for str {
    fn lower(&self, writer: &mut Writer) {
        writer.write_string(self);
    }
}

impl<T: Lower> Lower for Option<T> {
    fn lower(&self, writer: &mut Writer) {
        match self {
            None => writer.write_u8(0),
            Some(inner) => {
                writer.write_u8(1);
                inner.lower(writer);
            }
        }
    }
}

impl<T: Lift> Lift for Option<T> {
    fn lift(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        match reader.read_u8()? {
            0 => Ok(None),
            1 => Ok(Some(T::lift(reader)?)),
            other => Err(CodecError::InvalidDiscriminant(other)),
        }
    }
}

impl<T: Lower> Lower for Vec<T> {
    fn lower(&self, writer: &mut Writer) {
        let count = i32::try_from(self.len()).unwrap_or_else(|_| {
            panic!("sequence of {} elements exceeds the i32 count prefix", self.len())
        });
        writer.write_i32(count);
        for item in self {
            item.lower(writer);
        }
    }
}

impl<T: Lift> Lift for Vec<T> {
    fn lift(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let count = reader.read_i32()?;
        if count < 0 {
            return Err(CodecError::NegativeLength(count));
        }
        // Every element occupies at least one byte, so `remaining` bounds
        // the preallocation against a corrupt count.
        let mut items = Vec::with_capacity((count as usize).min(reader.remaining()));
        for _ in 0..count {
            items.push(T::lift(reader)?);
        }
        Ok(items)
    }
}
