use std::fmt;

use crate::error::{Error, Result};

/// The two numeric families a field can belong to. Strict accessors never
/// cross this boundary; converting accessors do so explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Integer,
    Real,
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericKind::Integer => f.write_str("integer"),
            NumericKind::Real => f.write_str("real"),
        }
    }
}

/// The sealed set of field representations found in trace headers and table
/// rows. Each carries its byte width and numeric kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Int8,
    Int16,
    Uint16,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl FieldType {
    pub const fn size(self) -> usize {
        match self {
            FieldType::Int8 => 1,
            FieldType::Int16 | FieldType::Uint16 => 2,
            FieldType::Int32 | FieldType::Float32 => 4,
            FieldType::Int64 | FieldType::Float64 => 8,
        }
    }

    pub const fn kind(self) -> NumericKind {
        match self {
            FieldType::Float32 | FieldType::Float64 => NumericKind::Real,
            _ => NumericKind::Integer,
        }
    }
}

/// A dynamically typed field value. Integers widen to `i64`, reals to `f64`;
/// the accessor narrows again on write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Real(f64),
}

impl Value {
    pub fn kind(self) -> NumericKind {
        match self {
            Value::Int(_) => NumericKind::Integer,
            Value::Real(_) => NumericKind::Real,
        }
    }

    /// Integer view. Reals truncate toward zero and saturate at the `i64`
    /// bounds (`as` cast semantics).
    pub fn as_int(self) -> i64 {
        match self {
            Value::Int(v) => v,
            Value::Real(v) => v as i64,
        }
    }

    /// Real view. Integers round to the nearest representable `f64`.
    pub fn as_real(self) -> f64 {
        match self {
            Value::Int(v) => v as f64,
            Value::Real(v) => v,
        }
    }
}

/// A typed window onto a fixed byte offset of a record buffer.
///
/// Reads and writes use native byte order: raw files are normalized to the
/// machine's order before any accessor touches them, and table rows are
/// memory this process wrote itself. The caller guarantees the buffer covers
/// `offset + size` bytes; shorter buffers are a programming error and panic
/// on the slice access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAccessor {
    field_type: FieldType,
    offset: usize,
}

impl FieldAccessor {
    pub const fn new(field_type: FieldType, offset: usize) -> Self {
        Self { field_type, offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.field_type.size()
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn kind(&self) -> NumericKind {
        self.field_type.kind()
    }

    /// The same field shape at a different offset. Used when a header field
    /// is re-packed into a table row layout.
    pub fn relocated(&self, offset: usize) -> FieldAccessor {
        FieldAccessor {
            field_type: self.field_type,
            offset,
        }
    }

    /// Read the field in its native kind.
    pub fn read(&self, buf: &[u8]) -> Value {
        let o = self.offset;
        match self.field_type {
            FieldType::Int8 => Value::Int(buf[o] as i8 as i64),
            FieldType::Int16 => Value::Int(i16::from_ne_bytes(array2(buf, o)) as i64),
            FieldType::Uint16 => Value::Int(u16::from_ne_bytes(array2(buf, o)) as i64),
            FieldType::Int32 => Value::Int(i32::from_ne_bytes(array4(buf, o)) as i64),
            FieldType::Int64 => Value::Int(i64::from_ne_bytes(array8(buf, o))),
            FieldType::Float32 => Value::Real(f32::from_ne_bytes(array4(buf, o)) as f64),
            FieldType::Float64 => Value::Real(f64::from_ne_bytes(array8(buf, o))),
        }
    }

    /// Write a value, converting toward the field's representation. Integer
    /// targets truncate reals toward zero and wrap wider integers like an
    /// `as` cast; real targets round integers to the nearest representable.
    pub fn write(&self, buf: &mut [u8], value: Value) {
        let o = self.offset;
        match self.field_type {
            FieldType::Int8 => buf[o] = value.as_int() as i8 as u8,
            FieldType::Int16 => put(buf, o, (value.as_int() as i16).to_ne_bytes()),
            FieldType::Uint16 => put(buf, o, (value.as_int() as u16).to_ne_bytes()),
            FieldType::Int32 => put(buf, o, (value.as_int() as i32).to_ne_bytes()),
            FieldType::Int64 => put(buf, o, value.as_int().to_ne_bytes()),
            FieldType::Float32 => put(buf, o, (value.as_real() as f32).to_ne_bytes()),
            FieldType::Float64 => put(buf, o, value.as_real().to_ne_bytes()),
        }
    }

    pub fn get_int(&self, buf: &[u8]) -> Result<i64> {
        match self.read(buf) {
            Value::Int(v) => Ok(v),
            Value::Real(_) => Err(self.mismatch(NumericKind::Integer)),
        }
    }

    pub fn get_real(&self, buf: &[u8]) -> Result<f64> {
        match self.read(buf) {
            Value::Real(v) => Ok(v),
            Value::Int(_) => Err(self.mismatch(NumericKind::Real)),
        }
    }

    pub fn set_int(&self, buf: &mut [u8], value: i64) -> Result<()> {
        if self.kind() != NumericKind::Integer {
            return Err(self.mismatch(NumericKind::Integer));
        }
        self.write(buf, Value::Int(value));
        Ok(())
    }

    pub fn set_real(&self, buf: &mut [u8], value: f64) -> Result<()> {
        if self.kind() != NumericKind::Real {
            return Err(self.mismatch(NumericKind::Real));
        }
        self.write(buf, Value::Real(value));
        Ok(())
    }

    fn mismatch(&self, requested: NumericKind) -> Error {
        Error::TypeMismatch {
            requested,
            actual: self.kind(),
        }
    }
}

fn array2(buf: &[u8], offset: usize) -> [u8; 2] {
    [buf[offset], buf[offset + 1]]
}

fn array4(buf: &[u8], offset: usize) -> [u8; 4] {
    [buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]]
}

fn array8(buf: &[u8], offset: usize) -> [u8; 8] {
    let mut a = [0u8; 8];
    a.copy_from_slice(&buf[offset..offset + 8]);
    a
}

fn put<const N: usize>(buf: &mut [u8], offset: usize, bytes: [u8; N]) {
    buf[offset..offset + N].copy_from_slice(&bytes);
}
