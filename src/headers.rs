//! # Trace Header Catalog
//!
//! The external schema of a trace: 80 named fields at fixed offsets inside a
//! 240-byte header, followed by `ns` 4-byte float samples. The layout is the
//! Seismic-Unix one, shared by SEG-Y tape data up to byte order and float
//! encoding.
//!
//! ## Header Layout
//!
//! ```text
//! Offset  Type  Fields
//! 0       i32   tracl tracr fldr tracf ep cdp cdpt
//! 28      i16   trid nvs nhs duse
//! 36      i32   offset gelev selev sdepth gdel sdel swdep gwdep
//! 68      i16   scalel scalco
//! 72      i32   sx sy gx gy
//! 88      i16   counit wevel swevel sut gut sstat gstat tstat laga lagb
//!               delrt muts mute
//! 114     u16   ns dt
//! 118     i16   gain igc igi corr sfs sfe slen styp stas stae tatyp afilf
//!               afils nofilf nofils lcf hcf lcs hcs year day hour minute
//!               sec timbas trwf grnors grnofr grnlof gaps otrav
//! 180     f32   d1 f1 d2 f2 ungpow unscale
//! 204     i32   ntr
//! 208     i16   mark shortpad
//! 212     ---   unassigned through 239
//! ```
//!
//! [`HeaderCatalog`] is an explicit value: built once at startup with
//! [`HeaderCatalog::standard`] and passed by reference into every component
//! that resolves field names. There is no ambient global registry. The
//! retrieve pipeline extends a working copy with its synthetic `indexnumber`
//! and `fileid` accessors.

use hashbrown::HashMap;

use crate::error::{Error, Result};
use crate::fields::{FieldAccessor, FieldType};

/// Byte length of a trace header.
pub const HEADER_LEN: usize = 240;

/// Byte length of one payload sample.
pub const SAMPLE_LEN: usize = 4;

/// Byte length of the SEG-Y reel prologue (3200-byte EBCDIC block plus the
/// 400-byte binary header) preceding the first trace on tape-format files.
pub const TAPE_PROLOGUE_LEN: usize = 3600;

const I32: FieldType = FieldType::Int32;
const I16: FieldType = FieldType::Int16;
const U16: FieldType = FieldType::Uint16;
const F32: FieldType = FieldType::Float32;

#[rustfmt::skip]
const STANDARD_FIELDS: &[(&str, FieldType, usize)] = &[
    ("tracl", I32, 0), ("tracr", I32, 4), ("fldr", I32, 8), ("tracf", I32, 12),
    ("ep", I32, 16), ("cdp", I32, 20), ("cdpt", I32, 24),
    ("trid", I16, 28), ("nvs", I16, 30), ("nhs", I16, 32), ("duse", I16, 34),
    ("offset", I32, 36), ("gelev", I32, 40), ("selev", I32, 44),
    ("sdepth", I32, 48), ("gdel", I32, 52), ("sdel", I32, 56),
    ("swdep", I32, 60), ("gwdep", I32, 64),
    ("scalel", I16, 68), ("scalco", I16, 70),
    ("sx", I32, 72), ("sy", I32, 76), ("gx", I32, 80), ("gy", I32, 84),
    ("counit", I16, 88), ("wevel", I16, 90), ("swevel", I16, 92),
    ("sut", I16, 94), ("gut", I16, 96), ("sstat", I16, 98), ("gstat", I16, 100),
    ("tstat", I16, 102), ("laga", I16, 104), ("lagb", I16, 106),
    ("delrt", I16, 108), ("muts", I16, 110), ("mute", I16, 112),
    ("ns", U16, 114), ("dt", U16, 116),
    ("gain", I16, 118), ("igc", I16, 120), ("igi", I16, 122), ("corr", I16, 124),
    ("sfs", I16, 126), ("sfe", I16, 128), ("slen", I16, 130), ("styp", I16, 132),
    ("stas", I16, 134), ("stae", I16, 136), ("tatyp", I16, 138),
    ("afilf", I16, 140), ("afils", I16, 142), ("nofilf", I16, 144),
    ("nofils", I16, 146), ("lcf", I16, 148), ("hcf", I16, 150),
    ("lcs", I16, 152), ("hcs", I16, 154), ("year", I16, 156), ("day", I16, 158),
    ("hour", I16, 160), ("minute", I16, 162), ("sec", I16, 164),
    ("timbas", I16, 166), ("trwf", I16, 168), ("grnors", I16, 170),
    ("grnofr", I16, 172), ("grnlof", I16, 174), ("gaps", I16, 176),
    ("otrav", I16, 178),
    ("d1", F32, 180), ("f1", F32, 184), ("d2", F32, 188), ("f2", F32, 192),
    ("ungpow", F32, 196), ("unscale", F32, 200),
    ("ntr", I32, 204),
    ("mark", I16, 208), ("shortpad", I16, 210),
];

/// Name to accessor mapping for one record layout.
#[derive(Debug, Clone, Default)]
pub struct HeaderCatalog {
    fields: HashMap<String, FieldAccessor>,
    names: Vec<String>,
}

impl HeaderCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard trace header table.
    pub fn standard() -> Self {
        let mut catalog = Self {
            fields: HashMap::with_capacity(STANDARD_FIELDS.len()),
            names: Vec::with_capacity(STANDARD_FIELDS.len()),
        };
        for &(name, ty, offset) in STANDARD_FIELDS {
            catalog.insert(name, FieldAccessor::new(ty, offset));
        }
        catalog
    }

    /// Add or replace a field. Insertion order is preserved for iteration.
    pub fn insert(&mut self, name: &str, accessor: FieldAccessor) {
        if self.fields.insert(name.to_string(), accessor).is_none() {
            self.names.push(name.to_string());
        }
    }

    pub fn get(&self, name: &str) -> Option<FieldAccessor> {
        self.fields.get(name).copied()
    }

    pub fn require(&self, name: &str) -> Result<FieldAccessor> {
        self.get(name).ok_or_else(|| Error::UnknownField {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Fields in insertion order.
    pub fn accessors(&self) -> impl Iterator<Item = (&str, FieldAccessor)> {
        self.names
            .iter()
            .map(|n| (n.as_str(), self.fields[n.as_str()]))
    }
}

/// The four header scalars that must be constant across one dataset and
/// equal across datasets retrieved together: sample count, sample interval,
/// elevation scale and coordinate scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatasetScalars {
    pub ns: i64,
    pub dt: i64,
    pub scalel: i64,
    pub scalco: i64,
}

impl DatasetScalars {
    /// Capture the scalars from a trace header.
    pub fn from_header(header: &[u8], catalog: &HeaderCatalog) -> Result<Self> {
        Ok(Self {
            ns: catalog.require("ns")?.get_int(header)?,
            dt: catalog.require("dt")?.get_int(header)?,
            scalel: catalog.require("scalel")?.get_int(header)?,
            scalco: catalog.require("scalco")?.get_int(header)?,
        })
    }
}
