//! # Error Taxonomy
//!
//! Every failure in the crate maps to one variant of [`Error`]. All of them are
//! fatal to the current run: they propagate with `?` to the binary boundary,
//! where they are printed and turn into a non-zero exit. Nothing is retried
//! and nothing is swallowed; diagnostics emitted through `tracing` are a side
//! channel, never a substitute for propagation.
//!
//! ## Variant Map
//!
//! | Variant               | Raised by                                        |
//! |-----------------------|--------------------------------------------------|
//! | `TypeMismatch`        | strict accessor get/set across numeric kinds     |
//! | `SizeMismatch`        | copy plan over differently sized fields          |
//! | `UnknownField`        | name lookups against the header catalog/table    |
//! | `DuplicateColumn`     | adding a column name twice to a record table     |
//! | `LayoutFrozen`        | adding a column after rows exist                 |
//! | `MalformedSelection`  | selection or path-spec parsing                   |
//! | `IncompatibleDatasets`| mixing catalogs with differing trace geometry    |
//! | `InconsistentDataset` | mid-stream geometry drift, unusable catalog meta |
//! | `QueryFailed`         | any SQLite prepare/step/execute failure          |
//! | `Io`                  | file open/seek/read/write, with path context     |

use std::io;

use thiserror::Error;

use crate::fields::NumericKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A strict typed accessor was used against a field of the other numeric
    /// kind. Conversion is available through the non-strict `write` path; the
    /// strict getters refuse to convert silently.
    #[error("type mismatch: {requested} access on a {actual} field")]
    TypeMismatch {
        requested: NumericKind,
        actual: NumericKind,
    },

    /// A copy plan pair was rejected because the source and destination
    /// fields have different byte sizes.
    #[error("size mismatch: cannot copy a {from}-byte field into a {to}-byte field")]
    SizeMismatch { from: usize, to: usize },

    /// A field name was not found in the header catalog or record table.
    #[error("unknown field '{name}'")]
    UnknownField { name: String },

    /// A column with this name already exists in the record table.
    #[error("duplicate column '{name}'")]
    DuplicateColumn { name: String },

    /// The record table layout cannot change once a row has been added.
    #[error("cannot add column '{name}': table layout is frozen once rows exist")]
    LayoutFrozen { name: String },

    /// The selection text or the catalog path specification did not parse.
    #[error("malformed selection: {detail}")]
    MalformedSelection { detail: String },

    /// Catalogs named in one retrieval describe raw files with differing
    /// trace geometry (sample count, sample interval, or scale factors).
    #[error("incompatible datasets: {detail}")]
    IncompatibleDatasets { detail: String },

    /// The dataset contradicts itself: a trace changed geometry mid-stream
    /// during a build, or a catalog's meta table holds unusable values.
    #[error("inconsistent dataset: {detail}")]
    InconsistentDataset { detail: String },

    /// A relational-store operation failed. The statement text is kept
    /// alongside the backend error, which preserves the SQLite result code.
    #[error("query failed: {source} (sql: {sql})")]
    QueryFailed {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A raw-file or stream operation failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    pub fn query(sql: impl Into<String>, source: rusqlite::Error) -> Self {
        Error::QueryFailed {
            sql: sql.into(),
            source,
        }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Error::MalformedSelection {
            detail: detail.into(),
        }
    }

    pub fn inconsistent(detail: impl Into<String>) -> Self {
        Error::InconsistentDataset {
            detail: detail.into(),
        }
    }
}
