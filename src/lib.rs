//! # sudb - Seismic Trace Catalogs
//!
//! sudb indexes fixed-format seismic trace files into SQLite catalogs and
//! retrieves traces back by header selection, across any number of files at
//! once. This implementation prioritizes:
//!
//! - **One pass, no copies**: traces stream through a single reusable buffer
//! - **Plain SQLite catalogs**: inspectable and editable with any sqlite3 client
//! - **Format-proof retrieval**: tape byte order, IBM floats and Fortran
//!   record framing all normalize on read
//!
//! ## Quick Start
//!
//! ```ignore
//! use sudb::pipeline::{CatalogRetriever, RetrieveConfig};
//! use sudb::selection::{parse_path_spec, Selection};
//! use sudb::su::SuWriter;
//!
//! let config = RetrieveConfig {
//!     paths: parse_path_spec("line1.db,line2.db")?,
//!     selection: Selection::parse("cdp+(100:200)|fldr+")?,
//!     overrides: Vec::new(),
//!     byteswap: None,
//!     ibm_floats: None,
//! };
//!
//! let mut sink = SuWriter::new(std::io::stdout().lock());
//! let records = CatalogRetriever::new(config)?.run(&mut sink)?;
//! ```
//!
//! ## Architecture
//!
//! sudb uses a layered architecture:
//!
//! ```text
//! ┌───────────────────────────────────────┐
//! │    Binaries (sudbwrite / sudbread)    │
//! ├───────────────────────────────────────┤
//! │     Pipelines (build / retrieve)      │
//! ├──────────────┬────────────────────────┤
//! │ Trace stream │ Selection -> SQL       │
//! ├──────────────┼────────────────────────┤
//! │ Data files   │ Catalog store (SQLite) │
//! │ (normalize)  │ headers + meta tables  │
//! ├──────────────┴────────────────────────┤
//! │   Typed field access over raw bytes   │
//! └───────────────────────────────────────┘
//! ```
//!
//! ## Catalog Layout
//!
//! A catalog is one SQLite file sitting next to the data file it describes:
//!
//! ```text
//! line1.db               # SQLite catalog
//! ├── headers            # one row per record: indexnumber + indexed fields
//! └── meta               # key/value: ns, dt, datapath, segytape, ...
//! line1.su               # the traces, addressed by indexnumber
//! ```
//!
//! ## Module Overview
//!
//! - [`fields`]: typed access to fixed-offset binary fields
//! - [`headers`]: the standard 240-byte trace header layout
//! - [`table`]: packed in-memory record table with SQLite persistence
//! - [`store`]: SQLite catalogs, opened singly or attached as a union
//! - [`selection`]: the selection mini-language and its SQL compiler
//! - [`datafile`]: random access to data files with format normalization
//! - [`su`]: sequential trace stream reader and writer
//! - [`pipeline`]: the end-to-end build and retrieve flows
//! - [`params`]: key=value command-line parameters

pub mod datafile;
pub mod error;
pub mod fields;
pub mod headers;
pub mod params;
pub mod pipeline;
pub mod selection;
pub mod store;
pub mod su;
pub mod table;

pub use error::{Error, Result};
pub use pipeline::{BuildConfig, CatalogBuilder, CatalogRetriever, RetrieveConfig};
