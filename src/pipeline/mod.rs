//! # Catalog Pipelines
//!
//! The two end-to-end flows of the crate, pairing the trace stream layer
//! with the catalog store:
//!
//! ```text
//!   build                                retrieve
//!
//!   trace stream                         catalog(s)
//!        |                                   |
//!        v                                   v
//!   CatalogBuilder ---> headers + meta   union query, sorted rows
//!        |                 (SQLite)          |
//!        v                                   v
//!   pass-through                        DataFileReader (per file)
//!                                           |
//!                                           v
//!                                       trace sink
//! ```
//!
//! [`CatalogBuilder`] consumes a trace stream once, indexing the selected
//! header fields while the traces pass through unchanged. [`CatalogRetriever`]
//! compiles a selection into SQL over one or more catalogs and replays the
//! matching records from the data files in query order.

mod build;
mod retrieve;

pub use build::{BuildConfig, CatalogBuilder, DEFAULT_INDEX_FIELDS};
pub use retrieve::{CatalogRetriever, RetrieveConfig, FILE_ID_COLUMN};
