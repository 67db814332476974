//! Catalog construction from a passing trace stream.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::PathBuf;

use chrono::Local;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fields::{CopyPlan, FieldAccessor, FieldType, Value};
use crate::headers::{DatasetScalars, HeaderCatalog};
use crate::store::{CatalogStore, MetaTable};
use crate::table::RecordTable;

/// Header fields indexed in every catalog. `BuildConfig::columns` extends
/// this set.
pub const DEFAULT_INDEX_FIELDS: &[&str] = &[
    "fldr", "tracf", "ep", "cdp", "cdpt", "trid", "sx", "sy", "gx", "gy", "offset",
];

pub struct BuildConfig {
    /// Catalog file to create. Must not already exist.
    pub db_path: PathBuf,
    /// Recorded in the catalog as the data file the stream is being
    /// written to. Retrieval resolves records against this path.
    pub data_path: String,
    /// Extra header fields to index beyond [`DEFAULT_INDEX_FIELDS`].
    pub columns: Vec<String>,
    pub segytape: bool,
    pub fortran: bool,
    pub comment: String,
    /// Stop indexing after this many records; zero means no limit.
    pub max: u64,
}

/// Indexes a trace stream into an in-memory header table, then writes the
/// table and the dataset description out as a new catalog.
///
/// The builder never touches the traces themselves. Callers are expected to
/// forward each record to wherever `data_path` points while feeding the same
/// bytes through [`process`](CatalogBuilder::process).
pub struct CatalogBuilder {
    config: BuildConfig,
    catalog: HeaderCatalog,
    table: RecordTable,
    plan: CopyPlan,
    index_column: FieldAccessor,
    scalars: Option<DatasetScalars>,
    seen: u64,
}

impl CatalogBuilder {
    pub fn new(config: BuildConfig, catalog: &HeaderCatalog) -> Result<Self> {
        if config.db_path.exists() {
            return Err(Error::io(
                format!("creating catalog {}", config.db_path.display()),
                io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "refusing to overwrite an existing catalog",
                ),
            ));
        }

        let mut table = RecordTable::new();
        let index_column = table.add_column(
            "indexnumber",
            FieldAccessor::new(FieldType::Int32, 0),
            "record ordinal in the data file",
        )?;
        table.set_primary_key("indexnumber");

        let mut names: BTreeSet<&str> = DEFAULT_INDEX_FIELDS.iter().copied().collect();
        names.extend(config.columns.iter().map(String::as_str));

        let mut plan = CopyPlan::new();
        for name in names {
            let from = catalog.require(name)?;
            let to = table.add_column(name, from, "trace header field")?;
            plan.append(from, to)?;
        }
        debug!(columns = table.column_count(), "catalog layout prepared");

        Ok(Self {
            config,
            catalog: catalog.clone(),
            table,
            plan,
            index_column,
            scalars: None,
            seen: 0,
        })
    }

    /// Index one record. Returns false once the configured limit is reached;
    /// the record is not indexed and the caller should stop feeding.
    pub fn process(&mut self, trace: &[u8]) -> Result<bool> {
        if self.config.max > 0 && self.seen >= self.config.max {
            return Ok(false);
        }

        let current = DatasetScalars::from_header(trace, &self.catalog)?;
        match self.scalars {
            None => self.scalars = Some(current),
            Some(scalars) if current != scalars => {
                return Err(Error::inconsistent(format!(
                    "record {} has ns/dt/scalel/scalco {}/{}/{}/{}, \
                     the stream established {}/{}/{}/{}",
                    self.seen,
                    current.ns,
                    current.dt,
                    current.scalel,
                    current.scalco,
                    scalars.ns,
                    scalars.dt,
                    scalars.scalel,
                    scalars.scalco
                )));
            }
            Some(_) => {}
        }

        let row = self.table.add_row();
        let dst = self.table.row_mut(row);
        self.index_column.write(dst, Value::Int(self.seen as i64));
        self.plan.apply(trace, dst);
        self.seen += 1;
        Ok(true)
    }

    /// Write the catalog file. Consumes the builder; an empty stream still
    /// produces a valid catalog describing zero records.
    pub fn finish(self) -> Result<u64> {
        let scalars = self.scalars.unwrap_or_default();
        let store = CatalogStore::create(&self.config.db_path)?;

        let mut meta = BTreeMap::new();
        let mut put = |key: &str, value: String| {
            meta.insert(key.to_string(), value);
        };
        put("ns", scalars.ns.to_string());
        put("dt", scalars.dt.to_string());
        put("scalel", scalars.scalel.to_string());
        put("scalco", scalars.scalco.to_string());
        put("numberoftraces", self.seen.to_string());
        put("datapath", self.config.data_path.clone());
        put("segytape", self.config.segytape.to_string());
        put("fortran", self.config.fortran.to_string());
        put("comment", self.config.comment.clone());
        put(
            "creationdate",
            Local::now().format("%-d/%-m/%Y %-H:%-M:%-S").to_string(),
        );
        put("creator", std::env::var("USER").unwrap_or_default());
        MetaTable::default().create(&store, "meta", &meta)?;
        self.table.create_table(&store, "headers")?;

        info!(
            catalog = %self.config.db_path.display(),
            records = self.seen,
            "catalog written"
        );
        Ok(self.seen)
    }
}
