//! Selection-driven replay of cataloged records.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::datafile::DataFileReader;
use crate::error::{Error, Result};
use crate::fields::{CopyPlan, FieldAccessor, FieldType};
use crate::headers::HeaderCatalog;
use crate::selection::{CatalogPath, Selection};
use crate::store::CatalogStore;
use crate::su::TraceSink;
use crate::table::RecordTable;

/// Synthetic query column tagging each row with the catalog it came from.
pub const FILE_ID_COLUMN: &str = "fileid";

pub struct RetrieveConfig {
    pub paths: Vec<CatalogPath>,
    pub selection: Selection,
    /// Columns whose cataloged values replace the header values on output.
    pub overrides: Vec<String>,
    /// Force the byte swap decision instead of deriving it from the format.
    pub byteswap: Option<bool>,
    /// Decode tape samples as IBM floats. On by default for tape data.
    pub ibm_floats: Option<bool>,
}

/// Replays cataloged records in selection order.
///
/// One SQL query runs per selection group. Rows come back already sorted, so
/// emission is a single pass: look up the row's file and record index, read
/// the record, apply any overrides, hand it to the sink.
pub struct CatalogRetriever {
    config: RetrieveConfig,
    headers: HeaderCatalog,
    columns: HeaderCatalog,
    store: CatalogStore,
    readers: Vec<DataFileReader>,
    table: RecordTable,
}

impl CatalogRetriever {
    pub fn new(config: RetrieveConfig) -> Result<Self> {
        let headers = HeaderCatalog::standard();
        let mut columns = headers.clone();
        // query-only columns; their offsets are table-local and never touch a trace
        columns.insert("indexnumber", FieldAccessor::new(FieldType::Int32, 0));
        columns.insert(FILE_ID_COLUMN, FieldAccessor::new(FieldType::Int32, 0));

        let db_paths: Vec<PathBuf> = config.paths.iter().map(|p| p.db_path.clone()).collect();
        let store = CatalogStore::open(&db_paths)?;

        let mut readers = Vec::with_capacity(config.paths.len());
        for path in &config.paths {
            let mut reader =
                DataFileReader::open(&path.db_path, path.data_path.as_deref(), &headers)?;
            if let Some(byteswap) = config.byteswap {
                reader.set_byteswap(byteswap);
            }
            if let Some(ibm_floats) = config.ibm_floats {
                reader.set_ibm_floats(ibm_floats);
            }
            readers.push(reader);
        }
        if let Some(first) = readers.first() {
            for other in readers.iter().skip(1) {
                if !first.compatible(other) {
                    return Err(Error::IncompatibleDatasets {
                        detail: format!(
                            "{} and {} describe different datasets (ns, dt, scalel or scalco)",
                            first.data_path().display(),
                            other.data_path().display()
                        ),
                    });
                }
            }
        }
        debug!(files = readers.len(), "retriever ready");

        Ok(Self {
            config,
            headers,
            columns,
            store,
            readers,
            table: RecordTable::new(),
        })
    }

    /// Execute every selection group in order, sending each matching record
    /// to `sink`. Returns the number of records emitted.
    pub fn run(&mut self, sink: &mut impl TraceSink) -> Result<u64> {
        let groups = self.config.selection.groups().to_vec();
        let overrides = self.config.overrides.clone();
        let mut emitted = 0u64;

        for (number, group) in groups.iter().enumerate() {
            let compiled = group.compile();

            // every referenced column must come back from the query
            let mut names: BTreeSet<&str> = group.column_names().collect();
            names.extend(overrides.iter().map(String::as_str));
            names.remove("indexnumber");
            names.remove(FILE_ID_COLUMN);
            let names: Vec<String> = names.into_iter().map(String::from).collect();

            let view =
                self.store
                    .union_view("headers", &names, compiled.where_sql(), FILE_ID_COLUMN);
            let sql = if self.store.file_count() > 1 {
                format!("select * from ({view}) order by {}", compiled.order_sql())
            } else {
                format!("{view} order by {}", compiled.order_sql())
            };

            self.table.clear();
            self.table.read_by_sql(&self.store, &sql, &self.columns)?;

            // the table layout changes per group, so the plan does too
            let mut plan = CopyPlan::new();
            for name in &overrides {
                let from = self.table.column(name)?.accessor();
                let to = self.headers.require(name)?;
                plan.append(from, to)?;
            }

            let index_column = self.table.column("indexnumber")?.accessor();
            let file_column = self.table.column(FILE_ID_COLUMN)?.accessor();

            for row in 0..self.table.row_count() {
                let fields = self.table.row(row);
                let file = file_column.read(fields).as_int() as usize;
                let index = index_column.read(fields).as_int();
                let index = u64::try_from(index).map_err(|_| {
                    Error::inconsistent(format!("negative record index {index} in catalog"))
                })?;

                let trace = self.readers[file].read(index)?;
                plan.apply(self.table.row(row), trace);
                sink.put_trace(trace)?;
                emitted += 1;
            }
            info!(
                group = number,
                records = self.table.row_count(),
                "group retrieved"
            );
        }

        sink.flush()?;
        Ok(emitted)
    }
}
