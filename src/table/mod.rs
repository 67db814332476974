//! # Record Table
//!
//! An in-memory columnar staging area between raw trace headers and the
//! relational store. Columns are named accessors packed into a row layout;
//! rows are fixed-size slots in one flat arena.
//!
//! ## Packing
//!
//! Each new column's offset is the current row size aligned up to the
//! column's own width, so a 4-, 1-, 2-byte sequence packs to offsets
//! 0, 4, 6 and a row size of 8:
//!
//! ```text
//! | 4-byte @0 | 1-byte @4 | pad | 2-byte @6 |
//! ```
//!
//! The layout freezes once the first row exists; adding columns after that
//! is an error. Rows are append-only and zero-initialized.
//!
//! ## Persistence
//!
//! `create_table` writes the whole table through a prepared INSERT inside a
//! transaction that commits and reopens every 1,000 rows, so a crash midway
//! leaves complete batches rather than a half-written journal to roll back.
//! `read_by_sql` is the reverse path: it materializes an arbitrary SELECT,
//! adding any unseen result column with the shape the header catalog gives
//! for its name, and branching on SQLite's reported storage class per cell.


use hashbrown::HashMap;
use rusqlite::types::Value as SqlValue;
use rusqlite::types::ValueRef;

use crate::error::{Error, Result};
use crate::fields::{FieldAccessor, NumericKind, Value};
use crate::headers::HeaderCatalog;
use crate::store::CatalogStore;

const COMMIT_INTERVAL: usize = 1000;

#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    accessor: FieldAccessor,
    description: String,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accessor(&self) -> FieldAccessor {
        self.accessor
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Default)]
pub struct RecordTable {
    columns: Vec<Column>,
    by_name: HashMap<String, usize>,
    row_size: usize,
    row_count: usize,
    data: Vec<u8>,
    primary_key: Option<String>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column shaped like `template`, relocated to the next
    /// size-aligned offset. Returns the placed accessor.
    pub fn add_column(
        &mut self,
        name: &str,
        template: FieldAccessor,
        description: &str,
    ) -> Result<FieldAccessor> {
        if self.row_count > 0 {
            return Err(Error::LayoutFrozen {
                name: name.to_string(),
            });
        }
        if self.by_name.contains_key(name) {
            return Err(Error::DuplicateColumn {
                name: name.to_string(),
            });
        }
        let size = template.size();
        let offset = self.row_size.next_multiple_of(size);
        let accessor = template.relocated(offset);
        self.row_size = offset + size;
        self.by_name.insert(name.to_string(), self.columns.len());
        self.columns.push(Column {
            name: name.to_string(),
            accessor,
            description: description.to_string(),
        });
        Ok(accessor)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.by_name
            .get(name)
            .map(|&i| &self.columns[i])
            .ok_or_else(|| Error::UnknownField {
                name: name.to_string(),
            })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_size(&self) -> usize {
        self.row_size
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn set_primary_key(&mut self, name: &str) {
        self.primary_key = Some(name.to_string());
    }

    /// Append a zero-initialized row and return its index.
    pub fn add_row(&mut self) -> usize {
        self.data.resize(self.data.len() + self.row_size, 0);
        self.row_count += 1;
        self.row_count - 1
    }

    /// Panics if `row` is out of range.
    pub fn row(&self, row: usize) -> &[u8] {
        &self.data[row * self.row_size..(row + 1) * self.row_size]
    }

    /// Panics if `row` is out of range.
    pub fn row_mut(&mut self, row: usize) -> &mut [u8] {
        &mut self.data[row * self.row_size..(row + 1) * self.row_size]
    }

    pub fn get_int(&self, column: &str, row: usize) -> Result<i64> {
        self.column(column)?.accessor.get_int(self.row(row))
    }

    pub fn get_real(&self, column: &str, row: usize) -> Result<f64> {
        self.column(column)?.accessor.get_real(self.row(row))
    }

    pub fn set_int(&mut self, column: &str, row: usize, value: i64) -> Result<()> {
        let accessor = self.column(column)?.accessor;
        accessor.set_int(self.row_mut(row), value)
    }

    pub fn set_real(&mut self, column: &str, row: usize, value: f64) -> Result<()> {
        let accessor = self.column(column)?.accessor;
        accessor.set_real(self.row_mut(row), value)
    }

    /// Drop rows and columns. The declared primary key survives so a table
    /// can be refilled group by group.
    pub fn clear(&mut self) {
        self.columns.clear();
        self.by_name.clear();
        self.row_size = 0;
        self.row_count = 0;
        self.data.clear();
    }

    /// Persist the table as `name`, replacing any previous version.
    pub fn create_table(&self, store: &CatalogStore, name: &str) -> Result<()> {
        store.execute(&format!("drop table if exists {name}"))?;

        let mut defs: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let sql_type = match c.accessor.kind() {
                    NumericKind::Integer => "integer",
                    NumericKind::Real => "real",
                };
                format!("{} {}", c.name, sql_type)
            })
            .collect();
        if let Some(pk) = &self.primary_key {
            defs.push(format!("primary key ({pk})"));
        }
        store.execute(&format!("create table {} ({})", name, defs.join(", ")))?;

        let placeholders = vec!["?"; self.columns.len()].join(", ");
        let insert = format!("insert into {name} values ({placeholders})");
        store.begin_transaction()?;
        let mut stmt = store.prepare(&insert)?;
        for row in 0..self.row_count {
            let buf = self.row(row);
            let values: Vec<SqlValue> = self
                .columns
                .iter()
                .map(|c| match c.accessor.read(buf) {
                    Value::Int(v) => SqlValue::Integer(v),
                    Value::Real(v) => SqlValue::Real(v),
                })
                .collect();
            stmt.execute(rusqlite::params_from_iter(values))
                .map_err(|e| Error::query(&insert, e))?;
            if (row + 1) % COMMIT_INTERVAL == 0 {
                store.commit()?;
                store.begin_transaction()?;
            }
        }
        drop(stmt);
        store.commit()
    }

    /// Fill the table from an arbitrary SELECT. Result columns resolve
    /// against the table first and then against `catalog` for their shape;
    /// a name known to neither is `UnknownField`. Cells are read by their
    /// SQLite storage class and converted toward the column's kind; NULLs
    /// leave the zero-initialized value in place.
    pub fn read_by_sql(
        &mut self,
        store: &CatalogStore,
        sql: &str,
        catalog: &HeaderCatalog,
    ) -> Result<()> {
        let mut stmt = store.prepare(sql)?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        let mut fill = Vec::with_capacity(names.len());
        for name in &names {
            let accessor = match self.by_name.get(name.as_str()) {
                Some(&i) => self.columns[i].accessor,
                None => {
                    let template = catalog.require(name)?;
                    self.add_column(name, template, "")?
                }
            };
            fill.push(accessor);
        }

        let mut rows = stmt.query([]).map_err(|e| Error::query(sql, e))?;
        while let Some(row) = rows.next().map_err(|e| Error::query(sql, e))? {
            let slot = self.add_row();
            let buf = self.row_mut(slot);
            for (i, accessor) in fill.iter().enumerate() {
                match row.get_ref(i).map_err(|e| Error::query(sql, e))? {
                    ValueRef::Integer(v) => accessor.write(buf, Value::Int(v)),
                    ValueRef::Real(v) => accessor.write(buf, Value::Real(v)),
                    _ => {}
                }
            }
        }
        Ok(())
    }
}
