//! # Relational Store
//!
//! [`CatalogStore`] puts one or more SQLite catalog files behind a single
//! connection. One file opens directly; several open as an in-memory
//! connection with each file attached under a positional alias, so one
//! statement can span all of them:
//!
//! ```text
//! CatalogStore::open(&[a.db, b.db, c.db])
//!
//!   :memory:
//!   ├── db0  ->  a.db
//!   ├── db1  ->  b.db
//!   └── db2  ->  c.db
//! ```
//!
//! [`CatalogStore::union_view`] assembles the SELECT that stitches the files
//! back into one logical table, tagging every branch with its file ordinal so
//! each row stays traceable to its source catalog.
//!
//! Transactions exist for write batching only; there is no concurrent access
//! in this crate's model. Every SQLite failure surfaces as
//! [`Error::QueryFailed`] carrying the statement text.

mod meta;

#[cfg(test)]
mod tests;

pub use meta::MetaTable;

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::error::{Error, Result};

#[derive(Debug)]
pub struct CatalogStore {
    conn: Connection,
    files: Vec<PathBuf>,
}

impl CatalogStore {
    /// Open a single catalog file, creating it if absent. The build pipeline
    /// uses this; retrieval goes through [`CatalogStore::open`], which
    /// requires the files to exist.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            Error::io(
                format!("can't create catalog '{}'", path.display()),
                std::io::Error::other(e),
            )
        })?;
        Ok(Self {
            conn,
            files: vec![path.to_path_buf()],
        })
    }

    /// Open one or more existing catalog files behind one connection.
    pub fn open(paths: &[PathBuf]) -> Result<Self> {
        if paths.is_empty() {
            return Err(Error::malformed("empty catalog path list"));
        }
        for path in paths {
            // SQLite would silently create missing files on open/attach.
            fs::metadata(path).map_err(|e| {
                Error::io(format!("catalog file '{}'", path.display()), e)
            })?;
        }
        let conn = if paths.len() == 1 {
            Connection::open(&paths[0]).map_err(|e| {
                Error::io(
                    format!("can't open catalog '{}'", paths[0].display()),
                    std::io::Error::other(e),
                )
            })?
        } else {
            let conn = Connection::open_in_memory().map_err(|e| {
                Error::io("can't open in-memory database", std::io::Error::other(e))
            })?;
            for (i, path) in paths.iter().enumerate() {
                let sql = format!("attach database ?1 as db{i}");
                conn.execute(&sql, [path.to_string_lossy()])
                    .map_err(|e| Error::query(&sql, e))?;
            }
            conn
        };
        Ok(Self {
            conn,
            files: paths.to_vec(),
        })
    }

    pub fn open_single(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(&[path.as_ref().to_path_buf()])
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn begin_transaction(&self) -> Result<()> {
        self.execute("begin transaction")
    }

    pub fn commit(&self) -> Result<()> {
        self.execute("commit")
    }

    pub fn execute(&self, sql: &str) -> Result<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| Error::query(sql, e))
    }

    pub fn prepare(&self, sql: &str) -> Result<rusqlite::Statement<'_>> {
        self.conn.prepare(sql).map_err(|e| Error::query(sql, e))
    }

    /// The SELECT spanning every attached file: each branch reads `columns`
    /// plus `indexnumber` from one file's `table`, tags rows with the file
    /// ordinal as `file_id_column`, and optionally filters; branches join
    /// with UNION. Table names are qualified only when more than one file is
    /// attached.
    pub fn union_view(
        &self,
        table: &str,
        columns: &[String],
        where_clause: Option<&str>,
        file_id_column: &str,
    ) -> String {
        let mut column_list = String::new();
        for column in columns {
            column_list.push_str(column);
            column_list.push_str(", ");
        }
        let filter = match where_clause {
            Some(w) => format!(" where {w}"),
            None => String::new(),
        };
        let mut branches = Vec::with_capacity(self.files.len());
        for i in 0..self.files.len() {
            let qualifier = if self.files.len() > 1 {
                format!("db{i}.")
            } else {
                String::new()
            };
            branches.push(format!(
                "select {column_list}indexnumber, {i} as {file_id_column} \
                 from {qualifier}{table}{filter}"
            ));
        }
        branches.join(" union ")
    }
}
