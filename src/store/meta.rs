use std::collections::BTreeMap;

use rusqlite::types::ValueRef;

use crate::error::{Error, Result};
use crate::store::CatalogStore;

/// The key/value table holding dataset-wide metadata.
///
/// Written once at the end of a build, read once when a catalog is opened
/// for retrieval. Values are stored as text; reads tolerate catalogs whose
/// values acquired numeric storage classes through hand edits, converting
/// them back to their text form.
#[derive(Debug, Clone)]
pub struct MetaTable {
    key_column: String,
    value_column: String,
}

impl Default for MetaTable {
    fn default() -> Self {
        Self::new("key", "value")
    }
}

impl MetaTable {
    pub fn new(key_column: &str, value_column: &str) -> Self {
        Self {
            key_column: key_column.to_string(),
            value_column: value_column.to_string(),
        }
    }

    /// Drop and recreate `name`, then insert every entry in one transaction.
    pub fn create(
        &self,
        store: &CatalogStore,
        name: &str,
        entries: &BTreeMap<String, String>,
    ) -> Result<()> {
        store.execute(&format!("drop table if exists {name}"))?;
        store.execute(&format!(
            "create table {name} ({k} text, {v} text, primary key ({k}))",
            k = self.key_column,
            v = self.value_column
        ))?;
        store.begin_transaction()?;
        let insert = format!("insert into {name} values (?1, ?2)");
        let mut stmt = store.prepare(&insert)?;
        for (key, value) in entries {
            stmt.execute(rusqlite::params![key, value])
                .map_err(|e| Error::query(&insert, e))?;
        }
        drop(stmt);
        store.commit()
    }

    pub fn read(&self, store: &CatalogStore, name: &str) -> Result<BTreeMap<String, String>> {
        let sql = format!(
            "select {k}, {v} from {name}",
            k = self.key_column,
            v = self.value_column
        );
        let mut stmt = store.prepare(&sql)?;
        let mut rows = stmt.query([]).map_err(|e| Error::query(&sql, e))?;
        let mut entries = BTreeMap::new();
        while let Some(row) = rows.next().map_err(|e| Error::query(&sql, e))? {
            let key = text_of(row.get_ref(0).map_err(|e| Error::query(&sql, e))?);
            let value = text_of(row.get_ref(1).map_err(|e| Error::query(&sql, e))?);
            entries.insert(key, value);
        }
        Ok(entries)
    }
}

fn text_of(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(v) => v.to_string(),
        ValueRef::Real(v) => v.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}
