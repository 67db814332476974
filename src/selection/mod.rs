//! # Selection Mini-Language
//!
//! The query dialect retrieval is driven by. One string describes which
//! records to pull from the catalog and in what order:
//!
//! ```text
//! spec     := group ('/' group)*
//! group    := column ('|' column)*
//! column   := name [sortmark] ['(' valueset ')']
//! sortmark := '+' | '-'
//! valueset := term (',' term)*
//! term     := literal | low ':' high [':' stride]
//! ```
//!
//! ## Examples
//!
//! | Spec                          | Meaning                                   |
//! |-------------------------------|-------------------------------------------|
//! | `cdp(400:600)`                | cdp in [400, 600], catalog order          |
//! | `cdp+(1:10)`                  | cdp in [1, 10], ascending by cdp          |
//! | `fldr(1000,7000:8000:20)`     | fldr = 1000 or in [7000, 8000] step 20    |
//! | `sx-\|sy+`                    | everything, by sx desc then sy asc        |
//! | `ep(1:3)/ep(7:9)`             | two runs: ep 1..3 first, then ep 7..9     |
//!
//! Groups are independent alternatives: each is compiled, queried and
//! emitted on its own, in spec order. Within a group, filtering columns
//! combine with AND and the terms of one column with OR. A column without a
//! value set only sorts; a column with an empty `()` neither filters nor
//! sorts unless marked. The empty spec is the unconstrained group: every
//! record, catalog order.
//!
//! Compilation to SQL is a pure text transformation, see [`CompiledGroup`].
//! Literals are 64-bit signed integers; a range with a stride `k` matches
//! values `low + n*k` inside `[low, high]`. Strides must be positive. Each
//! split level (groups, columns, terms) accepts at most [`MAX_ELEMENTS`]
//! elements.

mod compile;
mod parse;


pub use compile::CompiledGroup;
pub use parse::{parse_path_spec, CatalogPath, MAX_ELEMENTS};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One disjunct of a column's value set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Value(i64),
    Range {
        low: i64,
        high: i64,
        stride: Option<i64>,
    },
}

/// One `name[sortmark][(valueset)]` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnClause {
    pub(crate) name: String,
    pub(crate) sort: Option<SortOrder>,
    pub(crate) terms: Vec<Term>,
}

impl ColumnClause {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sort(&self) -> Option<SortOrder> {
        self.sort
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Whether this clause constrains rows (as opposed to only sorting).
    pub fn is_filter(&self) -> bool {
        !self.terms.is_empty()
    }
}

/// One alternative within a selection. An empty column list is the
/// unconstrained group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Group {
    pub(crate) columns: Vec<ColumnClause>,
}

impl Group {
    pub fn columns(&self) -> &[ColumnClause] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name())
    }

    pub fn compile(&self) -> CompiledGroup {
        compile::compile_group(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub(crate) groups: Vec<Group>,
}

impl Selection {
    pub fn parse(text: &str) -> Result<Selection> {
        parse::parse_selection(text)
    }

    /// The selection that matches every record in catalog order.
    pub fn unconstrained() -> Selection {
        Selection {
            groups: vec![Group::default()],
        }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::unconstrained()
    }
}
