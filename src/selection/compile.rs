use crate::selection::{Group, SortOrder, Term};

/// The SQL fragments one group compiles to. Assembly into a full statement
/// (union view, outer wrapping) happens at the store layer; this type is a
/// pure function of the group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledGroup {
    where_sql: Option<String>,
    order_sql: String,
}

impl CompiledGroup {
    pub fn where_sql(&self) -> Option<&str> {
        self.where_sql.as_deref()
    }

    /// Always non-empty: sorted columns in clause order, then the
    /// `indexnumber` tiebreaker that keeps result order deterministic.
    pub fn order_sql(&self) -> &str {
        &self.order_sql
    }
}

pub(crate) fn compile_group(group: &Group) -> CompiledGroup {
    let mut clauses = Vec::new();
    for column in &group.columns {
        if column.terms.is_empty() {
            continue;
        }
        let wrap = column.terms.len() > 1;
        let terms: Vec<String> = column
            .terms
            .iter()
            .map(|t| term_sql(&column.name, t, wrap))
            .collect();
        clauses.push(format!("({})", terms.join(" OR ")));
    }
    let where_sql = (!clauses.is_empty()).then(|| clauses.join(" AND "));

    let mut order_sql = String::new();
    for column in &group.columns {
        if let Some(sort) = column.sort {
            order_sql.push_str(&column.name);
            order_sql.push_str(match sort {
                SortOrder::Ascending => " ASC, ",
                SortOrder::Descending => " DESC, ",
            });
        }
    }
    order_sql.push_str("indexnumber");

    CompiledGroup {
        where_sql,
        order_sql,
    }
}

fn term_sql(name: &str, term: &Term, wrap: bool) -> String {
    let sql = match term {
        Term::Value(v) => format!("{name} = {v}"),
        Term::Range {
            low,
            high,
            stride: None,
        } => format!("{name} BETWEEN {low} AND {high}"),
        Term::Range {
            low,
            high,
            stride: Some(k),
        } => format!("{name} BETWEEN {low} AND {high} AND ({name} - {low}) % {k} = 0"),
    };
    if wrap {
        format!("({sql})")
    } else {
        sql
    }
}
