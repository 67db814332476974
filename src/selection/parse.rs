use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::selection::{ColumnClause, Group, Selection, SortOrder, Term};

/// Cap applied at every split level: groups per spec, columns per group,
/// terms per value set, paths per path spec.
pub const MAX_ELEMENTS: usize = 999;

pub(crate) fn parse_selection(text: &str) -> Result<Selection> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Selection::unconstrained());
    }
    let mut groups = Vec::new();
    for group_text in split_limited(text, '/', "groups")? {
        let group_text = group_text.trim();
        if group_text.is_empty() {
            return Err(Error::malformed("empty group"));
        }
        let mut columns = Vec::new();
        for column_text in split_limited(group_text, '|', "columns")? {
            let column_text = column_text.trim();
            if column_text.is_empty() {
                return Err(Error::malformed("empty column specification"));
            }
            columns.push(parse_column(column_text)?);
        }
        groups.push(Group { columns });
    }
    Ok(Selection { groups })
}

fn parse_column(text: &str) -> Result<ColumnClause> {
    let (head, value_set) = split_parenthesized(text)?;
    let (name, sort) = match head.as_bytes().last() {
        Some(b'+') => (&head[..head.len() - 1], Some(SortOrder::Ascending)),
        Some(b'-') => (&head[..head.len() - 1], Some(SortOrder::Descending)),
        _ => (head, None),
    };
    validate_name(name)?;

    let terms = match value_set {
        None => Vec::new(),
        Some(inner) if inner.trim().is_empty() => Vec::new(),
        Some(inner) => {
            let parts = split_limited(inner, ',', "terms")?;
            parts
                .into_iter()
                .map(|p| parse_term(p.trim()))
                .collect::<Result<Vec<_>>>()?
        }
    };

    Ok(ColumnClause {
        name: name.to_string(),
        sort,
        terms,
    })
}

fn parse_term(text: &str) -> Result<Term> {
    let parts: Vec<&str> = text.split(':').collect();
    match parts.as_slice() {
        [value] => Ok(Term::Value(parse_literal(value)?)),
        [low, high] => Ok(Term::Range {
            low: parse_literal(low)?,
            high: parse_literal(high)?,
            stride: None,
        }),
        [low, high, stride] => {
            let stride = parse_literal(stride)?;
            if stride <= 0 {
                return Err(Error::malformed(format!(
                    "stride must be positive in '{text}'"
                )));
            }
            Ok(Term::Range {
                low: parse_literal(low)?,
                high: parse_literal(high)?,
                stride: Some(stride),
            })
        }
        _ => Err(Error::malformed(format!("too many ':' in term '{text}'"))),
    }
}

fn parse_literal(text: &str) -> Result<i64> {
    let text = text.trim();
    text.parse::<i64>()
        .map_err(|_| Error::malformed(format!("invalid integer literal '{text}'")))
}

fn validate_name(name: &str) -> Result<()> {
    let mut bytes = name.bytes();
    let valid = match bytes.next() {
        Some(b) => {
            (b.is_ascii_alphabetic() || b == b'_')
                && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::malformed(format!("invalid column name '{name}'")))
    }
}

/// Split `text` into `head` and the optional content of one trailing
/// parenthesized section. Nested or unbalanced parentheses and text after
/// the closing parenthesis are errors.
fn split_parenthesized(text: &str) -> Result<(&str, Option<&str>)> {
    match text.find('(') {
        None => {
            if text.contains(')') {
                return Err(Error::malformed(format!("unmatched ')' in '{text}'")));
            }
            Ok((text, None))
        }
        Some(open) => {
            if !text.ends_with(')') {
                return Err(Error::malformed(format!(
                    "expected '{text}' to end with ')'"
                )));
            }
            let inner = &text[open + 1..text.len() - 1];
            if inner.contains('(') || inner.contains(')') {
                return Err(Error::malformed(format!(
                    "nested parentheses in '{text}'"
                )));
            }
            Ok((&text[..open], Some(inner)))
        }
    }
}

fn split_limited<'a>(text: &'a str, separator: char, what: &str) -> Result<Vec<&'a str>> {
    let parts: Vec<&str> = text.split(separator).collect();
    if parts.len() > MAX_ELEMENTS {
        return Err(Error::malformed(format!(
            "too many {what} ({}, limit {MAX_ELEMENTS})",
            parts.len()
        )));
    }
    Ok(parts)
}

/// One catalog in a retrieval, optionally paired with a raw-data path that
/// overrides the `datapath` recorded in its meta table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPath {
    pub db_path: PathBuf,
    pub data_path: Option<PathBuf>,
}

/// Parse `catalog[(rawdata)]` pairs, comma separated.
pub fn parse_path_spec(text: &str) -> Result<Vec<CatalogPath>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::malformed("empty path specification"));
    }
    let mut paths = Vec::new();
    for item in split_limited(text, ',', "paths")? {
        let item = item.trim();
        if item.is_empty() {
            return Err(Error::malformed("empty path in path specification"));
        }
        let (db, data) = split_parenthesized(item)?;
        if db.is_empty() {
            return Err(Error::malformed(format!(
                "missing catalog path in '{item}'"
            )));
        }
        paths.push(CatalogPath {
            db_path: PathBuf::from(db),
            data_path: data.map(PathBuf::from),
        });
    }
    Ok(paths)
}
