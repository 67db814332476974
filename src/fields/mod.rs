//! # Typed Field Access
//!
//! Traces and table rows are opaque byte buffers; everything that reads or
//! writes them goes through a [`FieldAccessor`]: a byte offset plus a sealed
//! [`FieldType`] that knows its width and numeric kind. Accessors are small
//! `Copy` values, built once (usually from the header catalog) and handed
//! around freely.
//!
//! Two access styles coexist:
//!
//! - **strict**: `get_int`/`set_int`/`get_real`/`set_real` fail with
//!   `TypeMismatch` when the field is of the other kind;
//! - **converting**: `read`/`write` move a [`Value`] in or out, converting
//!   between integer and real representations with defined semantics. This is
//!   the path copy plans and SQL row loading use.
//!
//! A [`CopyPlan`] is a validated list of accessor pairs applied per record;
//! it rejects pairs of differing byte size at construction time.

mod accessor;
mod plan;

#[cfg(test)]
mod tests;

pub use accessor::{FieldAccessor, FieldType, NumericKind, Value};
pub use plan::CopyPlan;
