//! Repository layer: entity-scoped SQL against the embedded store.
//!
//! Each function is one statement. Results are returned as `RawRow`s keyed by
//! column name so the SQLite store answers in the same shape as any other
//! `RecordStore`.

mod appointment;
mod budget;
mod image;
mod ledger;
mod lookup;
mod person;
mod team;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, Params};
use serde_json::Value;

use super::{RawRow, StoreError};

pub use appointment::*;
pub use budget::*;
pub use image::*;
pub use ledger::*;
pub use lookup::*;
pub use person::*;
pub use team::*;

/// Run a statement and collect every row as a `RawRow`.
pub(crate) fn query_rows<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<RawRow>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let rows = stmt.query_map(params, |row| {
        let mut raw = RawRow::new();
        for (i, name) in columns.iter().enumerate() {
            raw.insert(name.clone(), to_json(row.get_ref(i)?));
        }
        Ok(raw)
    })?;

    rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
}

/// Single-column integer query.
pub(crate) fn query_ids<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<i64>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| row.get::<_, i64>(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
}

/// `?1, ?2, ...` for an `IN (...)` list of `count` parameters.
pub(crate) fn placeholders(count: usize) -> String {
    (1..=count).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ")
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
    }
}
