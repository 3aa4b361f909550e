//! Dynamic store rows and the tolerant accessors that turn them into typed records.
//!
//! Rows arrive as JSON-like maps whose field names are not reliably cased
//! (the team procedure, for instance, answers in upper case). Every assembler
//! reads a `RawRow` exactly once, through these accessors, and builds its
//! canonical record immediately. Nothing past that boundary sees a raw field.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::text_repair::repair_text;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(Map<String, Value>);

impl RawRow {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert, mostly for tests and store adapters.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field lookup: exact key first, then ASCII case-insensitive. JSON null
    /// is reported as absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        let value = match self.0.get(name) {
            Some(v) => Some(v),
            None => self
                .0
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v),
        };
        value.filter(|v| !v.is_null())
    }

    /// Integer field. Accepts integral floats, booleans and numeric strings.
    pub fn i64(&self, name: &str) -> Option<i64> {
        match self.field(name)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn f64(&self, name: &str) -> Option<f64> {
        match self.field(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().replace(',', ".").parse().ok(),
            _ => None,
        }
    }

    /// Text field as stored. Numbers are rendered in their plain form; blank
    /// strings count as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        let s = match self.field(name)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        if s.trim().is_empty() {
            None
        } else {
            Some(s)
        }
    }

    /// Free-text field passed through the mojibake repair.
    pub fn repaired_text(&self, name: &str) -> Option<String> {
        self.text(name).map(|s| repair_text(&s))
    }

    /// True iff the field holds exactly 1 or boolean true.
    pub fn flag(&self, name: &str) -> bool {
        match self.field(name) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_i64() == Some(1) || n.as_f64() == Some(1.0),
            _ => false,
        }
    }

    /// Optional small integer flag, as questionnaire answers are stored.
    pub fn flag_value(&self, name: &str) -> Option<i64> {
        self.i64(name)
    }

    /// Date field. Accepts `YYYY-MM-DD` and full timestamps (date part kept).
    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        let raw = self.text(name)?;
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|dt| dt.date())
            })
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                    .ok()
                    .map(|dt| dt.date())
            })
            .or_else(|| raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
    }

    /// Time-of-day field (`HH:MM` or `HH:MM:SS`).
    pub fn time(&self, name: &str) -> Option<NaiveTime> {
        let raw = self.text(name)?;
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .ok()
    }

    /// True when at least one of the named fields is present and non-blank.
    pub fn any_present(&self, names: &[&str]) -> bool {
        names.iter().any(|name| match self.field(name) {
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(_) => true,
            None => false,
        })
    }
}

impl From<Map<String, Value>> for RawRow {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
