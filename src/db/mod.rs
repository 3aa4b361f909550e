pub mod classify;
pub mod repository;
pub mod retry;
pub mod row;
pub mod sqlite;
pub mod store;

pub use classify::*;
pub use retry::*;
pub use row::RawRow;
pub use sqlite::*;
pub use store::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Error reported by the store itself, in the code/message/hint shape
    /// relational backends use for failed statements and procedure calls.
    #[error("Query failed{}: {message}", code_suffix(.code))]
    Query {
        code: Option<String>,
        message: String,
        hint: Option<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Store connection lock poisoned")]
    LockPoisoned,

    #[error("Store task failed: {0}")]
    TaskFailed(String),
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(" [{c}]")).unwrap_or_default()
}

impl StoreError {
    /// Build a query error with only a code and message.
    pub fn query(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Query {
            code: Some(code.into()),
            message: message.into(),
            hint: None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Query { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
