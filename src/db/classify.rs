//! Store error classification.
//!
//! One predicate decides how every caller treats a failed round trip:
//! the optional team procedure being absent is a capability question, a
//! statement timeout is worth retrying, everything else is a real failure.
//!
//! The capability-absent signatures are matched on error text and codes.
//! A backend that changes its wording can slip past this list and surface
//! as `Fatal`, which is the safe direction to fail.

use rusqlite::ErrorCode;

use super::StoreError;

/// Postgres `query_canceled`, raised on statement timeout.
pub const TIMEOUT_ERROR_CODE: &str = "57014";

/// Codes reported when the requested procedure is not deployed.
const CAPABILITY_ABSENT_CODES: &[&str] = &["P0001", "42883", "PGRST202"];

/// Message fragments reported when the requested procedure is not deployed.
const CAPABILITY_ABSENT_MESSAGES: &[&str] = &["404", "does not exist", "function"];

/// Hint fragments reported when the requested procedure is not deployed.
const CAPABILITY_ABSENT_HINTS: &[&str] = &["function"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The optional operation is not available on this store.
    CapabilityAbsent,
    /// Timeout-class failure; retrying may succeed.
    Transient,
    /// Genuine failure.
    Fatal,
}

pub fn classify(err: &StoreError) -> ErrorClass {
    match err {
        StoreError::Query { code, message, hint } => {
            if code.as_deref() == Some(TIMEOUT_ERROR_CODE) {
                return ErrorClass::Transient;
            }
            let code_absent = code
                .as_deref()
                .is_some_and(|c| CAPABILITY_ABSENT_CODES.contains(&c));
            let message_absent = CAPABILITY_ABSENT_MESSAGES
                .iter()
                .any(|sig| message.contains(sig));
            let hint_absent = hint
                .as_deref()
                .is_some_and(|h| CAPABILITY_ABSENT_HINTS.iter().any(|sig| h.contains(sig)));
            if code_absent || message_absent || hint_absent {
                ErrorClass::CapabilityAbsent
            } else {
                ErrorClass::Fatal
            }
        }
        StoreError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
            if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) =>
        {
            ErrorClass::Transient
        }
        _ => ErrorClass::Fatal,
    }
}

pub fn is_capability_absent(err: &StoreError) -> bool {
    classify(err) == ErrorClass::CapabilityAbsent
}

pub fn is_transient(err: &StoreError) -> bool {
    classify(err) == ErrorClass::Transient
}
