use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::LedgerStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub due_date: Option<NaiveDate>,
    pub net_value: Option<f64>,
    pub status: LedgerStatus,
}

/// A credit movement against one of the patient's ledger entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: i64,
    pub entry_id: Option<i64>,
    pub movement_date: Option<NaiveDate>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub entries: Vec<LedgerEntry>,
    pub receipts: Vec<Receipt>,
}
