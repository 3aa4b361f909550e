use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::formatters::format_tax_id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub tax_id: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
}

impl Patient {
    /// Tax id in display form (`xxx.xxx.xxx-xx` when it has 11 digits).
    pub fn formatted_tax_id(&self) -> Option<String> {
        self.tax_id.as_deref().map(format_tax_id)
    }
}
