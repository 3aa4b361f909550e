use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalImage {
    pub id: i64,
    pub date: Option<NaiveDate>,
    pub history: Option<String>,
    pub path: Option<String>,
    pub tooth_id: Option<i64>,
    pub face_id: Option<i64>,
    pub budget_image: Option<String>,
    pub provider_id: Option<i64>,
    pub provider_name: Option<String>,
}

/// Image attached to one of the patient's budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetImage {
    pub id: i64,
    pub budget_id: i64,
    pub budget_date: Option<NaiveDate>,
    pub date: Option<NaiveDate>,
    pub history: Option<String>,
    pub path: Option<String>,
    pub tooth_id: Option<i64>,
    pub face_id: Option<i64>,
    pub budget_image: Option<String>,
    pub evaluation_id: Option<i64>,
    pub provider_id: Option<i64>,
    pub provider_name: Option<String>,
}
