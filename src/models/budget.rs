use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::BudgetKind;

/// A priced proposal of procedures. Header and items are shared by every
/// variant; `terms` carries what only one variant has.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub number: Option<i64>,
    pub date: Option<NaiveDate>,
    pub total: Option<f64>,
    pub type_tag: i64,
    pub provider_id: Option<i64>,
    pub provider_name: Option<String>,
    pub terms: BudgetTerms,
    pub items: Vec<BudgetItem>,
}

impl Budget {
    pub fn kind(&self) -> BudgetKind {
        self.terms.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BudgetTerms {
    Clinical(ClinicalTerms),
    Orthodontic(InstallmentTerms),
    Monthly(InstallmentTerms),
}

impl BudgetTerms {
    pub fn kind(&self) -> BudgetKind {
        match self {
            Self::Clinical(_) => BudgetKind::Clinical,
            Self::Orthodontic(_) => BudgetKind::Orthodontic,
            Self::Monthly(_) => BudgetKind::Monthly,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalTerms {
    pub insurer_id: Option<i64>,
    pub plan_id: Option<i64>,
    pub clinic_id: Option<i64>,
    pub guide_number: Option<String>,
    pub situation_id: Option<i64>,
    pub notes: Option<String>,
    pub discount: Option<f64>,
    pub discount_type: Option<i64>,
    pub closed: bool,
    pub membership_number: Option<String>,
    pub holder: Option<String>,
    pub copay_total: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstallmentTerms {
    pub start_date: Option<NaiveDate>,
    pub installments: Option<i64>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub id: i64,
    pub budget_id: i64,
    /// Display code: line, else procedure code/number, else item id.
    pub code: String,
    pub line: Option<String>,
    pub item_id: Option<i64>,
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub unit_value: Option<f64>,
    pub total: Option<f64>,
    pub discount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub tooth_number: Option<String>,
    pub phase: Option<i64>,
    pub performed: bool,
    pub billed: bool,
    pub notes: Option<String>,
    pub transfer: Option<TransferDetails>,
    pub audit: Option<AuditDetails>,
}

/// Provider payout block of a line item, passed through as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferDetails {
    pub date: Option<NaiveDate>,
    pub value: Option<f64>,
    pub is_value: Option<i64>,
    pub base: Option<f64>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditDetails {
    pub created_by: Option<String>,
    pub created_at: Option<String>,
    pub updated_by: Option<String>,
    pub updated_at: Option<String>,
}
