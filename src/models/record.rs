use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::*;

/// Everything known about one patient, assembled for a single view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub request_id: Uuid,
    pub assembled_at: DateTime<Utc>,
    pub patient: Patient,
    pub appointments: Vec<Appointment>,
    pub budgets: Vec<Budget>,
    pub orthodontics: Vec<Budget>,
    pub financial: FinancialSummary,
    pub clinical_team: Vec<TeamMember>,
    pub anamnesis: Option<Anamnesis>,
    pub images: Option<Vec<ClinicalImage>>,
    pub budget_images: Vec<BudgetImage>,
    /// Sections that failed and hold their empty value.
    pub degraded_sections: Vec<Section>,
}

impl PatientRecord {
    pub fn is_degraded(&self, section: Section) -> bool {
        self.degraded_sections.contains(&section)
    }
}
