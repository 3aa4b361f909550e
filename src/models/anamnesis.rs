use serde::{Deserialize, Serialize};

/// Intake questionnaire. Flags are stored answers (usually 0/1), kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Anamnesis {
    pub chief_complaint: Option<String>,
    pub has_disease: Option<i64>,
    pub disease_detail: Option<String>,
    pub under_physician_care: Option<i64>,
    pub has_allergy: Option<i64>,
    pub allergy_detail: Option<String>,
    pub has_std: Option<i64>,
    pub std_detail: Option<String>,
    pub notes: Option<String>,
}

impl Anamnesis {
    /// True iff any text answer is non-blank or any flag was answered.
    pub fn has_content(&self) -> bool {
        let texts = [
            &self.chief_complaint,
            &self.disease_detail,
            &self.allergy_detail,
            &self.std_detail,
            &self.notes,
        ];
        let flags = [
            self.has_disease,
            self.under_physician_care,
            self.has_allergy,
            self.has_std,
        ];
        texts
            .iter()
            .any(|t| t.as_deref().is_some_and(|s| !s.trim().is_empty()))
            || flags.iter().any(Option::is_some)
    }
}
