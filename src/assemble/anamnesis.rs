use crate::db::{RecordStore, StoreError};
use crate::models::Anamnesis;

/// Intake questionnaire of a patient. `None` when there is no row or the
/// row holds no answers.
pub async fn assemble_anamnesis<S>(store: &S, patient_id: i64) -> Result<Option<Anamnesis>, StoreError>
where
    S: RecordStore + ?Sized,
{
    let Some(row) = store.fetch_anamnesis(patient_id).await? else {
        return Ok(None);
    };

    let anamnesis = Anamnesis {
        chief_complaint: row.repaired_text("chief_complaint"),
        has_disease: row.flag_value("has_disease"),
        disease_detail: row.repaired_text("disease_detail"),
        under_physician_care: row.flag_value("under_physician_care"),
        has_allergy: row.flag_value("has_allergy"),
        allergy_detail: row.repaired_text("allergy_detail"),
        has_std: row.flag_value("has_std"),
        std_detail: row.repaired_text("std_detail"),
        notes: row.repaired_text("notes"),
    };

    Ok(anamnesis.has_content().then_some(anamnesis))
}
