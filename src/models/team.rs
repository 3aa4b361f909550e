use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub provider_id: i64,
    /// Empty when the provider has no person row.
    pub name: String,
    pub license_number: Option<String>,
    pub short_code: Option<String>,
}
