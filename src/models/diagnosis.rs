use serde::{Deserialize, Serialize};

/// Diagnoses have no mutable fields: a natural-key match is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub id: String,
    pub visit_id: String,
    pub diagnosis: String,
}
