use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub id: String,
    pub visit_id: String,
    pub drug_name: String,
    pub dosage: Option<String>,
    pub instructions: Option<String>,
}
