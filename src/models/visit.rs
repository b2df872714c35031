use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub visit_date: NaiveDateTime,
    pub department: Option<String>,
    pub reason: Option<String>,
}
