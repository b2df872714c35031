use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Vital-sign readings attached to an observation. Every reading is optional;
/// a missing reading is stored as NULL, never as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub bp_systolic: Option<i64>,
    pub bp_diastolic: Option<i64>,
    pub heart_rate: Option<i64>,
    pub temperature_c: Option<f64>,
    pub spo2: Option<i64>,
    pub bmi: Option<f64>,
}

/// Clinical note with vitals, keyed by (visit_id, note_text, created_at).
///
/// Unlike every other entity, the source may supply `id` itself; it is used
/// verbatim when the observation is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: String,
    pub visit_id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub note_text: String,
    pub vitals: Vitals,
    pub created_at: NaiveDateTime,
}
