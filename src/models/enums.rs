use serde::{Deserialize, Serialize};

/// Entity types handled by the ingest pipeline, declared in stage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    Patient,
    Doctor,
    Visit,
    Diagnosis,
    Medication,
    LabResult,
    Observation,
}

impl EntityType {
    /// Every entity type in the fixed processing order.
    pub const ALL: [EntityType; 7] = [
        EntityType::Patient,
        EntityType::Doctor,
        EntityType::Visit,
        EntityType::Diagnosis,
        EntityType::Medication,
        EntityType::LabResult,
        EntityType::Observation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Patient => "Patient",
            EntityType::Doctor => "Doctor",
            EntityType::Visit => "Visit",
            EntityType::Diagnosis => "Diagnosis",
            EntityType::Medication => "Medication",
            EntityType::LabResult => "LabResult",
            EntityType::Observation => "Observation",
        }
    }

    /// Name of the source file holding rows for this entity type.
    pub fn source_file(self) -> &'static str {
        match self {
            EntityType::Patient => "patients.csv",
            EntityType::Doctor => "doctors.csv",
            EntityType::Visit => "visits.csv",
            EntityType::Diagnosis => "diagnoses.csv",
            EntityType::Medication => "medications.csv",
            EntityType::LabResult => "lab_results.csv",
            EntityType::Observation => "reports.csv",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_order_places_parents_first() {
        let pos = |t: EntityType| EntityType::ALL.iter().position(|e| *e == t).unwrap();
        assert!(pos(EntityType::Patient) < pos(EntityType::Visit));
        assert!(pos(EntityType::Doctor) < pos(EntityType::Visit));
        assert!(pos(EntityType::Visit) < pos(EntityType::Diagnosis));
        assert!(pos(EntityType::Visit) < pos(EntityType::LabResult));
        assert_eq!(EntityType::ALL.last(), Some(&EntityType::Observation));
    }

    #[test]
    fn observations_read_from_reports_file() {
        assert_eq!(EntityType::Observation.source_file(), "reports.csv");
        assert_eq!(EntityType::LabResult.to_string(), "LabResult");
    }
}
