//! Stage-ordered ingest run.
//!
//! Stages run one after another in [`EntityType::ALL`] order, and rows within
//! a stage run one at a time in source order. Every write is committed on its
//! own, so a failure in a later stage leaves earlier stages in the store.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use super::identity::IdentityResolver;
use super::reader::RecordSource;
use super::report::ReconciliationReport;
use super::rows::*;
use super::upsert::{Reconcilable, UpsertEngine};
use super::IngestError;
use crate::config::IngestConfig;
use crate::db::{self, DatabaseError};
use crate::models::EntityType;

/// Where each entity type's rows come from.
#[derive(Debug, Clone)]
pub struct SourceSet {
    data_dir: PathBuf,
}

impl SourceSet {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn source(&self, entity: EntityType) -> RecordSource {
        RecordSource::new(self.data_dir.join(entity.source_file()))
    }
}

pub struct Orchestrator<'c> {
    engine: UpsertEngine<'c>,
    identities: IdentityResolver,
    report: ReconciliationReport,
}

impl<'c> Orchestrator<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            engine: UpsertEngine::new(conn),
            identities: IdentityResolver::new(),
            report: ReconciliationReport::new(),
        }
    }

    /// Drive every stage. The report is only returned once all stages complete.
    pub fn run(mut self, sources: &SourceSet) -> Result<ReconciliationReport, IngestError> {
        for entity in EntityType::ALL {
            let source = sources.source(entity);
            match entity {
                EntityType::Patient => self.run_stage::<PatientRow>(&source)?,
                EntityType::Doctor => self.run_stage::<DoctorRow>(&source)?,
                EntityType::Visit => self.run_stage::<VisitRow>(&source)?,
                EntityType::Diagnosis => self.run_stage::<DiagnosisRow>(&source)?,
                EntityType::Medication => self.run_stage::<MedicationRow>(&source)?,
                EntityType::LabResult => self.run_stage::<LabResultRow>(&source)?,
                EntityType::Observation => self.run_stage::<ObservationRow>(&source)?,
            }
        }
        Ok(self.report)
    }

    fn run_stage<R: StageRow>(&mut self, source: &RecordSource) -> Result<(), IngestError> {
        let entity = <R::Target as Reconcilable>::ENTITY;
        tracing::info!(
            entity = entity.as_str(),
            source = %source.path().display(),
            "Stage started"
        );

        for record in source.records()? {
            let record = record?;
            let row = match R::from_record(&record) {
                Ok(row) => row,
                Err(rejection) => {
                    tracing::warn!(
                        entity = entity.as_str(),
                        line = record.line(),
                        reason = %rejection,
                        "Row rejected"
                    );
                    self.report.record_skip(entity);
                    continue;
                }
            };

            let legacy_id = row.legacy_id().map(str::to_owned);
            let target = match row.resolve(&self.identities) {
                Ok(target) => target,
                Err(unresolved) => {
                    tracing::debug!(
                        entity = entity.as_str(),
                        line = record.line(),
                        reason = %unresolved,
                        "Row dropped"
                    );
                    self.report.record_skip(entity);
                    continue;
                }
            };

            let outcome = match self.engine.upsert(target) {
                Ok(outcome) => outcome,
                Err(DatabaseError::IdConflict { id, .. }) => {
                    tracing::warn!(
                        entity = entity.as_str(),
                        line = record.line(),
                        id = %id,
                        "Row skipped: id already held by another record"
                    );
                    self.report.record_skip(entity);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            self.identities
                .record(entity, legacy_id.as_deref(), &outcome.id);
            self.report.record_upsert(entity, outcome.created);
        }

        let tally = self.report.tally(entity);
        tracing::info!(
            entity = entity.as_str(),
            inserted = tally.inserted,
            updated = tally.updated,
            skipped = tally.skipped,
            "Stage finished"
        );
        Ok(())
    }
}

/// Open the store, run every stage, and close the store whatever the outcome.
pub fn run_ingest(config: &IngestConfig) -> Result<ReconciliationReport, IngestError> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = db::open_database(&config.database_path)?;
    tracing::info!(
        database = %config.database_path.display(),
        data_dir = %config.data_dir.display(),
        "Ingest run starting"
    );

    let result = Orchestrator::new(&conn).run(&SourceSet::new(&config.data_dir));

    if let Err(e) = db::close_database(conn) {
        tracing::warn!(error = %e, "Closing database failed");
    }
    result
}
