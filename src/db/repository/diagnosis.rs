use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_diagnosis(conn: &Connection, diag: &Diagnosis) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO diagnoses (id, visit_id, diagnosis) VALUES (?1, ?2, ?3)",
        params![diag.id, diag.visit_id, diag.diagnosis],
    )?;
    Ok(())
}

pub fn find_diagnosis_id(
    conn: &Connection,
    visit_id: &str,
    diagnosis: &str,
) -> Result<Option<String>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM diagnoses WHERE visit_id = ?1 AND diagnosis = ?2 LIMIT 1",
            params![visit_id, diagnosis],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(id)
}

pub fn get_diagnoses_for_visit(
    conn: &Connection,
    visit_id: &str,
) -> Result<Vec<Diagnosis>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, visit_id, diagnosis FROM diagnoses WHERE visit_id = ?1 ORDER BY diagnosis",
    )?;
    let rows = stmt.query_map(params![visit_id], |row| {
        Ok(Diagnosis {
            id: row.get(0)?,
            visit_id: row.get(1)?,
            diagnosis: row.get(2)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
