use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::{format_timestamp, parse_stored_timestamp};
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_lab_result(conn: &Connection, lab: &LabResult) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO lab_results (id, visit_id, test_name, result_value, unit,
         reference_range, test_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            lab.id,
            lab.visit_id,
            lab.test_name,
            lab.result_value,
            lab.unit,
            lab.reference_range,
            lab.test_date.as_ref().map(format_timestamp),
        ],
    )?;
    Ok(())
}

pub fn update_lab_result(conn: &Connection, lab: &LabResult) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE lab_results SET result_value = ?2, unit = ?3, reference_range = ?4,
         test_date = ?5 WHERE id = ?1",
        params![
            lab.id,
            lab.result_value,
            lab.unit,
            lab.reference_range,
            lab.test_date.as_ref().map(format_timestamp),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "lab_result".into(),
            id: lab.id.clone(),
        });
    }
    Ok(())
}

/// `test_date` is compared with `IS` so an undated row matches an undated record.
pub fn find_lab_result_id(
    conn: &Connection,
    visit_id: &str,
    test_name: &str,
    test_date: Option<&NaiveDateTime>,
) -> Result<Option<String>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM lab_results
             WHERE visit_id = ?1 AND test_name = ?2 AND test_date IS ?3 LIMIT 1",
            params![visit_id, test_name, test_date.map(format_timestamp)],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(id)
}

pub fn get_lab_results_for_visit(
    conn: &Connection,
    visit_id: &str,
) -> Result<Vec<LabResult>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, visit_id, test_name, result_value, unit, reference_range, test_date
         FROM lab_results WHERE visit_id = ?1 ORDER BY test_date",
    )?;

    let rows = stmt.query_map(params![visit_id], |row| Ok(lab_row_from_rusqlite(row)))?;

    let mut labs = Vec::new();
    for row in rows {
        labs.push(lab_from_row(row??)?);
    }
    Ok(labs)
}

// Internal row type for LabResult mapping
struct LabRow {
    id: String,
    visit_id: String,
    test_name: String,
    result_value: Option<f64>,
    unit: Option<String>,
    reference_range: Option<String>,
    test_date: Option<String>,
}

fn lab_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<LabRow, rusqlite::Error> {
    Ok(LabRow {
        id: row.get(0)?,
        visit_id: row.get(1)?,
        test_name: row.get(2)?,
        result_value: row.get(3)?,
        unit: row.get(4)?,
        reference_range: row.get(5)?,
        test_date: row.get(6)?,
    })
}

fn lab_from_row(row: LabRow) -> Result<LabResult, DatabaseError> {
    Ok(LabResult {
        id: row.id,
        visit_id: row.visit_id,
        test_name: row.test_name,
        result_value: row.result_value,
        unit: row.unit,
        reference_range: row.reference_range,
        test_date: row.test_date.as_deref().map(parse_stored_timestamp).transpose()?,
    })
}
