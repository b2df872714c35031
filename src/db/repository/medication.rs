use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_medication(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medications (id, visit_id, drug_name, dosage, instructions)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![med.id, med.visit_id, med.drug_name, med.dosage, med.instructions],
    )?;
    Ok(())
}

pub fn update_medication(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE medications SET dosage = ?2, instructions = ?3 WHERE id = ?1",
        params![med.id, med.dosage, med.instructions],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "medication".into(),
            id: med.id.clone(),
        });
    }
    Ok(())
}

pub fn find_medication_id(
    conn: &Connection,
    visit_id: &str,
    drug_name: &str,
) -> Result<Option<String>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM medications WHERE visit_id = ?1 AND drug_name = ?2 LIMIT 1",
            params![visit_id, drug_name],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(id)
}

pub fn get_medication(conn: &Connection, id: &str) -> Result<Option<Medication>, DatabaseError> {
    let med = conn
        .query_row(
            "SELECT id, visit_id, drug_name, dosage, instructions FROM medications WHERE id = ?1",
            params![id],
            |row| {
                Ok(Medication {
                    id: row.get(0)?,
                    visit_id: row.get(1)?,
                    drug_name: row.get(2)?,
                    dosage: row.get(3)?,
                    instructions: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(med)
}
