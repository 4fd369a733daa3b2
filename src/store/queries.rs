use rusqlite::{Connection, OptionalExtension, Row, params};

use super::StoreError;
use crate::schema::v1::{Population, Response, Sample, Sex, Subject};

const LOAD_SQL: &str = "
    SELECT
        s.sample,
        p.project,
        sub.subject,
        sub.age,
        sub.sex,
        sub.condition,
        t.treatment,
        s.sample_type,
        s.time_from_treatment_start,
        s.response,
        c.b_cell,
        c.cd8_t_cell,
        c.cd4_t_cell,
        c.nk_cell,
        c.monocyte
    FROM samples s
    JOIN projects p ON s.project = p.project
    JOIN subjects sub ON s.subject = sub.subject
    JOIN treatments t ON s.treatment_id = t.treatment_id
    LEFT JOIN cell_counts c ON s.sample = c.sample
    ORDER BY s.sample";

/// Denormalized view of the five tables, one row per sample.
///
/// A statement that cannot be prepared means the file is not a usable store,
/// which is reported as `Unavailable`.
pub fn load_samples(conn: &Connection) -> Result<Vec<Sample>, StoreError> {
    let mut stmt = conn
        .prepare(LOAD_SQL)
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
    let rows = stmt.query_map([], sample_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn sample_from_row(row: &Row<'_>) -> rusqlite::Result<Sample> {
    Ok(Sample {
        sample: row.get(0)?,
        project: row.get(1)?,
        subject: row.get(2)?,
        age: non_negative(row.get(3)?).unwrap_or(0),
        sex: Sex::from(row.get::<_, Option<String>>(4)?.unwrap_or_default()),
        condition: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        treatment: row.get(6)?,
        sample_type: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        time_from_treatment_start: non_negative(row.get(8)?).unwrap_or(0),
        response: Response::from(row.get::<_, Option<String>>(9)?.unwrap_or_default()),
        b_cell: non_negative(row.get(10)?),
        cd8_t_cell: non_negative(row.get(11)?),
        cd4_t_cell: non_negative(row.get(12)?),
        nk_cell: non_negative(row.get(13)?),
        monocyte: non_negative(row.get(14)?),
    })
}

fn non_negative<T: TryFrom<i64>>(value: Option<i64>) -> Option<T> {
    value.and_then(|v| T::try_from(v).ok())
}

fn count_param(value: Option<u64>) -> Result<Option<i64>, StoreError> {
    value
        .map(|v| {
            i64::try_from(v).map_err(|_| {
                StoreError::Validation(format!("count {} exceeds the storable maximum", v))
            })
        })
        .transpose()
}

pub fn count_samples(conn: &Connection) -> Result<usize, StoreError> {
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM samples", [], |r| r.get(0))
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
    Ok(n as usize)
}

pub fn sample_exists(conn: &Connection, sample_id: &str) -> Result<bool, StoreError> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM samples WHERE sample = ?1",
        params![sample_id],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

pub fn list_subjects(conn: &Connection) -> Result<Vec<Subject>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT subject, age, sex, condition FROM subjects ORDER BY subject")
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
    let rows = stmt.query_map([], |row| {
        Ok(Subject {
            subject: row.get(0)?,
            age: non_negative(row.get(1)?).unwrap_or(0),
            sex: Sex::from(row.get::<_, Option<String>>(2)?.unwrap_or_default()),
            condition: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Id of `treatment`, inserting it on first sight.
pub fn ensure_treatment(conn: &Connection, treatment: &str) -> Result<i64, StoreError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT treatment_id FROM treatments WHERE treatment = ?1",
            params![treatment],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO treatments (treatment) VALUES (?1)",
        params![treatment],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn ensure_project(conn: &Connection, project: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR IGNORE INTO projects (project) VALUES (?1)",
        params![project],
    )?;
    Ok(())
}

/// Insert the subject profile if unseen. An existing profile is kept; if the
/// incoming one differs, a description of the divergence is returned.
pub fn ensure_subject(conn: &Connection, subject: &Subject) -> Result<Option<String>, StoreError> {
    let existing: Option<(Option<i64>, Option<String>, Option<String>)> = conn
        .query_row(
            "SELECT age, sex, condition FROM subjects WHERE subject = ?1",
            params![subject.subject],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;

    let Some((age, sex, condition)) = existing else {
        conn.execute(
            "INSERT INTO subjects (subject, age, sex, condition) VALUES (?1, ?2, ?3, ?4)",
            params![
                subject.subject,
                subject.age,
                subject.sex.as_str(),
                subject.condition
            ],
        )?;
        return Ok(None);
    };

    let stored = Subject {
        subject: subject.subject.clone(),
        age: non_negative(age).unwrap_or(0),
        sex: Sex::from(sex.unwrap_or_default()),
        condition: condition.unwrap_or_default(),
    };
    if stored == *subject {
        return Ok(None);
    }
    Ok(Some(format!(
        "subject '{}' profile (age={}, sex={}, condition={}) differs from stored profile (age={}, sex={}, condition={}); kept stored profile",
        subject.subject,
        subject.age,
        subject.sex.as_str(),
        subject.condition,
        stored.age,
        stored.sex.as_str(),
        stored.condition
    )))
}

pub fn insert_sample_row(
    conn: &Connection,
    sample: &Sample,
    treatment_id: i64,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO samples
            (sample, project, subject, treatment_id, sample_type, time_from_treatment_start, response)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            sample.sample,
            sample.project,
            sample.subject,
            treatment_id,
            sample.sample_type,
            sample.time_from_treatment_start,
            sample.response.code()
        ],
    )?;
    Ok(())
}

pub fn insert_cell_counts(conn: &Connection, sample: &Sample) -> Result<(), StoreError> {
    let [b, cd8, cd4, nk, mono] = Population::ALL.map(|p| count_param(sample.count(p)));
    conn.execute(
        "INSERT INTO cell_counts (sample, b_cell, cd8_t_cell, cd4_t_cell, nk_cell, monocyte)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![sample.sample, b?, cd8?, cd4?, nk?, mono?],
    )?;
    Ok(())
}

/// Delete the cell-count rows, then the sample row. Returns sample rows removed.
pub fn delete_sample(conn: &Connection, sample_id: &str) -> Result<usize, StoreError> {
    conn.execute(
        "DELETE FROM cell_counts WHERE sample = ?1",
        params![sample_id],
    )?;
    let n = conn.execute("DELETE FROM samples WHERE sample = ?1", params![sample_id])?;
    Ok(n)
}
