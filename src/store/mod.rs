//! File-backed record store.
//!
//! Every operation opens its own short-lived connection and runs in a single
//! transaction, so a failed insert or delete leaves the file untouched.

pub mod migrations;
pub mod queries;

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tracing::{info, warn};

use crate::schema::v1::{Population, Sample, Subject};

use self::migrations::{DROP_SQL, SCHEMA_SQL};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("sample '{0}' already exists")]
    DuplicateSample(String),
    #[error("sample '{0}' not found")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("sqlite error: {message}")]
    Sqlite { message: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Sqlite {
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertReport {
    pub inserted: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SampleStore {
    path: PathBuf,
}

impl SampleStore {
    /// Open an existing store file.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::Unavailable(format!(
                "{} does not exist",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Open the store, creating the file and schema if absent.
    pub fn open_or_init(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::Unavailable(format!(
                "{} does not exist",
                self.path.display()
            )));
        }
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(conn)
    }

    /// Drop and recreate all tables.
    pub fn reset(&self) -> Result<(), StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute_batch(DROP_SQL)?;
        tx.execute_batch(SCHEMA_SQL)?;
        tx.commit()?;
        info!(store = %self.path.display(), "store_reset");
        Ok(())
    }

    pub fn load(&self) -> Result<Vec<Sample>, StoreError> {
        let conn = self.connect()?;
        let samples = queries::load_samples(&conn)?;
        info!(rows = samples.len(), "store_loaded");
        Ok(samples)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.connect()?;
        queries::count_samples(&conn)
    }

    pub fn subjects(&self) -> Result<Vec<Subject>, StoreError> {
        let conn = self.connect()?;
        queries::list_subjects(&conn)
    }

    /// Append a batch. Any invalid or duplicate sample rolls back the whole batch.
    pub fn insert(&self, batch: &[Sample]) -> Result<InsertReport, StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let report = insert_all(&tx, batch)?;
        tx.commit()?;
        info!(inserted = report.inserted, "store_batch_inserted");
        Ok(report)
    }

    /// Replace the whole store content with `batch`.
    pub fn replace_all(&self, batch: &[Sample]) -> Result<InsertReport, StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute_batch(DROP_SQL)?;
        tx.execute_batch(SCHEMA_SQL)?;
        let report = insert_all(&tx, batch)?;
        tx.commit()?;
        info!(inserted = report.inserted, "store_replaced");
        Ok(report)
    }

    /// Add one sample, creating its project, subject and treatment if unseen.
    pub fn upsert_single(&self, sample: &Sample) -> Result<InsertReport, StoreError> {
        self.insert(std::slice::from_ref(sample))
    }

    pub fn delete(&self, sample_id: &str) -> Result<(), StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let removed = queries::delete_sample(&tx, sample_id)?;
        if removed == 0 {
            return Err(StoreError::NotFound(sample_id.to_string()));
        }
        tx.commit()?;
        info!(sample = sample_id, "sample_removed");
        Ok(())
    }
}

pub fn validate_sample(sample: &Sample) -> Result<(), StoreError> {
    let required = [
        ("sample", &sample.sample),
        ("project", &sample.project),
        ("subject", &sample.subject),
        ("condition", &sample.condition),
        ("treatment", &sample.treatment),
    ];
    let empty: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if !empty.is_empty() {
        return Err(StoreError::Validation(format!(
            "required fields are empty: {}",
            empty.join(", ")
        )));
    }
    // Counts are stored as SQLite INTEGER.
    let oversized: Vec<&str> = Population::ALL
        .iter()
        .filter(|p| sample.count(**p).is_some_and(|c| i64::try_from(c).is_err()))
        .map(|p| p.as_str())
        .collect();
    if !oversized.is_empty() {
        return Err(StoreError::Validation(format!(
            "counts exceed {}: {}",
            i64::MAX,
            oversized.join(", ")
        )));
    }
    Ok(())
}

fn insert_all(conn: &Connection, batch: &[Sample]) -> Result<InsertReport, StoreError> {
    let mut report = InsertReport::default();
    for sample in batch {
        validate_sample(sample)?;
        if queries::sample_exists(conn, &sample.sample)? {
            return Err(StoreError::DuplicateSample(sample.sample.clone()));
        }
        let treatment_id = queries::ensure_treatment(conn, &sample.treatment)?;
        queries::ensure_project(conn, &sample.project)?;
        if let Some(divergence) = queries::ensure_subject(conn, &sample.subject_profile())? {
            warn!(sample = %sample.sample, "{}", divergence);
            report.warnings.push(divergence);
        }
        queries::insert_sample_row(conn, sample, treatment_id)?;
        queries::insert_cell_counts(conn, sample)?;
        report.inserted += 1;
    }
    Ok(report)
}
