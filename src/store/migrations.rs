//! Five-table schema: projects, subjects, treatments, samples, cell_counts.

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    project TEXT PRIMARY KEY
);

-- One demographic profile per subject; authoritative for age, sex and condition.
CREATE TABLE IF NOT EXISTS subjects (
    subject TEXT PRIMARY KEY,
    age INTEGER,
    sex TEXT,
    condition TEXT
);

CREATE TABLE IF NOT EXISTS treatments (
    treatment_id INTEGER PRIMARY KEY AUTOINCREMENT,
    treatment TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS samples (
    sample TEXT PRIMARY KEY,
    project TEXT NOT NULL REFERENCES projects(project),
    subject TEXT NOT NULL REFERENCES subjects(subject),
    treatment_id INTEGER NOT NULL REFERENCES treatments(treatment_id),
    sample_type TEXT,
    time_from_treatment_start INTEGER,
    response TEXT
);

CREATE TABLE IF NOT EXISTS cell_counts (
    sample TEXT NOT NULL REFERENCES samples(sample),
    b_cell INTEGER,
    cd8_t_cell INTEGER,
    cd4_t_cell INTEGER,
    nk_cell INTEGER,
    monocyte INTEGER
);

CREATE INDEX IF NOT EXISTS idx_cell_counts_sample ON cell_counts(sample);
CREATE INDEX IF NOT EXISTS idx_samples_subject ON samples(subject);
"#;

/// Children first so foreign keys never dangle.
pub const DROP_SQL: &str = r#"
DROP TABLE IF EXISTS cell_counts;
DROP TABLE IF EXISTS samples;
DROP TABLE IF EXISTS treatments;
DROP TABLE IF EXISTS subjects;
DROP TABLE IF EXISTS projects;
"#;
