use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::schema::v1::Sample;

pub const REQUIRED_COLUMNS: [&str; 15] = [
    "sample",
    "project",
    "subject",
    "age",
    "sex",
    "condition",
    "treatment",
    "sample_type",
    "time_from_treatment_start",
    "response",
    "b_cell",
    "cd8_t_cell",
    "cd4_t_cell",
    "nk_cell",
    "monocyte",
];

pub fn read_samples(path: &Path) -> Result<Vec<Sample>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_samples_from(file).with_context(|| format!("failed to read {}", path.display()))
}

/// Parse sample rows from CSV. Extra columns are ignored; every required
/// column must be present in the header.
pub fn read_samples_from<R: Read>(reader: R) -> Result<Vec<Sample>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("failed to read CSV header")?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        bail!("missing required columns: {}", missing.join(", "));
    }

    let mut samples = Vec::new();
    for (idx, record) in rdr.deserialize::<Sample>().enumerate() {
        // +2: one for the header, one for 1-based line numbers.
        let sample = record.with_context(|| format!("invalid row at line {}", idx + 2))?;
        samples.push(sample);
    }

    if samples.is_empty() {
        bail!("the uploaded CSV file is empty");
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_count_cells_become_none() {
        let csv = "sample,project,subject,age,sex,condition,treatment,sample_type,time_from_treatment_start,response,b_cell,cd8_t_cell,cd4_t_cell,nk_cell,monocyte\n\
                   S1,P1,SUB1,40,M,melanoma,tr1,PBMC,0,y,10,,5,,1\n";
        let samples = read_samples_from(csv.as_bytes()).unwrap();
        assert_eq!(samples[0].cd8_t_cell, None);
        assert_eq!(samples[0].cd4_t_cell, Some(5));
    }
}
