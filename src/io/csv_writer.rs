use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::io::csv_input::REQUIRED_COLUMNS;
use crate::math::stats::format_p_value;
use crate::schema::v1::{CountRow, FrequencyRow, GroupStats, PopulationSummary, ResponseComparison, Sample};

/// Serialize any flat row type. `header` is written explicitly only when
/// `rows` is empty; otherwise serde derives it from the first row.
pub fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T], header: &[&str]) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        w.write_record(header)?;
    }
    for row in rows {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

fn write_rows_to<T: Serialize>(path: &Path, rows: &[T], header: &[&str]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_rows(file, rows, header)
}

/// Cohort rows in the import column order, to any writer.
pub fn write_samples_to<W: Write>(writer: W, samples: &[Sample]) -> Result<()> {
    write_rows(writer, samples, &REQUIRED_COLUMNS)
}

pub fn write_samples(path: &Path, samples: &[Sample]) -> Result<()> {
    write_rows_to(path, samples, &REQUIRED_COLUMNS)
}

pub fn write_frequencies(path: &Path, rows: &[FrequencyRow]) -> Result<()> {
    write_rows_to(
        path,
        rows,
        &["sample", "total_count", "population", "count", "percentage"],
    )
}

pub fn write_population_summary(path: &Path, rows: &[PopulationSummary]) -> Result<()> {
    write_rows_to(
        path,
        rows,
        &["population", "mean", "std", "min", "max", "median"],
    )
}

pub fn write_group_stats(path: &Path, rows: &[GroupStats]) -> Result<()> {
    write_rows_to(
        path,
        rows,
        &["cohort", "population", "n", "mean", "std", "min", "max", "median"],
    )
}

pub fn write_counts(path: &Path, rows: &[CountRow]) -> Result<()> {
    write_rows_to(path, rows, &["label", "count"])
}

pub const RESPONSE_HEADER: [&str; 12] = [
    "population",
    "responder_n",
    "responder_mean",
    "responder_std",
    "non_responder_n",
    "non_responder_mean",
    "non_responder_std",
    "mean_difference",
    "t_stat",
    "p_value",
    "cohens_d",
    "significance",
];

/// Response comparison table. P-values go through the `<0.0001` clamp; an
/// absent t-test leaves `t_stat` and `p_value` empty.
pub fn write_response_comparison<W: Write>(writer: W, rows: &[ResponseComparison]) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(RESPONSE_HEADER)?;
    for r in rows {
        w.write_record([
            r.population.as_str().to_string(),
            r.responder_n.to_string(),
            format!("{:.2}", r.responder_mean),
            format!("{:.2}", r.responder_std),
            r.non_responder_n.to_string(),
            format!("{:.2}", r.non_responder_mean),
            format!("{:.2}", r.non_responder_std),
            format!("{:.2}", r.mean_difference),
            r.t_stat.map(|t| format!("{:.4}", t)).unwrap_or_default(),
            r.p_value.map(format_p_value).unwrap_or_default(),
            format!("{:.4}", r.cohens_d),
            r.significance.as_str().to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_response_comparison_file(path: &Path, rows: &[ResponseComparison]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_response_comparison(file, rows)
}
