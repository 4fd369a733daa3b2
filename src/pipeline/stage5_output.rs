use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::io::{csv_writer, json_writer};
use crate::pipeline::Stage;
use crate::schema::v1::ComparisonOutcome;

pub struct Stage5Output;

impl Stage5Output {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Output {
    fn name(&self) -> &'static str {
        "stage5_output"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ctx.report = json_writer::build_report(ctx);

        if !ctx.write_json && !ctx.write_csv {
            return Ok(());
        }
        let out = &ctx.output;
        fs::create_dir_all(&out.out_dir)
            .with_context(|| format!("failed to create {}", out.out_dir.display()))?;

        if ctx.write_json {
            json_writer::write_json(&out.json_path, &ctx.report)?;
        }
        if ctx.write_csv {
            csv_writer::write_samples(&out.cohort_csv, &ctx.cohort)?;
            csv_writer::write_frequencies(&out.frequencies_csv, &ctx.frequencies)?;
            csv_writer::write_population_summary(&out.summary_csv, &ctx.summary)?;
            csv_writer::write_group_stats(&out.group_stats_csv, &ctx.group_stats)?;
            // A one-sided split has no inferential table, including one left by an earlier run.
            match &ctx.response {
                Some(ComparisonOutcome::Compared(rows)) => {
                    csv_writer::write_response_comparison_file(&out.response_csv, rows)?;
                }
                _ => remove_stale(&out.response_csv)?,
            }
            if let Some(baseline) = &ctx.baseline {
                csv_writer::write_counts(&out.baseline_projects_csv, &baseline.samples_per_project)?;
                csv_writer::write_counts(&out.baseline_response_csv, &baseline.subjects_per_response)?;
                csv_writer::write_counts(&out.baseline_sex_csv, &baseline.subjects_per_sex)?;
            }
        }

        info!(out_dir = %out.out_dir.display(), "stage5_output_ready");
        Ok(())
    }
}

fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), "stale_output_removed");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to remove {}", path.display())),
    }
}
