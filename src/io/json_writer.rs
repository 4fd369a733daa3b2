use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::schema::v1::{CohortReportV1, InputMeta};

pub fn build_report(ctx: &Ctx) -> CohortReportV1 {
    let mut report = CohortReportV1::empty(&ctx.tool_version);
    report.input_meta = InputMeta {
        store: ctx.db_path.display().to_string(),
        store_status: ctx.store_status.to_string(),
        total_samples: ctx.samples.len(),
        cohort_samples: ctx.cohort.len(),
        filter: ctx.effective_filter().to_string(),
        group_by: ctx.group_by.as_str().to_string(),
    };
    report.population_summary = ctx.summary.clone();
    report.group_stats = ctx.group_stats.clone();
    report.response_comparison = ctx.response.clone();
    report.baseline = ctx.baseline.clone();
    report.warnings = ctx.warnings.clone();
    report
}

pub fn write_json(path: &Path, report: &CohortReportV1) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}
