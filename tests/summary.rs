use std::path::PathBuf;

use kira_cellcohort::ctx::{Ctx, StoreStatus};
use kira_cellcohort::io::summary::format_summary;
use kira_cellcohort::schema::v1::{BaselineSummary, ComparisonOutcome};

fn ctx() -> Ctx {
    Ctx::new(PathBuf::from("samples.db"), PathBuf::from("out"), "test")
}

#[test]
fn summary_for_unavailable_store() {
    let mut ctx = ctx();
    ctx.store_status = StoreStatus::Unavailable("samples.db does not exist".to_string());
    ctx.warnings.push("store unavailable".to_string());
    let text = format_summary(&ctx);

    assert!(text.starts_with("kira-cellcohort v"));
    assert!(text.contains("Store: samples.db (unavailable: samples.db does not exist)"));
    assert!(text.contains("Cohort: 0 of 0 samples"));
    assert!(text.contains("Warnings: 1"));
    assert!(!text.contains("Mean frequency"));
}

#[test]
fn summary_reports_insufficient_comparison_and_baseline() {
    let mut ctx = ctx();
    ctx.response = Some(ComparisonOutcome::Insufficient(
        "insufficient data for comparison".to_string(),
    ));
    ctx.baseline = Some(BaselineSummary {
        n_samples: 3,
        samples_per_project: Vec::new(),
        subjects_per_response: Vec::new(),
        subjects_per_sex: Vec::new(),
    });
    let text = format_summary(&ctx);

    assert!(text.contains("Responder vs non-responder: insufficient data for comparison"));
    assert!(text.contains("Baseline cohort: 3 samples"));
    assert!(!text.contains("Warnings"));
}

#[test]
fn summary_lists_no_significant_differences() {
    let mut ctx = ctx();
    ctx.response = Some(ComparisonOutcome::Compared(Vec::new()));
    let text = format_summary(&ctx);
    assert!(text.contains("no significant differences"));
}
