use std::fs;
use std::path::Path;

use kira_cellcohort::ctx::{Ctx, StoreStatus};
use kira_cellcohort::filter::{FilterField, Preset};
use kira_cellcohort::pipeline::Pipeline;
use kira_cellcohort::schema::v1::{ComparisonOutcome, Response, Sample, Sex};
use kira_cellcohort::scores::CohortKey;
use kira_cellcohort::store::SampleStore;
use tempfile::TempDir;

fn sample(id: &str, project: &str, response: Response, cd8: u64, time: u32) -> Sample {
    Sample {
        sample: id.to_string(),
        project: project.to_string(),
        subject: format!("SUB_{}", id),
        age: 50,
        sex: if id.ends_with('1') { Sex::M } else { Sex::F },
        condition: "melanoma".to_string(),
        treatment: "tr1".to_string(),
        sample_type: "PBMC".to_string(),
        time_from_treatment_start: time,
        response,
        b_cell: Some(100 - cd8),
        cd8_t_cell: Some(cd8),
        cd4_t_cell: Some(0),
        nk_cell: Some(0),
        monocyte: Some(0),
    }
}

fn seeded_store(dir: &Path) -> std::path::PathBuf {
    let db = dir.join("samples.db");
    let store = SampleStore::open_or_init(&db).unwrap();
    store
        .insert(&[
            sample("S1", "P1", Response::Responder, 60, 0),
            sample("S2", "P1", Response::Responder, 62, 0),
            sample("S3", "P2", Response::Responder, 64, 7),
            sample("S4", "P1", Response::NonResponder, 20, 0),
            sample("S5", "P2", Response::NonResponder, 22, 0),
            sample("S6", "P2", Response::NonResponder, 24, 14),
        ])
        .unwrap();
    db
}

fn first_line(path: &Path) -> String {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}

#[test]
fn analysis_writes_every_artifact() {
    let tmp = TempDir::new().unwrap();
    let db = seeded_store(tmp.path());
    let out = tmp.path().join("out");

    let mut ctx = Ctx::new(db, out.clone(), "test");
    ctx.group_by = CohortKey::Project;
    ctx.write_json = true;
    ctx.write_csv = true;
    Pipeline::analysis().run(&mut ctx).unwrap();

    assert_eq!(ctx.store_status, StoreStatus::Loaded(6));
    assert_eq!(ctx.cohort.len(), 6);
    assert_eq!(ctx.frequencies.len(), 30);
    assert!(matches!(ctx.response, Some(ComparisonOutcome::Compared(_))));
    assert_eq!(ctx.baseline.as_ref().unwrap().n_samples, 4);

    for name in [
        "cohort_report.json",
        "cohort.csv",
        "frequencies.csv",
        "summary_stats.csv",
        "group_stats.csv",
        "response_comparison.csv",
        "baseline_samples_per_project.csv",
        "baseline_subjects_per_response.csv",
        "baseline_subjects_per_sex.csv",
    ] {
        assert!(out.join(name).exists(), "missing {}", name);
    }

    assert_eq!(
        first_line(&out.join("frequencies.csv")),
        "sample,total_count,population,count,percentage"
    );
    assert_eq!(
        first_line(&out.join("group_stats.csv")),
        "cohort,population,n,mean,std,min,max,median"
    );
    assert!(first_line(&out.join("response_comparison.csv")).starts_with("population,responder_n"));
    assert_eq!(first_line(&out.join("baseline_subjects_per_sex.csv")), "label,count");
}

#[test]
fn filter_and_preset_narrow_the_cohort() {
    let tmp = TempDir::new().unwrap();
    let db = seeded_store(tmp.path());

    let mut ctx = Ctx::new(db, tmp.path().join("out"), "test");
    ctx.preset = Preset::Baseline;
    ctx.filter = ctx.filter.clone().select(FilterField::Project, ["P1"]);
    Pipeline::cohort().run(&mut ctx).unwrap();

    let ids: Vec<&str> = ctx.cohort.iter().map(|s| s.sample.as_str()).collect();
    assert_eq!(ids, vec!["S1", "S2", "S4"]);
    assert!(!tmp.path().join("out").exists());
}

#[test]
fn one_sided_cohort_clears_response_table() {
    let tmp = TempDir::new().unwrap();
    let db = seeded_store(tmp.path());
    let out = tmp.path().join("out");

    let mut first = Ctx::new(db.clone(), out.clone(), "test");
    first.write_csv = true;
    Pipeline::analysis().run(&mut first).unwrap();
    assert!(out.join("response_comparison.csv").exists());

    let mut ctx = Ctx::new(db, out.clone(), "test");
    ctx.filter = ctx.filter.clone().select(FilterField::Response, ["y"]);
    ctx.write_csv = true;
    Pipeline::analysis().run(&mut ctx).unwrap();

    assert!(matches!(ctx.response, Some(ComparisonOutcome::Insufficient(_))));
    assert!(ctx.warnings.iter().any(|w| w.contains("response comparison")));
    assert!(out.join("frequencies.csv").exists());
    assert!(!out.join("response_comparison.csv").exists());
}

#[test]
fn missing_store_yields_empty_analysis() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");

    let mut ctx = Ctx::new(tmp.path().join("absent.db"), out.clone(), "test");
    ctx.write_csv = true;
    Pipeline::analysis().run(&mut ctx).unwrap();

    assert!(matches!(ctx.store_status, StoreStatus::Unavailable(_)));
    assert!(ctx.samples.is_empty());
    assert!(ctx.cohort.is_empty());
    assert!(ctx.frequencies.is_empty());
    assert!(ctx.warnings.iter().any(|w| w.contains("store unavailable")));
    assert_eq!(
        fs::read_to_string(out.join("frequencies.csv")).unwrap().trim_end(),
        "sample,total_count,population,count,percentage"
    );
}

#[test]
fn filter_matching_nothing_is_a_warning() {
    let tmp = TempDir::new().unwrap();
    let db = seeded_store(tmp.path());

    let mut ctx = Ctx::new(db, tmp.path().join("out"), "test");
    ctx.filter = ctx.filter.clone().select(FilterField::Project, ["P404"]);
    Pipeline::analysis().run(&mut ctx).unwrap();

    assert!(ctx.cohort.is_empty());
    assert!(ctx.warnings.iter().any(|w| w.contains("no samples match")));
    assert!(ctx.summary.is_empty());
}
