use std::fmt;
use std::path::PathBuf;

use crate::filter::{CohortFilter, Preset};
use crate::schema::v1::{
    BaselineSummary, CohortReportV1, ComparisonOutcome, FrequencyRow, GroupStats,
    PopulationSummary, Sample,
};
use crate::scores::CohortKey;
use crate::store::SampleStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreStatus {
    NotLoaded,
    Loaded(usize),
    Empty,
    Unavailable(String),
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreStatus::NotLoaded => f.write_str("not loaded"),
            StoreStatus::Loaded(n) => write!(f, "loaded {} samples", n),
            StoreStatus::Empty => f.write_str("no data in store"),
            StoreStatus::Unavailable(reason) => write!(f, "unavailable: {}", reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub json_path: PathBuf,
    pub cohort_csv: PathBuf,
    pub frequencies_csv: PathBuf,
    pub summary_csv: PathBuf,
    pub group_stats_csv: PathBuf,
    pub response_csv: PathBuf,
    pub baseline_projects_csv: PathBuf,
    pub baseline_response_csv: PathBuf,
    pub baseline_sex_csv: PathBuf,
}

impl OutputPaths {
    pub fn new(out_dir: PathBuf) -> Self {
        Self {
            json_path: out_dir.join("cohort_report.json"),
            cohort_csv: out_dir.join("cohort.csv"),
            frequencies_csv: out_dir.join("frequencies.csv"),
            summary_csv: out_dir.join("summary_stats.csv"),
            group_stats_csv: out_dir.join("group_stats.csv"),
            response_csv: out_dir.join("response_comparison.csv"),
            baseline_projects_csv: out_dir.join("baseline_samples_per_project.csv"),
            baseline_response_csv: out_dir.join("baseline_subjects_per_response.csv"),
            baseline_sex_csv: out_dir.join("baseline_subjects_per_sex.csv"),
            out_dir,
        }
    }
}

/// State of one request, from store load to written artifacts.
#[derive(Debug)]
pub struct Ctx {
    pub db_path: PathBuf,
    pub tool_version: String,
    pub preset: Preset,
    pub filter: CohortFilter,
    pub group_by: CohortKey,
    pub threads: usize,
    pub write_json: bool,
    pub write_csv: bool,
    pub store: Option<SampleStore>,
    pub store_status: StoreStatus,
    pub samples: Vec<Sample>,
    pub cohort: Vec<Sample>,
    pub frequencies: Vec<FrequencyRow>,
    pub summary: Vec<PopulationSummary>,
    pub group_stats: Vec<GroupStats>,
    pub response: Option<ComparisonOutcome>,
    pub baseline: Option<BaselineSummary>,
    pub warnings: Vec<String>,
    pub output: OutputPaths,
    pub report: CohortReportV1,
}

impl Ctx {
    pub fn new(db_path: PathBuf, out_dir: PathBuf, tool_version: &str) -> Self {
        Self {
            db_path,
            tool_version: tool_version.to_string(),
            preset: Preset::None,
            filter: CohortFilter::new(),
            group_by: CohortKey::Treatment,
            threads: 0,
            write_json: false,
            write_csv: false,
            store: None,
            store_status: StoreStatus::NotLoaded,
            samples: Vec::new(),
            cohort: Vec::new(),
            frequencies: Vec::new(),
            summary: Vec::new(),
            group_stats: Vec::new(),
            response: None,
            baseline: None,
            warnings: Vec::new(),
            output: OutputPaths::new(out_dir),
            report: CohortReportV1::empty(tool_version),
        }
    }

    /// Preset and user filter combined.
    pub fn effective_filter(&self) -> CohortFilter {
        self.preset.filter().and(self.filter.clone())
    }
}
