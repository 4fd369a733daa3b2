use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::filter::{CohortFilter, Preset, Range};
use crate::schema::v1::{Response, Sample, Sex};
use crate::scores::CohortKey;

#[derive(Debug, Parser)]
#[command(
    name = "kira-cellcohort",
    version,
    about = "Immune cell-count cohort browser"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the store schema if absent
    Init(StoreArgs),
    /// Load a cell-count CSV into the store (replaces content unless --append)
    Load(LoadArgs),
    /// Add a single sample
    Add(AddArgs),
    /// Remove a sample and its cell counts
    Remove(RemoveArgs),
    /// Drop and recreate every table
    Reset(StoreArgs),
    /// Frequency, comparison and baseline analysis of a cohort
    Analyze(AnalyzeArgs),
    /// Write the filtered cohort as CSV
    Export(ExportArgs),
}

#[derive(Debug, Args)]
pub struct StoreArgs {
    #[arg(long, env = "KIRA_CELLCOHORT_DB", default_value = "samples.db")]
    pub db: PathBuf,
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long, help = "Input CSV with one row per sample")]
    pub csv: PathBuf,

    #[arg(long, default_value_t = false)]
    pub append: bool,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long)]
    pub sample: String,
    #[arg(long)]
    pub project: String,
    #[arg(long)]
    pub subject: String,
    #[arg(long)]
    pub condition: String,
    #[arg(long)]
    pub treatment: String,
    #[arg(long, default_value_t = 50)]
    pub age: u32,
    #[arg(long, value_enum, default_value_t = SexArg::M)]
    pub sex: SexArg,
    #[arg(long, value_enum, help = "Omitted means unknown")]
    pub response: Option<ResponseArg>,
    #[arg(long, default_value = "PBMC")]
    pub sample_type: String,
    #[arg(long, default_value_t = 0)]
    pub time_from_treatment_start: u32,
    #[arg(long, default_value_t = 0)]
    pub b_cell: u64,
    #[arg(long, default_value_t = 0)]
    pub cd8_t_cell: u64,
    #[arg(long, default_value_t = 0)]
    pub cd4_t_cell: u64,
    #[arg(long, default_value_t = 0)]
    pub nk_cell: u64,
    #[arg(long, default_value_t = 0)]
    pub monocyte: u64,
}

impl AddArgs {
    pub fn to_sample(&self) -> Sample {
        Sample {
            sample: self.sample.trim().to_string(),
            project: self.project.trim().to_string(),
            subject: self.subject.trim().to_string(),
            age: self.age,
            sex: match self.sex {
                SexArg::M => Sex::M,
                SexArg::F => Sex::F,
            },
            condition: self.condition.trim().to_string(),
            treatment: self.treatment.trim().to_string(),
            sample_type: self.sample_type.trim().to_string(),
            time_from_treatment_start: self.time_from_treatment_start,
            response: self.response.map_or(Response::Unknown, Response::from),
            b_cell: Some(self.b_cell),
            cd8_t_cell: Some(self.cd8_t_cell),
            cd4_t_cell: Some(self.cd4_t_cell),
            nk_cell: Some(self.nk_cell),
            monocyte: Some(self.monocyte),
        }
    }
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long)]
    pub sample: String,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    #[arg(long, value_enum, default_value_t = PresetArg::None)]
    pub preset: PresetArg,

    #[arg(
        long = "filter",
        help = "Cohort predicate field=v1,v2 (repeatable; 'All' disables the field)"
    )]
    pub filters: Vec<String>,

    #[arg(long)]
    pub min_age: Option<u32>,
    #[arg(long)]
    pub max_age: Option<u32>,
    #[arg(long)]
    pub min_time: Option<u32>,
    #[arg(long)]
    pub max_time: Option<u32>,
}

impl FilterArgs {
    pub fn preset(&self) -> Preset {
        match self.preset {
            PresetArg::None => Preset::None,
            PresetArg::Baseline => Preset::Baseline,
            PresetArg::Response => Preset::Response,
        }
    }

    pub fn cohort_filter(&self) -> anyhow::Result<CohortFilter> {
        let mut filter = CohortFilter::new();
        for clause in &self.filters {
            filter = filter.parse_clause(clause)?;
        }
        Ok(filter
            .with_age(Range::new(self.min_age, self.max_age))
            .with_time_from_treatment_start(Range::new(self.min_time, self.max_time)))
    }
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, value_enum, default_value_t = CohortKeyArg::Treatment)]
    pub by: CohortKeyArg,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, default_value_t = false)]
    pub csv: bool,

    #[arg(long, default_value_t = 0, help = "Number of threads (0 = auto)")]
    pub threads: usize,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[arg(long, help = "Output CSV path (stdout when omitted)")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SexArg {
    M,
    F,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResponseArg {
    Y,
    N,
}

impl From<ResponseArg> for Response {
    fn from(value: ResponseArg) -> Self {
        match value {
            ResponseArg::Y => Response::Responder,
            ResponseArg::N => Response::NonResponder,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PresetArg {
    None,
    Baseline,
    Response,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CohortKeyArg {
    Treatment,
    Condition,
    Response,
    Project,
    SampleType,
    Sex,
}

impl From<CohortKeyArg> for CohortKey {
    fn from(value: CohortKeyArg) -> Self {
        match value {
            CohortKeyArg::Treatment => CohortKey::Treatment,
            CohortKeyArg::Condition => CohortKey::Condition,
            CohortKeyArg::Response => CohortKey::Response,
            CohortKeyArg::Project => CohortKey::Project,
            CohortKeyArg::SampleType => CohortKey::SampleType,
            CohortKeyArg::Sex => CohortKey::Sex,
        }
    }
}
