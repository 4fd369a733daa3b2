use std::fmt;

use serde::{Deserialize, Serialize};

/// The five measured immune cell populations, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Population {
    #[serde(rename = "b_cell")]
    BCell,
    #[serde(rename = "cd8_t_cell")]
    Cd8TCell,
    #[serde(rename = "cd4_t_cell")]
    Cd4TCell,
    #[serde(rename = "nk_cell")]
    NkCell,
    #[serde(rename = "monocyte")]
    Monocyte,
}

impl Population {
    pub const ALL: [Population; 5] = [
        Population::BCell,
        Population::Cd8TCell,
        Population::Cd4TCell,
        Population::NkCell,
        Population::Monocyte,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Population::BCell => "b_cell",
            Population::Cd8TCell => "cd8_t_cell",
            Population::Cd4TCell => "cd4_t_cell",
            Population::NkCell => "nk_cell",
            Population::Monocyte => "monocyte",
        }
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sex {
    M,
    F,
    Unknown,
}

impl From<String> for Sex {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Sex::M,
            "f" | "female" => Sex::F,
            _ => Sex::Unknown,
        }
    }
}

impl From<Sex> for String {
    fn from(value: Sex) -> Self {
        value.as_str().to_string()
    }
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::M => "M",
            Sex::F => "F",
            Sex::Unknown => "unknown",
        }
    }
}

/// Treatment response. Stored and exported in the short `y` / `n` / empty form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Response {
    Responder,
    NonResponder,
    Unknown,
}

impl From<String> for Response {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "responder" => Response::Responder,
            "n" | "no" | "non-responder" | "non_responder" => Response::NonResponder,
            _ => Response::Unknown,
        }
    }
}

impl From<Response> for String {
    fn from(value: Response) -> Self {
        value.code().to_string()
    }
}

impl Response {
    pub fn code(self) -> &'static str {
        match self {
            Response::Responder => "y",
            Response::NonResponder => "n",
            Response::Unknown => "",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Response::Responder => "responder",
            Response::NonResponder => "non-responder",
            Response::Unknown => "unknown",
        }
    }
}

/// One row of the denormalized sample table. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub sample: String,
    pub project: String,
    pub subject: String,
    pub age: u32,
    pub sex: Sex,
    pub condition: String,
    pub treatment: String,
    pub sample_type: String,
    pub time_from_treatment_start: u32,
    pub response: Response,
    pub b_cell: Option<u64>,
    pub cd8_t_cell: Option<u64>,
    pub cd4_t_cell: Option<u64>,
    pub nk_cell: Option<u64>,
    pub monocyte: Option<u64>,
}

impl Sample {
    pub fn count(&self, population: Population) -> Option<u64> {
        match population {
            Population::BCell => self.b_cell,
            Population::Cd8TCell => self.cd8_t_cell,
            Population::Cd4TCell => self.cd4_t_cell,
            Population::NkCell => self.nk_cell,
            Population::Monocyte => self.monocyte,
        }
    }

    /// Sum of the five counts with missing values taken as zero. Saturates at
    /// `u64::MAX`.
    pub fn total_count(&self) -> u64 {
        Population::ALL
            .iter()
            .map(|p| self.count(*p).unwrap_or(0))
            .fold(0, u64::saturating_add)
    }

    pub fn subject_profile(&self) -> Subject {
        Subject {
            subject: self.subject.clone(),
            age: self.age,
            sex: self.sex,
            condition: self.condition.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub subject: String,
    pub age: u32,
    pub sex: Sex,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRow {
    pub sample: String,
    pub total_count: u64,
    pub population: Population,
    pub count: u64,
    pub percentage: f64,
}

/// Per-population distribution of percentages across a set of samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSummary {
    pub population: Population,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub cohort: String,
    pub population: Population,
    pub n: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Significance {
    #[serde(rename = "***")]
    VeryHigh,
    #[serde(rename = "**")]
    High,
    #[serde(rename = "*")]
    Low,
    #[serde(rename = "ns")]
    NotSignificant,
    #[serde(rename = "insufficient data")]
    Insufficient,
}

impl Significance {
    pub fn from_p_value(p: f64) -> Self {
        if p < 0.001 {
            Significance::VeryHigh
        } else if p < 0.01 {
            Significance::High
        } else if p < 0.05 {
            Significance::Low
        } else {
            Significance::NotSignificant
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Significance::VeryHigh => "***",
            Significance::High => "**",
            Significance::Low => "*",
            Significance::NotSignificant => "ns",
            Significance::Insufficient => "insufficient data",
        }
    }
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseComparison {
    pub population: Population,
    pub responder_n: usize,
    pub responder_mean: f64,
    pub responder_std: f64,
    pub non_responder_n: usize,
    pub non_responder_mean: f64,
    pub non_responder_std: f64,
    pub mean_difference: f64,
    pub t_stat: Option<f64>,
    pub p_value: Option<f64>,
    pub cohens_d: f64,
    pub significance: Significance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Compared(Vec<ResponseComparison>),
    Insufficient(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRow {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineSummary {
    pub n_samples: usize,
    pub samples_per_project: Vec<CountRow>,
    pub subjects_per_response: Vec<CountRow>,
    pub subjects_per_sex: Vec<CountRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputMeta {
    pub store: String,
    pub store_status: String,
    pub total_samples: usize,
    pub cohort_samples: usize,
    pub filter: String,
    pub group_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortReportV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub input_meta: InputMeta,
    pub population_summary: Vec<PopulationSummary>,
    pub group_stats: Vec<GroupStats>,
    pub response_comparison: Option<ComparisonOutcome>,
    pub baseline: Option<BaselineSummary>,
    pub warnings: Vec<String>,
}

impl CohortReportV1 {
    pub fn empty(tool_version: &str) -> Self {
        Self {
            tool: "kira-cellcohort".to_string(),
            version: tool_version.to_string(),
            schema_version: "v1".to_string(),
            input_meta: InputMeta {
                store: String::new(),
                store_status: String::new(),
                total_samples: 0,
                cohort_samples: 0,
                filter: String::new(),
                group_by: String::new(),
            },
            population_summary: Vec::new(),
            group_stats: Vec::new(),
            response_comparison: None,
            baseline: None,
            warnings: Vec::new(),
        }
    }
}
