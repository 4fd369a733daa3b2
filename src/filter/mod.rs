//! Declarative cohort selection over the denormalized sample table.
//!
//! Fields combine with AND, values within a field with OR. The `All` sentinel
//! on a field removes that field's predicate.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};

use crate::schema::v1::{Response, Sample, Sex};

mod presets;

pub use presets::{Preset, baseline_cohort, response_cohort};

pub const ALL_SENTINEL: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterField {
    Project,
    Subject,
    Condition,
    Treatment,
    SampleType,
    Response,
    Sex,
}

impl FilterField {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterField::Project => "project",
            FilterField::Subject => "subject",
            FilterField::Condition => "condition",
            FilterField::Treatment => "treatment",
            FilterField::SampleType => "sample_type",
            FilterField::Response => "response",
            FilterField::Sex => "sex",
        }
    }

    fn matches(self, sample: &Sample, selected: &BTreeSet<String>) -> bool {
        match self {
            FilterField::Project => selected.contains(&sample.project),
            FilterField::Subject => selected.contains(&sample.subject),
            FilterField::Condition => selected.contains(&sample.condition),
            FilterField::Treatment => selected.contains(&sample.treatment),
            FilterField::SampleType => selected.contains(&sample.sample_type),
            FilterField::Response => selected
                .iter()
                .any(|v| Response::from(v.clone()) == sample.response),
            FilterField::Sex => selected.iter().any(|v| Sex::from(v.clone()) == sample.sex),
        }
    }
}

impl FromStr for FilterField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim() {
            "project" => FilterField::Project,
            "subject" => FilterField::Subject,
            "condition" => FilterField::Condition,
            "treatment" => FilterField::Treatment,
            "sample_type" => FilterField::SampleType,
            "response" => FilterField::Response,
            "sex" => FilterField::Sex,
            other => bail!("unknown filter field '{}'", other),
        })
    }
}

/// Inclusive numeric bounds; a missing bound is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Range {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl Range {
    pub fn new(min: Option<u32>, max: Option<u32>) -> Self {
        Self { min, max }
    }

    pub fn exactly(value: u32) -> Self {
        Self::new(Some(value), Some(value))
    }

    pub fn contains(&self, value: u32) -> bool {
        self.min.is_none_or(|lo| value >= lo) && self.max.is_none_or(|hi| value <= hi)
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    fn intersect(self, other: Range) -> Range {
        let min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Range { min, max }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CohortFilter {
    selections: BTreeMap<FilterField, BTreeSet<String>>,
    pub age: Range,
    pub time_from_treatment_start: Range,
}

impl CohortFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict `field` to `values`. A selection that is empty or contains
    /// `All` clears the field instead.
    pub fn select<I, S>(mut self, field: FilterField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values
            .into_iter()
            .map(Into::into)
            .map(|v| v.trim().to_string())
            .collect();
        if values.is_empty() || values.iter().any(|v| v == ALL_SENTINEL) {
            self.selections.remove(&field);
        } else {
            self.selections.insert(field, values.into_iter().collect());
        }
        self
    }

    pub fn with_age(mut self, range: Range) -> Self {
        self.age = range;
        self
    }

    pub fn with_time_from_treatment_start(mut self, range: Range) -> Self {
        self.time_from_treatment_start = range;
        self
    }

    /// Parse a `field=v1,v2` clause and add it to the filter. Repeated clauses
    /// on one field add their values to the earlier ones; `All` or an empty
    /// value list clears the field.
    pub fn parse_clause(self, clause: &str) -> Result<Self> {
        let Some((field, values)) = clause.split_once('=') else {
            bail!("filter clause '{}' is not of the form field=value[,value]", clause);
        };
        let field: FilterField = field.parse()?;
        let values: Vec<String> = values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect();
        if values.is_empty() || values.iter().any(|v| v == ALL_SENTINEL) {
            return Ok(self.select(field, values));
        }
        let earlier = self.selection(field).cloned().unwrap_or_default();
        Ok(self.select(field, earlier.into_iter().chain(values)))
    }

    /// Logical AND of two filters. Shared fields keep only values selected by both.
    pub fn and(mut self, other: CohortFilter) -> Self {
        for (field, values) in other.selections {
            let merged = match self.selections.remove(&field) {
                Some(existing) => existing.intersection(&values).cloned().collect(),
                None => values,
            };
            self.selections.insert(field, merged);
        }
        self.age = self.age.intersect(other.age);
        self.time_from_treatment_start = self
            .time_from_treatment_start
            .intersect(other.time_from_treatment_start);
        self
    }

    pub fn selection(&self, field: FilterField) -> Option<&BTreeSet<String>> {
        self.selections.get(&field)
    }

    pub fn is_identity(&self) -> bool {
        self.selections.is_empty()
            && self.age.is_unbounded()
            && self.time_from_treatment_start.is_unbounded()
    }

    pub fn matches(&self, sample: &Sample) -> bool {
        self.selections
            .iter()
            .all(|(field, selected)| field.matches(sample, selected))
            && self.age.contains(sample.age)
            && self
                .time_from_treatment_start
                .contains(sample.time_from_treatment_start)
    }

    pub fn apply(&self, samples: &[Sample]) -> Vec<Sample> {
        if self.is_identity() {
            return samples.to_vec();
        }
        samples.iter().filter(|s| self.matches(s)).cloned().collect()
    }
}

impl fmt::Display for CohortFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            return f.write_str(ALL_SENTINEL);
        }
        let mut parts: Vec<String> = self
            .selections
            .iter()
            .map(|(field, values)| {
                let values: Vec<&str> = values.iter().map(String::as_str).collect();
                format!("{}={}", field.as_str(), values.join(","))
            })
            .collect();
        for (name, range) in [
            ("age", self.age),
            ("time_from_treatment_start", self.time_from_treatment_start),
        ] {
            if range.is_unbounded() {
                continue;
            }
            let lo = range.min.map(|v| v.to_string()).unwrap_or_default();
            let hi = range.max.map(|v| v.to_string()).unwrap_or_default();
            parts.push(format!("{}={}..{}", name, lo, hi));
        }
        f.write_str(&parts.join(" AND "))
    }
}
