use std::collections::{BTreeMap, HashMap};

use crate::math::stats::{
    cohens_d, mean, median, min_max, round2, sample_std, student_t_test,
};
use crate::schema::v1::{
    ComparisonOutcome, FrequencyRow, GroupStats, Population, Response, ResponseComparison, Sample,
    Significance,
};

pub const INSUFFICIENT_DATA: &str = "insufficient data for comparison";

/// Sample attribute used to split frequency rows into cohorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CohortKey {
    Treatment,
    Condition,
    Response,
    Project,
    SampleType,
    Sex,
}

impl CohortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            CohortKey::Treatment => "treatment",
            CohortKey::Condition => "condition",
            CohortKey::Response => "response",
            CohortKey::Project => "project",
            CohortKey::SampleType => "sample_type",
            CohortKey::Sex => "sex",
        }
    }

    pub fn label(self, sample: &Sample) -> String {
        match self {
            CohortKey::Treatment => sample.treatment.clone(),
            CohortKey::Condition => sample.condition.clone(),
            CohortKey::Response => sample.response.label().to_string(),
            CohortKey::Project => sample.project.clone(),
            CohortKey::SampleType => sample.sample_type.clone(),
            CohortKey::Sex => sample.sex.as_str().to_string(),
        }
    }
}

/// Attach a cohort label to each frequency row. Rows whose sample is not in
/// `samples` are dropped.
pub fn label_rows<'a>(
    rows: &'a [FrequencyRow],
    samples: &[Sample],
    key: CohortKey,
) -> Vec<(String, &'a FrequencyRow)> {
    let labels: HashMap<&str, String> = samples
        .iter()
        .map(|s| (s.sample.as_str(), key.label(s)))
        .collect();
    rows.iter()
        .filter_map(|row| {
            labels
                .get(row.sample.as_str())
                .map(|label| (label.clone(), row))
        })
        .collect()
}

/// Descriptive statistics per (cohort, population). Groups without members
/// never appear.
pub fn group_stats(labeled: &[(String, &FrequencyRow)]) -> Vec<GroupStats> {
    let mut groups: BTreeMap<(String, Population), Vec<f64>> = BTreeMap::new();
    for (label, row) in labeled {
        groups
            .entry((label.clone(), row.population))
            .or_default()
            .push(row.percentage);
    }

    groups
        .into_iter()
        .map(|((cohort, population), mut values)| {
            let (min, max) = min_max(&values);
            GroupStats {
                cohort,
                population,
                n: values.len(),
                mean: round2(mean(&values)),
                std: round2(sample_std(&values)),
                min: round2(min),
                max: round2(max),
                median: round2(median(&mut values)),
            }
        })
        .collect()
}

pub fn group_stats_by(rows: &[FrequencyRow], samples: &[Sample], key: CohortKey) -> Vec<GroupStats> {
    group_stats(&label_rows(rows, samples, key))
}

/// Responders versus non-responders, one row per population.
///
/// Samples with unknown response are left out. If either side has no samples
/// at all the outcome is `Insufficient`.
pub fn compare_response(rows: &[FrequencyRow], samples: &[Sample]) -> ComparisonOutcome {
    let response: HashMap<&str, Response> = samples
        .iter()
        .map(|s| (s.sample.as_str(), s.response))
        .collect();

    let mut responders: BTreeMap<Population, Vec<f64>> = BTreeMap::new();
    let mut non_responders: BTreeMap<Population, Vec<f64>> = BTreeMap::new();
    for row in rows {
        match response.get(row.sample.as_str()) {
            Some(Response::Responder) => responders
                .entry(row.population)
                .or_default()
                .push(row.percentage),
            Some(Response::NonResponder) => non_responders
                .entry(row.population)
                .or_default()
                .push(row.percentage),
            _ => {}
        }
    }

    if responders.is_empty() || non_responders.is_empty() {
        return ComparisonOutcome::Insufficient(INSUFFICIENT_DATA.to_string());
    }

    let table = Population::ALL
        .iter()
        .filter_map(|population| {
            let a = responders.get(population).filter(|v| !v.is_empty())?;
            let b = non_responders.get(population).filter(|v| !v.is_empty())?;
            Some(compare_population(*population, a, b))
        })
        .collect();

    ComparisonOutcome::Compared(table)
}

fn compare_population(population: Population, a: &[f64], b: &[f64]) -> ResponseComparison {
    let test = student_t_test(a, b);
    let significance = match test {
        Some(t) => Significance::from_p_value(t.p_value),
        None => Significance::Insufficient,
    };
    ResponseComparison {
        population,
        responder_n: a.len(),
        responder_mean: round2(mean(a)),
        responder_std: round2(sample_std(a)),
        non_responder_n: b.len(),
        non_responder_mean: round2(mean(b)),
        non_responder_std: round2(sample_std(b)),
        mean_difference: round2(mean(a) - mean(b)),
        t_stat: test.map(|t| t.t_stat),
        p_value: test.map(|t| t.p_value),
        cohens_d: cohens_d(a, b),
        significance,
    }
}
