use std::collections::{BTreeMap, BTreeSet};

use crate::schema::v1::{BaselineSummary, CountRow, Response, Sample};

pub fn samples_per_project(samples: &[Sample]) -> Vec<CountRow> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for s in samples {
        *counts.entry(s.project.as_str()).or_default() += 1;
    }
    to_rows(counts)
}

/// Distinct subjects per response label. Subjects with unknown response are
/// not counted.
pub fn subjects_per_response(samples: &[Sample]) -> Vec<CountRow> {
    let mut subjects: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for s in samples.iter().filter(|s| s.response != Response::Unknown) {
        subjects
            .entry(s.response.label())
            .or_default()
            .insert(s.subject.as_str());
    }
    to_rows(subjects.into_iter().map(|(k, v)| (k, v.len())).collect())
}

/// Distinct subjects per sex.
pub fn subjects_per_sex(samples: &[Sample]) -> Vec<CountRow> {
    let mut subjects: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for s in samples {
        subjects
            .entry(s.sex.as_str())
            .or_default()
            .insert(s.subject.as_str());
    }
    to_rows(subjects.into_iter().map(|(k, v)| (k, v.len())).collect())
}

pub fn baseline_summary(samples: &[Sample]) -> BaselineSummary {
    BaselineSummary {
        n_samples: samples.len(),
        samples_per_project: samples_per_project(samples),
        subjects_per_response: subjects_per_response(samples),
        subjects_per_sex: subjects_per_sex(samples),
    }
}

fn to_rows(counts: BTreeMap<&str, usize>) -> Vec<CountRow> {
    counts
        .into_iter()
        .map(|(label, count)| CountRow {
            label: label.to_string(),
            count,
        })
        .collect()
}
