use super::{CohortFilter, FilterField, Range};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    None,
    Baseline,
    Response,
}

impl Preset {
    pub fn filter(self) -> CohortFilter {
        match self {
            Preset::None => CohortFilter::new(),
            Preset::Baseline => baseline_cohort(),
            Preset::Response => response_cohort(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::None => "none",
            Preset::Baseline => "baseline",
            Preset::Response => "response",
        }
    }
}

/// Melanoma PBMC samples on tr1 taken at treatment start.
pub fn baseline_cohort() -> CohortFilter {
    response_cohort().with_time_from_treatment_start(Range::exactly(0))
}

/// Melanoma PBMC samples on tr1, all time points.
pub fn response_cohort() -> CohortFilter {
    CohortFilter::new()
        .select(FilterField::Condition, ["melanoma"])
        .select(FilterField::SampleType, ["PBMC"])
        .select(FilterField::Treatment, ["tr1"])
}
