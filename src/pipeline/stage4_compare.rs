use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::filter::baseline_cohort;
use crate::pipeline::Stage;
use crate::schema::v1::ComparisonOutcome;
use crate::scores::baseline::baseline_summary;
use crate::scores::comparison::{compare_response, group_stats_by};

pub struct Stage4Compare;

impl Stage4Compare {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Compare {
    fn name(&self) -> &'static str {
        "stage4_compare"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ctx.group_stats = group_stats_by(&ctx.frequencies, &ctx.cohort, ctx.group_by);

        let outcome = compare_response(&ctx.frequencies, &ctx.cohort);
        if let ComparisonOutcome::Insufficient(reason) = &outcome {
            warn!(%reason, "response comparison skipped");
            ctx.warnings.push(format!("response comparison: {}", reason));
        }
        ctx.response = Some(outcome);

        // Baseline breakdowns always describe the fixed baseline cohort of the whole store.
        let baseline = baseline_cohort().apply(&ctx.samples);
        if baseline.is_empty() {
            ctx.warnings
                .push("baseline cohort: insufficient data (no matching samples)".to_string());
        }
        ctx.baseline = Some(baseline_summary(&baseline));

        info!(
            groups = ctx.group_stats.len(),
            group_by = ctx.group_by.as_str(),
            baseline_samples = baseline.len(),
            "comparisons_ready"
        );
        Ok(())
    }
}
