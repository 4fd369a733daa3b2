use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage2Filter;

impl Stage2Filter {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Filter {
    fn name(&self) -> &'static str {
        "stage2_filter"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let filter = ctx.effective_filter();
        ctx.cohort = filter.apply(&ctx.samples);
        info!(
            filter = %filter,
            preset = ctx.preset.as_str(),
            total = ctx.samples.len(),
            selected = ctx.cohort.len(),
            "cohort_selected"
        );
        if ctx.cohort.is_empty() && !ctx.samples.is_empty() {
            warn!(filter = %filter, "no samples match the selected filters");
            ctx.warnings
                .push(format!("no samples match the selected filters ({})", filter));
        }
        Ok(())
    }
}
