use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scores::frequency::{compute_frequencies, summary_statistics};

pub struct Stage3Frequency;

impl Stage3Frequency {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Frequency {
    fn name(&self) -> &'static str {
        "stage3_frequency"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ctx.frequencies = compute_frequencies(&ctx.cohort, ctx.threads)?;
        ctx.summary = summary_statistics(&ctx.frequencies);
        info!(rows = ctx.frequencies.len(), "frequencies_ready");
        Ok(())
    }
}
