use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};

use crate::ctx::Ctx;

pub mod stage0_store;
pub mod stage1_load;
pub mod stage2_filter;
pub mod stage3_frequency;
pub mod stage4_compare;
pub mod stage5_output;

pub trait Stage {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut Ctx) -> Result<()>;
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Store through filter; enough for a cohort snapshot.
    pub fn cohort() -> Self {
        Self::new(vec![
            Box::new(stage0_store::Stage0Store::new()),
            Box::new(stage1_load::Stage1Load::new()),
            Box::new(stage2_filter::Stage2Filter::new()),
        ])
    }

    pub fn analysis() -> Self {
        Self::new(vec![
            Box::new(stage0_store::Stage0Store::new()),
            Box::new(stage1_load::Stage1Load::new()),
            Box::new(stage2_filter::Stage2Filter::new()),
            Box::new(stage3_frequency::Stage3Frequency::new()),
            Box::new(stage4_compare::Stage4Compare::new()),
            Box::new(stage5_output::Stage5Output::new()),
        ])
    }

    pub fn run(&self, ctx: &mut Ctx) -> Result<()> {
        for stage in &self.stages {
            let start = Instant::now();
            info!(stage = stage.name(), "stage started");
            if let Err(err) = stage.run(ctx) {
                let elapsed_ms = start.elapsed().as_millis();
                warn!(
                    stage = stage.name(),
                    elapsed_ms = elapsed_ms as u64,
                    "stage failed"
                );
                return Err(err);
            }
            let elapsed_ms = start.elapsed().as_millis();
            info!(
                stage = stage.name(),
                elapsed_ms = elapsed_ms as u64,
                "stage finished"
            );
        }
        Ok(())
    }
}
