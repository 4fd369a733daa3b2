use anyhow::Result;
use tracing::warn;

use crate::ctx::{Ctx, StoreStatus};
use crate::pipeline::Stage;
use crate::store::StoreError;

pub struct Stage1Load;

impl Stage1Load {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Load {
    fn name(&self) -> &'static str {
        "stage1_load"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let Some(store) = ctx.store.as_ref() else {
            ctx.samples.clear();
            return Ok(());
        };

        match store.load() {
            Ok(samples) => {
                ctx.store_status = if samples.is_empty() {
                    StoreStatus::Empty
                } else {
                    StoreStatus::Loaded(samples.len())
                };
                ctx.samples = samples;
            }
            // A missing or corrupt file is an empty view, not a failed request.
            Err(StoreError::Unavailable(reason)) => {
                warn!(%reason, "store unavailable");
                ctx.warnings.push(format!("store unavailable: {}", reason));
                ctx.samples.clear();
                ctx.store_status = StoreStatus::Unavailable(reason);
            }
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }
}
