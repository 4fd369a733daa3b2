use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::{Ctx, StoreStatus};
use crate::pipeline::Stage;
use crate::store::{SampleStore, StoreError};

pub struct Stage0Store;

impl Stage0Store {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage0Store {
    fn name(&self) -> &'static str {
        "stage0_store"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        match SampleStore::open(&ctx.db_path) {
            Ok(store) => {
                info!(store = %ctx.db_path.display(), "store_opened");
                ctx.store = Some(store);
            }
            Err(StoreError::Unavailable(reason)) => {
                warn!(store = %ctx.db_path.display(), %reason, "store unavailable");
                ctx.warnings.push(format!("store unavailable: {}", reason));
                ctx.store = None;
                ctx.store_status = StoreStatus::Unavailable(reason);
            }
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }
}
