use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::signals;

pub struct Stage2Signals;

impl Stage2Signals {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Signals {
    fn name(&self) -> &'static str {
        "stage2_signals"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let config = ctx.config.as_ref().context("site config not loaded")?;
        let merged = signals::collect(&ctx.sources, config)?;
        if merged.as_of.is_none() {
            warn!("no observation time in signals; scoring at generation time");
            ctx.warnings
                .push("signals carry no as_of; evaluated at generation time".to_string());
        }
        info!(signals = merged.len(), "signals merged");
        ctx.signals = merged;
        Ok(())
    }
}
