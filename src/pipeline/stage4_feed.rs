use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::feed;
use crate::pipeline::Stage;

pub struct Stage4Feed;

impl Stage4Feed {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Feed {
    fn name(&self) -> &'static str {
        "stage4_feed"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let config = ctx.config.as_ref().context("site config not loaded")?;
        let built = feed::build_feed(config, ctx.cards.clone(), &ctx.tool_version)?;

        let value = serde_json::to_value(&built).context("failed to serialize feed")?;
        let report = feed::validate_value(&value, Utc::now());
        for w in &report.warnings {
            warn!(warning = %w, "feed validation warning");
        }
        ctx.warnings.extend(report.warnings.iter().cloned());
        if !report.is_ok() {
            bail!("feed validation failed: {}", report.errors.join("; "));
        }

        info!(
            overall = built.rollups.overall_status.as_str(),
            top_actions = built.rollups.top_actions.len(),
            "feed assembled"
        );
        ctx.feed = Some(built);
        Ok(())
    }
}
