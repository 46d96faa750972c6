use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scores;

pub struct Stage3Score;

impl Stage3Score {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Score {
    fn name(&self) -> &'static str {
        "stage3_score"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let config = ctx.config.as_ref().context("site config not loaded")?;
        let generated_at = match ctx.generated_at {
            Some(ts) => ts,
            None => Utc::now().with_timezone(&config.offset()?),
        };

        let cards = scores::compute_cards_at(&ctx.signals, config, generated_at)?;
        for card in &cards {
            info!(
                card = card.kind.id(),
                score = card.score,
                label = card.label.as_str(),
                "card scored"
            );
        }
        ctx.generated_at = Some(generated_at);
        ctx.cards = cards;
        Ok(())
    }
}
