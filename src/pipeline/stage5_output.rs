use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::io::{json_writer, tsv_writer};
use crate::pipeline::Stage;

pub struct Stage5Output;

impl Stage5Output {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Output {
    fn name(&self) -> &'static str {
        "stage5_output"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        if !ctx.write_outputs {
            info!("output writing disabled");
            return Ok(());
        }
        let feed = ctx.feed.as_ref().context("feed not assembled")?;

        json_writer::write_cards(&ctx.output.cards_dir, &feed.cards)?;
        json_writer::write_feed(&ctx.output.feed_path, feed)?;
        if ctx.write_tsv {
            tsv_writer::write_tsv(&ctx.output.tsv_path, &feed.cards)?;
        }

        info!(out_dir = %ctx.output.out_dir.display(), cards = feed.cards.len(), "outputs written");
        Ok(())
    }
}
