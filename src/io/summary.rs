use anyhow::{Context, Result};

use crate::ctx::Ctx;

pub fn format_summary(ctx: &Ctx) -> Result<String> {
    let feed = ctx.feed.as_ref().context("feed not assembled")?;

    let mut out = String::new();
    out.push_str(&format!("riskcards v{}\n", ctx.tool_version));
    out.push_str(&format!(
        "Site: {} ({}), service window {}–{}\n",
        feed.site_name, feed.site_id, feed.service_window.start, feed.service_window.end
    ));
    for card in &feed.cards {
        out.push_str(&format!(
            "{} {:<30} {:>3} {}\n",
            card.icon,
            card.title,
            card.score,
            card.label.as_str()
        ));
    }
    out.push_str(&format!(
        "Overall: {} {}\n",
        feed.rollups.overall_status.icon(),
        feed.rollups.overall_status.as_str()
    ));
    out.push_str(&format!("Urgency: {}\n", feed.rollups.urgency_summary));
    out.push_str(&format!("Summary: {}\n", feed.rollups.summary));
    if !ctx.warnings.is_empty() {
        out.push_str(&format!("Warnings: {}\n", ctx.warnings.len()));
    }

    Ok(out)
}
