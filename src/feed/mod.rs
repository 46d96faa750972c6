pub mod rollups;
pub mod validate;

use chrono::Utc;

use crate::config::SiteConfig;
use crate::error::RiskError;
use crate::schema::v1::{FEED_SCHEMA_VERSION, Feed, RiskCard, ServiceWindowLocal};

pub use rollups::build_rollups;
pub use validate::{FeedReport, validate_feed_file, validate_value};

pub const TOOL_NAME: &str = "riskcards";

/// Keeps one card per kind (the newest), in first-seen order.
fn dedup_by_kind(cards: Vec<RiskCard>) -> Vec<RiskCard> {
    let mut out: Vec<RiskCard> = Vec::with_capacity(cards.len());
    for card in cards {
        match out.iter().position(|c| c.kind == card.kind) {
            Some(i) if card.generated_at > out[i].generated_at => out[i] = card,
            Some(_) => {}
            None => out.push(card),
        }
    }
    out
}

/// Wraps the cards of one run into a feed with rollups. The feed timestamp is
/// the newest card timestamp, or now when there are no cards.
pub fn build_feed(
    config: &SiteConfig,
    cards: Vec<RiskCard>,
    tool_version: &str,
) -> Result<Feed, RiskError> {
    let offset = config.offset()?;
    let cards = dedup_by_kind(cards);
    let generated_at = cards
        .iter()
        .map(|c| c.generated_at)
        .max()
        .unwrap_or_else(|| Utc::now().with_timezone(&offset));
    let rollups = build_rollups(&cards);

    Ok(Feed {
        schema_version: FEED_SCHEMA_VERSION.to_string(),
        tool: TOOL_NAME.to_string(),
        version: tool_version.to_string(),
        site_id: config.site_id.clone(),
        site_name: config.display_name().to_string(),
        generated_at,
        service_window: ServiceWindowLocal {
            start: config.service_window.start_hhmm(),
            end: config.service_window.end_hhmm(),
        },
        cards,
        rollups,
    })
}
