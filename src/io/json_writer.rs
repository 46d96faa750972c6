use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::io::write_json;
use crate::schema::v1::{Feed, RiskCard};

pub fn card_path(cards_dir: &Path, card: &RiskCard) -> PathBuf {
    cards_dir.join(format!("{}.json", card.kind.id()))
}

/// Writes one `<kind-id>.json` per card.
pub fn write_cards(cards_dir: &Path, cards: &[RiskCard]) -> Result<()> {
    fs::create_dir_all(cards_dir)
        .with_context(|| format!("failed to create {}", cards_dir.display()))?;
    for card in cards {
        write_json(&card_path(cards_dir, card), card)?;
    }
    Ok(())
}

pub fn write_feed(path: &Path, feed: &Feed) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    write_json(path, feed)
}
