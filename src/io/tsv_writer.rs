use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::schema::v1::RiskCard;

pub fn write_tsv(path: &Path, cards: &[RiskCard]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);

    writeln!(
        w,
        "kind\tcategory\ttime_horizon\tscore\tlabel\tconfidence\tgenerated_at"
    )?;
    for card in cards {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{:?}\t{}",
            card.kind.id(),
            card.category,
            card.time_horizon,
            card.score,
            card.label.as_str(),
            card.confidence,
            card.generated_at.to_rfc3339()
        )?;
    }
    w.flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
