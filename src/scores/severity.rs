use crate::config::SeverityThresholds;
use crate::schema::v1::Severity;

/// Global mapping from score to tier, shared by every card.
pub fn classify(score: u8, thresholds: &SeverityThresholds) -> Severity {
    let s = score.min(100) as i32;
    if s >= thresholds.critical_min {
        Severity::Critical
    } else if s >= thresholds.elevated_min {
        Severity::Elevated
    } else if s >= thresholds.watch_min {
        Severity::Watch
    } else {
        Severity::Normal
    }
}
