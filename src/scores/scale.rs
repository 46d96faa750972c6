use crate::schema::v1::Impact;

/// Maps a raw heuristic score onto 0..=100, where `full_scale` maps to 100.
/// Non-finite input maps to 0.
pub fn score_0_100(raw: f64, full_scale: f64) -> u8 {
    let scaled = raw / full_scale * 100.0;
    if !scaled.is_finite() {
        return if scaled == f64::INFINITY { 100 } else { 0 };
    }
    scaled.round().clamp(0.0, 100.0) as u8
}

pub fn clamp_score(score: i64) -> u8 {
    score.clamp(0, 100) as u8
}

pub fn impact_label(value: f64, medium_at: f64, high_at: f64) -> Impact {
    if value >= high_at {
        Impact::High
    } else if value >= medium_at {
        Impact::Medium
    } else {
        Impact::Low
    }
}

pub fn flag_impact(set: bool) -> Impact {
    if set { Impact::Medium } else { Impact::Low }
}
