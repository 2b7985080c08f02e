//! Non-textual ranking signals: freshness, popularity, engagement.

use chrono::{DateTime, Utc};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Exponential freshness decay: `exp(-age_days / decay_days)`.
///
/// A future timestamp gives a negative age and therefore a score above 1.
/// That is deliberate: very fresh content must not be penalized for clock
/// skew between the crawler and this host.
pub fn recency_score(created_utc: i64, now: DateTime<Utc>, decay_days: f64) -> f64 {
    let age_days = (now.timestamp() - created_utc) as f64 / SECONDS_PER_DAY;
    (-age_days / decay_days).exp()
}

/// Log-dampened vote score. Negative raw scores contribute 0, never a
/// negative output.
pub fn popularity_score(raw_score: i64) -> f64 {
    (1.0 + raw_score.max(0) as f64).ln()
}

/// Log-dampened comment count.
pub fn engagement_score(comment_count: u32) -> f64 {
    (1.0 + comment_count as f64).ln()
}
