//! Aggregate snapshot returned to the dashboard.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::session::SessionRecord;

/// Pageview count for one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCount {
    pub url: String,
    pub count: u64,
}

/// Click count for one `metadata.target` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickTargetCount {
    pub target: String,
    pub count: u64,
}

/// All dashboard rollups, computed fresh on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_sessions: u64,
    pub total_events: u64,
    pub top_click_targets: Vec<ClickTargetCount>,
    pub top_pages: Vec<PageCount>,
    /// Mean session length in seconds, `0.0` when no session qualifies
    pub avg_session_duration: f64,
}

/// Orders counts descending, ties by key ascending, and keeps `limit` rows.
pub fn rank_top(counts: HashMap<String, u64>, limit: usize) -> Vec<(String, u64)> {
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|(a_key, a_count), (b_key, b_count)| {
        b_count.cmp(a_count).then_with(|| a_key.cmp(b_key))
    });
    ranked.truncate(limit);
    ranked
}

/// Mean of [`SessionRecord::duration_secs`] over qualifying sessions.
pub fn mean_session_duration<'a>(sessions: impl IntoIterator<Item = &'a SessionRecord>) -> f64 {
    let (sum, count) = sessions
        .into_iter()
        .filter_map(SessionRecord::duration_secs)
        .fold((0.0, 0u64), |(sum, count), secs| (sum + secs, count + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
