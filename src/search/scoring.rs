//! Blended fuzzy + recency ranking for directory entries.
//!
//! Scoring is a pure function of the entries, the query and the supplied
//! clock reading. The engine holds only the (stateless) matcher.

use chrono::{DateTime, Utc};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::model::types::{DirectoryEntry, RankedEntry};

/// Weight of the fuzzy component for non-empty queries.
pub const FUZZY_WEIGHT: f64 = 0.7;
/// Weight of the recency component for non-empty queries.
pub const TIME_WEIGHT: f64 = 0.3;

/// Decay constant of the recency curve, in hours.
///
/// `exp(-h / 36)` gives ~0.51 after a day and ~0.009 after a week.
const DECAY_HOURS: f64 = 36.0;

/// Recency score for an entry last modified `elapsed_hours` ago.
///
/// Negative input (clock skew, mtimes in the future) is treated as zero.
pub fn time_decay(elapsed_hours: f64) -> f64 {
    let hours = if elapsed_hours.is_finite() {
        elapsed_hours.max(0.0)
    } else {
        return 0.0;
    };
    (-hours / DECAY_HOURS).exp().clamp(0.0, 1.0)
}

pub struct ScoringEngine {
    matcher: SkimMatcherV2,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self {
            matcher: SkimMatcherV2::default().ignore_case(),
        }
    }

    /// Rank `entries` against `query` as of `now`.
    ///
    /// An empty (or whitespace-only) query keeps every entry and ranks by
    /// recency alone. Otherwise entries that do not fuzzy-match are dropped and
    /// the rest are ranked by `0.7 * fuzzy + 0.3 * time`. Sorting is stable, so
    /// ties keep input order.
    pub fn score(
        &self,
        entries: &[DirectoryEntry],
        query: &str,
        now: DateTime<Utc>,
    ) -> Vec<RankedEntry> {
        let query = query.trim();
        let mut ranked: Vec<RankedEntry> = if query.is_empty() {
            entries
                .iter()
                .map(|entry| {
                    let time_score = recency(entry, now);
                    RankedEntry {
                        entry: entry.clone(),
                        score: time_score,
                        fuzzy_score: 1.0,
                        time_score,
                        positions: Vec::new(),
                    }
                })
                .collect()
        } else {
            let ceiling = self.best_possible(query);
            entries
                .iter()
                .filter_map(|entry| {
                    let (raw, positions) = self.matcher.fuzzy_indices(&entry.name, query)?;
                    let fuzzy_score = normalize(raw, ceiling);
                    let time_score = recency(entry, now);
                    Some(RankedEntry {
                        entry: entry.clone(),
                        score: FUZZY_WEIGHT * fuzzy_score + TIME_WEIGHT * time_score,
                        fuzzy_score,
                        time_score,
                        positions,
                    })
                })
                .collect()
        };

        // Very old entries all decay to 0.0; newer mtimes still come first.
        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| b.entry.modified_at.cmp(&a.entry.modified_at))
        });
        tracing::debug!(
            query = query,
            candidates = entries.len(),
            matched = ranked.len(),
            "scored entries"
        );
        ranked
    }

    /// Raw score of the query matched against itself: the best any name can do.
    fn best_possible(&self, query: &str) -> i64 {
        self.matcher.fuzzy_match(query, query).unwrap_or(0)
    }
}

fn normalize(raw: i64, ceiling: i64) -> f64 {
    if ceiling <= 0 {
        return 1.0;
    }
    (raw as f64 / ceiling as f64).clamp(0.0, 1.0)
}

fn recency(entry: &DirectoryEntry, now: DateTime<Utc>) -> f64 {
    let elapsed = now.signed_duration_since(entry.modified_at);
    time_decay(elapsed.num_milliseconds() as f64 / 3_600_000.0)
}
