//! RFM scoring — recency, frequency, and monetary value per customer,
//! each bucketed into equal-population quartiles by rank over the full
//! scored population. Recency is measured against the dataset's latest
//! order date, not wall-clock now.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::info;

use shoplens_core::snapshot::WarehouseSnapshot;
use shoplens_core::types::OrderStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RfmSegment {
    Champions,
    Loyal,
    PotentialLoyalists,
    AtRisk,
    Lost,
    Average,
}

impl RfmSegment {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Champions => "Champions",
            Self::Loyal => "Loyal",
            Self::PotentialLoyalists => "Potential Loyalists",
            Self::AtRisk => "At Risk",
            Self::Lost => "Lost",
            Self::Average => "Average",
        }
    }

    /// Map a score triple to a segment. Order matters: first match wins.
    pub fn from_scores(r: u8, f: u8, m: u8) -> Self {
        if r == 4 && f == 4 && m == 4 {
            Self::Champions
        } else if r >= 3 && f >= 3 && m >= 3 {
            Self::Loyal
        } else if r >= 3 && f == 1 {
            Self::PotentialLoyalists
        } else if r <= 2 && f >= 3 {
            Self::AtRisk
        } else if r == 1 && f == 1 {
            Self::Lost
        } else {
            Self::Average
        }
    }
}

impl std::fmt::Display for RfmSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfmScore {
    pub user_id: u64,
    pub recency_days: i64,
    pub frequency: u64,
    pub monetary: f64,
    pub recency_score: u8,
    pub frequency_score: u8,
    pub monetary_score: u8,
    /// The three single-digit scores concatenated, e.g. "434".
    pub code: String,
    pub segment: RfmSegment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfmReport {
    pub scores: Vec<RfmScore>,
    pub segment_counts: BTreeMap<RfmSegment, u64>,
}

/// Score every user with at least one completed order item. Users with no
/// completed purchase have no recency and are excluded from scoring.
pub fn score_users(snapshot: &WarehouseSnapshot) -> RfmReport {
    #[derive(Default)]
    struct Accum {
        last_purchase: Option<chrono::DateTime<chrono::Utc>>,
        frequency: u64,
        monetary: f64,
    }

    let mut per_user: HashMap<u64, Accum> = HashMap::new();
    for item in snapshot.items_with_status(OrderStatus::Complete) {
        let entry = per_user.entry(item.user_id).or_default();
        entry.frequency += 1;
        entry.monetary += item.sale_price;
        if entry.last_purchase.is_none_or(|t| item.created_at > t) {
            entry.last_purchase = Some(item.created_at);
        }
    }

    let Some(reference) = snapshot.max_order_date() else {
        return RfmReport {
            scores: Vec::new(),
            segment_counts: BTreeMap::new(),
        };
    };

    let mut inputs: Vec<(u64, i64, u64, f64)> = per_user
        .into_iter()
        .filter_map(|(user_id, a)| {
            let last = a.last_purchase?;
            Some((
                user_id,
                (reference - last).num_days(),
                a.frequency,
                a.monetary,
            ))
        })
        .collect();
    // Stable ordering so quartile assignment is deterministic for a
    // fixed input.
    inputs.sort_by_key(|&(user_id, ..)| user_id);

    let recency_scores = quartile_scores(
        inputs.iter().map(|&(id, r, ..)| (id, r as f64)).collect(),
        true,
    );
    let frequency_scores = quartile_scores(
        inputs.iter().map(|&(id, _, f, _)| (id, f as f64)).collect(),
        false,
    );
    let monetary_scores = quartile_scores(
        inputs.iter().map(|&(id, _, _, m)| (id, m)).collect(),
        false,
    );

    let mut scores = Vec::with_capacity(inputs.len());
    let mut segment_counts: BTreeMap<RfmSegment, u64> = BTreeMap::new();
    for (user_id, recency_days, frequency, monetary) in inputs {
        let r = recency_scores[&user_id];
        let f = frequency_scores[&user_id];
        let m = monetary_scores[&user_id];
        let segment = RfmSegment::from_scores(r, f, m);
        *segment_counts.entry(segment).or_insert(0) += 1;
        scores.push(RfmScore {
            user_id,
            recency_days,
            frequency,
            monetary,
            recency_score: r,
            frequency_score: f,
            monetary_score: m,
            code: format!("{r}{f}{m}"),
            segment,
        });
    }

    info!(users = scores.len(), "RFM scoring complete");
    RfmReport {
        scores,
        segment_counts,
    }
}

/// Rank-based quartile bucketing. The value list is sorted ascending
/// (stable, so equal values keep their incoming order) and split into
/// four buckets whose populations differ by at most one. With `invert`
/// the lowest values score 4 — used for recency, where fewer days means
/// a more recent customer.
fn quartile_scores(mut values: Vec<(u64, f64)>, invert: bool) -> HashMap<u64, u8> {
    let n = values.len();
    values.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    values
        .into_iter()
        .enumerate()
        .map(|(rank, (id, _))| {
            let bucket = (rank * 4 / n) as u8; // 0..=3, equal-population
            let score = if invert { 4 - bucket } else { bucket + 1 };
            (id, score)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quartile_populations_differ_by_at_most_one() {
        for n in [4usize, 5, 6, 7, 10, 101] {
            let values: Vec<(u64, f64)> = (0..n).map(|i| (i as u64, i as f64)).collect();
            let scores = quartile_scores(values, false);

            let mut counts = [0usize; 4];
            for score in scores.values() {
                counts[(score - 1) as usize] += 1;
            }
            let min = counts.iter().min().unwrap();
            let max = counts.iter().max().unwrap();
            assert!(max - min <= 1, "n={n}: uneven buckets {counts:?}");
        }
    }

    #[test]
    fn test_inverted_scoring_ranks_small_values_highest() {
        let values: Vec<(u64, f64)> = vec![(1, 5.0), (2, 50.0), (3, 200.0), (4, 400.0)];
        let scores = quartile_scores(values, true);
        assert_eq!(scores[&1], 4);
        assert_eq!(scores[&4], 1);
    }

    #[test]
    fn test_segment_precedence() {
        assert_eq!(RfmSegment::from_scores(4, 4, 4), RfmSegment::Champions);
        assert_eq!(RfmSegment::from_scores(3, 3, 4), RfmSegment::Loyal);
        assert_eq!(RfmSegment::from_scores(4, 1, 2), RfmSegment::PotentialLoyalists);
        assert_eq!(RfmSegment::from_scores(2, 3, 1), RfmSegment::AtRisk);
        assert_eq!(RfmSegment::from_scores(1, 1, 3), RfmSegment::Lost);
        assert_eq!(RfmSegment::from_scores(2, 2, 2), RfmSegment::Average);
    }

    #[test]
    fn test_tie_handling_is_deterministic() {
        let values: Vec<(u64, f64)> = (0..8).map(|i| (i as u64, 1.0)).collect();
        let first = quartile_scores(values.clone(), false);
        let second = quartile_scores(values, false);
        assert_eq!(first, second);
    }
}
