//! Aggregate statistics over a prediction list

use serde::Serialize;
use std::collections::HashMap;
use tenderdesk_core::{PredictionRecord, Rank};

/// Summary shown above the prediction table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub total: usize,

    /// Records ranked A or B
    pub recommended: usize,

    /// Arithmetic mean of `win_probability`; 0 for an empty list
    pub mean_win_probability: f64,

    /// Count per rank, in order of first occurrence
    pub rank_counts: Vec<(Rank, usize)>,
}

impl AggregateSummary {
    /// Count for one rank, 0 when it never occurs
    pub fn count_of(&self, rank: &Rank) -> usize {
        self.rank_counts
            .iter()
            .find(|(r, _)| r == rank)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Mean win probability as a rounded percentage
    pub fn mean_percent(&self) -> u32 {
        (self.mean_win_probability * 100.0).round().max(0.0) as u32
    }
}

/// Summarize a record list in a single pass
pub fn summarize(records: &[PredictionRecord]) -> AggregateSummary {
    let mut recommended = 0;
    let mut probability_sum = 0.0;
    let mut rank_counts: Vec<(Rank, usize)> = Vec::new();
    // Position of each rank in `rank_counts`
    let mut slots: HashMap<&Rank, usize> = HashMap::new();

    for record in records {
        if record.rank.is_recommended() {
            recommended += 1;
        }
        probability_sum += record.win_probability;

        match slots.get(&record.rank).copied() {
            Some(slot) => rank_counts[slot].1 += 1,
            None => {
                slots.insert(&record.rank, rank_counts.len());
                rank_counts.push((record.rank.clone(), 1));
            }
        }
    }

    let mean_win_probability = if records.is_empty() {
        0.0
    } else {
        probability_sum / records.len() as f64
    };

    AggregateSummary {
        total: records.len(),
        recommended,
        mean_win_probability,
        rank_counts,
    }
}
