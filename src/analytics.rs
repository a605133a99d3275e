//! Aggregate metrics over a filtered feedback view

use crate::types::{FeedbackRecord, LOW_RATING_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Headline numbers shown above the feedback table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSummary {
    /// Number of records in the view
    pub count: usize,
    /// Mean rating rounded to two decimals; `0.0` for an empty view
    pub average_rating: f64,
    /// Records rated at or below the low-rating threshold
    pub low_rating_count: usize,
}

/// Summarize with the default low-rating threshold (2)
pub fn summarize(records: &[FeedbackRecord]) -> FeedbackSummary {
    summarize_with_threshold(records, LOW_RATING_THRESHOLD)
}

pub fn summarize_with_threshold(records: &[FeedbackRecord], threshold: u8) -> FeedbackSummary {
    let count = records.len();
    if count == 0 {
        return FeedbackSummary {
            count: 0,
            average_rating: 0.0,
            low_rating_count: 0,
        };
    }

    let total: u64 = records.iter().map(|r| u64::from(r.rating.value())).sum();
    let mean = total as f64 / count as f64;

    FeedbackSummary {
        count,
        average_rating: (mean * 100.0).round() / 100.0,
        low_rating_count: records
            .iter()
            .filter(|r| r.rating.value() <= threshold)
            .count(),
    }
}
