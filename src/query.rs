//! Filtered views over the feedback set
//!
//! Every function here is pure: inputs are borrowed, never modified, and the
//! same inputs always give the same output.

use crate::error::{FeedbackError, Result};
use crate::types::{FeedbackRecord, Rating};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Set of ratings a record must belong to
///
/// An empty set matches nothing; it is not "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSet(BTreeSet<Rating>);

impl RatingSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every rating from 1 to 5
    pub fn all() -> Self {
        Rating::all().collect()
    }

    /// Ratings that occur in `records`, the admin view's default selection
    pub fn present_in(records: &[FeedbackRecord]) -> Self {
        records.iter().map(|r| r.rating).collect()
    }

    /// Parse a comma-separated list such as `"1,2,5"`
    pub fn parse(list: &str) -> Result<Self> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                let value = s
                    .parse::<i64>()
                    .map_err(|_| FeedbackError::validation(format!("not a rating: {:?}", s)))?;
                Rating::new(value)
            })
            .collect()
    }

    pub fn contains(&self, rating: Rating) -> bool {
        self.0.contains(&rating)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Rating> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Rating> for RatingSet {
    fn from_iter<I: IntoIterator<Item = Rating>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(FeedbackError::validation(format!(
                "date range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Range that admits every date
    pub fn unbounded() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    /// Earliest to latest parseable date in `records`, or `None` if there is none
    pub fn spanning(records: &[FeedbackRecord]) -> Option<Self> {
        let mut dates = records.iter().filter_map(|r| r.timestamp.date());
        let first = dates.next()?;
        let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Records whose rating is in `ratings` and whose date is in `dates`
///
/// Records with an unparseable timestamp are left out. The result is ordered
/// newest first; records with equal timestamps keep their insertion order.
pub fn filter(
    records: &[FeedbackRecord],
    ratings: &RatingSet,
    dates: &DateRange,
) -> Vec<FeedbackRecord> {
    if ratings.is_empty() {
        return Vec::new();
    }

    let mut matched: Vec<(NaiveDateTime, &FeedbackRecord)> = records
        .iter()
        .filter(|r| ratings.contains(r.rating))
        .filter_map(|r| match r.timestamp.parse() {
            Some(at) => Some((at, r)),
            None => {
                debug!("Skipping record with unparseable timestamp {:?}", r.timestamp.as_str());
                None
            }
        })
        .filter(|(at, _)| dates.contains(at.date()))
        .collect();

    // sort_by is stable, so ties stay in insertion order
    matched.sort_by(|a, b| b.0.cmp(&a.0));
    matched.into_iter().map(|(_, r)| r.clone()).collect()
}

/// Records at or below `threshold`, in their given order
pub fn needs_attention(records: &[FeedbackRecord], threshold: u8) -> Vec<FeedbackRecord> {
    records
        .iter()
        .filter(|r| r.rating.value() <= threshold)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Timestamp;
    use proptest::prelude::*;

    fn at(day: u32, hour: u32) -> Timestamp {
        Timestamp::from_datetime(
            NaiveDate::from_ymd_opt(2024, 6, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
        )
    }

    fn record(rating: i64, ts: Timestamp, review: &str) -> FeedbackRecord {
        FeedbackRecord {
            timestamp: ts,
            rating: Rating::new(rating).unwrap(),
            review: review.to_string(),
            ai_response: "r".to_string(),
            ai_summary: "s".to_string(),
            ai_recommended_action: "a".to_string(),
        }
    }

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    #[test]
    fn test_orders_newest_first_with_stable_ties() {
        let records = vec![
            record(4, at(1, 9), "old"),
            record(5, at(3, 9), "tie-a"),
            record(3, at(2, 9), "mid"),
            record(5, at(3, 9), "tie-b"),
        ];
        let out = filter(&records, &RatingSet::all(), &DateRange::unbounded());
        let reviews: Vec<_> = out.iter().map(|r| r.review.as_str()).collect();
        assert_eq!(reviews, vec!["tie-a", "tie-b", "mid", "old"]);
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let records = vec![
            record(4, at(1, 23), "before"),
            record(4, at(2, 0), "start"),
            record(4, at(4, 23), "end"),
            record(4, at(5, 0), "after"),
        ];
        let range = DateRange::new(june(2), june(4)).unwrap();
        let out = filter(&records, &RatingSet::all(), &range);
        let reviews: Vec<_> = out.iter().map(|r| r.review.as_str()).collect();
        assert_eq!(reviews, vec!["end", "start"]);
    }

    #[test]
    fn test_rating_membership_and_bad_timestamps() {
        let records = vec![
            record(1, at(1, 9), "one"),
            record(2, Timestamp::from("not a date"), "broken"),
            record(2, at(1, 10), "two"),
            record(5, at(1, 11), "five"),
        ];
        let ratings = RatingSet::parse("1, 2").unwrap();
        let out = filter(&records, &ratings, &DateRange::unbounded());
        let reviews: Vec<_> = out.iter().map(|r| r.review.as_str()).collect();
        assert_eq!(reviews, vec!["two", "one"]);
    }

    #[test]
    fn test_rating_set_parse_rejects_garbage() {
        assert!(RatingSet::parse("1,x").is_err());
        assert!(RatingSet::parse("0").is_err());
        assert!(RatingSet::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_spanning_and_defaults() {
        let records = vec![
            record(3, at(7, 9), "a"),
            record(1, Timestamp::from("garbage"), "b"),
            record(3, at(2, 9), "c"),
        ];
        let span = DateRange::spanning(&records).unwrap();
        assert_eq!(span, DateRange::new(june(2), june(7)).unwrap());
        assert!(DateRange::spanning(&[]).is_none());

        let present = RatingSet::present_in(&records);
        assert_eq!(present.iter().map(|r| r.value()).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        assert!(DateRange::new(june(5), june(1)).is_err());
    }

    #[test]
    fn test_needs_attention_keeps_order() {
        let records = vec![
            record(2, at(3, 9), "a"),
            record(4, at(2, 9), "b"),
            record(1, at(1, 9), "c"),
        ];
        let low = needs_attention(&records, 2);
        assert_eq!(low.iter().map(|r| r.review.as_str()).collect::<Vec<_>>(), vec!["a", "c"]);
    }

    fn arb_records() -> impl Strategy<Value = Vec<FeedbackRecord>> {
        prop::collection::vec((1i64..=5, 1u32..=28, 0u32..24, any::<bool>()), 0..40).prop_map(
            |rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (rating, day, hour, valid))| {
                        let ts = if valid {
                            at(day, hour)
                        } else {
                            Timestamp::from("??")
                        };
                        record(rating, ts, &format!("review {}", i))
                    })
                    .collect()
            },
        )
    }

    fn arb_ratings() -> impl Strategy<Value = RatingSet> {
        prop::collection::btree_set(1i64..=5, 0..=5)
            .prop_map(|set| set.into_iter().map(|n| Rating::new(n).unwrap()).collect())
    }

    proptest! {
        #[test]
        fn prop_filter_is_idempotent(
            records in arb_records(),
            ratings in arb_ratings(),
            a in 1u32..=28,
            b in 1u32..=28,
        ) {
            let range = DateRange::new(june(a.min(b)), june(a.max(b))).unwrap();
            let once = filter(&records, &ratings, &range);
            let twice = filter(&once, &ratings, &range);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_empty_rating_set_matches_nothing(records in arb_records()) {
            prop_assert!(filter(&records, &RatingSet::empty(), &DateRange::unbounded()).is_empty());
        }

        #[test]
        fn prop_output_is_sorted_subset(records in arb_records(), ratings in arb_ratings()) {
            let out = filter(&records, &ratings, &DateRange::unbounded());
            for pair in out.windows(2) {
                prop_assert!(pair[0].timestamp.parse() >= pair[1].timestamp.parse());
            }
            for r in &out {
                prop_assert!(ratings.contains(r.rating));
                prop_assert!(records.contains(r));
            }
        }
    }
}
