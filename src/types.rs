//! Core data types for the feedback desk
//!
//! Defines the persisted feedback record and the small value types that keep
//! it well-formed: ratings that cannot leave 1..=5, timestamps that keep their
//! on-disk text, and the names of the three enrichment fields.

use crate::error::{FeedbackError, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Text stored in an enrichment field when generation failed
pub const ENRICHMENT_UNAVAILABLE: &str = "unavailable";

/// Ratings at or below this value count as low ratings
pub const LOW_RATING_THRESHOLD: u8 = 2;

/// Serialized timestamp layout. Lexicographic order matches time order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Human-readable layout used in admin listings
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %I:%M %p";

/// Star rating in the closed range 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validate a raw integer as a rating
    pub fn new(value: i64) -> Result<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(FeedbackError::validation(format!(
                "rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Every valid rating, ascending
    pub fn all() -> impl Iterator<Item = Rating> {
        (Self::MIN..=Self::MAX).map(Rating)
    }
}

impl TryFrom<i64> for Rating {
    type Error = FeedbackError;

    fn try_from(value: i64) -> Result<Self> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Creation instant of a record, kept as the text that is persisted
///
/// Records read back from disk may carry text that no longer parses (hand
/// edits, foreign exports). Parsing is therefore deferred to the query layer,
/// which drops such records instead of failing the whole read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Stamp the current local wall-clock time
    pub fn now() -> Self {
        Self::from_datetime(Local::now().naive_local())
    }

    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self(dt.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the stored text, accepting the layouts older exports used
    pub fn parse(&self) -> Option<NaiveDateTime> {
        let text = self.0.trim();
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(text)
                    .ok()
                    .map(|dt| dt.with_timezone(&Local).naive_local())
            })
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }

    /// Calendar date of the instant, if it parses
    pub fn date(&self) -> Option<NaiveDate> {
        self.parse().map(|dt| dt.date())
    }

    /// `DD/MM/YYYY HH:MM AM` form, or the raw text when it does not parse
    pub fn display(&self) -> String {
        match self.parse() {
            Some(dt) => dt.format(DISPLAY_FORMAT).to_string(),
            None => self.0.clone(),
        }
    }
}

impl From<String> for Timestamp {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Timestamp {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three AI-derived fields of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentField {
    /// Customer-facing reply
    Response,
    /// One-sentence internal summary
    Summary,
    /// Suggested next step for the business
    RecommendedAction,
}

impl EnrichmentField {
    pub const ALL: [EnrichmentField; 3] = [
        EnrichmentField::Response,
        EnrichmentField::Summary,
        EnrichmentField::RecommendedAction,
    ];

    /// Column name in the record store
    pub fn column(self) -> &'static str {
        match self {
            EnrichmentField::Response => "ai_response",
            EnrichmentField::Summary => "ai_summary",
            EnrichmentField::RecommendedAction => "ai_recommended_action",
        }
    }
}

impl std::fmt::Display for EnrichmentField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// One persisted feedback submission
///
/// Field order is the column order of the record store and of exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub timestamp: Timestamp,

    #[serde(rename = "user_rating")]
    pub rating: Rating,

    #[serde(rename = "user_review")]
    pub review: String,

    pub ai_response: String,

    pub ai_summary: String,

    pub ai_recommended_action: String,
}

impl FeedbackRecord {
    /// Store column names, in persisted order
    pub const COLUMNS: [&'static str; 6] = [
        "timestamp",
        "user_rating",
        "user_review",
        "ai_response",
        "ai_summary",
        "ai_recommended_action",
    ];

    /// Value of one enrichment field
    pub fn enrichment(&self, field: EnrichmentField) -> &str {
        match field {
            EnrichmentField::Response => &self.ai_response,
            EnrichmentField::Summary => &self.ai_summary,
            EnrichmentField::RecommendedAction => &self.ai_recommended_action,
        }
    }

    /// True when the field holds `sentinel` rather than generated text
    pub fn is_unavailable(&self, field: EnrichmentField, sentinel: &str) -> bool {
        self.enrichment(field) == sentinel
    }

    /// Replace blank enrichment cells, as older rows may have, with `sentinel`
    pub fn fill_blank_enrichment(&mut self, sentinel: &str) {
        for text in [
            &mut self.ai_response,
            &mut self.ai_summary,
            &mut self.ai_recommended_action,
        ] {
            if text.trim().is_empty() {
                *text = sentinel.to_string();
            }
        }
    }

    pub fn is_low_rating(&self) -> bool {
        self.rating.value() <= LOW_RATING_THRESHOLD
    }

    /// Check the invariants every persisted record must satisfy
    pub fn validate(&self) -> Result<()> {
        if self.review.trim().is_empty() {
            return Err(FeedbackError::validation("review must not be empty"));
        }
        if self.timestamp.as_str().trim().is_empty() {
            return Err(FeedbackError::validation("timestamp must not be empty"));
        }
        for field in EnrichmentField::ALL {
            if self.enrichment(field).is_empty() {
                return Err(FeedbackError::validation(format!(
                    "{} must hold text or the sentinel",
                    field
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert!(Rating::new(-3).is_err());
        assert_eq!(Rating::new(1).unwrap().value(), 1);
        assert_eq!(Rating::new(5).unwrap().value(), 5);
        assert_eq!(Rating::all().count(), 5);
    }

    #[test]
    fn test_rating_error_is_validation() {
        let err = Rating::new(9).unwrap_err();
        assert!(matches!(err, FeedbackError::Validation(_)));
    }

    #[test]
    fn test_timestamp_roundtrip_format() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_time(NaiveTime::from_hms_micro_opt(14, 5, 7, 123456).unwrap());
        let ts = Timestamp::from_datetime(dt);
        assert_eq!(ts.as_str(), "2024-03-09 14:05:07.123456");
        assert_eq!(ts.parse(), Some(dt));
        assert_eq!(ts.display(), "09/03/2024 02:05 PM");
    }

    #[test]
    fn test_timestamp_lenient_parse() {
        assert!(Timestamp::from("2024-03-09 14:05:07").parse().is_some());
        assert!(Timestamp::from("2024-03-09T14:05:07.5").parse().is_some());
        assert!(Timestamp::from("2024-03-09T14:05:07+02:00").parse().is_some());
        assert_eq!(
            Timestamp::from("2024-03-09").date(),
            NaiveDate::from_ymd_opt(2024, 3, 9)
        );
        assert!(Timestamp::from("yesterday").parse().is_none());
        assert_eq!(Timestamp::from("yesterday").display(), "yesterday");
    }

    #[test]
    fn test_timestamps_sort_lexicographically() {
        let earlier = Timestamp::from_datetime(
            NaiveDate::from_ymd_opt(2024, 1, 9).unwrap().and_hms_opt(9, 0, 0).unwrap(),
        );
        let later = Timestamp::from_datetime(
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap().and_hms_opt(8, 0, 0).unwrap(),
        );
        assert!(earlier.as_str() < later.as_str());
    }

    #[test]
    fn test_offset_timestamps_share_one_clock() {
        // 23:30 UTC is later than 01:00 at +05:00 (20:00 UTC)
        let late = Timestamp::from("2024-03-09T23:30:00+00:00");
        let early = Timestamp::from("2024-03-10T01:00:00+05:00");
        assert!(late.parse().unwrap() > early.parse().unwrap());

        let expected = DateTime::parse_from_rfc3339("2024-03-09T23:30:00+00:00")
            .unwrap()
            .with_timezone(&Local)
            .naive_local();
        assert_eq!(late.parse(), Some(expected));
    }

    #[test]
    fn test_fill_blank_enrichment() {
        let mut record = FeedbackRecord {
            timestamp: Timestamp::now(),
            rating: Rating::new(2).unwrap(),
            review: "Late".to_string(),
            ai_response: String::new(),
            ai_summary: "Late order".to_string(),
            ai_recommended_action: " ".to_string(),
        };
        assert!(record.validate().is_err());

        record.fill_blank_enrichment("n/a");
        assert_eq!(record.ai_response, "n/a");
        assert_eq!(record.ai_summary, "Late order");
        assert!(record.is_unavailable(EnrichmentField::RecommendedAction, "n/a"));
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_record_validate() {
        let mut record = FeedbackRecord {
            timestamp: Timestamp::now(),
            rating: Rating::new(4).unwrap(),
            review: "Fast delivery".to_string(),
            ai_response: "Thanks!".to_string(),
            ai_summary: ENRICHMENT_UNAVAILABLE.to_string(),
            ai_recommended_action: "Keep it up".to_string(),
        };
        assert!(record.validate().is_ok());
        assert!(record.is_unavailable(EnrichmentField::Summary, ENRICHMENT_UNAVAILABLE));
        assert!(!record.is_unavailable(EnrichmentField::Response, ENRICHMENT_UNAVAILABLE));
        assert!(!record.is_low_rating());

        record.review = "   ".to_string();
        assert!(record.validate().is_err());
    }
}
