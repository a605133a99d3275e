//! Admin view over stored feedback
//!
//! Each report works from one `read_all` snapshot: filtering, aggregates, the
//! attention list and exports are all computed from that same snapshot, so
//! appends landing mid-request never leak into half of a report.

use crate::analytics::{summarize_with_threshold, FeedbackSummary};
use crate::auth::AdminSession;
use crate::error::Result;
use crate::query::{filter, needs_attention, DateRange, RatingSet};
use crate::storage::csv::export_records;
use crate::storage::FeedbackStore;
use crate::types::{FeedbackRecord, LOW_RATING_THRESHOLD};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// What the admin asked to see; `None` means the default selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCriteria {
    /// Defaults to every rating
    pub ratings: Option<RatingSet>,
    /// Defaults to the earliest..latest stored date
    pub dates: Option<DateRange>,
}

impl ViewCriteria {
    /// Build from loose request parameters
    ///
    /// `ratings` is a comma-separated list. A missing start or end leaves that
    /// side of the date range open.
    pub fn from_params(
        ratings: Option<&str>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self> {
        let ratings = ratings.map(RatingSet::parse).transpose()?;
        let dates = match (start, end) {
            (None, None) => None,
            (start, end) => Some(DateRange::new(
                start.unwrap_or(NaiveDate::MIN),
                end.unwrap_or(NaiveDate::MAX),
            )?),
        };
        Ok(Self { ratings, dates })
    }
}

/// Everything the admin dashboard displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminReport {
    /// Filtered records, newest first
    pub records: Vec<FeedbackRecord>,
    pub summary: FeedbackSummary,
    /// Low-rated subset of `records`
    pub attention: Vec<FeedbackRecord>,
    /// Ratings actually applied, the stored ones unless narrowed
    pub applied_ratings: RatingSet,
    /// Date window actually applied, if any record has a readable date
    pub applied_dates: Option<DateRange>,
    /// Size of the snapshot before filtering
    pub total_stored: usize,
}

pub struct AdminView {
    store: Arc<dyn FeedbackStore>,
    low_rating_threshold: u8,
}

impl AdminView {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self {
            store,
            low_rating_threshold: LOW_RATING_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.low_rating_threshold = threshold;
        self
    }

    /// Read a snapshot and build the report for `criteria`
    pub async fn report(&self, session: &AdminSession, criteria: &ViewCriteria) -> Result<AdminReport> {
        session.require()?;
        let snapshot = self.store.read_all().await?;
        debug!("Building admin report over {} records", snapshot.len());
        Ok(self.compute(&snapshot, criteria))
    }

    /// Filtered records as a store-compatible CSV blob
    pub async fn export(&self, session: &AdminSession, criteria: &ViewCriteria) -> Result<Vec<u8>> {
        let report = self.report(session, criteria).await?;
        export_records(&report.records)
    }

    /// Build a report from an already-read snapshot
    pub fn compute(&self, snapshot: &[FeedbackRecord], criteria: &ViewCriteria) -> AdminReport {
        let applied_ratings = criteria
            .ratings
            .clone()
            .unwrap_or_else(|| RatingSet::present_in(snapshot));
        let applied_dates = criteria.dates.or_else(|| DateRange::spanning(snapshot));
        let dates = applied_dates.unwrap_or_else(DateRange::unbounded);

        let records = filter(snapshot, &applied_ratings, &dates);
        let summary = summarize_with_threshold(&records, self.low_rating_threshold);
        let attention = needs_attention(&records, self.low_rating_threshold);

        AdminReport {
            records,
            summary,
            attention,
            applied_ratings,
            applied_dates,
            total_stored: snapshot.len(),
        }
    }
}
