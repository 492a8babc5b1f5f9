//! Daily mention counts over a date range
//!
//! A series is assembled from one co-occurrence request per calendar day.
//! Requests run concurrently, bounded by `http.max_concurrent_requests`, and
//! the samples come back in calendar order whatever order the responses
//! arrive in. A day whose request fails counts as zero.
//!
//! A `max_concurrent_requests` of 365 or more issues every day's request at
//! once and then waits for all of them.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use super::concepts::first_occurrence_count;
use super::NewsQuery;
use crate::error::Result;
use crate::models::OccurrenceSample;
use crate::utils::{format_day, parse_day, today};

/// Longest series a single call produces
pub const MAX_SERIES_DAYS: usize = 365;

/// Days covered by a `start..end` range
///
/// The range includes `start` and excludes `end`, except that `start == end`
/// yields that single day. Enumeration stops after [`MAX_SERIES_DAYS`], so a
/// `start` later than `end` yields a full year of days.
pub fn day_list(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start == end {
        return vec![start];
    }

    start
        .iter_days()
        .take(MAX_SERIES_DAYS)
        .take_while(|day| *day != end)
        .collect()
}

impl NewsQuery {
    /// Number of mentions of `concept_uri` on each day from `start` to `end`
    ///
    /// Missing dates default to today. `source_uri` restricts counting to
    /// one source.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDate` if a supplied date is not `YYYY-MM-DD`.
    /// Upstream failures never surface here.
    pub async fn occurrences_over_time(
        &self,
        concept_uri: &str,
        start: Option<&str>,
        end: Option<&str>,
        source_uri: Option<&str>,
    ) -> Result<Vec<OccurrenceSample>> {
        let start = start.map(parse_day).transpose()?.unwrap_or_else(today);
        let end = end.map(parse_day).transpose()?.unwrap_or_else(today);

        let series = self
            .cached(
                "occurrences_over_time",
                &(concept_uri, format_day(start), format_day(end), source_uri),
                self.fetch_series(concept_uri, start, end, source_uri),
            )
            .await;

        Ok(series)
    }

    async fn fetch_series(
        &self,
        concept_uri: &str,
        start: NaiveDate,
        end: NaiveDate,
        source_uri: Option<&str>,
    ) -> Vec<OccurrenceSample> {
        let days = day_list(start, end);
        let concurrency = self.config.http.max_concurrent_requests.max(1);

        info!(
            concept = concept_uri,
            days = days.len(),
            concurrency = concurrency,
            "Fetching occurrence series"
        );

        // `buffered` yields in input order, not completion order
        stream::iter(days)
            .map(|day| self.fetch_day(concept_uri, day, source_uri))
            .buffered(concurrency)
            .collect()
            .await
    }

    async fn fetch_day(
        &self,
        concept_uri: &str,
        day: NaiveDate,
        source_uri: Option<&str>,
    ) -> OccurrenceSample {
        let date = format_day(day);
        let Some(next) = day.succ_opt() else {
            return OccurrenceSample::zero(date);
        };

        let mut params = vec![
            ("uri", concept_uri.to_string()),
            ("after", date.clone()),
            ("before", format_day(next)),
            ("limit", "1".to_string()),
        ];
        if let Some(source) = source_uri {
            params.push(("source", source.to_string()));
        }

        let url = self.semantic_url(&["concepts", "co-occurrences", ""], &params);
        let response = self.gateway.get_json(&url).await;
        let value = first_occurrence_count(&response);

        debug!(date = %date, value = value, "Occurrence sample");
        OccurrenceSample { date, value }
    }
}
