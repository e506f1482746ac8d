//! Concurrent day-by-day history aggregation.
//!
//! One request for N days becomes N cache-aside lookups launched together.
//! The response is all-or-nothing: every day is attempted, and if any day
//! fails after all have settled, the whole request fails with the error of
//! the smallest failing offset. Days that already succeeded still sit in
//! the cache, so a retry only refetches what actually failed.

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use futures_util::future::join_all;
use vane_core::{DaySummary, Location, VaneError, VaneResult};
use vane_provider::WeatherProvider;
use vane_storage::{CacheKey, ReadThroughCache};

/// Upper bound on the requested window. Finite and overridable; keeps a
/// single request from fanning out into thousands of upstream calls.
pub const DEFAULT_MAX_WINDOW_DAYS: u32 = 366;

/// Fans one history request out into per-day lookups.
pub struct HistoryAggregator {
    cache: ReadThroughCache,
    provider: Arc<dyn WeatherProvider>,
    max_window_days: u32,
}

impl HistoryAggregator {
    pub fn new(cache: ReadThroughCache, provider: Arc<dyn WeatherProvider>) -> Self {
        Self {
            cache,
            provider,
            max_window_days: DEFAULT_MAX_WINDOW_DAYS,
        }
    }

    /// Builder form of [`set_max_window`](Self::set_max_window).
    pub fn with_max_window(mut self, days: u32) -> Self {
        self.set_max_window(days);
        self
    }

    pub fn set_max_window(&mut self, days: u32) {
        self.max_window_days = days.max(1);
    }

    /// Check a raw day count against the contract: a positive integer no
    /// larger than the window bound. Runs before any I/O.
    pub fn validate_window(&self, days: i64) -> VaneResult<u32> {
        if days < 1 {
            return Err(VaneError::invalid_payload(format!(
                "days must be a positive integer, got {days}"
            )));
        }
        if days > i64::from(self.max_window_days) {
            return Err(VaneError::invalid_payload(format!(
                "days must be at most {}, got {days}",
                self.max_window_days
            )));
        }
        Ok(days as u32)
    }

    /// Collect summaries for the `window` days ending today, most recent
    /// first.
    pub async fn collect(&self, location: &Location, window: u32) -> VaneResult<Vec<DaySummary>> {
        self.collect_from(location, window, Utc::now().date_naive())
            .await
    }

    /// Collect with an explicit anchor day. Offset `k` maps to
    /// `anchor - k` days; offset 0 is the anchor itself.
    pub async fn collect_from(
        &self,
        location: &Location,
        window: u32,
        anchor: NaiveDate,
    ) -> VaneResult<Vec<DaySummary>> {
        let mut dates = Vec::with_capacity(window as usize);
        for offset in 0..window {
            let date = anchor
                .checked_sub_days(Days::new(u64::from(offset)))
                .ok_or_else(|| {
                    VaneError::invalid_payload(format!(
                        "history window reaches past the representable calendar at offset {offset}"
                    ))
                })?;
            dates.push(date);
        }

        tracing::debug!(
            location_id = %location.id,
            window,
            "collecting weather history"
        );

        let lookups = dates.into_iter().map(|date| {
            let key = CacheKey::WeatherHistory(location.id, date);
            let provider = Arc::clone(&self.provider);
            let (latitude, longitude) = (location.latitude, location.longitude);
            async move {
                self.cache
                    .get_or_load(&key, move || async move {
                        provider.fetch_day_summary(latitude, longitude, date).await
                    })
                    .await
            }
        });

        // join_all keeps results in input order, so index k is offset k no
        // matter when each lookup finished. Nothing is inspected until every
        // day has settled; the `?` then surfaces the smallest failing offset.
        let settled = join_all(lookups).await;
        let mut summaries = Vec::with_capacity(settled.len());
        for result in settled {
            summaries.push(result?);
        }
        Ok(summaries)
    }
}
