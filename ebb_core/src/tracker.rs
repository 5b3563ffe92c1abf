//! Tracker: the record log, preferences and manual override behind a store.
//!
//! Every read re-derives from the store; nothing is cached. Callers invoke
//! [`Tracker::recompute`] after each mutation to refresh their views.

use crate::period_log::{self, extract_period_starts};
use crate::phase::{self, TipContext, TipSet};
use crate::prediction::{self, PredictionContext};
use crate::store::{load_json, save_json, RecordStore};
use crate::{
    stats, CycleAnalytics, CyclePhase, CyclePreferences, DailyRecord, PredictionResult, Result,
    Snapshot, CYCLE_LENGTH_RANGE, PERIOD_LENGTH_RANGE,
};
use chrono::NaiveDate;

/// Store key for the daily record log
pub const HISTORY_KEY: &str = "ebb.history";
/// Store key for the cycle length preference
pub const CYCLE_LENGTH_KEY: &str = "ebb.cycle_length";
/// Store key for the period length preference
pub const PERIOD_LENGTH_KEY: &str = "ebb.period_length";
/// Store key for the manual period start override
pub const MANUAL_START_KEY: &str = "ebb.manual_period_start";

pub struct Tracker<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> Tracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // ------------------------------------------------------------------
    // Record log
    // ------------------------------------------------------------------

    /// All records, ascending by date. Missing or malformed data reads as empty.
    pub fn history(&self) -> Vec<DailyRecord> {
        let mut records: Vec<DailyRecord> = load_json(&self.store, HISTORY_KEY).unwrap_or_default();
        records.sort_by_key(|r| r.date);
        records
    }

    /// Insert or replace the record for its date
    pub fn save_record(&mut self, record: DailyRecord) -> Result<()> {
        let mut records = self.history();
        tracing::info!("Saving record for {} (flow: {})", record.date, record.flow.as_str());
        period_log::upsert_record(&mut records, record);
        save_json(&mut self.store, HISTORY_KEY, &records)
    }

    /// Log a whole period starting at `start`
    ///
    /// Without an explicit length the effective period length is used.
    /// Returns the number of days written.
    pub fn quick_add_period(&mut self, start: NaiveDate, length: Option<i64>) -> Result<usize> {
        let length = length.unwrap_or_else(|| self.effective_period_length());
        let new_records = period_log::quick_period_records(start, length);
        let count = new_records.len();

        let mut records = self.history();
        for record in new_records {
            period_log::upsert_record(&mut records, record);
        }
        save_json(&mut self.store, HISTORY_KEY, &records)?;

        tracing::info!("Quick-added {} period days from {}", count, start);
        Ok(count)
    }

    pub fn record_for_date(&self, date: NaiveDate) -> Option<DailyRecord> {
        period_log::record_for_date(&self.history(), date).cloned()
    }

    pub fn has_record_for_date(&self, date: NaiveDate) -> bool {
        period_log::has_record_for_date(&self.history(), date)
    }

    pub fn is_period_day(&self, date: NaiveDate) -> bool {
        period_log::is_period_day(&self.history(), date)
    }

    pub fn period_starts(&self) -> Vec<NaiveDate> {
        extract_period_starts(&self.history())
    }

    // ------------------------------------------------------------------
    // Preferences
    // ------------------------------------------------------------------

    /// Stored cycle length; out-of-range stored values read as unset
    pub fn cycle_length_preference(&self) -> Option<i64> {
        load_json::<i64, _>(&self.store, CYCLE_LENGTH_KEY).filter(|d| CYCLE_LENGTH_RANGE.contains(d))
    }

    pub fn period_length_preference(&self) -> Option<i64> {
        load_json::<i64, _>(&self.store, PERIOD_LENGTH_KEY)
            .filter(|d| PERIOD_LENGTH_RANGE.contains(d))
    }

    /// Store a cycle length preference
    ///
    /// Out-of-range values are not written and `Ok(false)` is returned; any
    /// previous value stays in place.
    pub fn set_cycle_length(&mut self, days: i64) -> Result<bool> {
        if !CYCLE_LENGTH_RANGE.contains(&days) {
            tracing::debug!("Ignoring cycle length {} outside {:?}", days, CYCLE_LENGTH_RANGE);
            return Ok(false);
        }
        save_json(&mut self.store, CYCLE_LENGTH_KEY, &days)?;
        tracing::info!("Cycle length preference set to {} days", days);
        Ok(true)
    }

    /// Store a period length preference. Same rules as [`Self::set_cycle_length`].
    pub fn set_period_length(&mut self, days: i64) -> Result<bool> {
        if !PERIOD_LENGTH_RANGE.contains(&days) {
            tracing::debug!("Ignoring period length {} outside {:?}", days, PERIOD_LENGTH_RANGE);
            return Ok(false);
        }
        save_json(&mut self.store, PERIOD_LENGTH_KEY, &days)?;
        tracing::info!("Period length preference set to {} days", days);
        Ok(true)
    }

    pub fn preferences(&self) -> CyclePreferences {
        CyclePreferences::new(self.cycle_length_preference(), self.period_length_preference())
    }

    // ------------------------------------------------------------------
    // Manual override
    // ------------------------------------------------------------------

    pub fn manual_period_start(&self) -> Option<NaiveDate> {
        load_json(&self.store, MANUAL_START_KEY)
    }

    /// Mark a date as the latest period start, superseding the log
    pub fn set_manual_period_start(&mut self, date: NaiveDate) -> Result<()> {
        save_json(&mut self.store, MANUAL_START_KEY, &date)?;
        tracing::info!("Manual period start set to {}", date);
        Ok(())
    }

    pub fn clear_manual_period_start(&mut self) -> Result<()> {
        self.store.remove(MANUAL_START_KEY)?;
        tracing::info!("Manual period start cleared");
        Ok(())
    }

    /// Manual override if set, else the start of the latest logged period
    pub fn last_period_start_date(&self) -> Option<NaiveDate> {
        prediction::resolve_last_period_start(&self.period_starts(), self.manual_period_start())
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    pub fn analytics(&self) -> CycleAnalytics {
        stats::analyze(&self.history(), &self.preferences())
    }

    /// Cycle length in effect: preference, else average, else default
    pub fn effective_cycle_length(&self) -> i64 {
        self.cycle_length_preference()
            .unwrap_or_else(|| self.analytics().average_cycle_length)
    }

    /// Period length in effect: preference, else average, else default
    pub fn effective_period_length(&self) -> i64 {
        self.period_length_preference()
            .unwrap_or_else(|| self.analytics().average_period_length)
    }

    /// Re-derive analytics and predictions from the stored state
    pub fn recompute(&self, now: NaiveDate) -> Snapshot {
        let records = self.history();
        let preferences = self.preferences();
        let starts = extract_period_starts(&records);
        let analytics = stats::analyze(&records, &preferences);

        let ctx = PredictionContext {
            now,
            last_period_start: prediction::resolve_last_period_start(
                &starts,
                self.manual_period_start(),
            ),
            period_starts: &starts,
            preferences,
            analytics: &analytics,
        };

        prediction::snapshot(&ctx)
    }

    pub fn predict(&self, now: NaiveDate) -> Option<PredictionResult> {
        self.recompute(now).prediction
    }

    pub fn current_phase(&self, date: NaiveDate) -> Option<CyclePhase> {
        self.recompute(date).prediction.and_then(|p| p.current_phase)
    }

    /// 1-based day of the current cycle, `None` before any period start
    pub fn current_cycle_day(&self, now: NaiveDate) -> Option<i64> {
        let last_start = self.last_period_start_date()?;
        phase::current_cycle_day(now, last_start, self.effective_cycle_length())
    }

    /// Which predicted window `date` falls in, using the next cycle's windows
    pub fn tip_context(&self, date: NaiveDate, now: NaiveDate) -> TipContext {
        let snapshot = self.recompute(now);
        TipContext::from_windows(
            snapshot.is_date_in_predicted_period(date, 1),
            snapshot.is_date_in_ovulation_window(date, 1),
            snapshot.is_date_in_fertile_window(date, 1),
        )
    }

    pub fn tips_for_date(&self, date: NaiveDate, now: NaiveDate) -> TipSet {
        phase::tips_for(self.tip_context(date, now))
    }
}
