//! Prediction engine for upcoming periods, ovulation and fertile windows.
//!
//! Prediction rules:
//! - Anchor on the last period start (manual override wins over the log)
//! - Cycle length: preference, else the statistical average, nudged one day
//!   in the direction of the cycle trend
//! - Ovulation sits a fixed 14 days before the next period
//! - Projections further out lose 20 confidence points per month

use crate::phase::{classify_phase, recommended_actions, risk_factors};
use crate::{
    Confidence, CycleAnalytics, CyclePhase, CyclePreferences, DateWindow, PredictionResult,
    Snapshot,
};
use chrono::{Duration, NaiveDate};

/// Days from ovulation to the next period
pub const LUTEAL_PHASE_DAYS: i64 = 14;

/// Fertile days before (and including) ovulation
pub const FERTILE_DAYS_BEFORE_OVULATION: i64 = 5;

/// PMS window, in days before the next period start
pub const PMS_WINDOW_START: i64 = 10;
pub const PMS_WINDOW_END: i64 = 5;

/// Number of cycles projected ahead
pub const PROJECTION_MONTHS: u32 = 3;

/// Confidence points lost per projected month beyond the first
pub const CONFIDENCE_DECAY_PER_MONTH: i64 = 20;

/// Everything a prediction depends on
#[derive(Clone, Debug)]
pub struct PredictionContext<'a> {
    pub now: NaiveDate,
    /// Manual override if set, else the latest derived start
    pub last_period_start: Option<NaiveDate>,
    /// Derived period starts, ascending
    pub period_starts: &'a [NaiveDate],
    pub preferences: CyclePreferences,
    pub analytics: &'a CycleAnalytics,
}

impl PredictionContext<'_> {
    /// Cycle length before any trend nudge
    pub fn base_cycle_length(&self) -> i64 {
        self.preferences
            .cycle_length_days
            .unwrap_or(self.analytics.average_cycle_length)
    }

    pub fn period_length(&self) -> i64 {
        self.preferences
            .period_length_days
            .unwrap_or(self.analytics.average_period_length)
    }

    /// Cycle length shifted `nudge_days` in the trend direction
    pub fn effective_cycle_length(&self, nudge_days: i64) -> i64 {
        self.base_cycle_length() + self.analytics.cycle_trend.direction() * nudge_days
    }

    /// Phase of `date`, anchored on the override when it precedes the date
    pub fn phase_on(&self, date: NaiveDate) -> Option<CyclePhase> {
        let anchors: Vec<NaiveDate> = match self.last_period_start {
            Some(last) if last <= date => vec![last],
            _ => self.period_starts.to_vec(),
        };
        classify_phase(
            date,
            &anchors,
            self.period_length(),
            self.effective_cycle_length(trend_nudge(1)),
        )
    }
}

/// Last period start: the override when present, else the latest derived one
pub fn resolve_last_period_start(
    period_starts: &[NaiveDate],
    manual_override: Option<NaiveDate>,
) -> Option<NaiveDate> {
    manual_override.or_else(|| period_starts.last().copied())
}

/// Trend nudge in days for projected month `month`: one day for the next
/// cycle, growing as `month / 2` further out
pub fn trend_nudge(month: u32) -> i64 {
    i64::from(month / 2).max(1)
}

/// `date` shifted by `days`, `None` past the representable calendar
fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

fn days_until(target: NaiveDate, now: NaiveDate) -> i64 {
    (target - now).num_days().max(0)
}

fn build_projection(
    ctx: &PredictionContext<'_>,
    month: u32,
    period_start: NaiveDate,
    confidence_score: i64,
) -> Option<PredictionResult> {
    let period_end = shift(period_start, ctx.period_length() - 1)?;
    let ovulation = shift(period_start, -LUTEAL_PHASE_DAYS)?;
    let fertile_start = shift(ovulation, -FERTILE_DAYS_BEFORE_OVULATION)?;
    let pms_window = DateWindow::new(
        shift(period_start, -PMS_WINDOW_START)?,
        shift(period_start, -PMS_WINDOW_END)?,
    );
    let current_phase = ctx.phase_on(ctx.now);

    Some(PredictionResult {
        month,
        next_period_start: period_start,
        next_period_end: period_end,
        next_ovulation: ovulation,
        fertile_window_start: fertile_start,
        fertile_window_end: ovulation,
        pms_window,
        days_until_period: days_until(period_start, ctx.now),
        days_until_ovulation: days_until(ovulation, ctx.now),
        confidence: Confidence::from_score(confidence_score),
        current_phase,
        recommended_actions: current_phase
            .map(|phase| recommended_actions(phase, ctx.analytics))
            .unwrap_or_default(),
        risk_factors: risk_factors(ctx.analytics),
    })
}

fn project_month(
    ctx: &PredictionContext<'_>,
    last_start: NaiveDate,
    month: u32,
) -> Option<PredictionResult> {
    let cycle_length = ctx.effective_cycle_length(trend_nudge(month));
    let start = shift(last_start, cycle_length * i64::from(month))?;
    let score =
        ctx.analytics.prediction_confidence - CONFIDENCE_DECAY_PER_MONTH * i64::from(month - 1);
    build_projection(ctx, month, start, score)
}

/// Predict the next cycle
///
/// `None` when no period start is known or the projected dates fall off
/// the calendar.
pub fn predict_next(ctx: &PredictionContext<'_>) -> Option<PredictionResult> {
    let last_start = ctx.last_period_start?;
    let cycle_length = ctx.effective_cycle_length(trend_nudge(1));

    tracing::debug!(
        "Predicting from {} with cycle length {} ({:?})",
        last_start,
        cycle_length,
        ctx.analytics.cycle_trend
    );

    project_month(ctx, last_start, 1)
}

/// Project the next three cycles, each with its own decayed confidence
///
/// Month `n` is anchored at `last_start + cycle(n) * n` with the nudge from
/// [`trend_nudge`]. Month 1 always equals [`predict_next`]. Months whose
/// dates fall off the calendar are left out.
pub fn predict_months(ctx: &PredictionContext<'_>) -> Vec<PredictionResult> {
    let Some(last_start) = ctx.last_period_start else {
        return Vec::new();
    };

    (1..=PROJECTION_MONTHS)
        .filter_map(|month| project_month(ctx, last_start, month))
        .collect()
}

/// Assemble a snapshot from already-computed analytics
pub fn snapshot(ctx: &PredictionContext<'_>) -> Snapshot {
    Snapshot {
        analytics: ctx.analytics.clone(),
        prediction: predict_next(ctx),
        projections: predict_months(ctx),
    }
}

impl PredictionResult {
    /// The three days centred on the estimated ovulation date
    pub fn ovulation_window(&self) -> DateWindow {
        DateWindow::new(
            self.next_ovulation.pred_opt().unwrap_or(self.next_ovulation),
            self.next_ovulation.succ_opt().unwrap_or(self.next_ovulation),
        )
    }
}

impl Snapshot {
    /// Projection for month 1, 2 or 3
    ///
    /// Month 1 is the single-cycle prediction; later months come from the
    /// multi-month projection.
    pub fn projection(&self, month: u32) -> Option<&PredictionResult> {
        match month {
            1 => self.prediction.as_ref(),
            2..=PROJECTION_MONTHS => self.projections.iter().find(|p| p.month == month),
            _ => None,
        }
    }

    pub fn is_date_in_predicted_period(&self, date: NaiveDate, month: u32) -> bool {
        self.projection(month)
            .is_some_and(|p| p.period_window().contains(date))
    }

    pub fn is_date_in_ovulation_window(&self, date: NaiveDate, month: u32) -> bool {
        self.projection(month)
            .is_some_and(|p| p.ovulation_window().contains(date))
    }

    pub fn is_date_in_fertile_window(&self, date: NaiveDate, month: u32) -> bool {
        self.projection(month)
            .is_some_and(|p| p.fertile_window().contains(date))
    }
}
