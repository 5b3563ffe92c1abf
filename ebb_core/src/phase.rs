//! Cycle phase classification and phase-based guidance.
//!
//! Phases are a pure function of days elapsed since a period start:
//! menstrual `[0, L)`, follicular `[L, 14)`, ovulation `[14, 16]`,
//! luteal `(16, C)`, with `L` the period length and `C` the cycle length.
//! Offsets past `C` wrap into the next projected cycle.

use crate::{CycleAnalytics, CyclePhase, CycleTrend, PatternSeverity};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// First day (0-based, from period start) of the ovulation phase
pub const OVULATION_PHASE_START: i64 = 14;

/// Last day (inclusive) of the ovulation phase
pub const OVULATION_PHASE_END: i64 = 16;

/// Health score below which the advisor raises a flag
pub const LOW_HEALTH_SCORE: i64 = 60;

/// Phase for a day offset from the period start, `None` for negative offsets
pub fn phase_for_offset(
    days_since_start: i64,
    period_length: i64,
    cycle_length: i64,
) -> Option<CyclePhase> {
    if days_since_start < 0 {
        return None;
    }

    let day = if cycle_length > 0 {
        days_since_start % cycle_length
    } else {
        days_since_start
    };

    let phase = if day < period_length {
        CyclePhase::Menstrual
    } else if day < OVULATION_PHASE_START {
        CyclePhase::Follicular
    } else if day <= OVULATION_PHASE_END {
        CyclePhase::Ovulation
    } else {
        CyclePhase::Luteal
    };
    Some(phase)
}

/// Latest start on or before `date`. `starts` must be ascending.
pub fn nearest_start_on_or_before(starts: &[NaiveDate], date: NaiveDate) -> Option<NaiveDate> {
    starts.iter().rev().find(|start| **start <= date).copied()
}

/// Phase of `date` relative to the nearest preceding period start
pub fn classify_phase(
    date: NaiveDate,
    starts: &[NaiveDate],
    period_length: i64,
    cycle_length: i64,
) -> Option<CyclePhase> {
    let start = nearest_start_on_or_before(starts, date)?;
    phase_for_offset((date - start).num_days(), period_length, cycle_length)
}

/// 1-based day within the current cycle
pub fn current_cycle_day(now: NaiveDate, last_start: NaiveDate, cycle_length: i64) -> Option<i64> {
    let elapsed = (now - last_start).num_days();
    if elapsed < 0 || cycle_length <= 0 {
        return None;
    }
    Some(elapsed % cycle_length + 1)
}

fn base_actions(phase: CyclePhase) -> &'static [&'static str] {
    match phase {
        CyclePhase::Menstrual => &[
            "Rest more and keep a heating pad handy for cramps",
            "Eat iron-rich foods like spinach and lentils",
            "Stay hydrated",
        ],
        CyclePhase::Follicular => &[
            "Energy is rising: a good time for harder workouts",
            "Focus on fresh vegetables and lean protein",
            "Plan demanding tasks for the coming days",
        ],
        CyclePhase::Ovulation => &[
            "Stay hydrated and eat antioxidant-rich foods",
            "Track fertility signs if you are planning or avoiding pregnancy",
        ],
        CyclePhase::Luteal => &[
            "Magnesium-rich foods like dark chocolate and nuts may ease PMS",
            "Prioritize sleep and gentle exercise",
            "Cut back on caffeine and salt to reduce bloating",
        ],
    }
}

/// Short advice list for a phase
///
/// One extra item is added when the health score is low or the phase's
/// logged symptoms reach high severity.
pub fn recommended_actions(phase: CyclePhase, analytics: &CycleAnalytics) -> Vec<String> {
    let mut actions: Vec<String> = base_actions(phase).iter().map(|a| a.to_string()).collect();

    let severe_pattern = analytics
        .pattern_for(phase)
        .is_some_and(|p| p.severity == PatternSeverity::High);

    if analytics.health_score < LOW_HEALTH_SCORE || severe_pattern {
        actions.push(format!(
            "Symptoms around your {} phase have been heavy; consider discussing them with a healthcare provider",
            phase.to_string().to_lowercase()
        ));
    }

    actions
}

/// Flags worth surfacing: irregularity, then low health score, then trend
pub fn risk_factors(analytics: &CycleAnalytics) -> Vec<String> {
    let mut risks = Vec::new();

    if !analytics.is_regular {
        risks.push(format!(
            "Irregular cycles: only {}% are within 3 days of your average",
            analytics.regularity_score
        ));
    }

    if analytics.health_score < LOW_HEALTH_SCORE {
        risks.push(format!(
            "Low cycle health score ({}): variable cycles or frequent severe symptoms",
            analytics.health_score
        ));
    }

    match analytics.cycle_trend {
        CycleTrend::Stable => {}
        CycleTrend::Increasing => risks.push("Cycles are getting longer".to_string()),
        CycleTrend::Decreasing => risks.push("Cycles are getting shorter".to_string()),
    }

    risks
}

// ============================================================================
// Food and health tips
// ============================================================================

/// Which predicted window a date falls in, for tip lookup
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TipContext {
    Period,
    Ovulation,
    Fertile,
    Baseline,
}

impl TipContext {
    /// Resolve overlapping windows: period > ovulation > fertile > baseline
    pub fn from_windows(in_period: bool, in_ovulation: bool, in_fertile: bool) -> Self {
        if in_period {
            TipContext::Period
        } else if in_ovulation {
            TipContext::Ovulation
        } else if in_fertile {
            TipContext::Fertile
        } else {
            TipContext::Baseline
        }
    }
}

/// Food recommendations and health tips for one context
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TipSet {
    pub foods: Vec<&'static str>,
    pub health_tips: Vec<&'static str>,
}

static TIP_CATALOG: Lazy<HashMap<TipContext, TipSet>> = Lazy::new(build_tip_catalog);

fn build_tip_catalog() -> HashMap<TipContext, TipSet> {
    let mut catalog = HashMap::new();

    catalog.insert(
        TipContext::Period,
        TipSet {
            foods: vec![
                "Leafy greens and lentils for iron",
                "Dark chocolate",
                "Ginger tea",
                "Salmon or other omega-3 sources",
                "Bananas",
            ],
            health_tips: vec![
                "Use a heating pad for cramps",
                "Get extra rest",
                "Stay hydrated",
                "Try gentle yoga or walking",
                "Log your flow and symptoms daily",
            ],
        },
    );

    catalog.insert(
        TipContext::Ovulation,
        TipSet {
            foods: vec![
                "Berries and other antioxidant-rich fruit",
                "Leafy greens",
                "Whole grains",
                "Avocado",
                "Plenty of water",
            ],
            health_tips: vec![
                "Energy tends to peak: make room for exercise",
                "Watch for ovulation signs like mild one-sided pain",
                "Stay hydrated",
            ],
        },
    );

    catalog.insert(
        TipContext::Fertile,
        TipSet {
            foods: vec![
                "Eggs and legumes for protein",
                "Nuts and seeds for zinc",
                "Citrus fruit",
                "Whole grains",
            ],
            health_tips: vec![
                "This is your fertile window",
                "Use protection if you are avoiding pregnancy",
                "Keep up regular sleep",
            ],
        },
    );

    catalog.insert(
        TipContext::Baseline,
        TipSet {
            foods: vec![
                "Balanced meals with protein and fiber",
                "Fresh fruit and vegetables",
                "Complex carbohydrates",
                "Magnesium-rich nuts",
            ],
            health_tips: vec![
                "Keep a regular sleep schedule",
                "Exercise most days",
                "Keep logging to improve predictions",
            ],
        },
    );

    catalog
}

/// Tips for a context. Every context has an entry.
pub fn tips_for(context: TipContext) -> TipSet {
    TIP_CATALOG.get(&context).cloned().unwrap_or_else(|| TipSet {
        foods: Vec::new(),
        health_tips: Vec::new(),
    })
}
