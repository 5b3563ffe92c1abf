//! Core domain types for ebb.
//!
//! This module defines the fundamental types used throughout the system:
//! - Daily records (flow and symptoms, keyed by calendar date)
//! - User preferences for cycle and period length
//! - Derived analytics and prediction results

use crate::Error;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Cycle length used when neither a preference nor history is available
pub const DEFAULT_CYCLE_LENGTH: i64 = 28;

/// Period length used when neither a preference nor history is available
pub const DEFAULT_PERIOD_LENGTH: i64 = 5;

/// Accepted range for a user-set cycle length
pub const CYCLE_LENGTH_RANGE: RangeInclusive<i64> = 20..=40;

/// Accepted range for a user-set period length
pub const PERIOD_LENGTH_RANGE: RangeInclusive<i64> = 1..=14;

// ============================================================================
// Record Types
// ============================================================================

/// Logged menstrual flow for a day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlowIntensity {
    #[default]
    None,
    Light,
    Medium,
    Heavy,
}

impl FlowIntensity {
    /// Whether this counts as a period day
    pub fn has_flow(self) -> bool {
        self != FlowIntensity::None
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FlowIntensity::None => "none",
            FlowIntensity::Light => "light",
            FlowIntensity::Medium => "medium",
            FlowIntensity::Heavy => "heavy",
        }
    }
}

/// Intensity for cramps and headaches
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SymptomIntensity {
    #[default]
    None,
    Mild,
    Moderate,
    Severe,
}

impl SymptomIntensity {
    pub fn as_str(self) -> &'static str {
        match self {
            SymptomIntensity::None => "none",
            SymptomIntensity::Mild => "mild",
            SymptomIntensity::Moderate => "moderate",
            SymptomIntensity::Severe => "severe",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    #[default]
    Neutral,
    Happy,
    Sad,
    Irritable,
    Anxious,
    Tired,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Neutral => "neutral",
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Irritable => "irritable",
            Mood::Anxious => "anxious",
            Mood::Tired => "tired",
        }
    }
}

impl FromStr for FlowIntensity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(FlowIntensity::None),
            "light" => Ok(FlowIntensity::Light),
            "medium" => Ok(FlowIntensity::Medium),
            "heavy" => Ok(FlowIntensity::Heavy),
            other => Err(Error::InvalidInput(format!("unknown flow: {}", other))),
        }
    }
}

impl FromStr for SymptomIntensity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(SymptomIntensity::None),
            "mild" => Ok(SymptomIntensity::Mild),
            "moderate" => Ok(SymptomIntensity::Moderate),
            "severe" => Ok(SymptomIntensity::Severe),
            other => Err(Error::InvalidInput(format!(
                "unknown symptom intensity: {}",
                other
            ))),
        }
    }
}

impl FromStr for Mood {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "neutral" => Ok(Mood::Neutral),
            "happy" => Ok(Mood::Happy),
            "sad" => Ok(Mood::Sad),
            "irritable" => Ok(Mood::Irritable),
            "anxious" => Ok(Mood::Anxious),
            "tired" => Ok(Mood::Tired),
            other => Err(Error::InvalidInput(format!("unknown mood: {}", other))),
        }
    }
}

/// Symptoms attached to a daily record
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Symptoms {
    #[serde(default)]
    pub cramps: SymptomIntensity,
    #[serde(default)]
    pub headache: SymptomIntensity,
    #[serde(default)]
    pub mood: Mood,
    #[serde(default)]
    pub notes: String,
}

impl Symptoms {
    /// True if cramps or headache were logged as severe
    pub fn has_severe(&self) -> bool {
        self.cramps == SymptomIntensity::Severe || self.headache == SymptomIntensity::Severe
    }

    /// Human-readable labels for everything logged, skipping "none" and "neutral"
    pub fn labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        if self.cramps != SymptomIntensity::None {
            labels.push(format!("{} cramps", self.cramps.as_str()));
        }
        if self.headache != SymptomIntensity::None {
            labels.push(format!("{} headache", self.headache.as_str()));
        }
        if self.mood != Mood::Neutral {
            labels.push(format!("{} mood", self.mood.as_str()));
        }
        labels
    }
}

/// One logged calendar day. The date is the natural key.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub flow: FlowIntensity,
    #[serde(default)]
    pub symptoms: Symptoms,
}

impl DailyRecord {
    /// A record with no flow and no symptoms
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            flow: FlowIntensity::None,
            symptoms: Symptoms::default(),
        }
    }

    pub fn with_flow(date: NaiveDate, flow: FlowIntensity) -> Self {
        Self {
            flow,
            ..Self::empty(date)
        }
    }
}

// ============================================================================
// Preferences
// ============================================================================

/// User-set lengths that take priority over computed averages
///
/// Values outside [`CYCLE_LENGTH_RANGE`] / [`PERIOD_LENGTH_RANGE`] are never
/// held here; use the checked setters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CyclePreferences {
    pub cycle_length_days: Option<i64>,
    pub period_length_days: Option<i64>,
}

impl CyclePreferences {
    /// Build preferences, dropping out-of-range values
    pub fn new(cycle_length_days: Option<i64>, period_length_days: Option<i64>) -> Self {
        Self {
            cycle_length_days: cycle_length_days.filter(|d| CYCLE_LENGTH_RANGE.contains(d)),
            period_length_days: period_length_days.filter(|d| PERIOD_LENGTH_RANGE.contains(d)),
        }
    }
}

// ============================================================================
// Analytics Types
// ============================================================================

/// Cycle phase, driven purely by days elapsed since a period start
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Menstrual,
    Follicular,
    Ovulation,
    Luteal,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CyclePhase::Menstrual => "Menstrual",
            CyclePhase::Follicular => "Follicular",
            CyclePhase::Ovulation => "Ovulation",
            CyclePhase::Luteal => "Luteal",
        };
        f.write_str(name)
    }
}

/// Direction recent cycle lengths are moving in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CycleTrend {
    #[default]
    Stable,
    Increasing,
    Decreasing,
}

impl CycleTrend {
    /// Sign of the day nudge applied to predictions
    pub fn direction(self) -> i64 {
        match self {
            CycleTrend::Stable => 0,
            CycleTrend::Increasing => 1,
            CycleTrend::Decreasing => -1,
        }
    }
}

/// Qualitative band of the numeric prediction confidence
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// >= 75 high, >= 50 medium, else low
    pub fn from_score(score: i64) -> Self {
        if score >= 75 {
            Confidence::High
        } else if score >= 50 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        };
        f.write_str(name)
    }
}

/// Severity tier of a phase's symptom volume
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PatternSeverity {
    Low,
    Medium,
    High,
}

/// Symptoms aggregated over every logged day that fell into one phase
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymptomPattern {
    pub phase: CyclePhase,
    /// Up to five distinct labels, most frequent first
    pub symptoms: Vec<String>,
    pub severity: PatternSeverity,
    /// Total symptom occurrences counted for the phase
    pub occurrences: usize,
}

/// Statistics derived from the record log. Recomputed on demand, never stored.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CycleAnalytics {
    pub average_cycle_length: i64,
    pub min_cycle_length: i64,
    pub max_cycle_length: i64,
    /// Number of valid cycle intervals
    pub total_cycles: usize,
    pub regularity_score: i64,
    pub is_regular: bool,
    pub cycle_trend: CycleTrend,
    pub average_period_length: i64,
    pub prediction_confidence: i64,
    pub symptom_patterns: Vec<SymptomPattern>,
    pub health_score: i64,
}

impl CycleAnalytics {
    /// Pattern entry for a phase, if any symptoms were logged in it
    pub fn pattern_for(&self, phase: CyclePhase) -> Option<&SymptomPattern> {
        self.symptom_patterns.iter().find(|p| p.phase == phase)
    }
}

// ============================================================================
// Prediction Types
// ============================================================================

/// Inclusive range of calendar days
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// One projected cycle
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictionResult {
    /// 1 for the next cycle, 2 and 3 for the ones after
    pub month: u32,
    pub next_period_start: NaiveDate,
    pub next_period_end: NaiveDate,
    pub next_ovulation: NaiveDate,
    pub fertile_window_start: NaiveDate,
    pub fertile_window_end: NaiveDate,
    pub pms_window: DateWindow,
    pub days_until_period: i64,
    pub days_until_ovulation: i64,
    pub confidence: Confidence,
    pub current_phase: Option<CyclePhase>,
    pub recommended_actions: Vec<String>,
    pub risk_factors: Vec<String>,
}

impl PredictionResult {
    pub fn period_window(&self) -> DateWindow {
        DateWindow::new(self.next_period_start, self.next_period_end)
    }

    pub fn fertile_window(&self) -> DateWindow {
        DateWindow::new(self.fertile_window_start, self.fertile_window_end)
    }
}

/// Everything a view needs after a mutation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub analytics: CycleAnalytics,
    pub prediction: Option<PredictionResult>,
    pub projections: Vec<PredictionResult>,
}
