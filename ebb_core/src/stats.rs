//! Cycle statistics derived from the record log.
//!
//! Statistics rules:
//! - Only intervals between period starts of 15-45 days count; the rest are
//!   treated as logging gaps or outliers and skipped.
//! - Period runs longer than 10 days are skipped the same way.
//! - Confidence and health weights are heuristics, not clinical constants.

use crate::period_log::{extract_period_starts, flow_runs};
use crate::phase::{nearest_start_on_or_before, phase_for_offset};
use crate::{
    CycleAnalytics, CyclePhase, CyclePreferences, CycleTrend, DailyRecord, PatternSeverity,
    SymptomPattern, DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Interval lengths accepted into statistics
pub const VALID_CYCLE_INTERVAL: RangeInclusive<i64> = 15..=45;

/// Period run lengths accepted into statistics
pub const VALID_PERIOD_RUN: RangeInclusive<usize> = 1..=10;

/// Maximum distance from the mean for a cycle to count as regular
pub const REGULARITY_TOLERANCE_DAYS: i64 = 3;

/// Regularity score at or above which cycles are called regular
pub const REGULAR_THRESHOLD: i64 = 70;

const TREND_WINDOW: usize = 3;
const MIN_INTERVALS_FOR_CONFIDENCE: usize = 3;
const TOP_SYMPTOMS_PER_PHASE: usize = 5;

const CONFIDENCE_PER_INTERVAL: f64 = 15.0;
const CONFIDENCE_PER_REGULARITY_POINT: f64 = 0.6;
const CONFIDENCE_PER_RECORD: f64 = 2.0;

const MAX_VARIANCE_PENALTY: f64 = 20.0;
const MAX_SEVERE_PENALTY: f64 = 30.0;
const SEVERE_PENALTY_PER_PERCENT: f64 = 0.5;

/// Day counts between consecutive period starts, outliers removed
pub fn cycle_intervals(starts: &[NaiveDate]) -> Vec<i64> {
    starts
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .filter(|days| VALID_CYCLE_INTERVAL.contains(days))
        .collect()
}

fn mean(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<i64>() as f64 / values.len() as f64)
}

fn variance(values: &[i64]) -> f64 {
    match mean(values) {
        Some(avg) => {
            values.iter().map(|v| (*v as f64 - avg).powi(2)).sum::<f64>() / values.len() as f64
        }
        None => 0.0,
    }
}

/// Rounded mean of the valid intervals, `None` without any
pub fn average_cycle_length(intervals: &[i64]) -> Option<i64> {
    mean(intervals).map(|avg| avg.round() as i64)
}

/// Percentage of intervals within three days of the rounded mean
pub fn regularity_score(intervals: &[i64]) -> i64 {
    let Some(average) = average_cycle_length(intervals) else {
        return 0;
    };

    let within = intervals
        .iter()
        .filter(|days| (**days - average).abs() <= REGULARITY_TOLERANCE_DAYS)
        .count();

    (within as f64 * 100.0 / intervals.len() as f64).round() as i64
}

/// Compare the last three intervals against the (up to) three before them
pub fn cycle_trend(intervals: &[i64]) -> CycleTrend {
    if intervals.len() < TREND_WINDOW {
        return CycleTrend::Stable;
    }

    let split = intervals.len() - TREND_WINDOW;
    let recent = &intervals[split..];
    let previous = &intervals[split.saturating_sub(TREND_WINDOW)..split];

    let (Some(recent_avg), Some(previous_avg)) = (mean(recent), mean(previous)) else {
        return CycleTrend::Stable;
    };

    let diff = recent_avg - previous_avg;
    if diff.abs() < 1.0 {
        CycleTrend::Stable
    } else if diff > 0.0 {
        CycleTrend::Increasing
    } else {
        CycleTrend::Decreasing
    }
}

/// Numeric confidence (0-100) in the next prediction
///
/// Zero until at least three valid intervals exist.
pub fn prediction_confidence(interval_count: usize, regularity: i64, record_count: usize) -> i64 {
    if interval_count < MIN_INTERVALS_FOR_CONFIDENCE {
        return 0;
    }

    let raw = CONFIDENCE_PER_INTERVAL * interval_count as f64
        + CONFIDENCE_PER_REGULARITY_POINT * regularity as f64
        + CONFIDENCE_PER_RECORD * record_count as f64;

    (raw.round() as i64).clamp(0, 100)
}

/// Rounded mean length of logged periods, 5 without usable runs
pub fn average_period_length(records: &[DailyRecord]) -> i64 {
    let lengths: Vec<i64> = flow_runs(records)
        .iter()
        .map(|run| run.len())
        .filter(|len| VALID_PERIOD_RUN.contains(len))
        .map(|len| len as i64)
        .collect();

    average_cycle_length(&lengths).unwrap_or(DEFAULT_PERIOD_LENGTH)
}

fn severity_for(occurrences: usize) -> PatternSeverity {
    if occurrences > 10 {
        PatternSeverity::High
    } else if occurrences > 5 {
        PatternSeverity::Medium
    } else {
        PatternSeverity::Low
    }
}

/// Symptom labels grouped by the phase each logged day fell in
///
/// Days logged before the first known period start have no phase and are
/// skipped. Phases with no symptoms are omitted.
pub fn symptom_patterns(
    records: &[DailyRecord],
    starts: &[NaiveDate],
    period_length: i64,
    cycle_length: i64,
) -> Vec<SymptomPattern> {
    // Label counts in first-seen order, per phase
    let mut by_phase: BTreeMap<CyclePhase, Vec<(String, usize)>> = BTreeMap::new();

    for record in records {
        let labels = record.symptoms.labels();
        if labels.is_empty() {
            continue;
        }

        let Some(start) = nearest_start_on_or_before(starts, record.date) else {
            continue;
        };
        let days_since = (record.date - start).num_days();
        let Some(phase) = phase_for_offset(days_since, period_length, cycle_length) else {
            continue;
        };

        let counts = by_phase.entry(phase).or_default();
        for label in labels {
            match counts.iter_mut().find(|(existing, _)| *existing == label) {
                Some((_, count)) => *count += 1,
                None => counts.push((label, 1)),
            }
        }
    }

    by_phase
        .into_iter()
        .map(|(phase, mut counts)| {
            let occurrences = counts.iter().map(|(_, count)| count).sum();
            // Stable sort keeps first-seen order among ties
            counts.sort_by(|a, b| b.1.cmp(&a.1));

            SymptomPattern {
                phase,
                symptoms: counts
                    .into_iter()
                    .take(TOP_SYMPTOMS_PER_PHASE)
                    .map(|(label, _)| label)
                    .collect(),
                severity: severity_for(occurrences),
                occurrences,
            }
        })
        .collect()
}

/// 0-100 score penalizing variable cycles and frequent severe symptoms
pub fn health_score(intervals: &[i64], records: &[DailyRecord]) -> i64 {
    let variance_penalty = variance(intervals).min(MAX_VARIANCE_PENALTY);

    let severe_penalty = if records.is_empty() {
        0.0
    } else {
        let severe_days = records.iter().filter(|r| r.symptoms.has_severe()).count();
        let severe_percent = severe_days as f64 * 100.0 / records.len() as f64;
        (severe_percent * SEVERE_PENALTY_PER_PERCENT).min(MAX_SEVERE_PENALTY)
    };

    ((100.0 - variance_penalty - severe_penalty).round() as i64).max(0)
}

/// Compute every statistic for the current log
pub fn analyze(records: &[DailyRecord], preferences: &CyclePreferences) -> CycleAnalytics {
    let starts = extract_period_starts(records);
    let intervals = cycle_intervals(&starts);

    let average_cycle = average_cycle_length(&intervals)
        .or(preferences.cycle_length_days)
        .unwrap_or(DEFAULT_CYCLE_LENGTH);
    let regularity = regularity_score(&intervals);
    let average_period = average_period_length(records);

    let patterns = symptom_patterns(
        records,
        &starts,
        preferences.period_length_days.unwrap_or(average_period),
        preferences.cycle_length_days.unwrap_or(average_cycle),
    );

    let analytics = CycleAnalytics {
        average_cycle_length: average_cycle,
        min_cycle_length: intervals.iter().copied().min().unwrap_or(average_cycle),
        max_cycle_length: intervals.iter().copied().max().unwrap_or(average_cycle),
        total_cycles: intervals.len(),
        regularity_score: regularity,
        is_regular: regularity >= REGULAR_THRESHOLD,
        cycle_trend: cycle_trend(&intervals),
        average_period_length: average_period,
        prediction_confidence: prediction_confidence(intervals.len(), regularity, records.len()),
        symptom_patterns: patterns,
        health_score: health_score(&intervals, records),
    };

    tracing::debug!(
        "Analyzed {} records: {} cycles, average {} days, regularity {}%, confidence {}",
        records.len(),
        analytics.total_cycles,
        analytics.average_cycle_length,
        analytics.regularity_score,
        analytics.prediction_confidence
    );

    analytics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FlowIntensity, Mood, SymptomIntensity};
    use chrono::Duration;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Period runs of `length` flow days starting at each given date
    fn periods(starts: &[&str], length: i64) -> Vec<DailyRecord> {
        starts
            .iter()
            .flat_map(|s| {
                let start = date(s);
                (0..length).map(move |i| {
                    DailyRecord::with_flow(start + Duration::days(i), FlowIntensity::Medium)
                })
            })
            .collect()
    }

    #[test]
    fn test_intervals_and_average() {
        let starts = vec![date("2024-01-01"), date("2024-01-29"), date("2024-03-01")];
        let intervals = cycle_intervals(&starts);
        assert_eq!(intervals, vec![28, 32]);
        assert_eq!(average_cycle_length(&intervals), Some(30));
    }

    #[test]
    fn test_outlier_intervals_excluded() {
        let starts = vec![
            date("2024-01-01"),
            date("2024-01-11"), // 10 days
            date("2024-02-08"), // 28 days
            date("2024-04-08"), // 60 days
        ];
        assert_eq!(cycle_intervals(&starts), vec![28]);
    }

    #[test]
    fn test_regularity_boundary() {
        let intervals = vec![28, 29, 31, 27];
        assert_eq!(average_cycle_length(&intervals), Some(29));
        assert_eq!(regularity_score(&intervals), 100);
    }

    #[test]
    fn test_regularity_partial() {
        // mean 30; 22 and 38 are 8 days out
        let intervals = vec![22, 30, 30, 38];
        assert_eq!(regularity_score(&intervals), 50);
        assert_eq!(regularity_score(&[]), 0);
    }

    #[test]
    fn test_trend_needs_history() {
        assert_eq!(cycle_trend(&[28, 35]), CycleTrend::Stable);
        // Three intervals and nothing before them
        assert_eq!(cycle_trend(&[26, 30, 34]), CycleTrend::Stable);
    }

    #[test]
    fn test_trend_direction() {
        assert_eq!(cycle_trend(&[26, 26, 26, 30, 30, 30]), CycleTrend::Increasing);
        assert_eq!(cycle_trend(&[32, 32, 32, 28, 28, 28]), CycleTrend::Decreasing);
        assert_eq!(cycle_trend(&[28, 29, 28, 28, 29, 29]), CycleTrend::Stable);
        // Partial previous window
        assert_eq!(cycle_trend(&[25, 29, 29, 29]), CycleTrend::Increasing);
    }

    #[test]
    fn test_prediction_confidence_bounds() {
        assert_eq!(prediction_confidence(2, 100, 40), 0);
        // 45 + 60 + 20 = 125, clamped
        assert_eq!(prediction_confidence(3, 100, 10), 100);
        // 45 + 0 + 0
        assert_eq!(prediction_confidence(3, 0, 0), 45);
    }

    #[test]
    fn test_average_period_length() {
        let mut records = periods(&["2024-01-01"], 4);
        records.extend(periods(&["2024-01-29"], 6));
        assert_eq!(average_period_length(&records), 5);

        // A 12-day run is discarded
        let records = periods(&["2024-01-01"], 12);
        assert_eq!(average_period_length(&records), DEFAULT_PERIOD_LENGTH);

        assert_eq!(average_period_length(&[]), DEFAULT_PERIOD_LENGTH);
    }

    #[test]
    fn test_symptom_patterns_by_phase() {
        let mut records = periods(&["2024-01-01"], 3);
        records[0].symptoms.cramps = SymptomIntensity::Severe;
        records[1].symptoms.cramps = SymptomIntensity::Severe;
        records[1].symptoms.mood = Mood::Tired;

        let mut luteal_day = DailyRecord::empty(date("2024-01-22"));
        luteal_day.symptoms.headache = SymptomIntensity::Mild;
        records.push(luteal_day);

        // Logged before any period start: no phase
        let mut early = DailyRecord::empty(date("2023-12-20"));
        early.symptoms.mood = Mood::Sad;
        records.push(early);

        let starts = extract_period_starts(&records);
        let patterns = symptom_patterns(&records, &starts, 3, 28);

        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].phase, CyclePhase::Menstrual);
        assert_eq!(
            patterns[0].symptoms,
            vec!["severe cramps".to_string(), "tired mood".to_string()]
        );
        assert_eq!(patterns[0].occurrences, 3);
        assert_eq!(patterns[0].severity, PatternSeverity::Low);

        assert_eq!(patterns[1].phase, CyclePhase::Luteal);
        assert_eq!(patterns[1].symptoms, vec!["mild headache".to_string()]);
    }

    #[test]
    fn test_symptom_severity_tiers() {
        assert_eq!(severity_for(5), PatternSeverity::Low);
        assert_eq!(severity_for(6), PatternSeverity::Medium);
        assert_eq!(severity_for(10), PatternSeverity::Medium);
        assert_eq!(severity_for(11), PatternSeverity::High);
    }

    #[test]
    fn test_symptom_patterns_top_five() {
        let mut records = Vec::new();
        let start = date("2024-01-01");
        let moods = [Mood::Happy, Mood::Sad, Mood::Irritable, Mood::Anxious, Mood::Tired];
        for (i, mood) in moods.iter().enumerate() {
            let mut record =
                DailyRecord::with_flow(start + Duration::days(i as i64), FlowIntensity::Light);
            record.symptoms.mood = *mood;
            record.symptoms.cramps = SymptomIntensity::Mild;
            records.push(record);
        }

        let starts = extract_period_starts(&records);
        let patterns = symptom_patterns(&records, &starts, 5, 28);

        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].occurrences, 10);
        assert_eq!(patterns[0].symptoms.len(), 5);
        assert_eq!(patterns[0].symptoms[0], "mild cramps");
        assert_eq!(patterns[0].severity, PatternSeverity::Medium);
    }

    #[test]
    fn test_health_score() {
        let records = periods(&["2024-01-01"], 2);
        assert_eq!(health_score(&[28, 28, 28], &records), 100);

        // Variance of [20, 40] is 100, capped at 20
        assert_eq!(health_score(&[20, 40], &records), 80);

        // Every day severe: 100% * 0.5 = 50, capped at 30
        let mut severe = records.clone();
        for record in &mut severe {
            record.symptoms.headache = SymptomIntensity::Severe;
        }
        assert_eq!(health_score(&[28], &severe), 70);
        assert_eq!(health_score(&[20, 40], &severe), 50);
    }

    #[test]
    fn test_analyze_without_data_uses_defaults() {
        let analytics = analyze(&[], &CyclePreferences::default());

        assert_eq!(analytics.average_cycle_length, DEFAULT_CYCLE_LENGTH);
        assert_eq!(analytics.min_cycle_length, DEFAULT_CYCLE_LENGTH);
        assert_eq!(analytics.max_cycle_length, DEFAULT_CYCLE_LENGTH);
        assert_eq!(analytics.total_cycles, 0);
        assert_eq!(analytics.regularity_score, 0);
        assert!(!analytics.is_regular);
        assert_eq!(analytics.cycle_trend, CycleTrend::Stable);
        assert_eq!(analytics.average_period_length, DEFAULT_PERIOD_LENGTH);
        assert_eq!(analytics.prediction_confidence, 0);
        assert!(analytics.symptom_patterns.is_empty());
        assert_eq!(analytics.health_score, 100);
    }

    #[test]
    fn test_analyze_falls_back_to_preference_without_intervals() {
        let records = periods(&["2024-01-01"], 4);
        let prefs = CyclePreferences::new(Some(32), None);
        let analytics = analyze(&records, &prefs);

        assert_eq!(analytics.average_cycle_length, 32);
        assert_eq!(analytics.average_period_length, 4);
    }

    #[test]
    fn test_analyze_regular_history() {
        let records = periods(
            &["2024-01-01", "2024-01-29", "2024-02-26", "2024-03-25"],
            5,
        );
        let analytics = analyze(&records, &CyclePreferences::default());

        assert_eq!(analytics.total_cycles, 3);
        assert_eq!(analytics.average_cycle_length, 28);
        assert_eq!(analytics.min_cycle_length, 28);
        assert_eq!(analytics.max_cycle_length, 28);
        assert_eq!(analytics.regularity_score, 100);
        assert!(analytics.is_regular);
        assert_eq!(analytics.average_period_length, 5);
        // 45 + 60 + 40, clamped
        assert_eq!(analytics.prediction_confidence, 100);
        assert_eq!(analytics.health_score, 100);
    }

    /// One-day periods separated by the given gaps, starting 2020-01-01
    fn periods_with_gaps(gaps: &[i64]) -> Vec<DailyRecord> {
        let mut start = date("2020-01-01");
        let mut records = vec![DailyRecord::with_flow(start, FlowIntensity::Heavy)];
        for gap in gaps {
            start += Duration::days(*gap);
            records.push(DailyRecord::with_flow(start, FlowIntensity::Heavy));
        }
        records
    }

    #[test]
    fn test_is_regular_at_threshold() {
        // Rounded mean 26: the 28s are within 3 days, the 20s are not
        let mut gaps = vec![28; 7];
        gaps.extend([20; 3]);
        let analytics = analyze(&periods_with_gaps(&gaps), &CyclePreferences::default());
        assert_eq!(analytics.regularity_score, REGULAR_THRESHOLD);
        assert!(analytics.is_regular);

        let mut gaps = vec![28; 9];
        gaps.extend([20; 4]);
        let analytics = analyze(&periods_with_gaps(&gaps), &CyclePreferences::default());
        assert_eq!(analytics.regularity_score, REGULAR_THRESHOLD - 1);
        assert!(!analytics.is_regular);
    }
}
