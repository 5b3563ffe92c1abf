//! The daily record log and the period events derived from it.
//!
//! A period event is a maximal run of consecutive calendar days with logged
//! flow. Everything downstream (statistics, predictions, phases) starts from
//! the event start dates produced here.

use crate::{DailyRecord, FlowIntensity};
use chrono::NaiveDate;

/// Insert a record, or replace the one already logged for the same date.
///
/// The log stays sorted ascending by date. Upserting an identical record
/// twice leaves the log unchanged.
pub fn upsert_record(records: &mut Vec<DailyRecord>, record: DailyRecord) {
    match records.iter_mut().find(|r| r.date == record.date) {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
    records.sort_by_key(|r| r.date);
}

/// Start dates of every period event, ascending.
///
/// Single scan after the sort: a flow day opens a new event unless the
/// previous record is the day before and also had flow.
pub fn extract_period_starts(records: &[DailyRecord]) -> Vec<NaiveDate> {
    let mut sorted: Vec<&DailyRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let mut starts = Vec::new();
    let mut previous: Option<&DailyRecord> = None;

    for record in sorted {
        if record.flow.has_flow() {
            let continues = previous.is_some_and(|prev| {
                prev.flow.has_flow() && (record.date - prev.date).num_days() == 1
            });
            if !continues {
                starts.push(record.date);
            }
        }
        previous = Some(record);
    }

    tracing::debug!("Extracted {} period starts from {} records", starts.len(), records.len());
    starts
}

/// Flow days grouped into maximal runs of consecutive dates, ascending.
pub fn flow_runs(records: &[DailyRecord]) -> Vec<Vec<NaiveDate>> {
    let mut flow_days: Vec<NaiveDate> = records
        .iter()
        .filter(|r| r.flow.has_flow())
        .map(|r| r.date)
        .collect();
    flow_days.sort();
    flow_days.dedup();

    let mut runs: Vec<Vec<NaiveDate>> = Vec::new();
    for day in flow_days {
        match runs.last_mut() {
            Some(run) if run.last().is_some_and(|last| (day - *last).num_days() == 1) => {
                run.push(day)
            }
            _ => runs.push(vec![day]),
        }
    }
    runs
}

/// The record logged for a date, if any
pub fn record_for_date(records: &[DailyRecord], date: NaiveDate) -> Option<&DailyRecord> {
    records.iter().find(|r| r.date == date)
}

pub fn has_record_for_date(records: &[DailyRecord], date: NaiveDate) -> bool {
    record_for_date(records, date).is_some()
}

/// Whether flow was logged on this date
pub fn is_period_day(records: &[DailyRecord], date: NaiveDate) -> bool {
    record_for_date(records, date).is_some_and(|r| r.flow.has_flow())
}

/// Records for a whole period logged in one go.
///
/// Heavy on the first day, medium on the second, light afterwards.
/// Stops early at the end of the representable calendar.
pub fn quick_period_records(start: NaiveDate, length: i64) -> Vec<DailyRecord> {
    (0..length.max(0))
        .map_while(|offset| {
            let flow = match offset {
                0 => FlowIntensity::Heavy,
                1 => FlowIntensity::Medium,
                _ => FlowIntensity::Light,
            };
            let date = start.checked_add_days(chrono::Days::new(offset.unsigned_abs()))?;
            Some(DailyRecord::with_flow(date, flow))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SymptomIntensity, Symptoms};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn flow_day(s: &str) -> DailyRecord {
        DailyRecord::with_flow(date(s), FlowIntensity::Medium)
    }

    #[test]
    fn test_upsert_replaces_same_date() {
        let mut records = vec![flow_day("2024-01-02")];

        let mut replacement = DailyRecord::empty(date("2024-01-02"));
        replacement.symptoms.cramps = SymptomIntensity::Mild;
        upsert_record(&mut records, replacement.clone());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0], replacement);
    }

    #[test]
    fn test_upsert_is_idempotent_and_sorted() {
        let mut once = vec![flow_day("2024-01-05")];
        upsert_record(&mut once, flow_day("2024-01-01"));

        let mut twice = once.clone();
        upsert_record(&mut twice, flow_day("2024-01-01"));

        assert_eq!(once, twice);
        assert_eq!(once[0].date, date("2024-01-01"));
        assert_eq!(once[1].date, date("2024-01-05"));
    }

    #[test]
    fn test_consecutive_flow_days_collapse_to_one_start() {
        let records = vec![
            flow_day("2024-02-12"),
            flow_day("2024-02-10"),
            flow_day("2024-02-11"),
            DailyRecord::empty(date("2024-02-13")),
        ];
        assert_eq!(extract_period_starts(&records), vec![date("2024-02-10")]);
    }

    #[test]
    fn test_isolated_flow_day_is_its_own_event() {
        let records = vec![flow_day("2024-02-10")];
        assert_eq!(extract_period_starts(&records), vec![date("2024-02-10")]);

        let runs = flow_runs(&records);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].len(), 1);
    }

    #[test]
    fn test_gap_or_no_flow_day_starts_new_event() {
        let records = vec![
            flow_day("2024-03-01"),
            flow_day("2024-03-02"),
            DailyRecord::empty(date("2024-03-03")),
            flow_day("2024-03-04"),
            flow_day("2024-03-29"),
        ];
        assert_eq!(
            extract_period_starts(&records),
            vec![date("2024-03-01"), date("2024-03-04"), date("2024-03-29")]
        );
    }

    #[test]
    fn test_no_flow_records_yield_no_starts() {
        let mut record = DailyRecord::empty(date("2024-03-01"));
        record.symptoms = Symptoms {
            headache: SymptomIntensity::Severe,
            ..Symptoms::default()
        };
        assert!(extract_period_starts(&[record]).is_empty());
        assert!(extract_period_starts(&[]).is_empty());
    }

    #[test]
    fn test_flow_runs_group_consecutive_days() {
        let records = vec![
            flow_day("2024-01-01"),
            flow_day("2024-01-02"),
            flow_day("2024-01-03"),
            flow_day("2024-01-29"),
            flow_day("2024-01-30"),
        ];
        let lengths: Vec<usize> = flow_runs(&records).iter().map(|r| r.len()).collect();
        assert_eq!(lengths, vec![3, 2]);
    }

    #[test]
    fn test_lookups_by_date() {
        let records = vec![flow_day("2024-01-01"), DailyRecord::empty(date("2024-01-04"))];

        assert!(has_record_for_date(&records, date("2024-01-04")));
        assert!(!has_record_for_date(&records, date("2024-01-02")));
        assert!(is_period_day(&records, date("2024-01-01")));
        assert!(!is_period_day(&records, date("2024-01-04")));
        assert_eq!(
            record_for_date(&records, date("2024-01-01")).map(|r| r.flow),
            Some(FlowIntensity::Medium)
        );
    }

    #[test]
    fn test_quick_period_records_flow_taper() {
        let records = quick_period_records(date("2024-04-28"), 5);
        let flows: Vec<FlowIntensity> = records.iter().map(|r| r.flow).collect();

        assert_eq!(
            flows,
            vec![
                FlowIntensity::Heavy,
                FlowIntensity::Medium,
                FlowIntensity::Light,
                FlowIntensity::Light,
                FlowIntensity::Light,
            ]
        );
        assert_eq!(records[4].date, date("2024-05-02"));
        assert_eq!(extract_period_starts(&records), vec![date("2024-04-28")]);
    }

    #[test]
    fn test_quick_period_records_stop_at_calendar_end() {
        let start = NaiveDate::MAX.pred_opt().unwrap();
        let records = quick_period_records(start, 5);

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].date, NaiveDate::MAX);
        assert!(quick_period_records(start, 0).is_empty());
    }
}
