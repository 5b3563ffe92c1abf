//! CSV export of the daily record log.

use crate::{DailyRecord, Result};
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    date: String,
    flow: &'static str,
    cramps: &'static str,
    headache: &'static str,
    mood: &'static str,
    notes: &'a str,
}

impl<'a> From<&'a DailyRecord> for CsvRow<'a> {
    fn from(record: &'a DailyRecord) -> Self {
        CsvRow {
            date: record.date.format("%Y-%m-%d").to_string(),
            flow: record.flow.as_str(),
            cramps: record.symptoms.cramps.as_str(),
            headache: record.symptoms.headache.as_str(),
            mood: record.symptoms.mood.as_str(),
            notes: &record.symptoms.notes,
        }
    }
}

/// Write `records` to `path` as CSV, replacing any existing file
///
/// A header row is always written, even for an empty log.
/// Returns the number of records written.
pub fn export_records_csv(records: &[DailyRecord], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

    // Serialized headers only appear with the first row, so write them explicitly
    writer.write_record(["date", "flow", "cramps", "headache", "mood", "notes"])?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} records to {:?}", records.len(), path);
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FlowIntensity, Mood, SymptomIntensity};
    use chrono::NaiveDate;

    fn record(day: u32, flow: FlowIntensity) -> DailyRecord {
        DailyRecord::with_flow(NaiveDate::from_ymd_opt(2024, 3, day).unwrap(), flow)
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out").join("records.csv");

        let mut second = record(2, FlowIntensity::Medium);
        second.symptoms.cramps = SymptomIntensity::Severe;
        second.symptoms.mood = Mood::Tired;
        second.symptoms.notes = "long day, stayed in".into();

        let count = export_records_csv(&[record(1, FlowIntensity::Heavy), second], &path).unwrap();
        assert_eq!(count, 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["date", "flow", "cramps", "headache", "mood", "notes"]
        );

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "2024-03-01");
        assert_eq!(&rows[0][1], "heavy");
        assert_eq!(&rows[1][2], "severe");
        assert_eq!(&rows[1][4], "tired");
        assert_eq!(&rows[1][5], "long day, stayed in");
    }

    #[test]
    fn test_export_empty_log_has_header_only() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("records.csv");

        assert_eq!(export_records_csv(&[], &path).unwrap(), 0);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), "date,flow,cramps,headache,mood,notes");
    }

    #[test]
    fn test_export_replaces_existing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("records.csv");

        export_records_csv(&[record(1, FlowIntensity::Light), record(2, FlowIntensity::Light)], &path)
            .unwrap();
        export_records_csv(&[record(5, FlowIntensity::Light)], &path).unwrap();

        let reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.into_records().count(), 1);
    }
}
