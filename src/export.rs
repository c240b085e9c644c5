use crate::schedule::{Schedule, ScheduleEntry, ScheduleSummary};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// One spreadsheet row, using the column headers of the exported sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    #[serde(rename = "ID")]
    pub id: usize,
    #[serde(rename = "Activity")]
    pub activity: String,
    #[serde(rename = "Duration")]
    pub duration: i64,
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "Finish Date")]
    pub finish_date: String,
    #[serde(rename = "Predecessor")]
    pub predecessor: String,
}

impl From<&ScheduleEntry> for ScheduleRow {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            id: entry.id(),
            activity: entry.activity.name().to_string(),
            duration: entry.activity.duration_days(),
            start_date: format_date(entry.start),
            finish_date: format_date(entry.finish),
            predecessor: entry
                .predecessor_id()
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
struct ScheduleSnapshot<'a> {
    summary: Option<ScheduleSummary>,
    entries: &'a [ScheduleEntry],
}

pub fn rows(schedule: &Schedule) -> Vec<ScheduleRow> {
    schedule.entries().iter().map(ScheduleRow::from).collect()
}

/// Write the sheet as CSV; an empty schedule still gets a header row.
pub fn write_schedule_csv<W: Write>(schedule: &Schedule, writer: W) -> ExportResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    if schedule.is_empty() {
        writer.write_record([
            "ID",
            "Activity",
            "Duration",
            "Start Date",
            "Finish Date",
            "Predecessor",
        ])?;
    }
    for row in rows(schedule) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn schedule_to_csv_string(schedule: &Schedule) -> ExportResult<String> {
    let mut buffer = Vec::new();
    write_schedule_csv(schedule, &mut buffer)?;
    String::from_utf8(buffer).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err).into())
}

pub fn save_schedule_to_csv<P: AsRef<Path>>(schedule: &Schedule, path: P) -> ExportResult<()> {
    let file = File::create(path)?;
    write_schedule_csv(schedule, file)
}

pub fn write_schedule_json<W: Write>(schedule: &Schedule, writer: W) -> ExportResult<()> {
    let snapshot = ScheduleSnapshot {
        summary: schedule.summary(),
        entries: schedule.entries(),
    };
    serde_json::to_writer_pretty(writer, &snapshot)?;
    Ok(())
}

pub fn save_schedule_to_json<P: AsRef<Path>>(schedule: &Schedule, path: P) -> ExportResult<()> {
    let file = File::create(path)?;
    write_schedule_json(schedule, file)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
