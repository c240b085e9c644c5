use crate::activity::Activity;
use crate::calendar::WorkingCalendar;
use crate::error::{ScheduleError, ScheduleResult};
use crate::weather::WeatherDelayPolicy;
use chrono::{Datelike, Days, NaiveDate};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Days from 0001-01-01 (CE) to 1970-01-01, the polars date epoch.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Zero-based position in the schedule.
    pub index: usize,
    pub activity: Activity,
    pub start: NaiveDate,
    pub finish: NaiveDate,
    /// Index of the previous entry; `None` for the first one.
    pub predecessor: Option<usize>,
}

impl ScheduleEntry {
    /// One-based id used by presentation and export.
    pub fn id(&self) -> usize {
        self.index + 1
    }

    pub fn predecessor_id(&self) -> Option<usize> {
        self.predecessor.map(|index| index + 1)
    }

    pub fn calendar_days(&self) -> i64 {
        (self.finish - self.start).num_days()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub start: NaiveDate,
    pub finish: NaiveDate,
    pub total_days: i64,
    pub activity_count: usize,
}

impl ScheduleSummary {
    pub fn to_cli_summary(&self) -> String {
        format!(
            "start={}, finish={}, days={}, activities={}",
            self.start, self.finish, self.total_days, self.activity_count
        )
    }
}

/// The entry batch produced by one builder run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ScheduleEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.entries.first().map(|entry| entry.start)
    }

    pub fn finish(&self) -> Option<NaiveDate> {
        self.entries.last().map(|entry| entry.finish)
    }

    pub fn summary(&self) -> Option<ScheduleSummary> {
        let start = self.start()?;
        let finish = self.finish()?;
        Some(ScheduleSummary {
            start,
            finish,
            total_days: (finish - start).num_days(),
            activity_count: self.entries.len(),
        })
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let ids: Vec<i32> = self.entries.iter().map(|e| e.id() as i32).collect();
        let names: Vec<&str> = self.entries.iter().map(|e| e.activity.name()).collect();
        let durations: Vec<i64> = self
            .entries
            .iter()
            .map(|e| e.activity.duration_days())
            .collect();
        let starts: Vec<i32> = self.entries.iter().map(|e| date_to_i32(e.start)).collect();
        let finishes: Vec<i32> = self.entries.iter().map(|e| date_to_i32(e.finish)).collect();
        let predecessors: Vec<String> = self
            .entries
            .iter()
            .map(|e| e.predecessor_id().map(|id| id.to_string()).unwrap_or_default())
            .collect();

        let columns: Vec<Column> = vec![
            Series::new(PlSmallStr::from_static("ID"), ids).into_column(),
            Series::new(PlSmallStr::from_static("Activity"), names).into_column(),
            Series::new(PlSmallStr::from_static("Duration"), durations).into_column(),
            Series::new(PlSmallStr::from_static("Start Date"), starts)
                .cast(&DataType::Date)?
                .into_column(),
            Series::new(PlSmallStr::from_static("Finish Date"), finishes)
                .cast(&DataType::Date)?
                .into_column(),
            Series::new(PlSmallStr::from_static("Predecessor"), predecessors).into_column(),
        ];
        DataFrame::new(columns)
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a ScheduleEntry;
    type IntoIter = std::slice::Iter<'a, ScheduleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn date_to_i32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

/// Inverse of the `Date` column encoding used by [`Schedule::to_dataframe`].
pub fn date_from_polars_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(EPOCH_DAYS_FROM_CE)?)
}

fn add_days(date: NaiveDate, days: u64) -> ScheduleResult<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or(ScheduleError::DateOutOfRange(date))
}

/// Resolves a serial chain of activities into dated entries.
///
/// A single cursor walks the calendar: each activity starts where the
/// previous one finished and consumes exactly its duration in working days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleBuilder {
    start: NaiveDate,
    policy: WeatherDelayPolicy,
}

impl ScheduleBuilder {
    pub fn new(start: NaiveDate, policy: WeatherDelayPolicy) -> Self {
        Self { start, policy }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn policy(&self) -> WeatherDelayPolicy {
        self.policy
    }

    /// Every duration is checked before any date is resolved, so an invalid
    /// activity yields no entries at all.
    pub fn build<C>(&self, activities: &[Activity], calendar: &C) -> ScheduleResult<Schedule>
    where
        C: WorkingCalendar + ?Sized,
    {
        Self::validate_durations(activities)?;

        let mut entries = Vec::with_capacity(activities.len());
        let mut cursor = self.start;
        for (index, activity) in activities.iter().enumerate() {
            let start = cursor;
            cursor = self.advance(cursor, activity.duration_days(), calendar)?;
            debug!(
                index,
                activity = activity.name(),
                duration = activity.duration_days(),
                %start,
                finish = %cursor,
                "resolved activity"
            );
            entries.push(ScheduleEntry {
                index,
                activity: activity.clone(),
                start,
                finish: cursor,
                predecessor: index.checked_sub(1),
            });
        }

        let schedule = Schedule { entries };
        if let Some(summary) = schedule.summary() {
            info!(
                activities = summary.activity_count,
                start = %summary.start,
                finish = %summary.finish,
                total_days = summary.total_days,
                "schedule resolved"
            );
        }
        Ok(schedule)
    }

    fn validate_durations(activities: &[Activity]) -> ScheduleResult<()> {
        match activities
            .iter()
            .enumerate()
            .find(|(_, activity)| activity.duration_days() <= 0)
        {
            Some((index, activity)) => Err(ScheduleError::InvalidDuration {
                index,
                name: activity.name().to_string(),
                duration: activity.duration_days(),
            }),
            None => Ok(()),
        }
    }

    /// Walk `cursor` forward until `duration` working days are consumed.
    ///
    /// Weather delay days are skipped without being checked against the
    /// calendar and never count toward the duration.
    fn advance<C>(&self, mut cursor: NaiveDate, duration: i64, calendar: &C) -> ScheduleResult<NaiveDate>
    where
        C: WorkingCalendar + ?Sized,
    {
        let mut consumed: i64 = 0;
        while consumed < duration {
            if calendar.is_working_day(cursor) {
                consumed += 1;
                if self.policy.triggers_at(consumed) {
                    cursor = add_days(cursor, u64::from(self.policy.delay_days()))?;
                }
            }
            cursor = add_days(cursor, 1)?;
        }
        Ok(cursor)
    }
}
