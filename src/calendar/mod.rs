pub mod holidays;

use crate::error::{ScheduleError, ScheduleResult};
use chrono::{Datelike, NaiveDate, Weekday};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

pub use holidays::{Holiday, holidays_in_year};

/// Answers whether a calendar date can be worked.
pub trait WorkingCalendar {
    fn is_working_day(&self, date: NaiveDate) -> bool;
}

impl<C: WorkingCalendar + ?Sized> WorkingCalendar for &C {
    fn is_working_day(&self, date: NaiveDate) -> bool {
        (**self).is_working_day(date)
    }
}

impl<C: WorkingCalendar + ?Sized> WorkingCalendar for Box<C> {
    fn is_working_day(&self, date: NaiveDate) -> bool {
        (**self).is_working_day(date)
    }
}

impl<C: WorkingCalendar + ?Sized> WorkingCalendar for Arc<C> {
    fn is_working_day(&self, date: NaiveDate) -> bool {
        (**self).is_working_day(date)
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsState {
    Fl,
    Tx,
    Ny,
    Ca,
    Ma,
    Il,
}

impl UsState {
    pub const ALL: [UsState; 6] = [
        UsState::Fl,
        UsState::Tx,
        UsState::Ny,
        UsState::Ca,
        UsState::Ma,
        UsState::Il,
    ];

    pub fn code(self) -> &'static str {
        match self {
            UsState::Fl => "FL",
            UsState::Tx => "TX",
            UsState::Ny => "NY",
            UsState::Ca => "CA",
            UsState::Ma => "MA",
            UsState::Il => "IL",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.code().eq_ignore_ascii_case(code))
    }
}

/// Country/region pair that selects a public holiday set.
///
/// Canonical codes are `NONE`, `US` and `US-<state>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Jurisdiction {
    WeekendsOnly,
    UnitedStates(Option<UsState>),
}

impl Jurisdiction {
    /// Every jurisdiction with built-in holiday rules.
    pub fn supported() -> Vec<Jurisdiction> {
        let mut all = vec![Jurisdiction::WeekendsOnly, Jurisdiction::UnitedStates(None)];
        all.extend(
            UsState::ALL
                .into_iter()
                .map(|state| Jurisdiction::UnitedStates(Some(state))),
        );
        all
    }

    pub fn code(&self) -> String {
        self.to_string()
    }
}

impl Default for Jurisdiction {
    fn default() -> Self {
        Jurisdiction::UnitedStates(Some(UsState::Fl))
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Jurisdiction::WeekendsOnly => write!(f, "NONE"),
            Jurisdiction::UnitedStates(None) => write!(f, "US"),
            Jurisdiction::UnitedStates(Some(state)) => write!(f, "US-{}", state.code()),
        }
    }
}

impl FromStr for Jurisdiction {
    type Err = ScheduleError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let unsupported = || ScheduleError::UnsupportedJurisdiction(input.to_string());
        let code = input.trim();
        if code.eq_ignore_ascii_case("none") {
            return Ok(Jurisdiction::WeekendsOnly);
        }
        if code.eq_ignore_ascii_case("us") {
            return Ok(Jurisdiction::UnitedStates(None));
        }
        match code.split_once(['-', '/', '_']) {
            Some((country, region)) if country.eq_ignore_ascii_case("us") => {
                UsState::from_code(region)
                    .map(|state| Jurisdiction::UnitedStates(Some(state)))
                    .ok_or_else(unsupported)
            }
            Some(_) => Err(unsupported()),
            // Bare state code, e.g. `TX`.
            None => UsState::from_code(code)
                .map(|state| Jurisdiction::UnitedStates(Some(state)))
                .ok_or_else(unsupported),
        }
    }
}

impl TryFrom<String> for Jurisdiction {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Jurisdiction> for String {
    fn from(value: Jurisdiction) -> Self {
        value.to_string()
    }
}

type HolidayTable = Arc<HashSet<NaiveDate>>;

/// Lazily resolved holiday tables keyed by jurisdiction and year.
///
/// Tables are immutable once resolved, so one cache can back any number of
/// calendars across threads.
#[derive(Debug, Default)]
pub struct HolidayCache {
    tables: RwLock<HashMap<(Jurisdiction, i32), HolidayTable>>,
}

impl HolidayCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, jurisdiction: Jurisdiction, year: i32) -> HolidayTable {
        if let Some(table) = self.tables.read().get(&(jurisdiction, year)) {
            return Arc::clone(table);
        }

        let resolved: HashSet<NaiveDate> = holidays_in_year(jurisdiction, year)
            .into_iter()
            .map(|holiday| holiday.date)
            .collect();
        debug!(%jurisdiction, year, holidays = resolved.len(), "resolved holiday table");

        let mut tables = self.tables.write();
        Arc::clone(
            tables
                .entry((jurisdiction, year))
                .or_insert_with(|| Arc::new(resolved)),
        )
    }

    /// Number of (jurisdiction, year) tables resolved so far.
    pub fn resolved_tables(&self) -> usize {
        self.tables.read().len()
    }
}

/// Working-day calendar over the built-in public holiday rules.
#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    jurisdiction: Jurisdiction,
    cache: Arc<HolidayCache>,
}

impl HolidayCalendar {
    /// Fails with `UnsupportedJurisdiction` when `code` names no known rule set.
    pub fn new(code: &str) -> ScheduleResult<Self> {
        Self::with_cache(code, Arc::new(HolidayCache::new()))
    }

    pub fn with_cache(code: &str, cache: Arc<HolidayCache>) -> ScheduleResult<Self> {
        let jurisdiction = code.parse()?;
        Ok(Self::for_jurisdiction(jurisdiction, cache))
    }

    pub fn for_jurisdiction(jurisdiction: Jurisdiction, cache: Arc<HolidayCache>) -> Self {
        Self {
            jurisdiction,
            cache,
        }
    }

    pub fn jurisdiction(&self) -> Jurisdiction {
        self.jurisdiction
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.cache
            .table(self.jurisdiction, date.year())
            .contains(&date)
    }

    pub fn holidays_in_year(&self, year: i32) -> Vec<Holiday> {
        holidays_in_year(self.jurisdiction, year)
    }
}

impl WorkingCalendar for HolidayCalendar {
    fn is_working_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.is_holiday(date)
    }
}

/// Saturday/Sunday weekends plus an explicit list of holidays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedCalendar {
    #[serde(default)]
    holidays: HashSet<NaiveDate>,
}

impl FixedCalendar {
    pub fn weekends_only() -> Self {
        Self::default()
    }

    pub fn with_holidays<I>(holidays: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Add a single holiday
    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    /// Add the same holiday for every year of an inclusive range
    pub fn add_recurring_holiday(&mut self, month: u32, day: u32, start_year: i32, end_year: i32) {
        for year in start_year..=end_year {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                self.holidays.insert(date);
            }
        }
    }

    pub fn holidays(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.holidays.iter().copied().collect();
        dates.sort();
        dates
    }
}

impl WorkingCalendar for FixedCalendar {
    fn is_working_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.holidays.contains(&date)
    }
}

/// Count working days in the half-open range `[start, end)`.
pub fn count_working_days<C: WorkingCalendar + ?Sized>(
    calendar: &C,
    start: NaiveDate,
    end: NaiveDate,
) -> i64 {
    start
        .iter_days()
        .take_while(|date| *date < end)
        .filter(|date| calendar.is_working_day(*date))
        .count() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!("none".parse::<Jurisdiction>().unwrap(), Jurisdiction::WeekendsOnly);
        assert_eq!(
            "us".parse::<Jurisdiction>().unwrap(),
            Jurisdiction::UnitedStates(None)
        );
        assert_eq!(
            "us-tx".parse::<Jurisdiction>().unwrap(),
            Jurisdiction::UnitedStates(Some(UsState::Tx))
        );
        assert_eq!(
            "US/NY".parse::<Jurisdiction>().unwrap(),
            Jurisdiction::UnitedStates(Some(UsState::Ny))
        );
        assert_eq!(
            "ca".parse::<Jurisdiction>().unwrap(),
            Jurisdiction::UnitedStates(Some(UsState::Ca))
        );
    }

    #[test]
    fn rejects_unknown_codes() {
        for code in ["", "DE", "US-ZZ", "FR-75", "texas"] {
            assert_eq!(
                code.parse::<Jurisdiction>(),
                Err(ScheduleError::UnsupportedJurisdiction(code.to_string())),
                "{code} should be rejected"
            );
        }
    }

    #[test]
    fn display_round_trips() {
        for jurisdiction in Jurisdiction::supported() {
            let code = jurisdiction.to_string();
            assert_eq!(code.parse::<Jurisdiction>().unwrap(), jurisdiction);
        }
    }

    #[test]
    fn serde_uses_code_strings() {
        let json = serde_json::to_string(&Jurisdiction::UnitedStates(Some(UsState::Ma))).unwrap();
        assert_eq!(json, "\"US-MA\"");
        let back: Jurisdiction = serde_json::from_str("\"us-il\"").unwrap();
        assert_eq!(back, Jurisdiction::UnitedStates(Some(UsState::Il)));
        assert!(serde_json::from_str::<Jurisdiction>("\"XX\"").is_err());
    }
}
