use super::{Jurisdiction, UsState};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

impl Holiday {
    fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
        }
    }
}

/// Named public holidays of `jurisdiction` falling in `year`, sorted by date.
///
/// Fixed-date federal holidays that land on a weekend also get an observed
/// weekday (Saturday -> Friday, Sunday -> Monday). The observance of New
/// Year's Day can fall on 31 December, so the rules of `year + 1` are
/// evaluated too and filtered back to `year`.
pub fn holidays_in_year(jurisdiction: Jurisdiction, year: i32) -> Vec<Holiday> {
    let mut holidays = Vec::new();
    for rule_year in [year, year.saturating_add(1)] {
        collect_rules(jurisdiction, rule_year, &mut holidays);
    }
    holidays.retain(|holiday| holiday.date.year() == year);
    holidays.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
    holidays.dedup();
    holidays
}

fn collect_rules(jurisdiction: Jurisdiction, year: i32, out: &mut Vec<Holiday>) {
    match jurisdiction {
        Jurisdiction::WeekendsOnly => {}
        Jurisdiction::UnitedStates(state) => {
            add_us_federal(year, out);
            if let Some(state) = state {
                add_us_state(state, year, out);
            }
        }
    }
}

fn add_us_federal(year: i32, out: &mut Vec<Holiday>) {
    add_fixed_observed(out, year, 1, 1, "New Year's Day");
    if year >= 1986 {
        add_nth(out, year, 1, Weekday::Mon, 3, "Martin Luther King Jr. Day");
    }
    add_nth(out, year, 2, Weekday::Mon, 3, "Washington's Birthday");
    if let Some(date) = last_weekday(year, 5, Weekday::Mon) {
        out.push(Holiday::new(date, "Memorial Day"));
    }
    if year >= 2021 {
        add_fixed_observed(out, year, 6, 19, "Juneteenth National Independence Day");
    }
    add_fixed_observed(out, year, 7, 4, "Independence Day");
    add_nth(out, year, 9, Weekday::Mon, 1, "Labor Day");
    add_nth(out, year, 10, Weekday::Mon, 2, "Columbus Day");
    add_fixed_observed(out, year, 11, 11, "Veterans Day");
    add_nth(out, year, 11, Weekday::Thu, 4, "Thanksgiving");
    add_fixed_observed(out, year, 12, 25, "Christmas Day");
}

fn add_us_state(state: UsState, year: i32, out: &mut Vec<Holiday>) {
    match state {
        UsState::Fl => {
            add_day_after_thanksgiving(out, year, "Friday After Thanksgiving");
        }
        UsState::Tx => {
            add_fixed(out, year, 1, 19, "Confederate Heroes Day");
            add_fixed(out, year, 3, 2, "Texas Independence Day");
            if year >= 2000 {
                add_fixed(out, year, 3, 31, "Cesar Chavez Day");
            }
            add_fixed(out, year, 4, 21, "San Jacinto Day");
            if year >= 1980 {
                add_fixed(out, year, 6, 19, "Emancipation Day In Texas");
            }
            if year >= 1973 {
                add_fixed(out, year, 8, 27, "Lyndon Baines Johnson Day");
            }
            add_day_after_thanksgiving(out, year, "Friday After Thanksgiving");
            add_fixed(out, year, 12, 24, "Christmas Eve");
            add_fixed(out, year, 12, 26, "Day After Christmas");
        }
        UsState::Ny => {
            add_fixed(out, year, 2, 12, "Lincoln's Birthday");
            if year >= 2004 {
                add_fixed(out, year, 2, 15, "Susan B. Anthony Day");
            }
            // Tuesday after the first Monday of November.
            if let Some(monday) = nth_weekday(year, 11, Weekday::Mon, 1) {
                out.push(Holiday::new(monday + Duration::days(1), "Election Day"));
            }
        }
        UsState::Ca => {
            if year >= 1995 {
                add_fixed(out, year, 3, 31, "Cesar Chavez Day");
            }
            add_day_after_thanksgiving(out, year, "Day After Thanksgiving");
        }
        UsState::Ma => {
            if year >= 1969 {
                add_nth(out, year, 4, Weekday::Mon, 3, "Patriots' Day");
            }
        }
        UsState::Il => {
            add_fixed(out, year, 2, 12, "Lincoln's Birthday");
            if year >= 1978 {
                add_nth(out, year, 3, Weekday::Mon, 1, "Casimir Pulaski Day");
            }
        }
    }
}

fn add_fixed(out: &mut Vec<Holiday>, year: i32, month: u32, day: u32, name: &str) -> Option<NaiveDate> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    out.push(Holiday::new(date, name));
    Some(date)
}

fn add_fixed_observed(out: &mut Vec<Holiday>, year: i32, month: u32, day: u32, name: &str) {
    let Some(date) = add_fixed(out, year, month, day, name) else {
        return;
    };
    if let Some(observed) = observed_date(date) {
        out.push(Holiday::new(observed, format!("{name} (observed)")));
    }
}

fn add_nth(out: &mut Vec<Holiday>, year: i32, month: u32, weekday: Weekday, n: u32, name: &str) {
    if let Some(date) = nth_weekday(year, month, weekday, n) {
        out.push(Holiday::new(date, name));
    }
}

fn add_day_after_thanksgiving(out: &mut Vec<Holiday>, year: i32, name: &str) {
    if let Some(thanksgiving) = nth_weekday(year, 11, Weekday::Thu, 4) {
        out.push(Holiday::new(thanksgiving + Duration::days(1), name));
    }
}

fn observed_date(date: NaiveDate) -> Option<NaiveDate> {
    match date.weekday() {
        Weekday::Sat => date.pred_opt(),
        Weekday::Sun => date.succ_opt(),
        _ => None,
    }
}

/// Find the nth occurrence of a weekday in a month
pub(crate) fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> Option<NaiveDate> {
    let mut date = NaiveDate::from_ymd_opt(year, month, 1)?;
    let mut count = 0;

    while date.month() == month {
        if date.weekday() == weekday {
            count += 1;
            if count == n {
                return Some(date);
            }
        }
        date = date.succ_opt()?;
    }
    None
}

/// Find the last occurrence of a weekday in a month
pub(crate) fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let mut date = first_of_next.pred_opt()?;

    while date.weekday() != weekday {
        date = date.pred_opt()?;
    }
    Some(date)
}
