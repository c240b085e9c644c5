use chrono::{Days, NaiveDate};
use construction_scheduler::{
    Activity, FixedCalendar, HolidayCalendar, ProjectSettings, ScheduleBuilder, ScheduleError,
    SettingsError, WeatherDelayPolicy, WorkingCalendar, count_working_days,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn no_weather(start: NaiveDate) -> ScheduleBuilder {
    ScheduleBuilder::new(start, WeatherDelayPolicy::none())
}

#[test]
fn single_activity_from_monday_with_weekends_only() {
    let schedule = no_weather(d(2024, 6, 3))
        .build(&[Activity::new("Excavate", 5)], &FixedCalendar::weekends_only())
        .unwrap();
    assert_eq!(schedule.len(), 1);
    let entry = &schedule.entries()[0];
    assert_eq!(entry.start, d(2024, 6, 3));
    assert_eq!(entry.finish, d(2024, 6, 8));
    assert_eq!(entry.predecessor, None);
}

#[test]
fn activities_chain_on_a_single_cursor() {
    let schedule = no_weather(d(2024, 6, 3))
        .build(
            &Activity::uniform(["Excavate", "Pour Footings", "Cure"], 5),
            &FixedCalendar::weekends_only(),
        )
        .unwrap();
    let entries = schedule.entries();
    assert_eq!(entries[1].start, d(2024, 6, 8));
    assert_eq!(entries[1].finish, d(2024, 6, 15));
    assert_eq!(entries[2].finish, d(2024, 6, 22));
    for pair in entries.windows(2) {
        assert_eq!(pair[1].start, pair[0].finish);
        assert_eq!(pair[1].predecessor, Some(pair[0].index));
    }
    assert_eq!(entries[2].id(), 3);
    assert_eq!(entries[2].predecessor_id(), Some(2));
}

#[test]
fn federal_holiday_extends_the_activity() {
    let cal = HolidayCalendar::new("US").unwrap();
    let schedule = no_weather(d(2024, 7, 1))
        .build(&[Activity::new("Frame walls", 5)], &cal)
        .unwrap();
    assert_eq!(schedule.finish(), Some(d(2024, 7, 9)));
}

#[test]
fn year_boundary_resolves_both_years() {
    let cal = HolidayCalendar::new("US").unwrap();
    let schedule = no_weather(d(2024, 12, 23))
        .build(&[Activity::new("Drywall", 7)], &cal)
        .unwrap();
    assert_eq!(schedule.finish(), Some(d(2025, 1, 3)));
}

#[test]
fn state_holiday_delays_only_that_state() {
    let tx = HolidayCalendar::new("US-TX").unwrap();
    let fl = HolidayCalendar::new("US-FL").unwrap();
    let activities = [Activity::new("Mobilize", 1)];
    let builder = no_weather(d(2025, 4, 21));
    assert_eq!(builder.build(&activities, &tx).unwrap().finish(), Some(d(2025, 4, 23)));
    assert_eq!(builder.build(&activities, &fl).unwrap().finish(), Some(d(2025, 4, 22)));
}

#[test]
fn weather_delay_lands_every_period() {
    let activities = [Activity::new("Site work", 31)];
    let cal = FixedCalendar::weekends_only();
    let dry = no_weather(d(2024, 1, 3)).build(&activities, &cal).unwrap();
    let wet = ScheduleBuilder::new(d(2024, 1, 3), WeatherDelayPolicy::monthly(3))
        .build(&activities, &cal)
        .unwrap();
    assert_eq!(dry.finish(), Some(d(2024, 2, 15)));
    assert_eq!(wet.finish(), Some(d(2024, 2, 20)));
}

#[test]
fn weather_delay_can_be_absorbed_by_a_weekend() {
    let activities = [Activity::new("Site work", 30)];
    let cal = FixedCalendar::weekends_only();
    let dry = no_weather(d(2024, 1, 1)).build(&activities, &cal).unwrap();
    let wet = ScheduleBuilder::new(d(2024, 1, 1), WeatherDelayPolicy::monthly(3))
        .build(&activities, &cal)
        .unwrap();
    // The 30th working day is Friday 2024-02-09; the delay covers Sat..Mon.
    assert_eq!(dry.finish(), Some(d(2024, 2, 10)));
    assert_eq!(wet.finish(), Some(d(2024, 2, 13)));
}

#[test]
fn shorter_activities_never_trigger_weather() {
    let activities = Activity::uniform(["A", "B", "C"], 10);
    let cal = FixedCalendar::weekends_only();
    let dry = no_weather(d(2024, 1, 3)).build(&activities, &cal).unwrap();
    let wet = ScheduleBuilder::new(d(2024, 1, 3), WeatherDelayPolicy::monthly(10))
        .build(&activities, &cal)
        .unwrap();
    assert_eq!(dry, wet);
}

#[test]
fn custom_weather_period() {
    let policy = WeatherDelayPolicy::with_period(2, 5).unwrap();
    let schedule = ScheduleBuilder::new(d(2024, 6, 3), policy)
        .build(&[Activity::new("Pour", 5)], &FixedCalendar::weekends_only())
        .unwrap();
    // Friday is the fifth working day; two delay days plus the final step.
    assert_eq!(schedule.finish(), Some(d(2024, 6, 10)));
    assert!(WeatherDelayPolicy::with_period(2, 0).is_err());
}

#[test]
fn consumed_working_days_equal_duration() {
    let cal = HolidayCalendar::new("US-NY").unwrap();
    let activities = Activity::uniform(["A", "B", "C", "D"], 6);
    let schedule = no_weather(d(2024, 10, 28)).build(&activities, &cal).unwrap();
    for entry in &schedule {
        assert_eq!(count_working_days(&cal, entry.start, entry.finish), 6);
        assert!(entry.finish > entry.start);
    }
}

#[test]
fn invalid_duration_produces_no_entries() {
    let builder = no_weather(d(2024, 6, 3));
    let err = builder
        .build(
            &[
                Activity::new("Excavate", 3),
                Activity::new("Pour", 2),
                Activity::new("Cure", -1),
            ],
            &FixedCalendar::weekends_only(),
        )
        .unwrap_err();
    assert_eq!(
        err,
        ScheduleError::InvalidDuration {
            index: 2,
            name: "Cure".into(),
            duration: -1,
        }
    );
    assert!(err.to_string().contains("Cure"));
}

#[test]
fn building_twice_gives_identical_schedules() {
    let cal = HolidayCalendar::new("US-FL").unwrap();
    let activities = Activity::uniform(["Frame", "Roof", "Drywall"], 5);
    let builder = ScheduleBuilder::new(d(2024, 11, 18), WeatherDelayPolicy::monthly(3));
    assert_eq!(
        builder.build(&activities, &cal).unwrap(),
        builder.build(&activities, &cal).unwrap()
    );
}

#[test]
fn start_date_on_weekend_is_not_moved() {
    let cal = FixedCalendar::weekends_only();
    assert!(!cal.is_working_day(d(2024, 6, 1)));
    let schedule = no_weather(d(2024, 6, 1))
        .build(&[Activity::new("Excavate", 1)], &cal)
        .unwrap();
    assert_eq!(schedule.start(), Some(d(2024, 6, 1)));
    assert_eq!(schedule.finish(), Some(d(2024, 6, 4)));
}

#[test]
fn settings_plan_uses_uniform_duration() {
    let settings = ProjectSettings::from_toml_str(
        r#"
        project_sqft = 3000
        start_date = "2024-06-03"
        jurisdiction = "NONE"
        weather_delay_days = 3
        buffer_days = 2
        "#,
    )
    .unwrap();
    let cal = FixedCalendar::weekends_only();
    let schedule = settings.plan(&["Excavate", "Pour Footings"], &cal).unwrap();
    let summary = schedule.summary().unwrap();
    assert_eq!(summary.start, d(2024, 6, 3));
    assert_eq!(summary.finish, d(2024, 6, 15));
    assert_eq!(summary.total_days, 12);
    assert_eq!(summary.activity_count, 2);
    assert!(schedule.entries().iter().all(|e| e.activity.duration_days() == 5));
}

#[test]
fn settings_reject_out_of_range_weather() {
    let err = ProjectSettings::from_toml_str("weather_delay_days = 11").unwrap_err();
    assert!(matches!(
        err,
        SettingsError::OutOfRange {
            field: "weather_delay_days",
            ..
        }
    ));
}

#[test]
fn cursor_past_the_last_date_is_an_error() {
    let start = NaiveDate::MAX.checked_sub_days(Days::new(2)).unwrap();
    let err = no_weather(start)
        .build(&[Activity::new("Excavate", 5)], &FixedCalendar::weekends_only())
        .unwrap_err();
    assert!(matches!(err, ScheduleError::DateOutOfRange(_)));
}

#[test]
fn weather_jump_past_the_last_date_is_an_error() {
    let policy = WeatherDelayPolicy::with_period(u32::MAX, 1).unwrap();
    let err = ScheduleBuilder::new(d(2024, 6, 3), policy)
        .build(&[Activity::new("Excavate", 1)], &FixedCalendar::weekends_only())
        .unwrap_err();
    assert_eq!(err, ScheduleError::DateOutOfRange(d(2024, 6, 3)));
}
