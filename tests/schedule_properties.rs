use chrono::{Days, NaiveDate};
use construction_scheduler::{
    Activity, HolidayCalendar, ScheduleBuilder, WeatherDelayPolicy, WorkingCalendar,
    count_working_days,
};
use proptest::prelude::*;

fn start_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..3650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    })
}

fn jurisdiction() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "NONE", "US", "US-FL", "US-TX", "US-NY", "US-CA", "US-MA", "US-IL",
    ])
}

proptest! {
    #[test]
    fn entries_form_a_serial_chain(
        start in start_date(),
        code in jurisdiction(),
        durations in prop::collection::vec(1i64..40, 1..8),
        delay in 0u32..=10,
    ) {
        let cal = HolidayCalendar::new(code).unwrap();
        let activities: Vec<Activity> = durations
            .iter()
            .enumerate()
            .map(|(i, d)| Activity::new(format!("Activity {i}"), *d))
            .collect();
        let schedule = ScheduleBuilder::new(start, WeatherDelayPolicy::monthly(delay))
            .build(&activities, &cal)
            .unwrap();

        prop_assert_eq!(schedule.len(), activities.len());
        prop_assert_eq!(schedule.start(), Some(start));
        for (i, entry) in schedule.entries().iter().enumerate() {
            prop_assert_eq!(entry.index, i);
            prop_assert_eq!(entry.predecessor, i.checked_sub(1));
            prop_assert!(entry.finish > entry.start);
            prop_assert!(entry.calendar_days() >= entry.activity.duration_days());
            if i > 0 {
                prop_assert_eq!(entry.start, schedule.entries()[i - 1].finish);
            }
        }
    }

    #[test]
    fn without_weather_the_range_holds_exactly_the_duration(
        start in start_date(),
        code in jurisdiction(),
        duration in 1i64..120,
    ) {
        let cal = HolidayCalendar::new(code).unwrap();
        let schedule = ScheduleBuilder::new(start, WeatherDelayPolicy::none())
            .build(&[Activity::new("Work", duration)], &cal)
            .unwrap();
        let entry = &schedule.entries()[0];
        prop_assert_eq!(count_working_days(&cal, entry.start, entry.finish), duration);
        let last_day = entry.finish.pred_opt().unwrap();
        prop_assert!(cal.is_working_day(last_day));
    }

    #[test]
    fn weather_never_finishes_earlier(
        start in start_date(),
        duration in 1i64..150,
        delay in 0u32..=10,
    ) {
        let cal = HolidayCalendar::new("US").unwrap();
        let activities = [Activity::new("Work", duration)];
        let dry = ScheduleBuilder::new(start, WeatherDelayPolicy::none())
            .build(&activities, &cal)
            .unwrap();
        let wet = ScheduleBuilder::new(start, WeatherDelayPolicy::monthly(delay))
            .build(&activities, &cal)
            .unwrap();
        prop_assert!(wet.finish() >= dry.finish());
        if duration < 30 || delay == 0 {
            prop_assert_eq!(wet, dry);
        }
    }
}
