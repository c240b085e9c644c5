pub mod activity;
pub mod calendar;
pub mod error;
pub mod export;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod schedule;
pub mod scope;
pub mod session;
pub mod settings;
pub mod timeline;
pub mod weather;

pub use activity::Activity;
pub use calendar::{
    FixedCalendar, Holiday, HolidayCache, HolidayCalendar, Jurisdiction, UsState, WorkingCalendar,
    count_working_days, holidays_in_year,
};
pub use error::{ScheduleError, ScheduleResult};
pub use export::{
    ExportError, ScheduleRow, save_schedule_to_csv, save_schedule_to_json, schedule_to_csv_string,
    write_schedule_csv, write_schedule_json,
};
pub use schedule::{
    Schedule, ScheduleBuilder, ScheduleEntry, ScheduleSummary, date_from_polars_days,
};
pub use scope::{Scope, ScopeError, ScopeLibrary, parse_manual_activities};
pub use session::{ActivitySource, ChatMessage, Session};
pub use settings::{ProjectSettings, SettingsError};
pub use timeline::render_timeline;
pub use weather::WeatherDelayPolicy;
