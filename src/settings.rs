//! Project-level configuration bundle.
//!
//! Every field is optional in a settings file:
//!
//! ```toml
//! project_sqft = 3000
//! start_date = "2024-06-03"
//! jurisdiction = "US-TX"
//! weather_delay_days = 3
//! buffer_days = 2
//! ```

use crate::activity::Activity;
use crate::calendar::{HolidayCache, HolidayCalendar, Jurisdiction, WorkingCalendar};
use crate::error::ScheduleError;
use crate::schedule::{Schedule, ScheduleBuilder};
use crate::weather::{DEFAULT_WEATHER_PERIOD, WeatherDelayPolicy};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub const MAX_WEATHER_DELAY_DAYS: u32 = 10;
pub const MAX_BUFFER_DAYS: u32 = 10;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML settings: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be between 0 and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("unsupported settings format for {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSettings {
    #[serde(default = "default_project_sqft")]
    pub project_sqft: u32,
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    #[serde(default)]
    pub jurisdiction: Jurisdiction,
    #[serde(default = "default_weather_delay_days")]
    pub weather_delay_days: u32,
    #[serde(default = "default_buffer_days")]
    pub buffer_days: u32,
    #[serde(default = "default_weather_period_days")]
    pub weather_period_days: u32,
}

fn default_project_sqft() -> u32 {
    3000
}
fn default_start_date() -> NaiveDate {
    chrono::Local::now().date_naive()
}
fn default_weather_delay_days() -> u32 {
    3
}
fn default_buffer_days() -> u32 {
    2
}
fn default_weather_period_days() -> u32 {
    DEFAULT_WEATHER_PERIOD
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            project_sqft: default_project_sqft(),
            start_date: default_start_date(),
            jurisdiction: Jurisdiction::default(),
            weather_delay_days: default_weather_delay_days(),
            buffer_days: default_buffer_days(),
            weather_period_days: default_weather_period_days(),
        }
    }
}

impl ProjectSettings {
    pub fn from_toml_str(input: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(input)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_str(input: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(input)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load a `.toml` or `.json` settings file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&fs::read_to_string(path)?),
            Some("json") => Self::from_json_str(&fs::read_to_string(path)?),
            _ => Err(SettingsError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.weather_delay_days > MAX_WEATHER_DELAY_DAYS {
            return Err(SettingsError::OutOfRange {
                field: "weather_delay_days",
                value: self.weather_delay_days,
                max: MAX_WEATHER_DELAY_DAYS,
            });
        }
        if self.buffer_days > MAX_BUFFER_DAYS {
            return Err(SettingsError::OutOfRange {
                field: "buffer_days",
                value: self.buffer_days,
                max: MAX_BUFFER_DAYS,
            });
        }
        self.weather_policy()?;
        Ok(())
    }

    /// Working days given to every activity: `max(1, sqft / 1000 + buffer)`.
    pub fn uniform_duration(&self) -> i64 {
        let base = i64::from(self.project_sqft / 1000) + i64::from(self.buffer_days);
        base.max(1)
    }

    pub fn weather_policy(&self) -> Result<WeatherDelayPolicy, ScheduleError> {
        WeatherDelayPolicy::with_period(self.weather_delay_days, self.weather_period_days)
    }

    pub fn builder(&self) -> Result<ScheduleBuilder, ScheduleError> {
        Ok(ScheduleBuilder::new(self.start_date, self.weather_policy()?))
    }

    pub fn calendar(&self, cache: Arc<HolidayCache>) -> HolidayCalendar {
        HolidayCalendar::for_jurisdiction(self.jurisdiction, cache)
    }

    pub fn activities<S: AsRef<str>>(&self, names: &[S]) -> Vec<Activity> {
        Activity::uniform(names.iter().map(|name| name.as_ref()), self.uniform_duration())
    }

    /// Schedule `names` with the uniform duration against `calendar`.
    pub fn plan<S, C>(&self, names: &[S], calendar: &C) -> Result<Schedule, SettingsError>
    where
        S: AsRef<str>,
        C: WorkingCalendar + ?Sized,
    {
        self.validate()?;
        let schedule = self.builder()?.build(&self.activities(names), calendar)?;
        Ok(schedule)
    }
}
