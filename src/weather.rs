use crate::error::{ScheduleError, ScheduleResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WEATHER_PERIOD: u32 = 30;

/// Calendar days lost to weather every `period` working days of one activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWeatherDelayPolicy")]
pub struct WeatherDelayPolicy {
    delay_days: u32,
    period: u32,
}

#[derive(Deserialize)]
struct RawWeatherDelayPolicy {
    #[serde(default)]
    delay_days: u32,
    #[serde(default = "default_period")]
    period: u32,
}

fn default_period() -> u32 {
    DEFAULT_WEATHER_PERIOD
}

impl TryFrom<RawWeatherDelayPolicy> for WeatherDelayPolicy {
    type Error = ScheduleError;

    fn try_from(raw: RawWeatherDelayPolicy) -> Result<Self, Self::Error> {
        Self::with_period(raw.delay_days, raw.period)
    }
}

impl Default for WeatherDelayPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl WeatherDelayPolicy {
    /// No weather delay at all.
    pub fn none() -> Self {
        Self {
            delay_days: 0,
            period: DEFAULT_WEATHER_PERIOD,
        }
    }

    /// `delay_days` every 30 working days.
    pub fn monthly(delay_days: u32) -> Self {
        Self {
            delay_days,
            period: DEFAULT_WEATHER_PERIOD,
        }
    }

    pub fn with_period(delay_days: u32, period: u32) -> ScheduleResult<Self> {
        if period == 0 {
            return Err(ScheduleError::InvalidWeatherPeriod(period));
        }
        Ok(Self { delay_days, period })
    }

    pub fn delay_days(&self) -> u32 {
        self.delay_days
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    /// Whether the delay fires right after `consumed` working days.
    pub fn triggers_at(&self, consumed: i64) -> bool {
        consumed != 0 && consumed % i64::from(self.period) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triggers_on_positive_multiples_only() {
        let policy = WeatherDelayPolicy::monthly(3);
        assert!(!policy.triggers_at(0));
        assert!(!policy.triggers_at(29));
        assert!(policy.triggers_at(30));
        assert!(!policy.triggers_at(31));
        assert!(policy.triggers_at(60));
    }

    #[test]
    fn zero_period_is_rejected() {
        assert_eq!(
            WeatherDelayPolicy::with_period(2, 0),
            Err(ScheduleError::InvalidWeatherPeriod(0))
        );
    }

    #[test]
    fn deserializes_with_default_period() {
        let policy: WeatherDelayPolicy = serde_json::from_str(r#"{"delay_days": 4}"#).unwrap();
        assert_eq!(policy, WeatherDelayPolicy::monthly(4));
        assert!(serde_json::from_str::<WeatherDelayPolicy>(r#"{"period": 0}"#).is_err());
    }
}
