use serde::{Deserialize, Serialize};

/// A named unit of work lasting a whole number of working days.
///
/// Position in the activity sequence is its only identity; the builder runs
/// activities strictly in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    name: String,
    duration_days: i64,
}

impl Activity {
    pub fn new(name: impl Into<String>, duration_days: i64) -> Self {
        Self {
            name: name.into(),
            duration_days,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration_days(&self) -> i64 {
        self.duration_days
    }

    /// Same duration for every name, in input order.
    pub fn uniform<I, S>(names: I, duration_days: i64) -> Vec<Activity>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .map(|name| Activity::new(name, duration_days))
            .collect()
    }
}
