use crate::calendar::WorkingCalendar;
use crate::schedule::Schedule;
use crate::scope::{ScopeLibrary, parse_manual_activities};
use crate::settings::{ProjectSettings, SettingsError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sequence: usize,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySource {
    Document,
    Manual,
}

/// Everything one user accumulates while building a schedule.
///
/// Owned by the front end and passed by reference; the scheduling core never
/// sees it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    chat_log: Vec<ChatMessage>,
    document_activities: Vec<String>,
    manual_activities: Vec<String>,
    settings: ProjectSettings,
    schedule: Option<Schedule>,
}

impl Session {
    pub fn new(settings: ProjectSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Append a chat message; blank messages are ignored.
    pub fn post_message(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        let sequence = self.chat_log.len() + 1;
        self.chat_log.push(ChatMessage {
            sequence,
            text: text.to_string(),
        });
        true
    }

    /// Conversation history, newest first.
    pub fn history(&self) -> impl Iterator<Item = &ChatMessage> {
        self.chat_log.iter().rev()
    }

    pub fn message_count(&self) -> usize {
        self.chat_log.len()
    }

    /// Replace the document-derived activities with those matched in `text`.
    /// Returns how many activities were extracted.
    pub fn load_document(&mut self, text: &str, library: &ScopeLibrary) -> usize {
        self.document_activities = library.extract_activities(text);
        self.schedule = None;
        self.document_activities.len()
    }

    pub fn set_manual_activities(&mut self, input: &str) -> usize {
        self.manual_activities = parse_manual_activities(input);
        self.schedule = None;
        self.manual_activities.len()
    }

    pub fn push_manual_activity(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.manual_activities.push(name.to_string());
        self.schedule = None;
        true
    }

    pub fn clear_activities(&mut self) {
        self.document_activities.clear();
        self.manual_activities.clear();
        self.schedule = None;
    }

    /// Document activities win over manual entry when both exist.
    pub fn activities(&self) -> &[String] {
        if self.document_activities.is_empty() {
            &self.manual_activities
        } else {
            &self.document_activities
        }
    }

    pub fn activity_source(&self) -> Option<ActivitySource> {
        if !self.document_activities.is_empty() {
            Some(ActivitySource::Document)
        } else if !self.manual_activities.is_empty() {
            Some(ActivitySource::Manual)
        } else {
            None
        }
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    /// Change settings; any previously computed schedule is discarded.
    pub fn update_settings<F>(&mut self, mutator: F) -> Result<(), SettingsError>
    where
        F: FnOnce(&mut ProjectSettings),
    {
        let mut settings = self.settings.clone();
        mutator(&mut settings);
        settings.validate()?;
        self.settings = settings;
        self.schedule = None;
        Ok(())
    }

    pub fn compute<C>(&mut self, calendar: &C) -> Result<&Schedule, SettingsError>
    where
        C: WorkingCalendar + ?Sized,
    {
        let schedule = self.settings.plan(self.activities(), calendar)?;
        Ok(self.schedule.insert(schedule))
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }
}
