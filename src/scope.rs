use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Characters of extracted document text shown back to the user.
pub const PREVIEW_CHARS: usize = 3000;

#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid TOML scope library: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A trade scope: trigger keywords and the activities it contributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub name: String,
    pub keywords: Vec<String>,
    pub activities: Vec<String>,
}

impl Scope {
    pub fn new<K, A>(name: &str, keywords: K, activities: A) -> Self
    where
        K: IntoIterator,
        K::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            name: name.to_string(),
            keywords: keywords.into_iter().map(Into::into).collect(),
            activities: activities.into_iter().map(Into::into).collect(),
        }
    }

    /// `lowered_text` must already be lowercase.
    fn matches(&self, lowered_text: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| lowered_text.contains(&keyword.to_lowercase()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeLibrary {
    pub scopes: Vec<Scope>,
}

impl Default for ScopeLibrary {
    fn default() -> Self {
        Self::standard()
    }
}

impl ScopeLibrary {
    /// The residential construction scopes shipped with the tool.
    pub fn standard() -> Self {
        Self {
            scopes: vec![
                Scope::new(
                    "foundation",
                    ["pile", "grade beam", "slab", "rebar"],
                    [
                        "Mobilize Helical Pile Equipment",
                        "Install Helical Piles",
                        "Excavate for pile caps",
                        "Install grade beams",
                        "Pour foundation walls",
                        "Cure and waterproof",
                        "Place rat slab",
                    ],
                ),
                Scope::new(
                    "framing",
                    ["stud", "joist", "sheathing"],
                    [
                        "Install framing walls",
                        "Sheathing",
                        "Interior bearing walls",
                        "Framing inspection",
                    ],
                ),
                Scope::new(
                    "hvac",
                    ["heat pump", "FCU", "ERV", "diffuser"],
                    [
                        "Install FCU",
                        "Rough-in ductwork",
                        "Install diffusers",
                        "HVAC inspection",
                        "Final connections",
                    ],
                ),
                Scope::new(
                    "drywall",
                    ["gypsum board", "drywall", "taping", "finishing"],
                    [
                        "Install drywall",
                        "Tape and finish",
                        "Sand and prep",
                        "Final touch-up",
                    ],
                ),
                Scope::new(
                    "façade",
                    ["siding", "cement board", "WRB"],
                    ["Install WRB", "Cement board siding", "Trims and sealants"],
                ),
            ],
        }
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ScopeError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, ScopeError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Names of the scopes triggered by `text`, in library order.
    pub fn matched_scopes(&self, text: &str) -> Vec<&str> {
        let lowered = text.to_lowercase();
        self.scopes
            .iter()
            .filter(|scope| scope.matches(&lowered))
            .map(|scope| scope.name.as_str())
            .collect()
    }

    /// Activities of every triggered scope, concatenated in library order.
    pub fn extract_activities(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let mut activities = Vec::new();
        for scope in &self.scopes {
            if scope.matches(&lowered) {
                debug!(scope = %scope.name, activities = scope.activities.len(), "scope matched");
                activities.extend(scope.activities.iter().cloned());
            }
        }
        if activities.is_empty() {
            warn!("no matching scopes found in document text");
        }
        activities
    }
}

/// One activity per line; blank lines are dropped.
pub fn parse_manual_activities(input: &str) -> Vec<String> {
    let mut skipped = 0usize;
    let activities: Vec<String> = input
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                skipped += 1;
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect();
    if skipped > 0 && !activities.is_empty() {
        warn!(skipped, "blank activity lines skipped");
    }
    activities
}

/// The first `PREVIEW_CHARS` characters of `text`.
pub fn preview(text: &str) -> &str {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
