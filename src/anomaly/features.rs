use crate::error::{AnalysisError, Result};
use crate::parser::event::Event;
use chrono::Timelike;
use serde::{Deserialize, Serialize};

/// Number of numeric columns produced per event
pub const FEATURE_DIM: usize = 2;

/// Keywords that flag a message as a possible attack (English and Portuguese sources)
pub const DEFAULT_ATTACK_KEYWORDS: &[&str] = &["attack", "ataque"];

/// Case-insensitive substring matcher for attack keywords
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Build a keyword set. Blank keywords would match every message and are rejected.
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lowered = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim();
            if keyword.is_empty() {
                return Err(AnalysisError::invalid(
                    "attack_keywords",
                    "keywords must not be blank",
                ));
            }
            lowered.push(keyword.to_lowercase());
        }
        Ok(Self { keywords: lowered })
    }

    #[must_use]
    pub fn matches(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.keywords.iter().any(|k| message.contains(k.as_str()))
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_ATTACK_KEYWORDS
                .iter()
                .map(|k| (*k).to_string())
                .collect(),
        }
    }
}

/// Per-event feature tuple `(hour_of_day, attack_signal)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureVector {
    hour_of_day: u8,
    attack_signal: bool,
}

impl FeatureVector {
    /// Returns `None` when `hour_of_day` is outside `[0, 23]`
    #[must_use]
    pub const fn new(hour_of_day: u32, attack_signal: bool) -> Option<Self> {
        if hour_of_day > 23 {
            return None;
        }
        Some(Self {
            hour_of_day: hour_of_day as u8,
            attack_signal,
        })
    }

    #[must_use]
    pub const fn hour_of_day(&self) -> u8 {
        self.hour_of_day
    }

    #[must_use]
    pub const fn attack_signal(&self) -> bool {
        self.attack_signal
    }

    /// Numeric row fed to the isolation ensemble
    #[must_use]
    pub fn to_row(&self) -> [f64; FEATURE_DIM] {
        [
            f64::from(self.hour_of_day),
            f64::from(u8::from(self.attack_signal)),
        ]
    }
}

/// Maps events to feature vectors, one per event, in input order
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    keywords: KeywordSet,
}

impl FeatureExtractor {
    #[must_use]
    pub const fn new(keywords: KeywordSet) -> Self {
        Self { keywords }
    }

    #[must_use]
    pub const fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    /// Extract one feature vector per event.
    ///
    /// Every event is validated first; the first violation aborts the batch.
    pub fn extract(&self, events: &[Event]) -> Result<Vec<FeatureVector>> {
        profiling::scope!("FeatureExtractor::extract");
        events
            .iter()
            .enumerate()
            .map(|(index, event)| self.extract_one(index, event))
            .collect()
    }

    fn extract_one(&self, index: usize, event: &Event) -> Result<FeatureVector> {
        event.validate(index)?;
        let hour = event.timestamp.hour();
        FeatureVector::new(hour, self.keywords.matches(&event.message)).ok_or_else(|| {
            AnalysisError::malformed(index, format!("hour {hour} outside [0, 23]"))
        })
    }
}
