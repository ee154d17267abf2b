use crate::anomaly::decision::AnomalyLabel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final triage tier of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Normal,
    Suspicious,
    Critical,
}

impl Severity {
    pub const ALL: [Self; 3] = [Self::Normal, Self::Suspicious, Self::Critical];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Suspicious => "Suspicious",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision table over the model verdict and the keyword signal.
///
/// The keyword signal is required for any non-Normal tier: an isolated event
/// without it stays Normal.
#[must_use]
pub const fn classify(label: AnomalyLabel, attack_signal: bool) -> Severity {
    match (label, attack_signal) {
        (AnomalyLabel::Anomaly, true) => Severity::Critical,
        (AnomalyLabel::Normal, true) => Severity::Suspicious,
        (AnomalyLabel::Anomaly | AnomalyLabel::Normal, false) => Severity::Normal,
    }
}
