use crate::anomaly::decision::AnomalyLabel;
use crate::anomaly::severity::{classify, Severity};
use crate::parser::event::Event;
use serde::Serialize;

/// An event with its isolation score and model verdict
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEvent {
    #[serde(flatten)]
    pub event: Event,
    pub isolation_score: f64,
    pub anomaly_label: AnomalyLabel,
}

impl ScoredEvent {
    #[must_use]
    pub fn new(event: Event, isolation_score: f64, anomaly_label: AnomalyLabel) -> Self {
        Self {
            event,
            isolation_score,
            anomaly_label,
        }
    }

    /// Attach the severity tier for the given keyword signal
    #[must_use]
    pub fn classify(self, attack_signal: bool) -> ClassifiedEvent {
        let severity = classify(self.anomaly_label, attack_signal);
        ClassifiedEvent {
            scored: self,
            attack_signal,
            severity,
        }
    }
}

/// A scored event with its final triage tier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedEvent {
    #[serde(flatten)]
    pub scored: ScoredEvent,
    pub attack_signal: bool,
    pub severity: Severity,
}

impl ClassifiedEvent {
    #[must_use]
    pub const fn event(&self) -> &Event {
        &self.scored.event
    }

    #[must_use]
    pub const fn is_critical(&self) -> bool {
        matches!(self.severity, Severity::Critical)
    }
}
