use crate::anomaly::scored::ClassifiedEvent;
use crate::parser::event::{Event, Level, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// Snapshot of a Critical event handed to alert delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub timestamp: NaiveDateTime,
    pub source_ip: String,
    pub level: Level,
    pub message: String,
}

impl From<&Event> for Alert {
    fn from(event: &Event) -> Self {
        Self {
            timestamp: event.timestamp,
            source_ip: event.source_ip.clone(),
            level: event.level,
            message: event.message.clone(),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CRITICAL ALERT: {} | IP: {} | Level: {} | Message: {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.source_ip,
            self.level,
            self.message
        )
    }
}

/// One alert per Critical event, in input order
#[must_use]
pub fn emit(classified: &[ClassifiedEvent]) -> Vec<Alert> {
    classified
        .iter()
        .filter(|c| c.is_critical())
        .map(|c| Alert::from(c.event()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::decision::AnomalyLabel;
    use crate::anomaly::scored::ScoredEvent;
    use chrono::NaiveDate;

    fn classified(minute: u32, label: AnomalyLabel, signal: bool) -> ClassifiedEvent {
        let ts = NaiveDate::from_ymd_opt(2025, 6, 2)
            .and_then(|d| d.and_hms_opt(4, minute, 0))
            .expect("valid timestamp");
        let event = Event::new(ts, format!("10.0.0.{minute}"), Level::Error, "attack");
        ScoredEvent::new(event, 0.5, label).classify(signal)
    }

    #[test]
    fn test_only_critical_events_alert() {
        let batch = [
            classified(1, AnomalyLabel::Anomaly, true),
            classified(2, AnomalyLabel::Normal, true),
            classified(3, AnomalyLabel::Anomaly, false),
            classified(4, AnomalyLabel::Anomaly, true),
        ];
        let alerts = emit(&batch);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].source_ip, "10.0.0.1");
        assert_eq!(alerts[1].source_ip, "10.0.0.4");
    }

    #[test]
    fn test_empty() {
        assert!(emit(&[]).is_empty());
        assert!(emit(&[classified(9, AnomalyLabel::Normal, false)]).is_empty());
    }

    #[test]
    fn test_display() {
        let alert = Alert::from(classified(7, AnomalyLabel::Anomaly, true).event());
        assert_eq!(
            alert.to_string(),
            "CRITICAL ALERT: 2025-06-02 04:07:00 | IP: 10.0.0.7 | Level: ERROR | Message: attack"
        );
    }
}
