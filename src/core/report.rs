//! Batch summaries for console reporting.

use crate::anomaly::scored::ClassifiedEvent;
use crate::anomaly::severity::Severity;
use std::fmt;

/// Per-tier and per-label counts of a classified batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub anomalies: usize,
    pub normal: usize,
    pub suspicious: usize,
    pub critical: usize,
}

impl BatchSummary {
    #[must_use]
    pub fn from_classified(classified: &[ClassifiedEvent]) -> Self {
        classified.iter().fold(Self::default(), |mut summary, c| {
            summary.total += 1;
            if c.scored.anomaly_label.is_anomaly() {
                summary.anomalies += 1;
            }
            match c.severity {
                Severity::Normal => summary.normal += 1,
                Severity::Suspicious => summary.suspicious += 1,
                Severity::Critical => summary.critical += 1,
            }
            summary
        })
    }

    #[must_use]
    pub const fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Normal => self.normal,
            Severity::Suspicious => self.suspicious,
            Severity::Critical => self.critical,
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Anomaly labels: {} anomalous (-1), {} normal (1)",
            self.anomalies,
            self.total - self.anomalies
        )?;
        writeln!(f, "Events per classification:")?;
        for severity in Severity::ALL {
            writeln!(f, "  {:<10} {:>6}", severity.as_str(), self.count(severity))?;
        }
        Ok(())
    }
}

/// Critical events ordered by timestamp; events sharing a timestamp keep batch order
#[must_use]
pub fn critical_timeline(classified: &[ClassifiedEvent]) -> Vec<&ClassifiedEvent> {
    let mut critical: Vec<&ClassifiedEvent> =
        classified.iter().filter(|c| c.is_critical()).collect();
    critical.sort_by_key(|c| c.event().timestamp);
    critical
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::decision::AnomalyLabel;
    use crate::anomaly::scored::ScoredEvent;
    use crate::parser::event::{Event, Level};
    use chrono::NaiveDate;

    fn classified(hour: u32, ip: &str, label: AnomalyLabel, signal: bool) -> ClassifiedEvent {
        let ts = NaiveDate::from_ymd_opt(2025, 6, 2)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid timestamp");
        ScoredEvent::new(Event::new(ts, ip, Level::Error, "m"), 0.6, label).classify(signal)
    }

    #[test]
    fn test_summary_counts() {
        let batch = [
            classified(1, "10.0.0.1", AnomalyLabel::Anomaly, true),
            classified(2, "10.0.0.2", AnomalyLabel::Normal, true),
            classified(3, "10.0.0.3", AnomalyLabel::Anomaly, false),
            classified(4, "10.0.0.4", AnomalyLabel::Normal, false),
        ];
        let summary = BatchSummary::from_classified(&batch);
        assert_eq!(
            summary,
            BatchSummary {
                total: 4,
                anomalies: 2,
                normal: 2,
                suspicious: 1,
                critical: 1,
            }
        );
        assert!(summary.to_string().contains("Critical"));
    }

    #[test]
    fn test_timeline_sorted_and_stable() {
        let batch = [
            classified(5, "10.0.0.1", AnomalyLabel::Anomaly, true),
            classified(2, "10.0.0.2", AnomalyLabel::Anomaly, true),
            classified(7, "10.0.0.3", AnomalyLabel::Normal, true),
            classified(2, "10.0.0.4", AnomalyLabel::Anomaly, true),
        ];
        let ips: Vec<&str> = critical_timeline(&batch)
            .iter()
            .map(|c| c.event().source_ip.as_str())
            .collect();
        assert_eq!(ips, vec!["10.0.0.2", "10.0.0.4", "10.0.0.1"]);
    }
}
