// AuditCrab - GPL-3.0-or-later
// This file is part of AuditCrab.
//
// Copyright (C) 2026 Daniel Freiermuth
//
// AuditCrab is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// AuditCrab is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with AuditCrab.  If not, see <https://www.gnu.org/licenses/>.

use crate::error::{AnalysisError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp layout used by the audit sources and by alert rendering
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity level as written by the audit source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    /// Parse a level token, accepting the usual spellings in any case
    #[must_use]
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "INFO" | "I" => Some(Self::Info),
            "WARN" | "WARNING" | "W" => Some(Self::Warn),
            "ERROR" | "ERR" | "E" => Some(Self::Error),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed audit record. Never mutated after ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: NaiveDateTime,
    pub source_ip: String,
    pub level: Level,
    pub message: String,
}

impl Event {
    pub fn new(
        timestamp: NaiveDateTime,
        source_ip: impl Into<String>,
        level: Level,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            source_ip: source_ip.into(),
            level,
            message: message.into(),
        }
    }

    /// Check the field constraints the scoring engine relies on.
    ///
    /// `index` is the position of the event in its batch and is only used
    /// for error reporting.
    pub fn validate(&self, index: usize) -> Result<()> {
        // Hostnames and placeholders like "-" are accepted as-is
        if self.source_ip.trim().is_empty() {
            return Err(AnalysisError::malformed(index, "empty source address"));
        }
        Ok(())
    }

    /// Timestamp rendered the way the audit source writes it
    #[must_use]
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .and_then(|d| d.and_hms_opt(9, 26, 53))
            .expect("valid timestamp")
    }

    #[test]
    fn test_level_from_name() {
        assert_eq!(Level::from_name("INFO"), Some(Level::Info));
        assert_eq!(Level::from_name("warning"), Some(Level::Warn));
        assert_eq!(Level::from_name(" Err "), Some(Level::Error));
        assert_eq!(Level::from_name("FATAL"), None);
    }

    #[test]
    fn test_validate_accepts_any_source_name() {
        for source in ["10.0.0.7", "fe80::1", "core-gw-01", "-"] {
            assert!(
                Event::new(ts(), source, Level::Info, "ok").validate(0).is_ok(),
                "{source} should be accepted"
            );
        }
    }

    #[test]
    fn test_validate_rejects_empty_address() {
        let err = Event::new(ts(), "  ", Level::Warn, "x")
            .validate(4)
            .expect_err("blank source must be rejected");
        assert!(matches!(err, AnalysisError::MalformedEvent { index: 4, .. }));
    }

    #[test]
    fn test_formatted_timestamp() {
        let event = Event::new(ts(), "1.2.3.4", Level::Error, "boom");
        assert_eq!(event.formatted_timestamp(), "2025-03-14 09:26:53");
    }
}
