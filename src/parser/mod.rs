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

pub mod event;

use chrono::NaiveDateTime;
use event::{Event, Level, TIMESTAMP_FORMAT};
use fancy_regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

// timestamp | ip | level | message
static AUDIT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?) \| (.*?) \| (.*?) \| (.*)$").expect("valid regex literal")
});

/// Result of parsing a whole log file
#[derive(Debug, Clone, Default)]
pub struct ParsedLog {
    /// Events in file order
    pub events: Vec<Event>,
    /// 1-based line numbers of non-blank lines that could not be parsed
    pub skipped: Vec<usize>,
}

/// Parse a single `timestamp | ip | level | message` line.
///
/// Returns `None` when the line does not follow the layout, when its
/// timestamp or level cannot be decoded, or when the source field is blank.
/// Any other source text, hostnames included, is kept verbatim.
pub fn parse_line(raw: &str, line_number: usize) -> Option<Event> {
    let trimmed = raw.trim();
    let caps = match AUDIT_LINE.captures(trimmed) {
        Ok(Some(caps)) => caps,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Regex failure on line {line_number}: {e}");
            return None;
        }
    };

    let timestamp = match NaiveDateTime::parse_from_str(caps[1].trim(), TIMESTAMP_FORMAT) {
        Ok(ts) => ts,
        Err(e) => {
            tracing::debug!("Line {line_number}: bad timestamp {:?}: {e}", &caps[1]);
            return None;
        }
    };

    let source = caps[2].trim();
    if source.is_empty() {
        tracing::debug!("Line {line_number}: empty source field");
        return None;
    }

    let Some(level) = Level::from_name(&caps[3]) else {
        tracing::debug!("Line {line_number}: unknown level {:?}", &caps[3]);
        return None;
    };

    Some(Event::new(
        timestamp,
        source,
        level,
        caps[4].to_string(),
    ))
}

/// Parse every line of `content`, keeping file order
pub fn parse_content(content: &str) -> ParsedLog {
    profiling::scope!("parse_content");
    let mut parsed = ParsedLog::default();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = idx + 1;
        match parse_line(line, line_number) {
            Some(event) => parsed.events.push(event),
            None => parsed.skipped.push(line_number),
        }
    }

    if !parsed.skipped.is_empty() {
        tracing::info!(
            "Skipped {} unparseable lines (first at line {})",
            parsed.skipped.len(),
            parsed.skipped[0]
        );
    }
    parsed
}

/// Read and parse a log file, replacing invalid UTF-8 sequences
pub fn parse_file(path: &Path) -> std::io::Result<ParsedLog> {
    let read_start = std::time::Instant::now();
    let buffer = std::fs::read(path)?;
    tracing::info!(
        "File I/O took {:?} to read {} bytes",
        read_start.elapsed(),
        buffer.len()
    );

    let content = String::from_utf8_lossy(&buffer);
    Ok(parse_content(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_audit_line() {
        let event = parse_line(
            "2025-06-02 14:05:31 | 192.168.10.4 | ERROR | Access denied - Possible attack detected",
            1,
        )
        .expect("should parse audit line");
        assert_eq!(event.timestamp.hour(), 14);
        assert_eq!(event.source_ip, "192.168.10.4");
        assert_eq!(event.level, Level::Error);
        assert_eq!(event.message, "Access denied - Possible attack detected");
    }

    #[test]
    fn test_message_may_contain_separator() {
        let event = parse_line("2025-06-02 14:05:31 | 10.0.0.1 | INFO | a | b", 1)
            .expect("should parse audit line");
        assert_eq!(event.message, "a | b");
    }

    #[test]
    fn test_rejects_bad_timestamp_and_level() {
        assert!(parse_line("2025-13-02 14:05:31 | 10.0.0.1 | INFO | x", 1).is_none());
        assert!(parse_line("2025-06-02 14:05:31 | 10.0.0.1 | TRACE | x", 1).is_none());
        assert!(parse_line("just some text", 1).is_none());
    }

    #[test]
    fn test_source_field_is_free_text() {
        let event = parse_line("2025-06-02 14:05:31 | core-gw-01 | WARN | x", 1)
            .expect("hostname source");
        assert_eq!(event.source_ip, "core-gw-01");
        assert!(event.validate(0).is_ok());
        assert!(parse_line("2025-06-02 14:05:31 |   | WARN | x", 1).is_none());
    }

    #[test]
    fn test_parse_content_tracks_skipped_lines() {
        let content = "\
2025-06-02 10:00:00 | 10.0.0.1 | INFO | Access granted

garbage line
2025-06-02 10:00:05 | 10.0.0.2 | WARN | Authentication failure
";
        let parsed = parse_content(content);
        assert_eq!(parsed.events.len(), 2);
        assert_eq!(parsed.skipped, vec![3]);
        assert_eq!(parsed.events[1].source_ip, "10.0.0.2");
    }

    #[test]
    fn test_parse_file_lossy() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("audit.log");
        let mut bytes = b"2025-06-02 10:00:00 | 10.0.0.1 | INFO | caf".to_vec();
        bytes.extend_from_slice(&[0xff, b'\n']);
        std::fs::write(&path, bytes).expect("write fixture");

        let parsed = parse_file(&path).expect("readable file");
        assert_eq!(parsed.events.len(), 1);
        assert!(parsed.events[0].message.starts_with("caf"));
    }
}
