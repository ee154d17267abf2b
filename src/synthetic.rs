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

//! Synthetic audit logs for demos and tests.

use crate::parser::event::{Level, TIMESTAMP_FORMAT};
use chrono::{Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MESSAGES: &[&str] = &[
    "Access granted",
    "Access denied",
    "Transaction completed",
    "Authentication failure",
    "Intrusion attempt",
];

/// Appended to every ERROR message
pub const ATTACK_SUFFIX: &str = " - Possible attack detected";

/// Generate `count` log lines spread over the hour after `base_time`.
///
/// Levels are drawn 70% INFO, 20% WARN, 10% ERROR. The same seed always
/// yields the same lines.
#[must_use]
pub fn generate(count: usize, seed: u64, base_time: NaiveDateTime) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let timestamp = base_time + Duration::seconds(rng.gen_range(0..3600));
            let ip = (0..4)
                .map(|_| rng.gen_range(1..255u8).to_string())
                .collect::<Vec<_>>()
                .join(".");
            let level = match rng.gen_range(0..100u8) {
                0..=69 => Level::Info,
                70..=89 => Level::Warn,
                _ => Level::Error,
            };
            let mut message = MESSAGES[rng.gen_range(0..MESSAGES.len())].to_string();
            if level == Level::Error {
                message.push_str(ATTACK_SUFFIX);
            }
            format!(
                "{} | {ip} | {level} | {message}",
                timestamp.format(TIMESTAMP_FORMAT)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_content;
    use chrono::NaiveDate;

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn test_generated_lines_parse() {
        let lines = generate(300, 42, base());
        let parsed = parse_content(&lines.join("\n"));
        assert_eq!(parsed.events.len(), 300);
        assert!(parsed.skipped.is_empty());

        for event in &parsed.events {
            assert!(event.validate(0).is_ok());
            assert!(event.timestamp >= base() && event.timestamp < base() + Duration::hours(1));
            assert_eq!(event.level == Level::Error, event.message.ends_with(ATTACK_SUFFIX));
        }
    }

    #[test]
    fn test_seeded() {
        assert_eq!(generate(20, 3, base()), generate(20, 3, base()));
        assert_ne!(generate(20, 3, base()), generate(20, 4, base()));
    }
}
