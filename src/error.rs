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

//! Error taxonomy shared by the scoring engine and its collaborators.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The ensemble needs at least two vectors to partition anything.
    #[error("insufficient data: need at least {required} feature vectors, got {found}")]
    InsufficientData { required: usize, found: usize },

    #[error("dimension mismatch at vector {index}: expected {expected} features, got {found}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("malformed event at index {index}: {reason}")]
    MalformedEvent { index: usize, reason: String },

    #[error("cannot access model file {path:?}: {source}")]
    ModelIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode model file {path:?}: {source}")]
    ModelFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl AnalysisError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedEvent {
            index,
            reason: reason.into(),
        }
    }
}
