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

pub mod pipeline;
pub mod report;

pub use pipeline::{Analysis, Analyzer};
pub use report::{critical_timeline, BatchSummary};
