use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_CONTAMINATION: f64 = 0.1;

/// Binary model verdict, serialized as `-1` (anomaly) / `1` (normal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum AnomalyLabel {
    Anomaly,
    Normal,
}

impl AnomalyLabel {
    #[must_use]
    pub const fn as_i8(self) -> i8 {
        match self {
            Self::Anomaly => -1,
            Self::Normal => 1,
        }
    }

    #[must_use]
    pub const fn is_anomaly(self) -> bool {
        matches!(self, Self::Anomaly)
    }
}

impl From<AnomalyLabel> for i8 {
    fn from(label: AnomalyLabel) -> Self {
        label.as_i8()
    }
}

impl TryFrom<i8> for AnomalyLabel {
    type Error = String;

    fn try_from(value: i8) -> std::result::Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Anomaly),
            1 => Ok(Self::Normal),
            other => Err(format!("anomaly label must be -1 or 1, got {other}")),
        }
    }
}

impl fmt::Display for AnomalyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

/// Expected anomalous fraction of a batch, strictly inside `(0, 1)`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Contamination(f64);

impl Contamination {
    pub fn new(value: f64) -> Result<Self> {
        if value > 0.0 && value < 1.0 {
            Ok(Self(value))
        } else {
            Err(AnalysisError::invalid(
                "contamination",
                format!("must lie strictly between 0 and 1, got {value}"),
            ))
        }
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Default for Contamination {
    fn default() -> Self {
        Self(DEFAULT_CONTAMINATION)
    }
}

/// The `(1 - contamination)` quantile of `scores`, linearly interpolated
/// between the two nearest ranks. `None` for an empty batch.
#[must_use]
pub fn threshold(scores: &[f64], contamination: Contamination) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = (1.0 - contamination.get()) * (sorted.len() - 1) as f64;
    let lo = position.floor() as usize;
    let hi = position.ceil() as usize;
    let fraction = position - lo as f64;
    let value = sorted[lo] + fraction * (sorted[hi] - sorted[lo]);
    Some(value.min(sorted[hi]))
}

/// Label every score against the batch-relative threshold.
///
/// The boundary is inclusive: a score equal to the threshold is an anomaly,
/// so tied scores at the cut are all flagged together.
#[must_use]
pub fn decide(scores: &[f64], contamination: Contamination) -> Vec<AnomalyLabel> {
    match threshold(scores, contamination) {
        Some(cut) => label_with(scores, cut),
        None => Vec::new(),
    }
}

/// Label `scores` against an already computed cut, inclusive at the cut
#[must_use]
pub fn label_with(scores: &[f64], cut: f64) -> Vec<AnomalyLabel> {
    scores
        .iter()
        .map(|&s| {
            if s >= cut {
                AnomalyLabel::Anomaly
            } else {
                AnomalyLabel::Normal
            }
        })
        .collect()
}
