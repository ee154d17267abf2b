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

//! Batch driver: extract, fit, score, decide, classify, emit.

use crate::anomaly::alert::{emit, Alert};
use crate::anomaly::decision::{label_with, threshold, Contamination};
use crate::anomaly::features::{FeatureExtractor, FeatureVector, KeywordSet, FEATURE_DIM};
use crate::anomaly::forest::{EnsembleParams, IsolationEnsemble};
use crate::anomaly::scored::{ClassifiedEvent, ScoredEvent};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::parser::event::Event;

/// Everything a batch run produces
#[derive(Debug, Clone)]
pub struct Analysis {
    /// One entry per input event, in input order
    pub classified: Vec<ClassifiedEvent>,
    /// Alerts for the Critical entries, in input order
    pub alerts: Vec<Alert>,
    /// Score cut used for the anomaly labels (`None` for an empty batch)
    pub threshold: Option<f64>,
    /// The ensemble the batch was scored with
    pub model: IsolationEnsemble,
}

/// Runs the scoring and classification engine over event batches.
///
/// Parameters are validated on construction, so a misconfigured analyzer
/// fails before any batch is touched.
#[derive(Debug, Clone)]
pub struct Analyzer {
    extractor: FeatureExtractor,
    params: EnsembleParams,
    contamination: Contamination,
}

impl Analyzer {
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let contamination = Contamination::new(config.contamination())?;
        let params = config.ensemble_params();
        params.validate()?;
        let keywords = KeywordSet::new(&config.attack_keywords)?;

        Ok(Self {
            extractor: FeatureExtractor::new(keywords),
            params,
            contamination,
        })
    }

    #[must_use]
    pub const fn contamination(&self) -> Contamination {
        self.contamination
    }

    /// Fit a fresh ensemble on `events` and classify the same batch
    pub fn analyze(&self, events: &[Event]) -> Result<Analysis> {
        profiling::scope!("Analyzer::analyze");
        let features = self.extractor.extract(events)?;
        let rows = to_rows(&features);
        let model = IsolationEnsemble::fit(&rows, &self.params)?;
        tracing::info!(
            "Fitted {} trees on {} events",
            model.num_trees(),
            events.len()
        );
        self.classify_batch(events, &features, &rows, model)
    }

    /// Classify `events` against a previously fitted ensemble
    pub fn analyze_with_model(
        &self,
        model: IsolationEnsemble,
        events: &[Event],
    ) -> Result<Analysis> {
        profiling::scope!("Analyzer::analyze_with_model");
        let features = self.extractor.extract(events)?;
        let rows = to_rows(&features);
        self.classify_batch(events, &features, &rows, model)
    }

    fn classify_batch(
        &self,
        events: &[Event],
        features: &[FeatureVector],
        rows: &[[f64; FEATURE_DIM]],
        model: IsolationEnsemble,
    ) -> Result<Analysis> {
        let scores = model.score(rows)?;
        let cut = threshold(&scores, self.contamination);
        let labels = cut.map_or_else(Vec::new, |cut| label_with(&scores, cut));
        debug_assert_eq!(scores.len(), events.len());
        debug_assert_eq!(labels.len(), events.len());

        let classified: Vec<ClassifiedEvent> = events
            .iter()
            .zip(features)
            .zip(scores.iter().zip(&labels))
            .map(|((event, feature), (&score, &label))| {
                ScoredEvent::new(event.clone(), score, label).classify(feature.attack_signal())
            })
            .collect();

        let alerts = emit(&classified);
        let anomalies = labels.iter().filter(|l| l.is_anomaly()).count();
        tracing::info!(
            "Labelled {anomalies} of {} events anomalous (contamination {}), {} critical",
            classified.len(),
            self.contamination.get(),
            alerts.len()
        );

        Ok(Analysis {
            classified,
            alerts,
            threshold: cut,
            model,
        })
    }
}

fn to_rows(features: &[FeatureVector]) -> Vec<[f64; FEATURE_DIM]> {
    features.iter().map(FeatureVector::to_row).collect()
}
