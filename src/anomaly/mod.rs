pub mod alert;
pub mod decision;
pub mod features;
pub mod forest;
pub mod scored;
pub mod severity;

pub use alert::{emit, Alert};
pub use decision::{decide, label_with, AnomalyLabel, Contamination};
pub use features::{FeatureExtractor, FeatureVector, KeywordSet};
pub use forest::{EnsembleParams, IsolationEnsemble};
pub use scored::{ClassifiedEvent, ScoredEvent};
pub use severity::{classify, Severity};
