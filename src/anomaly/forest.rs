//! Isolation ensemble for unsupervised outlier scoring.
//!
//! Each tree recursively splits a random subsample on a random feature at a
//! random value until points are isolated or a depth limit is reached. Points
//! that end up in shallow leaves across the ensemble are easy to isolate and
//! score close to 1; typical points score well below 0.5.
//!
//! Trees are built in parallel. Every tree owns an RNG seeded from a
//! per-tree seed drawn up front from the ensemble seed, so the fitted model
//! only depends on the seed and the input order.

use crate::error::{AnalysisError, Result};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_NUM_TREES: usize = 100;

/// Upper bound for the default per-tree subsample
pub const DEFAULT_MAX_SUBSAMPLE: usize = 256;

pub const DEFAULT_SEED: u64 = 42;

const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Expected path length of an unsuccessful BST search over `n` points.
///
/// Used both to normalize scores and to account for the points left
/// together in a leaf once the depth limit is hit.
#[must_use]
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Fit parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsembleParams {
    pub num_trees: usize,
    /// Points drawn per tree; `None` means `min(256, batch size)`
    pub subsample_size: Option<usize>,
    pub seed: u64,
}

impl Default for EnsembleParams {
    fn default() -> Self {
        Self {
            num_trees: DEFAULT_NUM_TREES,
            subsample_size: None,
            seed: DEFAULT_SEED,
        }
    }
}

impl EnsembleParams {
    pub fn validate(&self) -> Result<()> {
        if self.num_trees == 0 {
            return Err(AnalysisError::invalid(
                "num_trees",
                "the ensemble needs at least one tree",
            ));
        }
        if let Some(size) = self.subsample_size {
            if size < 2 {
                return Err(AnalysisError::invalid(
                    "subsample_size",
                    format!("must be at least 2, got {size}"),
                ));
            }
        }
        Ok(())
    }

    fn effective_subsample(&self, batch_size: usize) -> usize {
        let requested = self.subsample_size.unwrap_or(DEFAULT_MAX_SUBSAMPLE);
        if requested > batch_size && self.subsample_size.is_some() {
            tracing::debug!(
                "Subsample size {requested} exceeds batch size {batch_size}, using the full batch"
            );
        }
        requested.min(batch_size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// `size` training points reached this leaf
    Leaf { size: usize },
}

impl Node {
    fn path_length(&self, row: &[f64]) -> f64 {
        let mut node = self;
        let mut depth = 0.0;
        loop {
            match node {
                Self::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        &**left
                    } else {
                        &**right
                    };
                    depth += 1.0;
                }
                Self::Leaf { size } => return depth + average_path_length(*size),
            }
        }
    }

    /// Structural check for trees that did not come out of `fit`
    fn check(&self, dimension: usize, max_leaf: usize) -> std::result::Result<(), String> {
        match self {
            Self::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= dimension {
                    return Err(format!(
                        "split on feature {feature} but the model has {dimension} dimensions"
                    ));
                }
                if !threshold.is_finite() {
                    return Err(format!("non-finite split threshold {threshold}"));
                }
                left.check(dimension, max_leaf)?;
                right.check(dimension, max_leaf)
            }
            Self::Leaf { size } if *size > max_leaf => Err(format!(
                "leaf holds {size} points, more than the subsample size {max_leaf}"
            )),
            Self::Leaf { .. } => Ok(()),
        }
    }
}

/// One randomized partition tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationTree {
    root: Node,
}

impl IsolationTree {
    /// Number of partitions needed to reach `row`'s leaf, plus the leaf correction
    #[must_use]
    pub fn path_length(&self, row: &[f64]) -> f64 {
        self.root.path_length(row)
    }
}

struct TreeBuilder<'a, R> {
    rows: &'a [R],
    dim: usize,
    max_depth: usize,
    rng: StdRng,
}

impl<R: AsRef<[f64]>> TreeBuilder<'_, R> {
    fn value(&self, index: usize, feature: usize) -> f64 {
        self.rows[index].as_ref()[feature]
    }

    fn build(&mut self, indices: Vec<usize>, depth: usize) -> Node {
        if indices.len() <= 1 || depth >= self.max_depth {
            return Node::Leaf {
                size: indices.len(),
            };
        }

        // Only features with spread in this node can separate anything
        let candidates: Vec<(usize, f64, f64)> = (0..self.dim)
            .filter_map(|feature| {
                let (lo, hi) = indices.iter().fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), &i| {
                        let v = self.value(i, feature);
                        (lo.min(v), hi.max(v))
                    },
                );
                (hi > lo).then_some((feature, lo, hi))
            })
            .collect();

        if candidates.is_empty() {
            return Node::Leaf {
                size: indices.len(),
            };
        }

        let (feature, lo, hi) = candidates[self.rng.gen_range(0..candidates.len())];
        let threshold = self.split_value(lo, hi);

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.value(i, feature) <= threshold);

        let left = Box::new(self.build(left, depth + 1));
        let right = Box::new(self.build(right, depth + 1));
        Node::Split {
            feature,
            threshold,
            left,
            right,
        }
    }

    /// Uniform value in `[lo, hi)`: the minimum always goes left, the maximum right
    fn split_value(&mut self, lo: f64, hi: f64) -> f64 {
        if (hi - lo).is_finite() {
            return self.rng.gen_range(lo..hi);
        }
        // The span overflows f64, so interpolate at half scale
        let u: f64 = self.rng.gen();
        let value = (lo / 2.0 + u * (hi / 2.0 - lo / 2.0)) * 2.0;
        if value < hi {
            value
        } else {
            lo
        }
    }
}

/// A fitted isolation ensemble. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationEnsemble {
    trees: Vec<IsolationTree>,
    dimension: usize,
    subsample_size: usize,
}

impl IsolationEnsemble {
    /// Build the ensemble over a batch of equally sized numeric rows.
    pub fn fit<R>(rows: &[R], params: &EnsembleParams) -> Result<Self>
    where
        R: AsRef<[f64]> + Sync,
    {
        profiling::scope!("IsolationEnsemble::fit");
        params.validate()?;
        if rows.len() < 2 {
            return Err(AnalysisError::InsufficientData {
                required: 2,
                found: rows.len(),
            });
        }
        let dimension = check_rows(rows, None)?;

        let batch_size = rows.len();
        let subsample_size = params.effective_subsample(batch_size);
        let max_depth = (subsample_size as f64).log2().ceil() as usize;

        let mut master = StdRng::seed_from_u64(params.seed);
        let tree_seeds: Vec<u64> = (0..params.num_trees).map(|_| master.gen()).collect();

        let start = std::time::Instant::now();
        let trees: Vec<IsolationTree> = tree_seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let indices = if subsample_size < batch_size {
                    index::sample(&mut rng, batch_size, subsample_size).into_vec()
                } else {
                    (0..batch_size).collect()
                };
                let mut builder = TreeBuilder {
                    rows,
                    dim: dimension,
                    max_depth,
                    rng,
                };
                IsolationTree {
                    root: builder.build(indices, 0),
                }
            })
            .collect();

        tracing::debug!(
            "Built {} trees over {batch_size} rows (subsample {subsample_size}, depth limit {max_depth}) in {:?}",
            trees.len(),
            start.elapsed()
        );

        Ok(Self {
            trees,
            dimension,
            subsample_size,
        })
    }

    /// Normalized isolation score for every row, in input order.
    ///
    /// Rows must have the dimensionality the ensemble was fit on.
    pub fn score<R>(&self, rows: &[R]) -> Result<Vec<f64>>
    where
        R: AsRef<[f64]> + Sync,
    {
        profiling::scope!("IsolationEnsemble::score");
        if self.trees.is_empty() || self.subsample_size < 2 {
            return Err(AnalysisError::invalid(
                "model",
                "ensemble has no trees or a degenerate subsample size",
            ));
        }
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        check_rows(rows, Some(self.dimension))?;

        Ok(rows
            .par_iter()
            .map(|row| self.score_row(row.as_ref()))
            .collect())
    }

    fn score_row(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.path_length(row)).sum();
        let mean_path = total / self.trees.len() as f64;
        2f64.powf(-mean_path / average_path_length(self.subsample_size))
    }

    #[must_use]
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub const fn subsample_size(&self) -> usize {
        self.subsample_size
    }

    /// Write the model as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self).map_err(|source| AnalysisError::ModelFormat {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| AnalysisError::ModelIo {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Saved isolation ensemble to {path:?}");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| AnalysisError::ModelIo {
            path: path.to_path_buf(),
            source,
        })?;
        let model: Self =
            serde_json::from_str(&contents).map_err(|source| AnalysisError::ModelFormat {
                path: path.to_path_buf(),
                source,
            })?;
        model.check().map_err(|reason| {
            AnalysisError::invalid("model", format!("{}: {reason}", path.display()))
        })?;
        tracing::info!(
            "Loaded isolation ensemble with {} trees from {path:?}",
            model.num_trees()
        );
        Ok(model)
    }

    fn check(&self) -> std::result::Result<(), String> {
        if self.trees.is_empty() {
            return Err("ensemble has no trees".to_string());
        }
        if self.dimension == 0 {
            return Err("ensemble has zero dimensions".to_string());
        }
        if self.subsample_size < 2 {
            return Err(format!("subsample size {} is below 2", self.subsample_size));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.root
                .check(self.dimension, self.subsample_size)
                .map_err(|reason| format!("tree {index}: {reason}"))?;
        }
        Ok(())
    }
}

/// Check shape and finiteness, returning the common dimension
fn check_rows<R: AsRef<[f64]>>(rows: &[R], expected: Option<usize>) -> Result<usize> {
    let Some(first) = rows.first() else {
        return Ok(expected.unwrap_or(0));
    };
    let expected = expected.unwrap_or_else(|| first.as_ref().len());
    if expected == 0 {
        return Err(AnalysisError::malformed(0, "feature vector has no columns"));
    }

    for (index, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        if row.len() != expected {
            return Err(AnalysisError::DimensionMismatch {
                index,
                expected,
                found: row.len(),
            });
        }
        if let Some(v) = row.iter().find(|v| !v.is_finite()) {
            return Err(AnalysisError::malformed(
                index,
                format!("non-finite feature value {v}"),
            ));
        }
    }
    Ok(expected)
}
