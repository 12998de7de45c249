//! Random forest regressor: bagged, fully grown variance-reduction trees.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::services::forecaster::Regressor;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("cannot fit on an empty training set")]
    EmptyTrainingSet,

    #[error("feature rows ({rows}) and targets ({targets}) differ in length")]
    ShapeMismatch { rows: usize, targets: usize },

    #[error("training data contains non-finite values")]
    NonFinite,
}

/// Random forest configuration
#[derive(Debug, Clone)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree (None = grow until pure)
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed; tree `i` uses `seed + i`
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, features: &[f64]) -> f64 {
        match self {
            Node::Leaf { value } => *value,
            Node::Split { feature, threshold, left, right } => {
                if features[*feature] <= *threshold {
                    left.predict(features)
                } else {
                    right.predict(features)
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

/// Regression tree grown on a subset of sample indices
#[derive(Debug, Clone)]
struct DecisionTree {
    root: Node,
}

impl DecisionTree {
    fn fit(
        config: &ForestConfig,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let root = Self::build(config, features, targets, indices, 0, rng);
        Self { root }
    }

    fn build(
        config: &ForestConfig,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> Node {
        let values: Vec<f64> = indices.iter().map(|&i| targets[i]).collect();
        let value = mean(&values);

        let depth_reached = config.max_depth.map_or(false, |max| depth >= max);
        if depth_reached
            || indices.len() < config.min_samples_split
            || sum_squared_error(&values) < 1e-12
        {
            return Node::Leaf { value };
        }

        match Self::find_best_split(config, features, targets, indices, rng) {
            Some(split) => {
                let left = Self::build(config, features, targets, &split.left, depth + 1, rng);
                let right = Self::build(config, features, targets, &split.right, depth + 1, rng);
                Node::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            None => Node::Leaf { value },
        }
    }

    /// Best variance-reduction split over midpoints between distinct feature values.
    /// Sweeps each feature in sorted order with running sums.
    fn find_best_split(
        config: &ForestConfig,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<BestSplit> {
        let n_features = features[indices[0]].len();
        let max_features = config.max_features.unwrap_or(n_features).clamp(1, n_features);

        let mut candidates: Vec<usize> = (0..n_features).collect();
        candidates.shuffle(rng);
        candidates.truncate(max_features);

        let n = indices.len();
        let total_sum: f64 = indices.iter().map(|&i| targets[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();
        let parent_sse = total_sq - total_sum * total_sum / n as f64;

        let mut best: Option<(f64, usize, f64)> = None;

        for &feature in &candidates {
            let mut sorted: Vec<usize> = indices.to_vec();
            sorted.sort_by(|&a, &b| features[a][feature].total_cmp(&features[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for k in 0..n - 1 {
                let y = targets[sorted[k]];
                left_sum += y;
                left_sq += y * y;

                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < config.min_samples_leaf || n_right < config.min_samples_leaf {
                    continue;
                }

                let here = features[sorted[k]][feature];
                let next = features[sorted[k + 1]][feature];
                if here >= next {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / n_left as f64)
                    + (right_sq - right_sum * right_sum / n_right as f64);
                let gain = parent_sse - sse;

                if gain > 1e-12 && best.map_or(true, |(g, _, _)| gain > g) {
                    best = Some((gain, feature, (here + next) / 2.0));
                }
            }
        }

        let (_, feature, threshold) = best?;
        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| features[i][feature] <= threshold);

        Some(BestSplit { feature, threshold, left, right })
    }

    fn predict_one(&self, features: &[f64]) -> f64 {
        self.root.predict(features)
    }
}

/// Random forest model
#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit on row-major `features` against `targets`
    pub fn fit(config: ForestConfig, features: &[Vec<f64>], targets: &[f64]) -> Result<Self, ModelError> {
        if features.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if features.len() != targets.len() {
            return Err(ModelError::ShapeMismatch {
                rows: features.len(),
                targets: targets.len(),
            });
        }
        let all_finite = targets.iter().all(|t| t.is_finite())
            && features.iter().all(|row| !row.is_empty() && row.iter().all(|v| v.is_finite()));
        if !all_finite {
            return Err(ModelError::NonFinite);
        }

        let n = features.len();
        let trees = (0..config.n_trees.max(1))
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(i as u64));
                let indices: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.random_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                DecisionTree::fit(&config, features, targets, &indices, &mut rng)
            })
            .collect();

        Ok(Self { config, trees })
    }

    /// Number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(|t| t.root.depth()).max().unwrap_or(0)
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

impl Regressor for RandomForest {
    /// Mean of the tree predictions
    fn predict_one(&self, features: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict_one(features)).sum();
        sum / self.trees.len() as f64
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sum_squared_error(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let features: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let targets: Vec<f64> = (0..40).map(|i| if i < 20 { 10.0 } else { 20.0 }).collect();
        (features, targets)
    }

    #[test]
    fn test_forest_learns_step_function() {
        let (features, targets) = step_data();
        let forest = RandomForest::fit(ForestConfig { n_trees: 25, ..Default::default() }, &features, &targets).unwrap();

        assert_eq!(forest.n_trees(), 25);
        assert!((forest.predict_one(&[2.0, 2.0]) - 10.0).abs() < 1.0);
        assert!((forest.predict_one(&[37.0, 1.0]) - 20.0).abs() < 1.0);
    }

    #[test]
    fn test_fit_is_reproducible_for_same_seed() {
        let features: Vec<Vec<f64>> = (0..50).map(|i| vec![i as f64, ((i as f64) * 0.3).sin()]).collect();
        let targets: Vec<f64> = features.iter().map(|f| f[0] * 0.5 + f[1] * 3.0).collect();

        let config = ForestConfig { n_trees: 30, seed: 7, ..Default::default() };
        let a = RandomForest::fit(config.clone(), &features, &targets).unwrap();
        let b = RandomForest::fit(config, &features, &targets).unwrap();

        for probe in [[3.5, 0.1], [25.0, -0.7], [80.0, 0.9]] {
            assert_eq!(a.predict_one(&probe), b.predict_one(&probe));
        }
    }

    #[test]
    fn test_predictions_stay_within_target_range() {
        let features: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let forest = RandomForest::fit(ForestConfig { n_trees: 20, ..Default::default() }, &features, &targets).unwrap();

        for x in [-50.0, 0.0, 14.5, 29.0, 500.0] {
            let p = forest.predict_one(&[x]);
            assert!(p >= 100.0 && p <= 129.0, "prediction {} out of range", p);
        }
    }

    #[test]
    fn test_without_bootstrap_single_tree_fits_exactly() {
        let (features, targets) = step_data();
        let config = ForestConfig { n_trees: 1, bootstrap: false, ..Default::default() };
        let forest = RandomForest::fit(config, &features, &targets).unwrap();

        for (row, target) in features.iter().zip(targets.iter()) {
            assert_eq!(forest.predict_one(row), *target);
        }
        assert!(forest.max_depth() >= 2);
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        let config = ForestConfig::default();
        assert_eq!(RandomForest::fit(config.clone(), &[], &[]).unwrap_err(), ModelError::EmptyTrainingSet);
        assert_eq!(
            RandomForest::fit(config.clone(), &[vec![1.0]], &[1.0, 2.0]).unwrap_err(),
            ModelError::ShapeMismatch { rows: 1, targets: 2 }
        );
        assert_eq!(
            RandomForest::fit(config, &[vec![f64::NAN]], &[1.0]).unwrap_err(),
            ModelError::NonFinite
        );
    }
}
