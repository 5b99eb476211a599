//! Random forest over TF-IDF vectors
//!
//! Bootstrap-sampled CART trees with Gini impurity, `sqrt(n_features)`
//! candidate features per split and midpoint thresholds. All randomness
//! comes from one `StdRng` seeded from [`ForestParams::seed`], so fitting the
//! same rows twice yields the same forest.

use crate::classifier::Prediction;
use crate::vectorizer::SparseVector;
use bullyguard_core::{Error, Label, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Forest hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Nodes with fewer samples become leaves
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: default_n_estimators(),
            max_depth: default_max_depth(),
            min_samples_split: default_min_samples_split(),
            seed: default_seed(),
        }
    }
}

impl ForestParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(Error::config("n_estimators must be positive"));
        }
        if self.max_depth == 0 {
            return Err(Error::config("max_depth must be positive"));
        }
        if self.min_samples_split < 2 {
            return Err(Error::config("min_samples_split must be at least 2"));
        }
        Ok(())
    }
}

fn default_n_estimators() -> usize {
    100
}

fn default_max_depth() -> usize {
    10
}

fn default_min_samples_split() -> usize {
    2
}

fn default_seed() -> u64 {
    42
}

/// Tree node; children always sit at higher arena indices than their parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// `[p(safe), p(cyberbullying)]`
        probabilities: [f64; 2],
    },
}

/// One CART tree stored as a node arena rooted at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn leaf_probabilities(&self, input: &SparseVector) -> Result<[f64; 2]> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { probabilities }) => return Ok(*probabilities),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let next = if input.get(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                    if next <= index {
                        return Err(Error::classifier(format!(
                            "tree node {index} points backwards to {next}"
                        )));
                    }
                    index = next;
                }
                None => {
                    return Err(Error::classifier(format!(
                        "tree node {index} does not exist"
                    )))
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest reachable leaf (a lone root leaf has depth 0).
    ///
    /// Links to missing or earlier nodes are not followed.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(0usize, 0usize)];
        while let Some((index, depth)) = pending.pop() {
            match self.nodes.get(index) {
                Some(Node::Split { left, right, .. }) => {
                    for child in [*left, *right] {
                        if child > index {
                            pending.push((child, depth + 1));
                        }
                    }
                }
                Some(Node::Leaf { .. }) => deepest = deepest.max(depth),
                None => {}
            }
        }
        deepest
    }

    fn validate(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::model_corrupt("tree has no nodes"));
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(Error::model_corrupt(format!(
                            "node {index} splits on feature {feature} of {n_features}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(Error::model_corrupt(format!(
                            "node {index} has a non-finite threshold"
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(Error::model_corrupt(format!(
                                "node {index} has invalid child {child}"
                            )));
                        }
                    }
                }
                Node::Leaf { probabilities } => {
                    let sum = probabilities[0] + probabilities[1];
                    if probabilities.iter().any(|p| !(0.0..=1.0).contains(p))
                        || (sum - 1.0).abs() > 1e-9
                    {
                        return Err(Error::model_corrupt(format!(
                            "leaf {index} has invalid probabilities {probabilities:?}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Ensemble of decision trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit the forest on dense feature rows
    pub fn fit(params: ForestParams, rows: &[Vec<f64>], labels: &[Label]) -> Result<Self> {
        params.validate()?;

        if rows.is_empty() {
            return Err(Error::training("cannot fit forest on zero samples"));
        }
        if rows.len() != labels.len() {
            return Err(Error::training(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        let n_features = rows[0].len();
        if n_features == 0 {
            return Err(Error::training("cannot fit forest on zero features"));
        }
        if rows.iter().any(|row| row.len() != n_features) {
            return Err(Error::training("feature rows have inconsistent widths"));
        }

        let labels: Vec<usize> = labels.iter().map(|l| l.index()).collect();
        let max_features = ((n_features as f64).sqrt() as usize).max(1);
        let mut rng = StdRng::seed_from_u64(params.seed);
        let n_samples = rows.len();

        let mut trees = Vec::with_capacity(params.n_estimators);
        for _ in 0..params.n_estimators {
            let bootstrap: Vec<usize> = (0..n_samples)
                .map(|_| rng.gen_range(0..n_samples))
                .collect();

            let mut builder = TreeBuilder {
                rows,
                labels: &labels,
                params: &params,
                max_features,
                rng: &mut rng,
                nodes: Vec::new(),
            };
            builder.build(bootstrap, 0);
            trees.push(DecisionTree {
                nodes: builder.nodes,
            });
        }

        Ok(Self {
            params,
            n_features,
            trees,
        })
    }

    /// Averaged class probabilities `[p(safe), p(cyberbullying)]`
    pub fn predict_proba(&self, input: &SparseVector) -> Result<[f64; 2]> {
        if let Some(max_index) = input.max_index() {
            if max_index >= self.n_features {
                return Err(Error::classifier(format!(
                    "input column {max_index} outside forest width {}",
                    self.n_features
                )));
            }
        }
        if self.trees.is_empty() {
            return Err(Error::classifier("forest has no trees"));
        }

        let mut total = [0.0; 2];
        for tree in &self.trees {
            let probabilities = tree.leaf_probabilities(input)?;
            total[0] += probabilities[0];
            total[1] += probabilities[1];
        }

        let n = self.trees.len() as f64;
        Ok([total[0] / n, total[1] / n])
    }

    /// Most probable label; ties go to `Safe`
    pub fn predict(&self, input: &SparseVector) -> Result<Prediction> {
        let [safe, bullying] = self.predict_proba(input)?;
        let prediction = if bullying > safe {
            Prediction::new(Label::Cyberbullying, bullying)
        } else {
            Prediction::new(Label::Safe, safe)
        };
        Ok(prediction)
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::model_corrupt("forest has no trees"));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| Error::model_corrupt(format!("tree {index}: {e}")))?;
        }
        Ok(())
    }
}

struct TreeBuilder<'a> {
    rows: &'a [Vec<f64>],
    labels: &'a [usize],
    params: &'a ForestParams,
    max_features: usize,
    rng: &'a mut StdRng,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    /// Grow the subtree for `samples`, returning its arena index
    fn build(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let counts = self.class_counts(&samples);
        let index = self.nodes.len();
        self.nodes.push(leaf(counts));

        let pure = counts[0] == 0 || counts[1] == 0;
        if pure || depth >= self.params.max_depth || samples.len() < self.params.min_samples_split
        {
            return index;
        }

        let Some((feature, threshold)) = self.best_split(&samples) else {
            return index;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&s| self.rows[s][feature] <= threshold);

        let left = self.build(left, depth + 1);
        let right = self.build(right, depth + 1);
        self.nodes[index] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        index
    }

    fn class_counts(&self, samples: &[usize]) -> [usize; 2] {
        let mut counts = [0; 2];
        for &s in samples {
            counts[self.labels[s]] += 1;
        }
        counts
    }

    /// Lowest weighted-Gini split among up to `max_features` non-constant
    /// features, visited in random order
    fn best_split(&mut self, samples: &[usize]) -> Option<(usize, f64)> {
        let n_features = self.rows[0].len();
        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(&mut *self.rng);

        let total = self.class_counts(samples);
        let n = samples.len() as f64;
        let mut best: Option<(f64, usize, f64)> = None;
        let mut visited = 0;

        for feature in features {
            if visited == self.max_features {
                break;
            }

            let mut column: Vec<(f64, usize)> = samples
                .iter()
                .map(|&s| (self.rows[s][feature], self.labels[s]))
                .collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            if column[0].0 == column[column.len() - 1].0 {
                continue;
            }
            visited += 1;

            let mut left = [0usize; 2];
            for i in 0..column.len() - 1 {
                left[column[i].1] += 1;
                let (value, next) = (column[i].0, column[i + 1].0);
                if value == next {
                    continue;
                }

                let right = [total[0] - left[0], total[1] - left[1]];
                let n_left = (i + 1) as f64;
                let impurity = (n_left * gini(left) + (n - n_left) * gini(right)) / n;

                if best.map_or(true, |(b, _, _)| impurity < b) {
                    let mut threshold = value + (next - value) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some((impurity, feature, threshold));
                }
            }
        }

        best.map(|(_, feature, threshold)| (feature, threshold))
    }
}

fn leaf(counts: [usize; 2]) -> Node {
    let n = (counts[0] + counts[1]) as f64;
    let probabilities = if n == 0.0 {
        [1.0, 0.0]
    } else {
        [counts[0] as f64 / n, counts[1] as f64 / n]
    };
    Node::Leaf { probabilities }
}

fn gini(counts: [usize; 2]) -> f64 {
    let n = (counts[0] + counts[1]) as f64;
    if n == 0.0 {
        return 0.0;
    }
    let p0 = counts[0] as f64 / n;
    let p1 = counts[1] as f64 / n;
    1.0 - p0 * p0 - p1 * p1
}
