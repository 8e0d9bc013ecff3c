//! Regression trees and bagged forests

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{check_row, check_training_data, Regressor};
use crate::error::{Error, Result};

/// Nodes with fewer samples than this become leaves
const MIN_SAMPLES_SPLIT: usize = 2;

/// Depth limit applied even when `max_depth` is None
pub const MAX_TREE_DEPTH: usize = 48;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// CART regression tree using squared-error splits
///
/// Nodes live in a flat arena; index 0 is the root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub max_depth: Option<usize>,
    n_features: usize,
    nodes: Vec<Node>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    sse: f64,
}

impl RegressionTree {
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            max_depth,
            n_features: 0,
            nodes: Vec::new(),
        }
    }

    /// Number of nodes (leaves and splits)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Effective depth limit: `max_depth`, never above `MAX_TREE_DEPTH`
    fn depth_limit(&self) -> usize {
        self.max_depth.unwrap_or(MAX_TREE_DEPTH).min(MAX_TREE_DEPTH)
    }

    /// Edges on the longest root-to-leaf path
    #[cfg(test)]
    fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            match self.nodes.get(idx) {
                Some(Node::Split { left, right, .. }) => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
                Some(Node::Leaf { .. }) => deepest = deepest.max(depth),
                None => {}
            }
        }
        deepest
    }

    fn build(&mut self, x: &[Vec<f64>], y: &[f64], indices: Vec<usize>, depth: usize) -> usize {
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;
        let slot = self.nodes.len();
        self.nodes.push(Node::Leaf { value: mean });

        if depth >= self.depth_limit() || indices.len() < MIN_SAMPLES_SPLIT {
            return slot;
        }

        let Some(best) = self.best_split(x, y, &indices) else {
            return slot;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| x[i][best.feature] <= best.threshold);

        let left = self.build(x, y, left_idx, depth + 1);
        let right = self.build(x, y, right_idx, depth + 1);
        self.nodes[slot] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        slot
    }

    /// Lowest-SSE split over every feature, or None if nothing reduces error
    fn best_split(&self, x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Option<BestSplit> {
        let n = indices.len() as f64;
        let total: f64 = indices.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        let parent_sse = total_sq - total * total / n;

        let mut best: Option<BestSplit> = None;
        let mut order = indices.to_vec();

        for feature in 0..self.n_features {
            order.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 0..order.len() - 1 {
                let yi = y[order[k]];
                left_sum += yi;
                left_sq += yi * yi;

                let here = x[order[k]][feature];
                let next = x[order[k + 1]][feature];
                if here == next {
                    continue;
                }

                let left_n = (k + 1) as f64;
                let right_n = n - left_n;
                let right_sum = total - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / left_n)
                    + (right_sq - right_sum * right_sum / right_n);

                if best.as_ref().map_or(true, |b| sse < b.sse) {
                    best = Some(BestSplit {
                        feature,
                        threshold: (here + next) / 2.0,
                        sse,
                    });
                }
            }
        }

        best.filter(|b| b.sse < parent_sse - 1e-12 * parent_sse.abs().max(1.0))
    }
}

impl Regressor for RegressionTree {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        self.n_features = check_training_data(x, y)?;
        self.nodes.clear();
        self.build(x, y, (0..x.len()).collect(), 0);
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> Result<f64> {
        if !self.is_fitted() {
            return Err(Error::Model("Regression tree is not fitted".to_string()));
        }
        check_row(row, self.n_features)?;

        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Leaf { value }) => return Ok(*value),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                None => return Err(Error::Model(format!("Dangling tree node {}", idx))),
            }
        }
    }

    fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }
}

/// Bagged ensemble of regression trees; predicts the mean of its trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub seed: u64,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn new(n_estimators: usize, max_depth: Option<usize>, seed: u64) -> Self {
        Self {
            n_estimators,
            max_depth,
            seed,
            trees: Vec::new(),
        }
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Nodes across every tree
    pub fn node_count(&self) -> usize {
        self.trees.iter().map(RegressionTree::node_count).sum()
    }
}

impl Regressor for RandomForest {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        check_training_data(x, y)?;
        if self.n_estimators == 0 {
            return Err(Error::Model("Forest needs at least one tree".to_string()));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let n = x.len();
        self.trees.clear();

        for _ in 0..self.n_estimators {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let xs: Vec<Vec<f64>> = sample.iter().map(|&i| x[i].clone()).collect();
            let ys: Vec<f64> = sample.iter().map(|&i| y[i]).collect();

            let mut tree = RegressionTree::new(self.max_depth);
            tree.fit(&xs, &ys)?;
            self.trees.push(tree);
        }

        Ok(())
    }

    fn predict(&self, row: &[f64]) -> Result<f64> {
        if !self.is_fitted() {
            return Err(Error::Model("Random forest is not fitted".to_string()));
        }
        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.predict(row)?;
        }
        Ok(sum / self.trees.len() as f64)
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}
