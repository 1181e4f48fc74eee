//! 合成图数据集：上下文随机块模型（CSBM）
//!
//! - 标签按节点编号轮流分配，各类别数量均衡
//! - 特征 = 类别中心 + 高斯噪声
//! - 同类节点以 `p_in`、异类节点以 `p_out` 的概率连边（无向，双向存储）
//! - 划分方式仿 Planetoid：每类取 `train_per_class` 个训练节点，其余节点依次划入验证、测试集
//!
//! 给定种子时生成结果完全确定，用于测试与演示。

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::GraphDataset;
use crate::data::error::DataError;
use crate::data::{GraphSnapshot, Masks};
use crate::distribution::Distribution;

#[derive(Debug, Clone)]
pub struct SyntheticGraph {
    num_nodes: usize,
    num_classes: usize,
    num_features: usize,
    p_in: f32,
    p_out: f32,
    feature_noise: f32,
    train_per_class: usize,
    num_val: usize,
    num_test: usize,
    seed: u64,
}

impl SyntheticGraph {
    pub fn new(num_nodes: usize, num_classes: usize) -> Self {
        Self {
            num_nodes,
            num_classes,
            num_features: 16,
            p_in: 0.1,
            p_out: 0.01,
            feature_noise: 1.0,
            train_per_class: 5,
            num_val: num_nodes / 4,
            num_test: num_nodes / 2,
            seed: 0,
        }
    }

    pub fn num_features(mut self, num_features: usize) -> Self {
        self.num_features = num_features;
        self
    }

    /// 同类 / 异类连边概率
    pub fn edge_probs(mut self, p_in: f32, p_out: f32) -> Self {
        self.p_in = p_in;
        self.p_out = p_out;
        self
    }

    pub fn feature_noise(mut self, std_dev: f32) -> Self {
        self.feature_noise = std_dev;
        self
    }

    pub fn split(mut self, train_per_class: usize, num_val: usize, num_test: usize) -> Self {
        self.train_per_class = train_per_class;
        self.num_val = num_val;
        self.num_test = num_test;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn generate(&self) -> Result<GraphDataset, DataError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let n = self.num_nodes;
        let num_classes = self.num_classes.max(1);

        let labels: Vec<usize> = (0..n).map(|i| i % num_classes).collect();

        let centroids =
            Distribution::new_normal(0.0, 1.0, (num_classes, self.num_features), &mut rng);
        let noise =
            Distribution::new_normal(0.0, self.feature_noise, (n, self.num_features), &mut rng);
        let mut features = Array2::<f32>::zeros((n, self.num_features));
        for (i, &label) in labels.iter().enumerate() {
            let mut row = features.row_mut(i);
            row.assign(&centroids.row(label));
            row += &noise.row(i);
        }

        let mut edges = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let p = if labels[i] == labels[j] {
                    self.p_in
                } else {
                    self.p_out
                };
                if rng.gen_range(0.0..1.0) < p {
                    edges.push((i, j));
                    edges.push((j, i));
                }
            }
        }

        let masks = self.make_masks(&labels, &mut rng);
        let snapshot = GraphSnapshot::new(features, labels, edges, None, masks, num_classes)?;
        Ok(GraphDataset::new(
            format!("csbm_n{}_c{}_s{}", n, num_classes, self.seed),
            snapshot,
        ))
    }

    fn make_masks(&self, labels: &[usize], rng: &mut StdRng) -> Masks {
        let n = labels.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);

        let mut train = vec![false; n];
        let mut val = vec![false; n];
        let mut test = vec![false; n];
        let mut per_class = vec![0usize; self.num_classes.max(1)];

        let mut rest = Vec::with_capacity(n);
        for &i in &order {
            if per_class[labels[i]] < self.train_per_class {
                per_class[labels[i]] += 1;
                train[i] = true;
            } else {
                rest.push(i);
            }
        }
        let mut remaining = rest.into_iter();
        for i in remaining.by_ref().take(self.num_val) {
            val[i] = true;
        }
        for i in remaining.take(self.num_test) {
            test[i] = true;
        }
        Masks { train, val, test }
    }
}
