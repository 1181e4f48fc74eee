//! 拓扑增强：依据模型对节点对的置信度编辑边集
//!
//! 只读取模型输出，不读取标签；gold 邻接只在评估时使用。

use std::collections::BTreeMap;

use ndarray::Array2;

use super::TopologyError;
use crate::data::{GraphSnapshot, adjacency};
use crate::nn::LinkPredictor;

/// 增强所需的输入：当前快照与上一轮所选 epoch 的模型输出
pub struct AugmentInput<'a> {
    pub snapshot: &'a GraphSnapshot,
    /// raw 输出 [N, C]
    pub raw: &'a Array2<f32>,
    /// log_softmax 输出 [N, C]
    pub log_probs: &'a Array2<f32>,
    /// 学生模型的链接预测头（基线模型没有）
    pub link: Option<LinkPredictor>,
}

/// 增强结果
#[derive(Debug, Clone)]
pub struct Augmentation {
    /// 行优先排序的有向边表，每条无向边两条记录
    pub edge_list: Vec<(usize, usize)>,
    /// 与 `edge_list` 对齐；旧边保留原权重，新边为 1.0
    pub edge_weight: Vec<f32>,
    /// 新的加权稠密邻接（对称、无自环）；权重为 0 的边在这里也是 0，结构以 `edge_list` 为准
    pub adjacency: Array2<f32>,
    /// 本轮真正新增的无向边 `(i, j)`，`i < j`
    pub new_edges: Vec<(usize, usize)>,
    /// 本轮删除的无向边 `(i, j)`，`i < j`（只在 drop_edge 时非空）
    pub dropped_edges: Vec<(usize, usize)>,
    /// 阈值化后的候选邻接（0/1，对角为 0）
    pub candidate_adjacency: Array2<f32>,
}

impl Augmentation {
    /// 没有新增任何边
    pub fn is_stalled(&self) -> bool {
        self.new_edges.is_empty()
    }

    pub fn num_undirected_edges(&self) -> usize {
        adjacency::undirected_pairs(&self.edge_list).len()
    }
}

pub trait Augmenter {
    fn augment(&self, input: &AugmentInput<'_>, drop_edge: bool) -> Result<Augmentation, TopologyError>;
}

/// 基于置信度阈值的增强器
///
/// - 有链接预测头时，节点对置信度为 `sigmoid(tau·cos(f_i, f_j) + beta)`
/// - 否则为 softmax 概率向量的内积 `p_i · p_j`
///
/// 置信度严格大于 `threshold` 的节点对成为候选边。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceAugmenter {
    threshold: f32,
}

impl Default for ConfidenceAugmenter {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

impl ConfidenceAugmenter {
    pub fn new(threshold: f32) -> Result<Self, TopologyError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(TopologyError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// 对称化后的节点对置信度 [N, N]
    pub fn confidence(&self, input: &AugmentInput<'_>) -> Array2<f32> {
        let scores = match input.link {
            Some(link) => link.scores(input.raw),
            None => {
                let probs = input.log_probs.mapv(f32::exp);
                probs.dot(&probs.t())
            }
        };
        (&scores + &scores.t()) * 0.5
    }
}

impl Augmenter for ConfidenceAugmenter {
    fn augment(&self, input: &AugmentInput<'_>, drop_edge: bool) -> Result<Augmentation, TopologyError> {
        let n = input.snapshot.num_nodes();
        for (what, m) in [("raw", input.raw), ("log_probs", input.log_probs)] {
            if m.nrows() != n {
                return Err(TopologyError::ShapeMismatch {
                    what,
                    expected: (n, input.snapshot.num_classes()),
                    got: m.dim(),
                });
            }
        }

        let confidence = self.confidence(input);
        let mut candidate = confidence.mapv(|s| if s > self.threshold { 1.0 } else { 0.0 });
        candidate.diag_mut().fill(0.0);

        // 边是否存在只看边表，不看权重；重复记录取第一条的权重
        let mut weights: BTreeMap<(usize, usize), f32> = BTreeMap::new();
        let snapshot_weights = input.snapshot.edge_weight();
        for (k, &edge) in input.snapshot.edge_list().iter().enumerate() {
            weights
                .entry(edge)
                .or_insert_with(|| snapshot_weights.map_or(1.0, |ws| ws[k]));
        }
        let existing = adjacency::undirected_pairs(input.snapshot.edge_list());

        let mut next: BTreeMap<(usize, usize), f32> = weights
            .iter()
            .filter(|((s, d), _)| s == d)
            .map(|(&e, &w)| (e, w))
            .collect();
        let mut new_edges = Vec::new();
        let mut dropped_edges = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let exists = existing.contains(&(i, j));
                let wanted = candidate[[i, j]] != 0.0;
                if exists && (wanted || !drop_edge) {
                    // 两个方向取同一权重 max(w_ij, w_ji)，单向边沿用唯一那条的权重
                    let w = match (weights.get(&(i, j)), weights.get(&(j, i))) {
                        (Some(&a), Some(&b)) => a.max(b),
                        (Some(&w), None) | (None, Some(&w)) => w,
                        (None, None) => 1.0,
                    };
                    next.insert((i, j), w);
                    next.insert((j, i), w);
                } else if exists {
                    dropped_edges.push((i, j));
                } else if wanted {
                    next.insert((i, j), 1.0);
                    next.insert((j, i), 1.0);
                    new_edges.push((i, j));
                }
            }
        }

        let (edge_list, edge_weight): (Vec<_>, Vec<_>) = next.into_iter().unzip();
        let adjacency = adjacency::without_self_loops(&adjacency::to_dense(
            n,
            &edge_list,
            Some(&edge_weight),
        ));
        Ok(Augmentation {
            edge_list,
            edge_weight,
            adjacency,
            new_edges,
            dropped_edges,
            candidate_adjacency: candidate,
        })
    }
}
