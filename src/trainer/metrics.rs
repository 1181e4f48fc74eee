//! 节点分类精度

use log::warn;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::data::transforms::argmax_rows;
use crate::data::{GraphSnapshot, Split};

/// 三个划分上的精度
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SplitAccuracy {
    pub train: f32,
    pub val: f32,
    pub test: f32,
}

impl SplitAccuracy {
    pub fn from_predictions(predictions: &[usize], snapshot: &GraphSnapshot) -> Self {
        let masks = snapshot.masks();
        let labels = snapshot.labels();
        Self {
            train: accuracy(predictions, labels, masks.get(Split::Train)),
            val: accuracy(predictions, labels, masks.get(Split::Val)),
            test: accuracy(predictions, labels, masks.get(Split::Test)),
        }
    }

    pub fn from_log_probs(log_probs: &Array2<f32>, snapshot: &GraphSnapshot) -> Self {
        Self::from_predictions(&argmax_rows(log_probs.view()), snapshot)
    }

    pub fn get(&self, split: Split) -> f32 {
        match split {
            Split::Train => self.train,
            Split::Val => self.val,
            Split::Test => self.test,
        }
    }
}

/// mask 内预测正确的比例；mask 为空时返回 0.0 并记录 warning
pub fn accuracy(predictions: &[usize], labels: &[usize], mask: &[bool]) -> f32 {
    let mut total = 0usize;
    let mut correct = 0usize;
    for ((&p, &l), &m) in predictions.iter().zip(labels).zip(mask) {
        if m {
            total += 1;
            if p == l {
                correct += 1;
            }
        }
    }
    if total == 0 {
        warn!("mask 为空，精度记为 0");
        return 0.0;
    }
    correct as f32 / total as f32
}
