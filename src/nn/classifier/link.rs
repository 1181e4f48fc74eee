use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::nn::functional::{row_norms, sigmoid};

/// 余弦相似度计算时的范数下限
pub(crate) const NORM_EPS: f32 = 1e-8;

/// 链接预测头：`s_ij = sigmoid(tau * cos(f_i, f_j) + beta)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkPredictor {
    pub tau: f32,
    pub beta: f32,
}

impl Default for LinkPredictor {
    fn default() -> Self {
        Self {
            tau: 10.0,
            beta: -3.0,
        }
    }
}

/// `cos(f_i, f_j)` 的中间量，反向传播时复用
pub(crate) struct Cosine {
    pub similarity: Array2<f32>,
    pub unit: Array2<f32>,
    pub norms: Array1<f32>,
}

impl Cosine {
    pub fn new(raw: &Array2<f32>) -> Self {
        let norms = row_norms(raw, NORM_EPS);
        let mut unit = raw.clone();
        for (mut row, &n) in unit.rows_mut().into_iter().zip(norms.iter()) {
            row.mapv_inplace(|v| v / n);
        }
        let similarity = unit.dot(&unit.t());
        Self {
            similarity,
            unit,
            norms,
        }
    }
}

impl LinkPredictor {
    pub fn new(tau: f32, beta: f32) -> Self {
        Self { tau, beta }
    }

    /// sigmoid 之前的打分 `tau * cos + beta`
    pub fn logits(&self, raw: &Array2<f32>) -> Array2<f32> {
        Cosine::new(raw)
            .similarity
            .mapv(|c| self.tau * c + self.beta)
    }

    /// 全部节点对的链接概率 [N, N]
    pub fn scores(&self, raw: &Array2<f32>) -> Array2<f32> {
        self.logits(raw).mapv(sigmoid)
    }
}
