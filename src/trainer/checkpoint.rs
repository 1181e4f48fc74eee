use ndarray::Array2;

use super::SplitAccuracy;
use crate::nn::ModelState;

/// 一次 `fit()` 中被选中的 epoch 的快照
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub epoch: usize,
    pub accuracy: SplitAccuracy,
    /// 该 epoch 的总训练损失
    pub loss: f32,
    /// eval 模式下的 raw 输出（下一轮的 teacher）
    pub final_scores: Array2<f32>,
    pub log_probs: Array2<f32>,
    pub state: ModelState,
}

impl Checkpoint {
    pub fn val_acc(&self) -> f32 {
        self.accuracy.val
    }
}
