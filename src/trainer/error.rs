use thiserror::Error;

use crate::data::DataError;
use crate::ensemble::EnsembleError;
use crate::nn::NnError;
use crate::topology::TopologyError;

#[derive(Debug, Error)]
pub enum TrainError {
    /// 损失出现 NaN / inf
    #[error("第 {round} 轮第 {epoch} 个 epoch 的损失不是有限值")]
    NonFiniteLoss { round: usize, epoch: usize },

    #[error("{what} 形状不匹配: 期望 {expected:?}, 实际 {got:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// 要求的能力分类器没有提供（如蒸馏训练需要链接预测头）
    #[error("分类器缺少能力: {0}")]
    MissingCapability(&'static str),

    #[error("use_last_epoch 与 use_loss_epoch 不能同时开启")]
    ConflictingEpochPolicy,

    #[error("训练参数无效: {0}")]
    InvalidOptions(String),

    /// `fit()` 之前就需要 checkpoint
    #[error("还没有可用的 checkpoint，请先调用 fit()")]
    NoCheckpoint,

    #[error(transparent)]
    Nn(#[from] NnError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Ensemble(#[from] EnsembleError),
}
