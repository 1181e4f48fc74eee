//! 顶层错误类型，汇总各子模块的错误

use thiserror::Error;
mod ops;
pub use self::ops::*;

use crate::data::DataError;
use crate::ensemble::EnsembleError;
use crate::nn::NnError;
use crate::round_loop::ConfigError;
use crate::topology::TopologyError;
use crate::trainer::TrainError;

#[derive(Error, Debug)]
pub enum ToptimizeError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Nn(#[from] NnError),
    #[error(transparent)]
    Train(#[from] TrainError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    Ensemble(#[from] EnsembleError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("报告序列化失败: {0}")]
    Report(#[from] serde_json::Error),
}

impl ToptimizeError {
    /// 数值发散（NaN/inf 损失）导致的失败：该次运行应被标记为失败，而不是污染统计
    pub fn is_divergence(&self) -> bool {
        matches!(self, Self::Train(TrainError::NonFiniteLoss { .. }))
    }
}
