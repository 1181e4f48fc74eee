use std::path::PathBuf;
use thiserror::Error;

use crate::data::DataError;
use crate::nn::NnError;

#[derive(Error, Debug)]
pub enum EnsembleError {
    #[error("目录中没有可集成的模型: {0}")]
    NoModels(PathBuf),
    #[error("第 {index} 个模型输出形状不匹配：期望 {expected:?}，实际 {got:?}")]
    ShapeMismatch {
        index: usize,
        expected: (usize, usize),
        got: (usize, usize),
    },
    #[error(transparent)]
    Nn(#[from] NnError),
    #[error(transparent)]
    Data(#[from] DataError),
}
