//! 神经网络模块的错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NnError {
    #[error("形状不匹配: 期望 {expected:?}, 实际 {got:?}. {message}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },

    /// 前向缓存缺失（未前向就调用 backward）
    #[error("{0} 在 backward 之前没有执行 forward")]
    MissingForward(&'static str),

    #[error("参数缺失: {0}")]
    MissingParameter(String),

    #[error("模型架构不匹配: 期望 {expected}, 实际 {got}")]
    ArchitectureMismatch { expected: String, got: String },

    /// 模型文件魔数不对
    #[error("无效的模型文件: {0}")]
    InvalidModelFile(String),

    #[error("不支持的模型文件版本: {0}")]
    UnsupportedVersion(u32),

    #[error("序列化失败: {0}")]
    Serialization(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl NnError {
    pub(crate) fn shape(expected: &[usize], got: &[usize], message: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
            message: message.into(),
        }
    }
}

impl From<bincode::Error> for NnError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
