//! 数据加载错误类型定义

use std::path::PathBuf;
use thiserror::Error;

/// 数据集与图快照相关错误
#[derive(Debug, Error)]
pub enum DataError {
    /// 文件未找到
    #[error("文件未找到: {0}")]
    FileNotFound(PathBuf),

    /// IO 错误
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 格式错误（如 JSON 字段缺失）
    #[error("格式错误: {0}")]
    FormatError(String),

    /// 边的端点越界
    #[error("边 ({src}, {dst}) 越界: 节点数为 {num_nodes}")]
    EdgeOutOfBounds {
        src: usize,
        dst: usize,
        num_nodes: usize,
    },

    /// 标签越界
    #[error("节点 {node} 的标签 {label} 越界: 类别数为 {num_classes}")]
    LabelOutOfBounds {
        node: usize,
        label: usize,
        num_classes: usize,
    },

    /// 长度不匹配（标签、mask、边权等与节点/边数量不一致）
    #[error("{what} 长度不匹配: 期望 {expected}, 实际 {got}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// 形状不匹配
    #[error("形状不匹配: 期望 {expected:?}, 实际 {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
}
