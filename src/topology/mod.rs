//! 拓扑增强与拓扑评估
//!
//! - [`Augmenter`] / [`ConfidenceAugmenter`]: 依据模型置信度增删边，结果始终对称
//! - [`compare_topology`]: 预测邻接与 gold 邻接的 TP/FP/TN/FN 统计
//! - [`new_edge_precision`]: 累计新增边中同标签边的比例

mod augmenter;
mod compare;
mod error;

pub use augmenter::{AugmentInput, Augmentation, Augmenter, ConfidenceAugmenter};
pub use compare::{TopologyStats, compare_topology, new_edge_precision};
pub use error::TopologyError;
