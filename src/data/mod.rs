//! 图数据模块
//!
//! 提供图快照、稠密邻接派生、数据集加载与变换功能。
//!
//! # 主要组件
//!
//! - [`GraphSnapshot`]: 一轮训练内不可变的图（特征、标签、边表、mask）
//! - [`adjacency`]: 稠密邻接矩阵的构建、归一化、对称化与边表互转
//! - [`JsonGraphDataset`]: 从 JSON 文件加载图数据集
//! - [`SyntheticGraph`]: 上下文随机块模型（CSBM）合成图
//! - [`transforms`]: 数据变换函数（特征归一化、one-hot、冷启动等）
//! - [`DataError`]: 数据加载错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use toptimize::data::SyntheticGraph;
//!
//! let dataset = SyntheticGraph::new(200, 4).num_features(32).seed(42).generate()?;
//! let snapshot = dataset.snapshot();
//! let gold = snapshot.gold_adjacency();
//! ```

pub mod adjacency;
pub mod datasets;
pub mod error;
mod snapshot;
pub mod transforms;

#[cfg(test)]
pub(crate) mod tests;

// Re-exports
pub use datasets::{GraphDataset, JsonGraphDataset, SyntheticGraph};
pub use error::DataError;
pub use snapshot::{GraphSnapshot, GraphStats, Masks, Split};
