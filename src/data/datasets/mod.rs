//! 数据集实现
//!
//! 数据集只负责提供一个带标签的图：特征、标签、边表、可选边权、三个 mask 与类别数。
//! 核心训练逻辑从不自己解析原始文件。

mod json;
mod synthetic;

pub use json::JsonGraphDataset;
pub use synthetic::SyntheticGraph;

use super::GraphSnapshot;

/// 一个已加载的图数据集
#[derive(Debug, Clone)]
pub struct GraphDataset {
    name: String,
    snapshot: GraphSnapshot,
}

impl GraphDataset {
    pub fn new(name: impl Into<String>, snapshot: GraphSnapshot) -> Self {
        Self {
            name: name.into(),
            snapshot,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 初始快照（加载时的原始拓扑）
    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    pub fn num_classes(&self) -> usize {
        self.snapshot.num_classes()
    }

    pub fn num_features(&self) -> usize {
        self.snapshot.num_features()
    }
}
