//! 图快照（GraphSnapshot）：一轮训练内不可变的节点特征、标签、边表与划分
//!
//! 每轮结束时由拓扑增强产生新的边表，通过 `with_edges()` 得到一个新快照，
//! 旧快照不会被原地修改。节点侧的数据（特征、标签、mask）在快照之间通过 Rc 共享。

use std::cell::OnceCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use ndarray::Array2;

use super::adjacency;
use super::error::DataError;
use super::transforms::one_hot;

/// 训练 / 验证 / 测试划分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];
}

/// 三个节点 mask，运行期间固定（可以互相重叠）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Masks {
    pub train: Vec<bool>,
    pub val: Vec<bool>,
    pub test: Vec<bool>,
}

impl Masks {
    pub fn get(&self, split: Split) -> &[bool] {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }

    pub fn count(&self, split: Split) -> usize {
        self.get(split).iter().filter(|&&m| m).count()
    }
}

#[derive(Debug)]
struct NodeData {
    features: Array2<f32>,
    labels: Vec<usize>,
    masks: Masks,
    num_classes: usize,
}

/// 图快照
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    nodes: Rc<NodeData>,
    edge_list: Vec<(usize, usize)>,
    edge_weight: Option<Vec<f32>>,
    // 派生视图，首次访问时计算
    dense: OnceCell<Array2<f32>>,
    gcn_norm: OnceCell<Array2<f32>>,
    attention_mask: OnceCell<Array2<f32>>,
}

impl GraphSnapshot {
    /// 创建快照并校验所有不变量
    pub fn new(
        features: Array2<f32>,
        labels: Vec<usize>,
        edge_list: Vec<(usize, usize)>,
        edge_weight: Option<Vec<f32>>,
        masks: Masks,
        num_classes: usize,
    ) -> Result<Self, DataError> {
        let num_nodes = features.nrows();
        check_len("labels", num_nodes, labels.len())?;
        check_len("train_mask", num_nodes, masks.train.len())?;
        check_len("val_mask", num_nodes, masks.val.len())?;
        check_len("test_mask", num_nodes, masks.test.len())?;
        if let Some((node, &label)) = labels.iter().enumerate().find(|(_, l)| **l >= num_classes) {
            return Err(DataError::LabelOutOfBounds {
                node,
                label,
                num_classes,
            });
        }

        let nodes = Rc::new(NodeData {
            features,
            labels,
            masks,
            num_classes,
        });
        Self::from_parts(nodes, edge_list, edge_weight)
    }

    /// 用新的边表替换得到新快照（节点数据共享）
    pub fn with_edges(
        &self,
        edge_list: Vec<(usize, usize)>,
        edge_weight: Option<Vec<f32>>,
    ) -> Result<Self, DataError> {
        Self::from_parts(Rc::clone(&self.nodes), edge_list, edge_weight)
    }

    fn from_parts(
        nodes: Rc<NodeData>,
        edge_list: Vec<(usize, usize)>,
        edge_weight: Option<Vec<f32>>,
    ) -> Result<Self, DataError> {
        let num_nodes = nodes.features.nrows();
        if let Some(&(src, dst)) = edge_list
            .iter()
            .find(|(s, d)| *s >= num_nodes || *d >= num_nodes)
        {
            return Err(DataError::EdgeOutOfBounds {
                src,
                dst,
                num_nodes,
            });
        }
        if let Some(w) = &edge_weight {
            check_len("edge_weight", edge_list.len(), w.len())?;
        }
        Ok(Self {
            nodes,
            edge_list,
            edge_weight,
            dense: OnceCell::new(),
            gcn_norm: OnceCell::new(),
            attention_mask: OnceCell::new(),
        })
    }

    pub fn features(&self) -> &Array2<f32> {
        &self.nodes.features
    }

    pub fn labels(&self) -> &[usize] {
        &self.nodes.labels
    }

    pub fn masks(&self) -> &Masks {
        &self.nodes.masks
    }

    pub fn edge_list(&self) -> &[(usize, usize)] {
        &self.edge_list
    }

    pub fn edge_weight(&self) -> Option<&[f32]> {
        self.edge_weight.as_deref()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.features.nrows()
    }

    pub fn num_features(&self) -> usize {
        self.nodes.features.ncols()
    }

    pub fn num_classes(&self) -> usize {
        self.nodes.num_classes
    }

    /// 有向边记录数（无向边通常计两次）
    pub fn num_edges(&self) -> usize {
        self.edge_list.len()
    }

    pub fn num_undirected_edges(&self) -> usize {
        adjacency::undirected_pairs(&self.edge_list).len()
    }

    pub fn edge_set(&self) -> HashSet<(usize, usize)> {
        self.edge_list.iter().copied().collect()
    }

    /// 加权稠密邻接（对角线清零）
    pub fn dense_adjacency(&self) -> &Array2<f32> {
        self.dense.get_or_init(|| {
            let adj = adjacency::to_dense(self.num_nodes(), &self.edge_list, self.edge_weight());
            adjacency::without_self_loops(&adj)
        })
    }

    /// GCN 传播矩阵 `D^-1/2 (Aᵀ + I) D^-1/2`。
    /// 按目标节点聚合：第 i 行汇总所有指向 i 的边（src -> i），度为入度
    pub fn gcn_adjacency(&self) -> &Array2<f32> {
        self.gcn_norm.get_or_init(|| {
            let incoming = self.dense_adjacency().t().to_owned();
            adjacency::gcn_normalize(&incoming)
        })
    }

    /// GAT 邻域掩码：第 i 行为 1 的位置是节点 i 的入邻居（含自身）
    pub fn attention_mask(&self) -> &Array2<f32> {
        self.attention_mask.get_or_init(|| {
            let mut mask = adjacency::structure(self.num_nodes(), &self.edge_list)
                .t()
                .to_owned();
            mask.diag_mut().fill(1.0);
            mask
        })
    }

    pub fn one_hot_labels(&self) -> Array2<f32> {
        one_hot(self.labels(), self.num_classes())
    }

    /// gold 邻接：同标签节点对为 1。只用于离线评估
    pub fn gold_adjacency(&self) -> Array2<f32> {
        adjacency::co_membership(&self.one_hot_labels())
    }

    /// 数据集统计
    pub fn stats(&self) -> GraphStats {
        let adj = self.dense_adjacency();
        let num_nodes = self.num_nodes();
        let train_nodes = self.masks().count(Split::Train);
        let has_isolated_nodes = (0..num_nodes).any(|i| {
            adj.row(i).iter().all(|&w| w == 0.0) && adj.column(i).iter().all(|&w| w == 0.0)
        });
        GraphStats {
            num_nodes,
            num_edges: self.num_edges(),
            num_features: self.num_features(),
            num_classes: self.num_classes(),
            average_degree: if num_nodes == 0 {
                0.0
            } else {
                self.num_edges() as f32 / num_nodes as f32
            },
            train_nodes,
            label_rate: if num_nodes == 0 {
                0.0
            } else {
                train_nodes as f32 / num_nodes as f32
            },
            has_isolated_nodes,
            has_self_loops: self.edge_list.iter().any(|(s, d)| s == d),
            is_undirected: adjacency::is_symmetric(adj),
        }
    }
}

fn check_len(what: &'static str, expected: usize, got: usize) -> Result<(), DataError> {
    if expected == got {
        Ok(())
    } else {
        Err(DataError::LengthMismatch {
            what,
            expected,
            got,
        })
    }
}

/// 图统计信息
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStats {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub num_features: usize,
    pub num_classes: usize,
    pub average_degree: f32,
    pub train_nodes: usize,
    pub label_rate: f32,
    pub has_isolated_nodes: bool,
    pub has_self_loops: bool,
    pub is_undirected: bool,
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "节点数: {}", self.num_nodes)?;
        writeln!(f, "边数: {}", self.num_edges)?;
        writeln!(f, "特征维度: {}", self.num_features)?;
        writeln!(f, "类别数: {}", self.num_classes)?;
        writeln!(f, "平均度: {:.2}", self.average_degree)?;
        writeln!(f, "训练节点数: {}", self.train_nodes)?;
        writeln!(f, "训练标签率: {:.2}", self.label_rate)?;
        writeln!(f, "含孤立节点: {}", self.has_isolated_nodes)?;
        writeln!(f, "含自环: {}", self.has_self_loops)?;
        write!(f, "无向图: {}", self.is_undirected)
    }
}
