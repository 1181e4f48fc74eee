//! 稠密邻接矩阵的派生与转换
//!
//! `edge_list` 始终是图结构的唯一真源，这里的稠密矩阵都是临时视图。
//! 边是否存在只由边表决定（[`structure`]、[`undirected_pairs`]），与边权无关；
//! 比较拓扑前用 [`with_self_loops`] 显式加自环。

use std::collections::BTreeSet;

use approx::abs_diff_eq;
use ndarray::{Array1, Array2, Axis};

/// 由边表构建 N×N 加权邻接矩阵。重复边的权重相加；`weights` 为 `None` 时每条边权重为 1
pub fn to_dense(num_nodes: usize, edges: &[(usize, usize)], weights: Option<&[f32]>) -> Array2<f32> {
    let mut adj = Array2::<f32>::zeros((num_nodes, num_nodes));
    for (k, &(src, dst)) in edges.iter().enumerate() {
        let w = weights.map_or(1.0, |ws| ws[k]);
        adj[[src, dst]] += w;
    }
    adj
}

/// 边表描述的结构（0/1）邻接，与边权无关：权重为 0 的边同样记为存在
pub fn structure(num_nodes: usize, edges: &[(usize, usize)]) -> Array2<f32> {
    let mut adj = Array2::<f32>::zeros((num_nodes, num_nodes));
    for &(src, dst) in edges {
        adj[[src, dst]] = 1.0;
    }
    adj
}

/// 边表中出现过的无向节点对 `(i, j)`，`i < j`，不含自环
pub fn undirected_pairs(edges: &[(usize, usize)]) -> BTreeSet<(usize, usize)> {
    edges
        .iter()
        .filter(|(s, d)| s != d)
        .map(|&(s, d)| (s.min(d), s.max(d)))
        .collect()
}

/// 返回对角线全部置 1 的副本
pub fn with_self_loops(adj: &Array2<f32>) -> Array2<f32> {
    let mut out = adj.clone();
    out.diag_mut().fill(1.0);
    out
}

/// 返回对角线全部清零的副本
pub fn without_self_loops(adj: &Array2<f32>) -> Array2<f32> {
    let mut out = adj.clone();
    out.diag_mut().fill(0.0);
    out
}

pub fn is_symmetric(adj: &Array2<f32>) -> bool {
    if adj.nrows() != adj.ncols() {
        return false;
    }
    adj.indexed_iter()
        .all(|((i, j), &w)| abs_diff_eq!(w, adj[[j, i]], epsilon = 1e-6))
}

/// GCN 对称归一化：`D^-1/2 (A + I) D^-1/2`，度按加权行和计算
pub fn gcn_normalize(adj: &Array2<f32>) -> Array2<f32> {
    let a_hat = with_self_loops(adj);
    let deg: Array1<f32> = a_hat.sum_axis(Axis(1));
    let deg_inv_sqrt = deg.mapv(|d| if d > 0.0 { d.powf(-0.5) } else { 0.0 });

    let mut out = a_hat;
    for ((i, j), v) in out.indexed_iter_mut() {
        *v *= deg_inv_sqrt[i] * deg_inv_sqrt[j];
    }
    out
}

/// 类别共属矩阵 `Y Yᵀ`：同一类别的节点对为 1（含对角线）
pub fn co_membership(one_hot: &Array2<f32>) -> Array2<f32> {
    one_hot.dot(&one_hot.t())
}
