//! 拓扑与 gold 邻接的比较（只用于离线评估）

use std::fmt;

use log::info;
use ndarray::Array2;
use serde::Serialize;

use super::TopologyError;

/// 以 gold 邻接为真值的二分类统计（逐元素，含对角线）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TopologyStats {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
    /// TP / (TP + FP)
    pub precision: f32,
    /// TN / (TN + FN)
    pub npv: f32,
    /// TP / (TP + FN)
    pub recall: f32,
    /// TN / (TN + FP)
    pub selectivity: f32,
    pub f1: f32,
}

fn ratio(num: usize, den: usize) -> f32 {
    if den == 0 { 0.0 } else { num as f32 / den as f32 }
}

/// 比较预测邻接与 gold 邻接，非零即视为"有边"
pub fn compare_topology(
    predicted: &Array2<f32>,
    gold: &Array2<f32>,
) -> Result<TopologyStats, TopologyError> {
    if predicted.dim() != gold.dim() {
        return Err(TopologyError::ShapeMismatch {
            what: "predicted adjacency",
            expected: gold.dim(),
            got: predicted.dim(),
        });
    }
    let (mut tp, mut fp, mut tn, mut fn_) = (0, 0, 0, 0);
    for (&p, &g) in predicted.iter().zip(gold.iter()) {
        match (p != 0.0, g != 0.0) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, false) => tn += 1,
            (false, true) => fn_ += 1,
        }
    }
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };
    Ok(TopologyStats {
        tp,
        fp,
        tn,
        fn_,
        precision,
        npv: ratio(tn, tn + fn_),
        recall,
        selectivity: ratio(tn, tn + fp),
        f1,
    })
}

impl TopologyStats {
    pub fn log(&self, tag: &str) {
        info!("[{tag}] {self}");
    }
}

impl fmt::Display for TopologyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TP {} FP {} TN {} FN {} | 精确率 {:.4} NPV {:.4} 召回率 {:.4} 特异度 {:.4} F1 {:.4}",
            self.tp,
            self.fp,
            self.tn,
            self.fn_,
            self.precision,
            self.npv,
            self.recall,
            self.selectivity,
            self.f1
        )
    }
}

/// 新增边精度：累计新增的无向边中连接同标签节点的比例；没有新增边时为 `None`
pub fn new_edge_precision(new_edges: &[(usize, usize)], labels: &[usize]) -> Option<f32> {
    if new_edges.is_empty() {
        return None;
    }
    let same = new_edges
        .iter()
        .filter(|&&(i, j)| labels.get(i).is_some() && labels.get(i) == labels.get(j))
        .count();
    Some(same as f32 / new_edges.len() as f32)
}
