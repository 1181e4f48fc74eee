//! 数据变换函数
//!
//! 提供常用的数据预处理操作，如特征归一化、one-hot 编码、冷启动删边等。

use std::collections::BTreeMap;

use ndarray::{Array2, ArrayView2, Axis};
use rand::Rng;
use rand::seq::SliceRandom;

/// 将类别索引转换为 one-hot 编码
///
/// # 参数
/// - `labels`: 类别索引，值为 0..num_classes
/// - `num_classes`: 类别总数
///
/// # 返回
/// one-hot 矩阵，形状 [N, num_classes]；越界的标签对应全零行
///
/// # 示例
/// ```ignore
/// let one_hot = one_hot(&[0, 2, 1], 3);
/// // 结果: [[1,0,0], [0,0,1], [0,1,0]]
/// ```
pub fn one_hot(labels: &[usize], num_classes: usize) -> Array2<f32> {
    let mut out = Array2::<f32>::zeros((labels.len(), num_classes));
    for (i, &class_idx) in labels.iter().enumerate() {
        if class_idx < num_classes {
            out[[i, class_idx]] = 1.0;
        }
    }
    out
}

/// 逐行取最大值所在的列号（并列时取最小列号）
pub fn argmax_rows(scores: ArrayView2<'_, f32>) -> Vec<usize> {
    scores
        .axis_iter(Axis(0))
        .map(|row| {
            let mut best = 0;
            for (j, &v) in row.iter().enumerate() {
                if v > row[best] {
                    best = j;
                }
            }
            best
        })
        .collect()
}

/// 特征按行归一化（行和为 1），全零行保持不变
pub fn normalize_features(features: &Array2<f32>) -> Array2<f32> {
    let mut out = features.clone();
    for mut row in out.axis_iter_mut(Axis(0)) {
        let sum: f32 = row.sum();
        if sum != 0.0 {
            row.mapv_inplace(|v| v / sum);
        }
    }
    out
}

/// 冷启动：随机保留 `ratio` 比例的无向边
///
/// 以无序节点对 `{i, j}` 为单位抽样，被保留的节点对其所有有向记录（及边权）原样保留，
/// 因此输出仍然是对称的。`ratio >= 1` 时原样返回。
pub fn cold_start<R: Rng>(
    edges: &[(usize, usize)],
    weights: Option<&[f32]>,
    ratio: f32,
    rng: &mut R,
) -> (Vec<(usize, usize)>, Option<Vec<f32>>) {
    if ratio >= 1.0 {
        return (edges.to_vec(), weights.map(<[f32]>::to_vec));
    }

    // 每个无序节点对 -> 该对的所有有向记录下标
    let mut pairs: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();
    for (k, &(src, dst)) in edges.iter().enumerate() {
        let key = (src.min(dst), src.max(dst));
        pairs.entry(key).or_default().push(k);
    }

    let mut keys: Vec<_> = pairs.keys().copied().collect();
    keys.shuffle(rng);
    let keep = ((keys.len() as f32) * ratio.max(0.0)).round() as usize;

    let mut kept_records: Vec<usize> = keys[..keep]
        .iter()
        .flat_map(|key| pairs[key].iter().copied())
        .collect();
    kept_records.sort_unstable();

    let new_edges = kept_records.iter().map(|&k| edges[k]).collect();
    let new_weights = weights.map(|ws| kept_records.iter().map(|&k| ws[k]).collect());
    (new_edges, new_weights)
}
