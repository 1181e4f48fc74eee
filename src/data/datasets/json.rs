//! JSON 格式的图数据集
//!
//! 文件格式：
//! ```json
//! {
//!   "name": "cora",
//!   "num_classes": 7,
//!   "features": [[0.0, 1.0, ...], ...],
//!   "labels": [3, 4, ...],
//!   "edges": [[0, 633], [633, 0], ...],
//!   "edge_weight": [1.0, 1.0, ...],
//!   "train_mask": [true, false, ...],
//!   "val_mask": [...],
//!   "test_mask": [...]
//! }
//! ```
//! `edge_weight` 与 `num_classes` 可省略（后者缺省为最大标签 + 1）。

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::Array2;
use serde::Deserialize;

use super::GraphDataset;
use crate::data::error::DataError;
use crate::data::transforms::normalize_features;
use crate::data::{GraphSnapshot, Masks};

#[derive(Debug, Deserialize)]
struct RawGraphFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    num_classes: Option<usize>,
    features: Vec<Vec<f32>>,
    labels: Vec<usize>,
    edges: Vec<(usize, usize)>,
    #[serde(default)]
    edge_weight: Option<Vec<f32>>,
    train_mask: Vec<bool>,
    val_mask: Vec<bool>,
    test_mask: Vec<bool>,
}

/// JSON 图数据集加载器
pub struct JsonGraphDataset;

impl JsonGraphDataset {
    /// 加载数据集
    ///
    /// # 参数
    /// - `path`: JSON 文件路径
    /// - `normalize`: 是否将特征按行归一化
    pub fn load<P: AsRef<Path>>(path: P, normalize: bool) -> Result<GraphDataset, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::FileNotFound(path.to_path_buf()));
        }
        let reader = BufReader::new(File::open(path)?);
        let raw: RawGraphFile = serde_json::from_reader(reader)
            .map_err(|e| DataError::FormatError(format!("{}: {e}", path.display())))?;

        let name = raw.name.clone().unwrap_or_else(|| {
            path.file_stem()
                .map_or_else(|| "graph".to_string(), |s| s.to_string_lossy().to_string())
        });
        let snapshot = Self::into_snapshot(raw, normalize)?;
        Ok(GraphDataset::new(name, snapshot))
    }

    fn into_snapshot(raw: RawGraphFile, normalize: bool) -> Result<GraphSnapshot, DataError> {
        let num_nodes = raw.features.len();
        let num_features = raw.features.first().map_or(0, Vec::len);
        if let Some(row) = raw.features.iter().find(|r| r.len() != num_features) {
            return Err(DataError::ShapeMismatch {
                expected: vec![num_features],
                got: vec![row.len()],
            });
        }
        let flat: Vec<f32> = raw.features.into_iter().flatten().collect();
        let features = Array2::from_shape_vec((num_nodes, num_features), flat)
            .map_err(|e| DataError::FormatError(e.to_string()))?;
        let features = if normalize {
            normalize_features(&features)
        } else {
            features
        };

        let num_classes = raw
            .num_classes
            .unwrap_or_else(|| raw.labels.iter().max().map_or(0, |m| m + 1));

        GraphSnapshot::new(
            features,
            raw.labels,
            raw.edges,
            raw.edge_weight,
            Masks {
                train: raw.train_mask,
                val: raw.val_mask,
                test: raw.test_mask,
            },
            num_classes,
        )
    }
}
