//! 一次实验的全部配置
//!
//! 所有字段都有缺省值，JSON 文件中只需写出要覆盖的项。

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ensemble::EnsembleStrategy;
use crate::errors::ComparisonOperator;
use crate::nn::ClassifierKind;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("use_last_epoch 与 use_loss_epoch 不能同时开启")]
    ConflictingEpochPolicy,
    #[error("{name}须{operator}{threshold}，实际为{value}")]
    OutOfRange {
        name: &'static str,
        operator: ComparisonOperator,
        threshold: f64,
        value: f64,
    },
    #[error("配置文件读取失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("配置文件解析失败: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub classifier: ClassifierKind,
    /// 隐藏层宽度，缺省按分类器类型取 16（GCN）/ 8（GAT）
    pub hidden: Option<usize>,
    /// 独立运行次数
    pub total_run: usize,
    /// 基线之后的最大轮数
    pub total_step: usize,
    /// 学生模型每轮的 epoch 数
    pub total_epoch: usize,
    /// 基线模型的 epoch 数，缺省 GCN 200 / GAT 500
    pub base_epochs: Option<usize>,
    pub seed: u64,
    pub lambda1: f32,
    pub lambda2: f32,
    pub tau: f32,
    pub beta: f32,
    /// 拓扑增强的置信度阈值
    pub threshold: f32,
    pub cold_start_ratio: f32,
    pub use_last_epoch: bool,
    pub use_loss_epoch: bool,
    pub drop_edge: bool,
    /// 连续多少轮没有新增边后停止
    pub patience: usize,
    /// 运行结束后是否保留逐轮模型文件
    pub keep_models: bool,
    pub eval_new_adj: bool,
    pub use_metric: bool,
    pub ensemble: EnsembleStrategy,
    /// 实验目录；每次运行写入其下的 `run_<k>/`
    pub output_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierKind::Gcn,
            hidden: None,
            total_run: 1,
            total_step: 5,
            total_epoch: 300,
            base_epochs: None,
            seed: 0,
            lambda1: 1.0,
            lambda2: 10.0,
            tau: 10.0,
            beta: -3.0,
            threshold: 0.5,
            cold_start_ratio: 1.0,
            use_last_epoch: false,
            use_loss_epoch: false,
            drop_edge: false,
            patience: 100,
            keep_models: false,
            eval_new_adj: false,
            use_metric: false,
            ensemble: EnsembleStrategy::MeanLogProb,
            output_dir: PathBuf::from("experiment"),
        }
    }
}

fn check(
    name: &'static str,
    value: f64,
    operator: ComparisonOperator,
    threshold: f64,
) -> Result<(), ConfigError> {
    let ok = match operator {
        ComparisonOperator::GreaterOrEqual => value >= threshold,
        ComparisonOperator::LessOrEqual => value <= threshold,
        ComparisonOperator::GreaterThan => value > threshold,
        ComparisonOperator::LessThan => value < threshold,
    };
    if ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            operator,
            threshold,
            value,
        })
    }
}

impl RunConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn hidden(&self) -> usize {
        self.hidden.unwrap_or_else(|| self.classifier.default_hidden())
    }

    pub fn base_epochs(&self) -> usize {
        self.base_epochs
            .unwrap_or_else(|| self.classifier.default_base_epochs())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        use ComparisonOperator::*;

        if self.use_last_epoch && self.use_loss_epoch {
            return Err(ConfigError::ConflictingEpochPolicy);
        }
        check("total_run", self.total_run as f64, GreaterOrEqual, 1.0)?;
        check("total_epoch", self.total_epoch as f64, GreaterOrEqual, 1.0)?;
        check("base_epochs", self.base_epochs() as f64, GreaterOrEqual, 1.0)?;
        check("hidden", self.hidden() as f64, GreaterOrEqual, 1.0)?;
        check("patience", self.patience as f64, GreaterOrEqual, 1.0)?;
        check("lambda1", self.lambda1 as f64, GreaterOrEqual, 0.0)?;
        check("lambda2", self.lambda2 as f64, GreaterOrEqual, 0.0)?;
        check("tau", self.tau as f64, GreaterThan, 0.0)?;
        check("threshold", self.threshold as f64, GreaterOrEqual, 0.0)?;
        check("threshold", self.threshold as f64, LessOrEqual, 1.0)?;
        check("cold_start_ratio", self.cold_start_ratio as f64, GreaterThan, 0.0)?;
        check("cold_start_ratio", self.cold_start_ratio as f64, LessOrEqual, 1.0)?;
        Ok(())
    }
}
