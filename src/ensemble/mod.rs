//! 逐轮模型集成
//!
//! 一次运行目录下的 `model_<step>.bin` 各自带着保存时的边表；每个模型在自己的拓扑上
//! 用当前特征推理，再把各模型的 log 概率聚合成单一预测。

mod error;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::{debug, info};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use error::EnsembleError;

use crate::data::GraphSnapshot;
use crate::data::transforms::argmax_rows;
use crate::nn::model_io::list_round_artifacts;
use crate::nn::{Classifier, Model, RoundArtifact};
use crate::trainer::SplitAccuracy;

/// 聚合策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnsembleStrategy {
    /// 对 log 概率取均值后 argmax
    #[default]
    MeanLogProb,
    /// 各模型 argmax 后多数投票
    MajorityVote,
}

impl fmt::Display for EnsembleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MeanLogProb => write!(f, "mean_log_prob"),
            Self::MajorityVote => write!(f, "majority_vote"),
        }
    }
}

impl FromStr for EnsembleStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "mean_log_prob" | "mean" => Ok(Self::MeanLogProb),
            "majority_vote" | "vote" => Ok(Self::MajorityVote),
            other => Err(format!("未知的集成策略: {other}（可选 mean_log_prob / majority_vote）")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ensembler {
    strategy: EnsembleStrategy,
}

impl Ensembler {
    pub fn new(strategy: EnsembleStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> EnsembleStrategy {
        self.strategy
    }

    /// 把多个模型的 log 概率（各为 N×C）聚合为每个节点的预测类别
    ///
    /// 平票时取最小的类别号
    pub fn aggregate(&self, log_probs: &[Array2<f32>]) -> Result<Vec<usize>, EnsembleError> {
        let first = log_probs
            .first()
            .ok_or_else(|| EnsembleError::NoModels(Default::default()))?;
        let expected = first.dim();
        if let Some((index, lp)) = log_probs
            .iter()
            .enumerate()
            .find(|(_, lp)| lp.dim() != expected)
        {
            return Err(EnsembleError::ShapeMismatch {
                index,
                expected,
                got: lp.dim(),
            });
        }

        let (n, c) = expected;
        match self.strategy {
            EnsembleStrategy::MeanLogProb => {
                let mut sum = Array2::<f32>::zeros((n, c));
                for lp in log_probs {
                    sum += lp;
                }
                sum /= log_probs.len() as f32;
                Ok(argmax_rows(sum.view()))
            }
            EnsembleStrategy::MajorityVote => {
                let mut votes = Array2::<f32>::zeros((n, c));
                for lp in log_probs {
                    for (i, class) in argmax_rows(lp.view()).into_iter().enumerate() {
                        votes[[i, class]] += 1.0;
                    }
                }
                Ok(argmax_rows(votes.view()))
            }
        }
    }

    /// 加载 `run_dir` 下全部逐轮模型，在各自保存的拓扑上推理并聚合
    pub fn evaluate_dir(
        &self,
        run_dir: &Path,
        snapshot: &GraphSnapshot,
    ) -> Result<SplitAccuracy, EnsembleError> {
        let artifacts = list_round_artifacts(run_dir)?;
        if artifacts.is_empty() {
            return Err(EnsembleError::NoModels(run_dir.to_path_buf()));
        }

        let mut outputs = Vec::with_capacity(artifacts.len());
        for (step, path) in &artifacts {
            let artifact = RoundArtifact::load(path)?;
            let round_graph =
                snapshot.with_edges(artifact.edge_list.clone(), artifact.edge_weight.clone())?;
            let mut model = Model::from_state(&artifact.state, *step as u64)?;
            let out = model.forward(&round_graph, false)?;
            debug!(
                "集成: 载入 model_{step}（{}，{} 条有向边）",
                artifact.state.descriptor,
                artifact.edge_list.len()
            );
            outputs.push(out.log_probs);
        }

        let predictions = self.aggregate(&outputs)?;
        let accuracy = SplitAccuracy::from_predictions(&predictions, snapshot);
        info!(
            "集成 {} 个模型（{}）: train {:.4} val {:.4} test {:.4}",
            outputs.len(),
            self.strategy,
            accuracy.train,
            accuracy.val,
            accuracy.test
        );
        Ok(accuracy)
    }
}

#[cfg(test)]
mod tests;
