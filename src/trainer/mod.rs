//! 单个分类器在一个图快照上的训练器
//!
//! 一个 Trainer 只服务一轮：持有分类器、快照和优化器，`fit()` 之后保存所选 epoch 的
//! checkpoint，RoundLoop 从中读取下一轮的 teacher 信号。

mod checkpoint;
mod error;
pub mod metrics;
mod options;

use std::path::Path;

use log::{debug, info};
use ndarray::Array2;

pub use checkpoint::Checkpoint;
pub use error::TrainError;
pub use metrics::{SplitAccuracy, accuracy};
pub use options::{EpochSelection, FitOptions};

use crate::data::GraphSnapshot;
use crate::data::adjacency::co_membership;
use crate::data::transforms::{argmax_rows, one_hot};
use crate::ensemble::{EnsembleStrategy, Ensembler};
use crate::nn::criterion::{link_loss, mse_loss, nll_loss};
use crate::nn::{Adam, Classifier, ForwardOutput, Optimizer, RoundArtifact};
use crate::topology::{
    AugmentInput, Augmentation, Augmenter, TopologyStats, compare_topology,
};

pub struct Trainer<C: Classifier> {
    model: C,
    snapshot: GraphSnapshot,
    optimizer: Box<dyn Optimizer>,
    checkpoint: Option<Checkpoint>,
    last_topology: Option<TopologyStats>,
}

/// 由 argmax 预测得到的 0/1 同类关系矩阵
fn predicted_co_membership(scores: &Array2<f32>) -> Array2<f32> {
    let predictions = argmax_rows(scores.view());
    co_membership(&one_hot(&predictions, scores.ncols()))
}

impl<C: Classifier> Trainer<C> {
    /// 使用分类器默认学习率的 Adam
    pub fn new(model: C, snapshot: GraphSnapshot) -> Self {
        let optimizer = Box::new(Adam::new(model.describe().learning_rate));
        Self {
            model,
            snapshot,
            optimizer,
            checkpoint: None,
            last_topology: None,
        }
    }

    pub fn with_optimizer(mut self, optimizer: Box<dyn Optimizer>) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn model(&self) -> &C {
        &self.model
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    pub fn checkpoint(&self) -> Option<&Checkpoint> {
        self.checkpoint.as_ref()
    }

    /// 最近一次 `fit()` 的预测同类关系与 gold 的比较结果
    pub fn last_topology_stats(&self) -> Option<&TopologyStats> {
        self.last_topology.as_ref()
    }

    /// 训练 `max_epochs` 个 epoch，返回所选 epoch 的三项精度，并把模型权重恢复为该 epoch 的权重
    pub fn fit(&mut self, opts: &FitOptions<'_>) -> Result<SplitAccuracy, TrainError> {
        if opts.max_epochs == 0 {
            return Err(TrainError::InvalidOptions("max_epochs 须 > 0".to_string()));
        }
        let selection = opts.selection()?;
        let expected = (self.snapshot.num_nodes(), self.snapshot.num_classes());
        for (what, signal) in [("teacher", opts.teacher), ("best_final", opts.best_final)] {
            if let Some(signal) = signal {
                if signal.dim() != expected {
                    return Err(TrainError::ShapeMismatch {
                        what,
                        expected,
                        got: signal.dim(),
                    });
                }
            }
        }
        let link = if opts.link_prediction {
            Some(
                self.model
                    .link_predictor()
                    .ok_or(TrainError::MissingCapability("link_predictor"))?,
            )
        } else {
            None
        };
        // 链接预测目标在整个 fit 内固定；没有外部信号时每个 epoch 由当前输出重新计算
        let fixed_link_target = opts.best_final.or(opts.teacher).map(predicted_co_membership);

        self.checkpoint = None;
        let snapshot = &self.snapshot;
        let train_mask = &snapshot.masks().train;

        for epoch in 0..opts.max_epochs {
            self.model.zero_grad();
            let out = self.model.forward(snapshot, true)?;

            let task = nll_loss(&out.log_probs, snapshot.labels(), train_mask)?;
            let mut loss = task.value;
            let mut grad = task.grad;

            if let Some(teacher) = opts.teacher {
                let distill = mse_loss(&out.raw, teacher)?;
                loss += opts.lambda1 * distill.value;
                grad.scaled_add(opts.lambda1, &distill.grad);
            }
            if let Some(link) = &link {
                let own_target;
                let target = match &fixed_link_target {
                    Some(t) => t,
                    None => {
                        own_target = predicted_co_membership(&out.raw);
                        &own_target
                    }
                };
                let link_term = link_loss(&out.raw, target, link)?;
                loss += opts.lambda2 * link_term.value;
                grad.scaled_add(opts.lambda2, &link_term.grad);
            }

            if !loss.is_finite() {
                return Err(TrainError::NonFiniteLoss {
                    round: opts.round,
                    epoch,
                });
            }

            self.model.backward(snapshot, &grad)?;
            self.optimizer.step(self.model.param_groups_mut());

            let eval = self.model.forward(snapshot, false)?;
            let accuracy = SplitAccuracy::from_log_probs(&eval.log_probs, snapshot);
            debug!(
                "round {} epoch {:>4} loss {:.4} train {:.4} val {:.4} test {:.4}",
                opts.round, epoch, loss, accuracy.train, accuracy.val, accuracy.test
            );

            let replace = match (&self.checkpoint, selection) {
                (None, _) | (_, EpochSelection::LastEpoch) => true,
                (Some(best), EpochSelection::BestValidation) => accuracy.val > best.val_acc(),
                (Some(best), EpochSelection::LowestLoss) => loss < best.loss,
            };
            if replace {
                self.checkpoint = Some(Checkpoint {
                    epoch,
                    accuracy,
                    loss,
                    final_scores: eval.raw,
                    log_probs: eval.log_probs,
                    state: self.model.state(),
                });
            }
        }

        let best = self.checkpoint.as_ref().ok_or(TrainError::NoCheckpoint)?;
        self.model.load_state(&best.state)?;
        info!(
            "round {} 选中 epoch {} ({:?}): train {:.4} val {:.4} test {:.4}",
            opts.round,
            best.epoch,
            selection,
            best.accuracy.train,
            best.accuracy.val,
            best.accuracy.test
        );

        if let Some(gold) = opts.gold_adjacency {
            let stats = compare_topology(&predicted_co_membership(&best.log_probs), gold)?;
            stats.log(&format!("round {} 预测同类关系 vs gold", opts.round));
            self.last_topology = Some(stats);
        }
        Ok(best.accuracy)
    }

    /// eval 模式推理（无 dropout）
    pub fn infer(&mut self) -> Result<ForwardOutput, TrainError> {
        Ok(self.model.forward(&self.snapshot, false)?)
    }

    /// 用所选 epoch 的输出增强拓扑
    pub fn augment_topology(
        &mut self,
        augmenter: &dyn Augmenter,
        drop_edge: bool,
    ) -> Result<Augmentation, TrainError> {
        let out = self.infer()?;
        let input = AugmentInput {
            snapshot: &self.snapshot,
            raw: &out.raw,
            log_probs: &out.log_probs,
            link: self.model.link_predictor(),
        };
        let augmentation = augmenter.augment(&input, drop_edge)?;
        info!(
            "拓扑增强: 新增 {} 条边, 删除 {} 条边, 共 {} 条无向边",
            augmentation.new_edges.len(),
            augmentation.dropped_edges.len(),
            augmentation.num_undirected_edges()
        );
        Ok(augmentation)
    }

    /// 对运行目录中保存的所有逐轮模型做集成评估
    pub fn ensemble(
        &self,
        run_dir: &Path,
        strategy: EnsembleStrategy,
    ) -> Result<SplitAccuracy, TrainError> {
        Ok(Ensembler::new(strategy).evaluate_dir(run_dir, &self.snapshot)?)
    }

    /// 把当前模型参数与给定拓扑一起写入模型文件
    ///
    /// 拓扑单独传入：增强之后保存时，文件里记录的是下一轮要用的边表
    pub fn save_model(
        &self,
        path: &Path,
        step: usize,
        edge_list: &[(usize, usize)],
        edge_weight: Option<&[f32]>,
    ) -> Result<(), TrainError> {
        RoundArtifact {
            step,
            state: self.model.state(),
            edge_list: edge_list.to_vec(),
            edge_weight: edge_weight.map(<[f32]>::to_vec),
        }
        .save(path)?;
        debug!("模型已保存: {}", path.display());
        Ok(())
    }
}
