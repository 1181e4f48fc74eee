//! 多轮拓扑优化的主循环
//!
//! 状态: BaseTraining → {TeacherSelect → StudentTraining → Augment → Ensemble → StopCheck}*
//!
//! 每轮都新建分类器与 Trainer（不热启动），上一轮只通过 teacher 信号与增强后的拓扑影响下一轮。

mod config;
mod history;
pub mod report;

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub use config::{ConfigError, RunConfig};
pub use history::{ExperimentSummary, MeanStd, RoundHistory, RoundRecord, RunOutcome};

use crate::data::adjacency::{structure, with_self_loops};
use crate::data::transforms::cold_start;
use crate::data::{GraphDataset, GraphSnapshot};
use crate::errors::ToptimizeError;
use crate::nn::model_io::model_file_name;
use crate::nn::{Classifier, ClassifierConfig, LinkPredictor, Model};
use crate::topology::{Augmenter, ConfidenceAugmenter, compare_topology, new_edge_precision};
use crate::trainer::{Checkpoint, FitOptions, TrainError, Trainer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    BaseTraining,
    TeacherSelect,
    StudentTraining,
    Augment,
    Ensemble,
    StopCheck,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::BaseTraining => "base training",
            Phase::TeacherSelect => "teacher select",
            Phase::StudentTraining => "student training",
            Phase::Augment => "augment",
            Phase::Ensemble => "ensemble",
            Phase::StopCheck => "stop check",
        };
        write!(f, "{name}")
    }
}

/// 每个阶段开始前发给观察者的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseEvent {
    pub run: usize,
    pub round: usize,
    pub phase: Phase,
}

type Observer<'a> = Box<dyn FnMut(&PhaseEvent) + 'a>;

pub struct RoundLoop<'a> {
    config: RunConfig,
    augmenter: Box<dyn Augmenter + 'a>,
    observer: Option<Observer<'a>>,
}

/// 由运行种子与轮次派生分类器种子
fn round_seed(run_seed: u64, round: usize) -> u64 {
    run_seed.wrapping_mul(1_000_003).wrapping_add(round as u64)
}

impl<'a> RoundLoop<'a> {
    pub fn new(config: RunConfig) -> Result<Self, ToptimizeError> {
        config.validate()?;
        let augmenter = Box::new(ConfidenceAugmenter::new(config.threshold)?);
        Ok(Self {
            config,
            augmenter,
            observer: None,
        })
    }

    pub fn with_augmenter(mut self, augmenter: Box<dyn Augmenter + 'a>) -> Self {
        self.augmenter = augmenter;
        self
    }

    pub fn with_observer(mut self, observer: impl FnMut(&PhaseEvent) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn run_dir(&self, run: usize) -> PathBuf {
        self.config.output_dir.join(format!("run_{run}"))
    }

    fn notify(&mut self, run: usize, round: usize, phase: Phase) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&PhaseEvent { run, round, phase });
        }
    }

    fn classifier_config(
        &self,
        snapshot: &GraphSnapshot,
        seed: u64,
        link: Option<LinkPredictor>,
    ) -> ClassifierConfig {
        ClassifierConfig::new(
            self.config.classifier,
            snapshot.num_features(),
            snapshot.num_classes(),
        )
        .hidden(self.config.hidden())
        .seed(seed)
        .link(link)
    }

    /// 全部独立运行；发散的运行记为失败，不进入统计
    pub fn run_all(&mut self, dataset: &GraphDataset) -> Result<ExperimentSummary, ToptimizeError> {
        report::reset_dir(&self.config.output_dir)?;
        info!(
            "实验 {}: 数据集 {}，分类器 {}，{} 次运行",
            self.config.output_dir.display(),
            dataset.name(),
            self.config.classifier,
            self.config.total_run
        );

        let mut outcomes = Vec::new();
        let mut failed_runs = Vec::new();
        for run in 0..self.config.total_run {
            match self.run_once(run, dataset) {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) if e.is_divergence() => {
                    warn!("run {run} 失败: {e}");
                    let run_dir = self.run_dir(run);
                    if !self.config.keep_models && run_dir.exists() {
                        report::remove_models(&run_dir)?;
                    }
                    failed_runs.push(run);
                }
                Err(e) => return Err(e),
            }
        }

        let summary = ExperimentSummary::new(outcomes, failed_runs);
        info!("\n{summary}");
        report::write_run_perf(&self.config.output_dir, &summary)?;
        Ok(summary)
    }

    /// 一次独立运行：基线 + 至多 `total_step` 轮学生训练
    pub fn run_once(&mut self, run: usize, dataset: &GraphDataset) -> Result<RunOutcome, ToptimizeError> {
        let run_dir = self.run_dir(run);
        std::fs::create_dir_all(&run_dir)?;
        let run_seed = self.config.seed.wrapping_add(run as u64);
        info!("========== run {run} (seed {run_seed}) ==========");

        let initial = dataset.snapshot();
        let (edges, weights) = cold_start(
            initial.edge_list(),
            initial.edge_weight(),
            self.config.cold_start_ratio,
            &mut StdRng::seed_from_u64(run_seed),
        );
        let mut snapshot = initial.with_edges(edges, weights)?;
        info!("数据集 {} 统计:\n{}", dataset.name(), snapshot.stats());
        let gold = snapshot.gold_adjacency();

        let mut history = RoundHistory::new();

        // 基线
        self.notify(run, 0, Phase::BaseTraining);
        let base_model = Model::build(&self.classifier_config(&snapshot, round_seed(run_seed, 0), None));
        info!("round 0 分类器: {}", base_model.describe());
        let mut trainer = Trainer::new(base_model, snapshot.clone());
        let base = trainer.fit(
            &FitOptions::new(0, self.config.base_epochs())
                .epoch_flags(false, false),
        )?;
        trainer.save_model(
            &run_dir.join(model_file_name(0)),
            0,
            snapshot.edge_list(),
            snapshot.edge_weight(),
        )?;
        history.push(RoundRecord {
            round: 0,
            teacher_signal: false,
            new_edges: 0,
            edge_count: snapshot.num_undirected_edges(),
            accuracy: base,
            ensembled: None,
        });
        let mut teacher = best_scores(trainer.checkpoint())?;

        let link = LinkPredictor::new(self.config.tau, self.config.beta);
        let mut all_new_edges = Vec::new();
        let mut bad_counter = 0;
        let mut ensembled = base;
        let mut non_ensembled = base;

        for round in 1..=self.config.total_step {
            self.notify(run, round, Phase::TeacherSelect);
            // teacher 与 best_final 都取上一轮所选 epoch 的 raw 输出
            debug!("round {round} teacher 形状 {:?}", teacher.dim());

            self.notify(run, round, Phase::StudentTraining);
            let model = Model::build(&self.classifier_config(
                &snapshot,
                round_seed(run_seed, round),
                Some(link),
            ));
            let mut student = Trainer::new(model, snapshot.clone());
            non_ensembled = student.fit(
                &FitOptions::new(round, self.config.total_epoch)
                    .teacher(&teacher, self.config.lambda1)
                    .link_prediction(self.config.lambda2)
                    .best_final(&teacher)
                    .gold_adjacency(&gold)
                    .epoch_flags(self.config.use_last_epoch, self.config.use_loss_epoch),
            )?;
            info!(
                "run {run} round {round} 未集成: train {:.4} val {:.4} test {:.4}",
                non_ensembled.train, non_ensembled.val, non_ensembled.test
            );

            self.notify(run, round, Phase::Augment);
            let augmentation = student.augment_topology(self.augmenter.as_ref(), self.config.drop_edge)?;
            if self.config.eval_new_adj {
                let predicted = structure(snapshot.num_nodes(), &augmentation.edge_list);
                let stats = compare_topology(&with_self_loops(&predicted), &gold)?;
                stats.log(&format!("round {round} 增强邻接 vs gold"));
            }
            all_new_edges.extend_from_slice(&augmentation.new_edges);
            snapshot = snapshot.with_edges(
                augmentation.edge_list.clone(),
                Some(augmentation.edge_weight.clone()),
            )?;
            // 保存的是下一轮要用的拓扑
            student.save_model(
                &run_dir.join(model_file_name(round)),
                round,
                snapshot.edge_list(),
                snapshot.edge_weight(),
            )?;

            self.notify(run, round, Phase::Ensemble);
            ensembled = student.ensemble(&run_dir, self.config.ensemble)?;
            info!(
                "run {run} round {round} 集成: train {:.4} val {:.4} test {:.4}",
                ensembled.train, ensembled.val, ensembled.test
            );

            history.push(RoundRecord {
                round,
                teacher_signal: true,
                new_edges: augmentation.new_edges.len(),
                edge_count: augmentation.num_undirected_edges(),
                accuracy: non_ensembled,
                ensembled: Some(ensembled),
            });
            teacher = best_scores(student.checkpoint())?;

            self.notify(run, round, Phase::StopCheck);
            if augmentation.is_stalled() {
                bad_counter += 1;
                info!("round {round} 没有新增边，bad_counter = {bad_counter}");
            } else {
                bad_counter = 0;
            }
            if bad_counter == self.config.patience {
                info!("连续 {bad_counter} 轮没有新增边，停止");
                break;
            }
        }

        report::write_step_perf(&run_dir, &history)?;

        let new_edge_precision = if self.config.use_metric {
            let precision = new_edge_precision(&all_new_edges, snapshot.labels());
            match precision {
                Some(p) => info!("run {run} 累计新增 {} 条边，同类比例 {p:.4}", all_new_edges.len()),
                None => info!("run {run} 没有新增边"),
            }
            precision
        } else {
            None
        };

        if !self.config.keep_models {
            let removed = report::remove_models(&run_dir)?;
            info!("删除 {removed} 个模型文件");
        }

        Ok(RunOutcome {
            run,
            base,
            ensembled,
            non_ensembled,
            new_edge_precision,
            history,
        })
    }
}

fn best_scores(checkpoint: Option<&Checkpoint>) -> Result<Array2<f32>, TrainError> {
    checkpoint
        .map(|c| c.final_scores.clone())
        .ok_or(TrainError::NoCheckpoint)
}

/// 实验目录名：`<alias>_<dataset>_<model>`
pub fn experiment_dir(root: &Path, alias: &str, dataset: &str, config: &RunConfig) -> PathBuf {
    root.join(format!("{alias}_{dataset}_{}", config.classifier))
}

#[cfg(test)]
mod tests;
