//! 逐轮记录与跨运行汇总

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::trainer::SplitAccuracy;

/// 第 `round` 轮（基线为 0）的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: usize,
    /// 本轮是否使用了上一轮的 teacher 信号
    pub teacher_signal: bool,
    /// 本轮增强新增的无向边数
    pub new_edges: usize,
    /// 本轮结束时（增强之后）的无向边数
    pub edge_count: usize,
    /// 未集成的单轮精度
    pub accuracy: SplitAccuracy,
    /// 对 model_0..model_round 的集成精度；基线轮没有集成
    pub ensembled: Option<SplitAccuracy>,
}

/// 一次独立运行内的逐轮历史，只增长
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundHistory {
    records: Vec<RoundRecord>,
}

impl RoundHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: RoundRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[RoundRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&RoundRecord> {
        self.records.last()
    }

    /// 基线之后实际执行的轮数
    pub fn num_student_rounds(&self) -> usize {
        self.records.iter().filter(|r| r.round > 0).count()
    }
}

/// 一次独立运行的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub run: usize,
    pub base: SplitAccuracy,
    /// 末轮的集成精度（没有学生轮次时等于基线）
    pub ensembled: SplitAccuracy,
    /// 末轮的未集成精度
    pub non_ensembled: SplitAccuracy,
    /// 整次运行累计新增边中同标签边的比例（只在开启 use_metric 时计算）
    pub new_edge_precision: Option<f32>,
    pub history: RoundHistory,
}

/// 均值 ± 总体标准差
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeanStd {
    pub mean: f32,
    pub std: f32,
}

impl MeanStd {
    pub fn from_values(values: &[f32]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f32;
        let mean = values.iter().sum::<f32>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
        Self {
            mean,
            std: var.sqrt(),
        }
    }
}

impl fmt::Display for MeanStd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} ± {:.2}", self.mean * 100.0, self.std * 100.0)
    }
}

/// 全部运行的汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub outcomes: Vec<RunOutcome>,
    /// 因数值发散而失败的运行编号，不计入统计
    pub failed_runs: Vec<usize>,
    pub base_val: MeanStd,
    pub base_test: MeanStd,
    pub ensembled_val: MeanStd,
    pub ensembled_test: MeanStd,
    pub non_ensembled_val: MeanStd,
    pub non_ensembled_test: MeanStd,
    /// 各运行新增边精度的均值（没有任何值时为 None）
    pub new_edge_precision: Option<MeanStd>,
}

impl ExperimentSummary {
    pub fn new(outcomes: Vec<RunOutcome>, failed_runs: Vec<usize>) -> Self {
        let collect = |f: &dyn Fn(&RunOutcome) -> f32| {
            MeanStd::from_values(&outcomes.iter().map(f).collect::<Vec<_>>())
        };
        let precisions: Vec<f32> = outcomes
            .iter()
            .filter_map(|o| o.new_edge_precision)
            .collect();
        Self {
            base_val: collect(&|o| o.base.val),
            base_test: collect(&|o| o.base.test),
            ensembled_val: collect(&|o| o.ensembled.val),
            ensembled_test: collect(&|o| o.ensembled.test),
            non_ensembled_val: collect(&|o| o.non_ensembled.val),
            non_ensembled_test: collect(&|o| o.non_ensembled.test),
            new_edge_precision: (!precisions.is_empty()).then(|| MeanStd::from_values(&precisions)),
            outcomes,
            failed_runs,
        }
    }
}

impl fmt::Display for ExperimentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "完成 {} 次运行（失败 {} 次）",
            self.outcomes.len(),
            self.failed_runs.len()
        )?;
        writeln!(f, "Base      val {}  test {}", self.base_val, self.base_test)?;
        writeln!(
            f,
            "Ensembled val {}  test {}",
            self.ensembled_val, self.ensembled_test
        )?;
        write!(
            f,
            "Single    val {}  test {}",
            self.non_ensembled_val, self.non_ensembled_test
        )?;
        if let Some(p) = &self.new_edge_precision {
            write!(f, "\n新增边精度 {p}")?;
        }
        Ok(())
    }
}
