//! 节点分类器
//!
//! 训练循环只通过 [`Classifier`] 能力接口与模型交互；
//! 具体架构在配置期选定一次，由 `enum_dispatch` 的 [`Model`] 静态分派。
//! 测试可以为自己的桩模型实现 [`Classifier`]。

mod distill;
mod gat;
mod gcn;
mod link;

use std::fmt;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use distill::{Distill, DistillGatClassifier, DistillGcnClassifier};
pub use gat::GatClassifier;
pub use gcn::GcnClassifier;
pub(crate) use link::Cosine;
pub use link::LinkPredictor;

use crate::data::GraphSnapshot;
use crate::nn::{NnError, Param, ParamGroup};

/// 一次前向的输出
#[derive(Debug, Clone)]
pub struct ForwardOutput {
    /// 最后一层的原始输出 [N, C]（"final"）
    pub raw: Array2<f32>,
    /// `log_softmax(raw)`（"logit"）
    pub log_probs: Array2<f32>,
}

#[enum_dispatch]
pub trait Classifier {
    /// `train = true` 时启用 dropout
    fn forward(&mut self, snapshot: &GraphSnapshot, train: bool) -> Result<ForwardOutput, NnError>;

    /// 以最近一次 `forward` 为准，把对 raw 输出的梯度回传并累积到各参数
    fn backward(&mut self, snapshot: &GraphSnapshot, grad_raw: &Array2<f32>) -> Result<(), NnError>;

    /// 按层分组的参数（每组有各自的 weight decay）
    fn param_groups_mut(&mut self) -> Vec<ParamGroup<'_>>;

    fn zero_grad(&mut self);

    /// 链接预测头，只有蒸馏学生模型才有
    fn link_predictor(&self) -> Option<LinkPredictor>;

    fn state(&self) -> ModelState;

    fn load_state(&mut self, state: &ModelState) -> Result<(), NnError>;

    fn describe(&self) -> ClassifierDescriptor;
}

#[enum_dispatch(Classifier)]
pub enum Model {
    GcnClassifier,
    GatClassifier,
    DistillGcn(DistillGcnClassifier),
    DistillGat(DistillGatClassifier),
}

impl Model {
    /// 按配置构建模型；`config.link` 为 `Some` 时构建蒸馏学生模型
    pub fn build(config: &ClassifierConfig) -> Self {
        match (config.kind, config.link) {
            (ClassifierKind::Gcn, None) => GcnClassifier::new(config).into(),
            (ClassifierKind::Gat, None) => GatClassifier::new(config).into(),
            (ClassifierKind::Gcn, Some(link)) => {
                Distill::new(GcnClassifier::new(config), link).into()
            }
            (ClassifierKind::Gat, Some(link)) => {
                Distill::new(GatClassifier::new(config), link).into()
            }
        }
    }

    /// 按保存的状态重建模型
    pub fn from_state(state: &ModelState, seed: u64) -> Result<Self, NnError> {
        let config = ClassifierConfig::from_descriptor(&state.descriptor, seed);
        let mut model = Self::build(&config);
        model.load_state(state)?;
        Ok(model)
    }
}

/// 基础架构
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    #[default]
    Gcn,
    Gat,
}

impl ClassifierKind {
    /// 默认隐藏层宽度（GAT 为每个头的宽度）
    pub const fn default_hidden(self) -> usize {
        match self {
            Self::Gcn => 16,
            Self::Gat => 8,
        }
    }

    /// 基线模型默认训练轮数
    pub const fn default_base_epochs(self) -> usize {
        match self {
            Self::Gcn => 200,
            Self::Gat => 500,
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gcn => write!(f, "GCN"),
            Self::Gat => write!(f, "GAT"),
        }
    }
}

impl FromStr for ClassifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gcn" => Ok(Self::Gcn),
            "gat" => Ok(Self::Gat),
            other => Err(format!("未知的模型类型: {other}（可选 GCN / GAT）")),
        }
    }
}

/// 构建分类器所需的全部参数
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub kind: ClassifierKind,
    pub in_features: usize,
    pub hidden: usize,
    pub heads: usize,
    pub num_classes: usize,
    /// 参数初始化与 dropout 的随机种子
    pub seed: u64,
    pub link: Option<LinkPredictor>,
}

impl ClassifierConfig {
    pub fn new(kind: ClassifierKind, in_features: usize, num_classes: usize) -> Self {
        Self {
            kind,
            in_features,
            hidden: kind.default_hidden(),
            heads: match kind {
                ClassifierKind::Gcn => 1,
                ClassifierKind::Gat => 8,
            },
            num_classes,
            seed: 0,
            link: None,
        }
    }

    pub fn hidden(mut self, hidden: usize) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn heads(mut self, heads: usize) -> Self {
        self.heads = heads;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn link(mut self, link: Option<LinkPredictor>) -> Self {
        self.link = link;
        self
    }

    pub fn from_descriptor(descriptor: &ClassifierDescriptor, seed: u64) -> Self {
        Self {
            kind: descriptor.kind,
            in_features: descriptor.in_features,
            hidden: descriptor.hidden,
            heads: descriptor.heads,
            num_classes: descriptor.num_classes,
            seed,
            link: descriptor.link,
        }
    }
}

/// 分类器的可序列化描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierDescriptor {
    pub kind: ClassifierKind,
    pub in_features: usize,
    pub hidden: usize,
    pub heads: usize,
    pub num_classes: usize,
    /// 该架构默认的 Adam 学习率
    pub learning_rate: f32,
    #[serde(default)]
    pub link: Option<LinkPredictor>,
}

impl ClassifierDescriptor {
    /// 架构（不含链接预测头）是否一致
    pub fn same_architecture(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.in_features == other.in_features
            && self.hidden == other.hidden
            && self.heads == other.heads
            && self.num_classes == other.num_classes
    }
}

impl fmt::Display for ClassifierDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({} -> {}x{} -> {})",
            self.kind, self.in_features, self.heads, self.hidden, self.num_classes
        )?;
        if let Some(link) = &self.link {
            write!(f, " + link(tau={}, beta={})", link.tau, link.beta)?;
        }
        Ok(())
    }
}

/// 模型参数快照：架构描述 + 按名字保存的参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    pub descriptor: ClassifierDescriptor,
    pub params: Vec<(String, Array2<f32>)>,
}

impl ModelState {
    pub fn get(&self, name: &str) -> Option<&Array2<f32>> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

pub(crate) fn collect_state<'a>(
    descriptor: ClassifierDescriptor,
    params: impl IntoIterator<Item = &'a Param>,
) -> ModelState {
    ModelState {
        descriptor,
        params: params
            .into_iter()
            .map(|p| (p.name().to_string(), p.value().clone()))
            .collect(),
    }
}

pub(crate) fn apply_state(
    expected: &ClassifierDescriptor,
    state: &ModelState,
    params: Vec<&mut Param>,
) -> Result<(), NnError> {
    if !expected.same_architecture(&state.descriptor) {
        return Err(NnError::ArchitectureMismatch {
            expected: expected.to_string(),
            got: state.descriptor.to_string(),
        });
    }
    for param in params {
        let value = state
            .get(param.name())
            .ok_or_else(|| NnError::MissingParameter(param.name().to_string()))?;
        param.set_value(value)?;
    }
    Ok(())
}
