//! 负责神经网络部分：图卷积层、激活、损失、优化器与节点分类器
//!
//! 全部前向/反向都在 ndarray 上手写完成，训练是整图（full-batch）的。

pub mod classifier;
pub mod criterion;
mod error;
pub mod functional;
mod init;
pub mod layer;
pub mod model_io;
pub mod optimizer;
mod param;

pub use classifier::{
    Classifier, ClassifierConfig, ClassifierDescriptor, ClassifierKind, ForwardOutput,
    LinkPredictor, Model, ModelState,
};
pub use error::NnError;
pub use init::Init;
pub use model_io::RoundArtifact;
pub use optimizer::{Adam, Optimizer, SGD};
pub use param::{Param, ParamGroup};

#[cfg(test)]
mod tests;
