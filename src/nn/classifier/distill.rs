//! 自蒸馏学生模型：基础分类器 + 链接预测头
//!
//! 前向、反向与参数完全来自内部的基础分类器；链接预测头本身没有可训练参数，
//! 只改变 `link_predictor()` 与 `describe()` 的返回值。

use ndarray::Array2;

use super::{
    Classifier, ClassifierDescriptor, ForwardOutput, GatClassifier, GcnClassifier, LinkPredictor,
    ModelState,
};
use crate::data::GraphSnapshot;
use crate::nn::{NnError, ParamGroup};

pub struct Distill<C> {
    base: C,
    link: LinkPredictor,
}

pub type DistillGcnClassifier = Distill<GcnClassifier>;
pub type DistillGatClassifier = Distill<GatClassifier>;

impl<C: Classifier> Distill<C> {
    pub fn new(base: C, link: LinkPredictor) -> Self {
        Self { base, link }
    }

    pub fn base(&self) -> &C {
        &self.base
    }
}

impl<C: Classifier> Classifier for Distill<C> {
    fn forward(&mut self, snapshot: &GraphSnapshot, train: bool) -> Result<ForwardOutput, NnError> {
        self.base.forward(snapshot, train)
    }

    fn backward(&mut self, snapshot: &GraphSnapshot, grad_raw: &Array2<f32>) -> Result<(), NnError> {
        self.base.backward(snapshot, grad_raw)
    }

    fn param_groups_mut(&mut self) -> Vec<ParamGroup<'_>> {
        self.base.param_groups_mut()
    }

    fn zero_grad(&mut self) {
        self.base.zero_grad();
    }

    fn link_predictor(&self) -> Option<LinkPredictor> {
        Some(self.link)
    }

    fn state(&self) -> ModelState {
        let mut state = self.base.state();
        state.descriptor.link = Some(self.link);
        state
    }

    fn load_state(&mut self, state: &ModelState) -> Result<(), NnError> {
        self.base.load_state(state)
    }

    fn describe(&self) -> ClassifierDescriptor {
        ClassifierDescriptor {
            link: Some(self.link),
            ..self.base.describe()
        }
    }
}
