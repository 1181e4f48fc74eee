mod rounds;

use ndarray::Array2;

use crate::data::GraphSnapshot;
use crate::nn::functional::log_softmax_rows;
use crate::nn::{
    Classifier, ClassifierDescriptor, ClassifierKind, ForwardOutput, LinkPredictor, ModelState,
    NnError, ParamGroup,
};

/// 按脚本输出固定分数的桩分类器
///
/// 第 k 个 epoch（第 k 次 train 模式前向之后）的 eval 输出为 `outputs[k]`。
/// 状态只包含当前脚本位置，用于检查 `fit()` 结束时恢复的是哪个 epoch。
pub(crate) struct ScriptedClassifier {
    outputs: Vec<Array2<f32>>,
    pub position: usize,
    pub forward_calls: usize,
    link: Option<LinkPredictor>,
}

impl ScriptedClassifier {
    pub fn new(outputs: Vec<Array2<f32>>) -> Self {
        Self {
            outputs,
            position: 0,
            forward_calls: 0,
            link: None,
        }
    }

    /// 永远输出同一组分数
    pub fn fixed(raw: Array2<f32>) -> Self {
        Self::new(vec![raw])
    }

    pub fn with_link(mut self, link: LinkPredictor) -> Self {
        self.link = Some(link);
        self
    }

    fn current(&self) -> &Array2<f32> {
        let last = self.outputs.len() - 1;
        &self.outputs[self.position.saturating_sub(1).min(last)]
    }
}

impl Classifier for ScriptedClassifier {
    fn forward(&mut self, _snapshot: &GraphSnapshot, train: bool) -> Result<ForwardOutput, NnError> {
        self.forward_calls += 1;
        if train {
            self.position += 1;
        }
        let raw = self.current().clone();
        let log_probs = log_softmax_rows(&raw);
        Ok(ForwardOutput { raw, log_probs })
    }

    fn backward(&mut self, _snapshot: &GraphSnapshot, _grad_raw: &Array2<f32>) -> Result<(), NnError> {
        Ok(())
    }

    fn param_groups_mut(&mut self) -> Vec<ParamGroup<'_>> {
        Vec::new()
    }

    fn zero_grad(&mut self) {}

    fn link_predictor(&self) -> Option<LinkPredictor> {
        self.link
    }

    fn state(&self) -> ModelState {
        ModelState {
            descriptor: self.describe(),
            params: vec![(
                "position".to_string(),
                Array2::from_elem((1, 1), self.position as f32),
            )],
        }
    }

    fn load_state(&mut self, state: &ModelState) -> Result<(), NnError> {
        let value = state
            .get("position")
            .ok_or_else(|| NnError::MissingParameter("position".to_string()))?;
        self.position = value[[0, 0]] as usize;
        Ok(())
    }

    fn describe(&self) -> ClassifierDescriptor {
        let (n, c) = self.outputs[0].dim();
        ClassifierDescriptor {
            kind: ClassifierKind::Gcn,
            in_features: n,
            hidden: 0,
            heads: 1,
            num_classes: c,
            learning_rate: 0.01,
            link: self.link,
        }
    }
}
