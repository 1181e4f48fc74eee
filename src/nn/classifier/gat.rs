//! 两层 GAT 节点分类器
//!
//! Dropout(0.6) → GatConv(in, hidden, heads, concat) → ELU → Dropout(0.6)
//!   → GatConv(hidden * heads, classes, 1 head)

use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{
    Classifier, ClassifierConfig, ClassifierDescriptor, ClassifierKind, ForwardOutput,
    LinkPredictor, ModelState, apply_state, collect_state,
};
use crate::data::GraphSnapshot;
use crate::nn::functional::{dropout, elu, elu_backward, log_softmax_rows};
use crate::nn::layer::GatConv;
use crate::nn::{NnError, ParamGroup};

const DROPOUT: f32 = 0.6;
const LEARNING_RATE: f32 = 0.005;
const WEIGHT_DECAY: f32 = 5e-4;

struct ForwardCache {
    hidden_pre: Array2<f32>,
    drop_mask: Array2<f32>,
}

pub struct GatClassifier {
    conv1: GatConv,
    conv2: GatConv,
    rng: StdRng,
    cache: Option<ForwardCache>,
}

impl GatClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let conv1 = GatConv::new(
            config.in_features,
            config.hidden,
            config.heads,
            true,
            DROPOUT,
            "conv1",
            &mut rng,
        );
        let conv2 = GatConv::new(
            conv1.out_features(),
            config.num_classes,
            1,
            false,
            DROPOUT,
            "conv2",
            &mut rng,
        );
        Self {
            conv1,
            conv2,
            rng,
            cache: None,
        }
    }
}

impl Classifier for GatClassifier {
    fn forward(&mut self, snapshot: &GraphSnapshot, train: bool) -> Result<ForwardOutput, NnError> {
        let mask = snapshot.attention_mask();
        let x = if train {
            dropout(snapshot.features(), DROPOUT, &mut self.rng).0
        } else {
            snapshot.features().clone()
        };
        let hidden_pre = self.conv1.forward(&x, mask, train, &mut self.rng)?;
        let hidden = elu(&hidden_pre);
        let (hidden, drop_mask) = if train {
            dropout(&hidden, DROPOUT, &mut self.rng)
        } else {
            let ones = Array2::ones(hidden.raw_dim());
            (hidden, ones)
        };
        let raw = self.conv2.forward(&hidden, mask, train, &mut self.rng)?;
        let log_probs = log_softmax_rows(&raw);
        self.cache = Some(ForwardCache {
            hidden_pre,
            drop_mask,
        });
        Ok(ForwardOutput { raw, log_probs })
    }

    fn backward(&mut self, _snapshot: &GraphSnapshot, grad_raw: &Array2<f32>) -> Result<(), NnError> {
        let cache = self
            .cache
            .as_ref()
            .ok_or(NnError::MissingForward("GatClassifier"))?;
        let grad_hidden = self.conv2.backward(grad_raw)? * &cache.drop_mask;
        let grad_hidden_pre = elu_backward(&grad_hidden, &cache.hidden_pre);
        self.conv1.backward(&grad_hidden_pre)?;
        Ok(())
    }

    fn param_groups_mut(&mut self) -> Vec<ParamGroup<'_>> {
        let params = self
            .conv1
            .params_mut()
            .into_iter()
            .chain(self.conv2.params_mut())
            .collect();
        vec![ParamGroup::new(WEIGHT_DECAY, params)]
    }

    fn zero_grad(&mut self) {
        for p in self.conv1.params_mut().into_iter().chain(self.conv2.params_mut()) {
            p.zero_grad();
        }
    }

    fn link_predictor(&self) -> Option<LinkPredictor> {
        None
    }

    fn state(&self) -> ModelState {
        collect_state(
            self.describe(),
            self.conv1.params().into_iter().chain(self.conv2.params()),
        )
    }

    fn load_state(&mut self, state: &ModelState) -> Result<(), NnError> {
        let expected = self.describe();
        let params = self
            .conv1
            .params_mut()
            .into_iter()
            .chain(self.conv2.params_mut())
            .collect();
        apply_state(&expected, state, params)
    }

    fn describe(&self) -> ClassifierDescriptor {
        let heads = self.conv1.heads();
        ClassifierDescriptor {
            kind: ClassifierKind::Gat,
            in_features: self.conv1.in_features(),
            hidden: self.conv1.out_features() / heads,
            heads,
            num_classes: self.conv2.out_features(),
            learning_rate: LEARNING_RATE,
            link: None,
        }
    }
}
