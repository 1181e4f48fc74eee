//! 两层 GCN 节点分类器
//!
//! GcnConv(in, hidden) → ReLU → Dropout(0.5) → GcnConv(hidden, classes)

use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{
    Classifier, ClassifierConfig, ClassifierDescriptor, ClassifierKind, ForwardOutput,
    LinkPredictor, ModelState, apply_state, collect_state,
};
use crate::data::GraphSnapshot;
use crate::nn::functional::{dropout, log_softmax_rows, relu, relu_backward};
use crate::nn::layer::GcnConv;
use crate::nn::{NnError, ParamGroup};

const DROPOUT: f32 = 0.5;
const LEARNING_RATE: f32 = 0.01;
const CONV1_WEIGHT_DECAY: f32 = 5e-4;

struct ForwardCache {
    hidden_pre: Array2<f32>,
    drop_mask: Array2<f32>,
}

pub struct GcnClassifier {
    conv1: GcnConv,
    conv2: GcnConv,
    rng: StdRng,
    cache: Option<ForwardCache>,
}

impl GcnClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let conv1 = GcnConv::new(config.in_features, config.hidden, "conv1", &mut rng);
        let conv2 = GcnConv::new(config.hidden, config.num_classes, "conv2", &mut rng);
        Self {
            conv1,
            conv2,
            rng,
            cache: None,
        }
    }
}

impl Classifier for GcnClassifier {
    fn forward(&mut self, snapshot: &GraphSnapshot, train: bool) -> Result<ForwardOutput, NnError> {
        let adj = snapshot.gcn_adjacency();
        let hidden_pre = self.conv1.forward(snapshot.features(), adj)?;
        let hidden = relu(&hidden_pre);
        let (hidden, drop_mask) = if train {
            dropout(&hidden, DROPOUT, &mut self.rng)
        } else {
            let ones = Array2::ones(hidden.raw_dim());
            (hidden, ones)
        };
        let raw = self.conv2.forward(&hidden, adj)?;
        let log_probs = log_softmax_rows(&raw);
        self.cache = Some(ForwardCache {
            hidden_pre,
            drop_mask,
        });
        Ok(ForwardOutput { raw, log_probs })
    }

    fn backward(&mut self, snapshot: &GraphSnapshot, grad_raw: &Array2<f32>) -> Result<(), NnError> {
        let adj = snapshot.gcn_adjacency();
        let cache = self
            .cache
            .as_ref()
            .ok_or(NnError::MissingForward("GcnClassifier"))?;
        let grad_hidden = self.conv2.backward(grad_raw, adj)? * &cache.drop_mask;
        let grad_hidden_pre = relu_backward(&grad_hidden, &cache.hidden_pre);
        self.conv1.backward(&grad_hidden_pre, adj)?;
        Ok(())
    }

    fn param_groups_mut(&mut self) -> Vec<ParamGroup<'_>> {
        vec![
            ParamGroup::new(CONV1_WEIGHT_DECAY, self.conv1.params_mut()),
            ParamGroup::new(0.0, self.conv2.params_mut()),
        ]
    }

    fn zero_grad(&mut self) {
        for group in self.param_groups_mut() {
            for p in group.params {
                p.zero_grad();
            }
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
        ClassifierDescriptor {
            kind: ClassifierKind::Gcn,
            in_features: self.conv1.in_features(),
            hidden: self.conv1.out_features(),
            heads: 1,
            num_classes: self.conv2.out_features(),
            learning_rate: LEARNING_RATE,
            link: None,
        }
    }
}
