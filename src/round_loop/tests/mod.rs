mod rounds;

use ndarray::Array2;

use crate::data::{GraphDataset, SyntheticGraph};
use crate::round_loop::RunConfig;
use crate::topology::{AugmentInput, Augmentation, Augmenter, TopologyError};

/// 永远不改动拓扑的增强器
pub(crate) struct StalledAugmenter;

impl Augmenter for StalledAugmenter {
    fn augment(&self, input: &AugmentInput<'_>, _drop_edge: bool) -> Result<Augmentation, TopologyError> {
        let snapshot = input.snapshot;
        let n = snapshot.num_nodes();
        Ok(Augmentation {
            edge_list: snapshot.edge_list().to_vec(),
            edge_weight: snapshot
                .edge_weight()
                .map_or_else(|| vec![1.0; snapshot.num_edges()], <[f32]>::to_vec),
            adjacency: snapshot.dense_adjacency().clone(),
            new_edges: Vec::new(),
            dropped_edges: Vec::new(),
            candidate_adjacency: Array2::zeros((n, n)),
        })
    }
}

pub(crate) fn small_dataset() -> GraphDataset {
    SyntheticGraph::new(30, 3)
        .num_features(6)
        .feature_noise(0.5)
        .edge_probs(0.15, 0.01)
        .split(3, 9, 15)
        .seed(3)
        .generate()
        .unwrap()
}

/// 轮数与 epoch 都很少的配置
pub(crate) fn quick_config(output_dir: &std::path::Path) -> RunConfig {
    RunConfig {
        total_step: 3,
        total_epoch: 5,
        base_epochs: Some(5),
        output_dir: output_dir.to_path_buf(),
        ..RunConfig::default()
    }
}
