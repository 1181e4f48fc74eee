//! Trainer 的拓扑增强、模型保存与集成委托

use super::ScriptedClassifier;
use crate::data::tests::five_node_graph;
use crate::data::transforms::one_hot;
use crate::ensemble::EnsembleStrategy;
use crate::nn::model_io::model_file_name;
use crate::nn::{ClassifierConfig, ClassifierKind, Model, RoundArtifact};
use crate::topology::ConfidenceAugmenter;
use crate::trainer::{FitOptions, Trainer};

#[test]
fn test_augment_topology_five_node_scenario() {
    let g = five_node_graph();
    let raw = one_hot(g.labels(), 2) * 20.0;
    let mut t = Trainer::new(ScriptedClassifier::fixed(raw), g);
    t.fit(&FitOptions::new(0, 1)).unwrap();

    let aug = t
        .augment_topology(&ConfidenceAugmenter::default(), false)
        .unwrap();
    assert_eq!(aug.new_edges, vec![(0, 4), (1, 4)]);
    assert!(!aug.new_edges.contains(&(0, 2)));
}

#[test]
fn test_save_model_keeps_topology() {
    let dir = tempfile::tempdir().unwrap();
    let g = five_node_graph();
    let model = Model::build(&ClassifierConfig::new(ClassifierKind::Gcn, 3, 2));
    let t = Trainer::new(model, g.clone());

    let path = dir.path().join(model_file_name(0));
    let weights = [1.0, 1.0, 0.5, 0.5];
    t.save_model(&path, 0, g.edge_list(), Some(&weights)).unwrap();

    let loaded = RoundArtifact::load(&path).unwrap();
    let reloaded = g
        .with_edges(loaded.edge_list.clone(), loaded.edge_weight.clone())
        .unwrap();
    let expected = g.with_edges(g.edge_list().to_vec(), Some(weights.to_vec())).unwrap();
    assert_eq!(reloaded.dense_adjacency(), expected.dense_adjacency());
}

#[test]
fn test_ensemble_over_saved_rounds() {
    let dir = tempfile::tempdir().unwrap();
    let g = five_node_graph();
    let mut last = None;
    for step in 0..3 {
        let model = Model::build(&ClassifierConfig::new(ClassifierKind::Gcn, 3, 2).seed(step));
        let mut t = Trainer::new(model, g.clone());
        t.fit(&FitOptions::new(step as usize, 5)).unwrap();
        t.save_model(
            &dir.path().join(model_file_name(step as usize)),
            step as usize,
            g.edge_list(),
            None,
        )
        .unwrap();
        last = Some(t);
    }
    let acc = last
        .unwrap()
        .ensemble(dir.path(), EnsembleStrategy::MeanLogProb)
        .unwrap();
    for v in [acc.train, acc.val, acc.test] {
        assert!((0.0..=1.0).contains(&v));
    }
}
