use ndarray::{Array2, array};

use super::{EnsembleError, EnsembleStrategy, Ensembler};
use crate::data::tests::five_node_graph;
use crate::data::{GraphSnapshot, SyntheticGraph};
use crate::nn::functional::log_softmax_rows;
use crate::nn::model_io::model_file_name;
use crate::nn::{Classifier, ClassifierConfig, ClassifierKind, Model, RoundArtifact};
use crate::trainer::{FitOptions, SplitAccuracy, Trainer};

#[test]
fn test_mean_log_prob_aggregation() {
    let a = log_softmax_rows(&array![[3.0, 0.0], [0.0, 1.0]]);
    let b = log_softmax_rows(&array![[0.0, 1.0], [0.0, 1.0]]);
    let preds = Ensembler::new(EnsembleStrategy::MeanLogProb)
        .aggregate(&[a, b])
        .unwrap();
    assert_eq!(preds, vec![0, 1]);
}

#[test]
fn test_majority_vote_ties_go_to_smallest_class() {
    let a = array![[0.9, 0.1, 0.0]];
    let b = array![[0.0, 0.1, 0.9]];
    let c = array![[0.0, 0.9, 0.1]];
    let vote = Ensembler::new(EnsembleStrategy::MajorityVote);
    assert_eq!(vote.aggregate(&[a.clone(), b.clone(), c]).unwrap(), vec![0]);
    assert_eq!(vote.aggregate(&[b.clone(), b, a]).unwrap(), vec![2]);
}

#[test]
fn test_aggregate_rejects_bad_input() {
    let e = Ensembler::default();
    assert!(matches!(e.aggregate(&[]), Err(EnsembleError::NoModels(_))));
    let err = e
        .aggregate(&[Array2::zeros((3, 2)), Array2::zeros((3, 3))])
        .unwrap_err();
    assert!(matches!(
        err,
        EnsembleError::ShapeMismatch {
            index: 1,
            expected: (3, 2),
            got: (3, 3)
        }
    ));
}

#[test]
fn test_strategy_from_str() {
    assert_eq!(
        "majority-vote".parse::<EnsembleStrategy>().unwrap(),
        EnsembleStrategy::MajorityVote
    );
    assert_eq!(
        "mean".parse::<EnsembleStrategy>().unwrap(),
        EnsembleStrategy::MeanLogProb
    );
    assert!("median".parse::<EnsembleStrategy>().is_err());
}

#[test]
fn test_evaluate_empty_dir() {
    let dir = tempfile::tempdir().unwrap();
    let err = Ensembler::default()
        .evaluate_dir(dir.path(), &five_node_graph())
        .unwrap_err();
    assert!(matches!(err, EnsembleError::NoModels(_)));
}

#[test]
fn test_each_model_uses_its_saved_topology() {
    let dir = tempfile::tempdir().unwrap();
    let g = five_node_graph();
    let mut model = Model::build(&ClassifierConfig::new(ClassifierKind::Gcn, 3, 2).seed(5));
    RoundArtifact {
        step: 1,
        state: model.state(),
        edge_list: vec![],
        edge_weight: None,
    }
    .save(dir.path().join(model_file_name(1)))
    .unwrap();

    let isolated = g.with_edges(vec![], None).unwrap();
    let expected = SplitAccuracy::from_log_probs(&model.forward(&isolated, false).unwrap().log_probs, &g);
    let got = Ensembler::default().evaluate_dir(dir.path(), &g).unwrap();
    assert_eq!(got, expected);
}

fn separable_graph() -> GraphSnapshot {
    SyntheticGraph::new(90, 3)
        .num_features(8)
        .feature_noise(0.3)
        .edge_probs(0.2, 0.005)
        .seed(11)
        .generate()
        .unwrap()
        .snapshot()
        .clone()
}

#[test]
fn test_ensemble_not_worse_than_weakest_round() {
    let dir = tempfile::tempdir().unwrap();
    let g = separable_graph();
    let mut individual = Vec::new();
    for step in 0..3usize {
        let model = Model::build(
            &ClassifierConfig::new(ClassifierKind::Gcn, 8, 3).seed(100 + step as u64),
        );
        let mut t = Trainer::new(model, g.clone());
        individual.push(t.fit(&FitOptions::new(step, 60)).unwrap());
        t.save_model(
            &dir.path().join(model_file_name(step)),
            step,
            g.edge_list(),
            g.edge_weight(),
        )
        .unwrap();
    }

    let weakest = individual
        .iter()
        .map(|a| a.val)
        .fold(f32::INFINITY, f32::min);
    for strategy in [EnsembleStrategy::MeanLogProb, EnsembleStrategy::MajorityVote] {
        let acc = Ensembler::new(strategy).evaluate_dir(dir.path(), &g).unwrap();
        assert!(acc.val >= weakest, "{strategy}: {} < {weakest}", acc.val);
    }
}
