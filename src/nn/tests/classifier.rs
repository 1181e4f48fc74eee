//! 节点分类器（GCN / GAT / 蒸馏学生）测试

use approx::assert_abs_diff_eq;

use crate::data::SyntheticGraph;
use crate::data::tests::five_node_graph;
use crate::nn::criterion::nll_loss;
use crate::nn::{
    Adam, Classifier, ClassifierConfig, ClassifierKind, LinkPredictor, Model, NnError, Optimizer,
};

fn config(kind: ClassifierKind) -> ClassifierConfig {
    ClassifierConfig::new(kind, 3, 2).hidden(4).heads(2).seed(7)
}

#[test]
fn test_forward_shapes_and_probabilities() {
    let g = five_node_graph();
    for kind in [ClassifierKind::Gcn, ClassifierKind::Gat] {
        let mut model = Model::build(&config(kind));
        let out = model.forward(&g, false).unwrap();
        assert_eq!(out.raw.dim(), (5, 2));
        for row in out.log_probs.rows() {
            assert_abs_diff_eq!(row.mapv(f32::exp).sum(), 1.0, epsilon = 1e-5);
        }
    }
}

#[test]
fn test_same_seed_same_model() {
    let g = five_node_graph();
    let mut a = Model::build(&config(ClassifierKind::Gat));
    let mut b = Model::build(&config(ClassifierKind::Gat));
    assert_eq!(a.forward(&g, false).unwrap().raw, b.forward(&g, false).unwrap().raw);
    // dropout 也由同一个种子驱动
    assert_eq!(a.forward(&g, true).unwrap().raw, b.forward(&g, true).unwrap().raw);
}

#[test]
fn test_eval_mode_is_deterministic() {
    let g = five_node_graph();
    let mut model = Model::build(&config(ClassifierKind::Gcn));
    let first = model.forward(&g, false).unwrap().raw;
    model.forward(&g, true).unwrap();
    assert_eq!(model.forward(&g, false).unwrap().raw, first);
}

#[test]
fn test_param_groups_weight_decay() {
    let mut gcn = Model::build(&config(ClassifierKind::Gcn));
    let groups = gcn.param_groups_mut();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].weight_decay, 5e-4);
    assert_eq!(groups[1].weight_decay, 0.0);
    assert_eq!(groups[0].params[0].name(), "conv1.weight");
    drop(groups);

    let mut gat = Model::build(&config(ClassifierKind::Gat));
    let groups = gat.param_groups_mut();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].params.len(), 8);
}

#[test]
fn test_state_round_trip() {
    let g = five_node_graph();
    let mut a = Model::build(&config(ClassifierKind::Gcn));
    let mut b = Model::build(&config(ClassifierKind::Gcn).seed(99));
    assert_ne!(a.forward(&g, false).unwrap().raw, b.forward(&g, false).unwrap().raw);

    b.load_state(&a.state()).unwrap();
    assert_eq!(a.forward(&g, false).unwrap().raw, b.forward(&g, false).unwrap().raw);

    let mut rebuilt = Model::from_state(&a.state(), 0).unwrap();
    assert_eq!(
        rebuilt.forward(&g, false).unwrap().raw,
        a.forward(&g, false).unwrap().raw
    );
}

#[test]
fn test_load_state_rejects_other_architecture() {
    let gcn = Model::build(&config(ClassifierKind::Gcn));
    let mut gat = Model::build(&config(ClassifierKind::Gat));
    let err = gat.load_state(&gcn.state()).unwrap_err();
    assert!(matches!(err, NnError::ArchitectureMismatch { .. }));
}

#[test]
fn test_distill_model_exposes_link_head() {
    let link = LinkPredictor::new(10.0, -3.0);
    let base = Model::build(&config(ClassifierKind::Gcn));
    let student = Model::build(&config(ClassifierKind::Gcn).link(Some(link)));
    assert!(base.link_predictor().is_none());
    assert_eq!(student.link_predictor(), Some(link));
    assert_eq!(student.describe().link, Some(link));
    assert!(matches!(student, Model::DistillGcn(_)));

    // 学生模型的参数可以与基线互相加载
    let mut other = Model::build(&config(ClassifierKind::Gcn).link(Some(link)).seed(3));
    other.load_state(&base.state()).unwrap();
    let rebuilt = Model::from_state(&student.state(), 0).unwrap();
    assert_eq!(rebuilt.link_predictor(), Some(link));
}

#[test]
fn test_training_reduces_loss() {
    let dataset = SyntheticGraph::new(60, 3)
        .num_features(8)
        .edge_probs(0.2, 0.01)
        .seed(2)
        .generate()
        .unwrap();
    let g = dataset.snapshot();
    for kind in [ClassifierKind::Gcn, ClassifierKind::Gat] {
        let mut model = Model::build(&ClassifierConfig::new(kind, 8, 3).seed(1));
        let mut adam = Adam::new(model.describe().learning_rate);
        let eval_loss = |m: &mut Model| {
            let out = m.forward(g, false).unwrap();
            nll_loss(&out.log_probs, g.labels(), &g.masks().train).unwrap().value
        };
        let before = eval_loss(&mut model);
        for _ in 0..30 {
            model.zero_grad();
            let out = model.forward(g, true).unwrap();
            let loss = nll_loss(&out.log_probs, g.labels(), &g.masks().train).unwrap();
            model.backward(g, &loss.grad).unwrap();
            adam.step(model.param_groups_mut());
        }
        let after = eval_loss(&mut model);
        assert!(after < before, "{kind}: {before} -> {after}");
    }
}

#[test]
fn test_backward_before_forward_fails() {
    let g = five_node_graph();
    let mut model = Model::build(&config(ClassifierKind::Gat));
    let grad = ndarray::Array2::zeros((5, 2));
    assert!(matches!(
        model.backward(&g, &grad),
        Err(NnError::MissingForward(_))
    ));
}
