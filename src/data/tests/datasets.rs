use std::io::Write;

use crate::data::{DataError, JsonGraphDataset, Split, SyntheticGraph};

#[test]
fn test_synthetic_graph_is_deterministic() {
    let a = SyntheticGraph::new(40, 2).num_features(4).seed(9).generate().unwrap();
    let b = SyntheticGraph::new(40, 2).num_features(4).seed(9).generate().unwrap();
    assert_eq!(a.snapshot().edge_list(), b.snapshot().edge_list());
    assert_eq!(a.snapshot().features(), b.snapshot().features());
    assert_eq!(a.num_classes(), 2);
    assert_eq!(a.num_features(), 4);
}

#[test]
fn test_synthetic_graph_split_and_symmetry() {
    let dataset = SyntheticGraph::new(60, 3)
        .split(4, 10, 20)
        .edge_probs(0.3, 0.02)
        .seed(1)
        .generate()
        .unwrap();
    let g = dataset.snapshot();
    assert_eq!(g.masks().count(Split::Train), 12);
    assert_eq!(g.masks().count(Split::Val), 10);
    assert_eq!(g.masks().count(Split::Test), 20);
    assert!(g.stats().is_undirected);
    assert!(g.num_edges() > 0);
}

#[test]
fn test_json_dataset_load() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "name": "tiny",
            "features": [[1.0, 1.0], [0.0, 2.0], [3.0, 1.0]],
            "labels": [0, 1, 0],
            "edges": [[0, 1], [1, 0]],
            "train_mask": [true, false, false],
            "val_mask": [false, true, false],
            "test_mask": [false, false, true]
        }}"#
    )
    .unwrap();

    let dataset = JsonGraphDataset::load(file.path(), true).unwrap();
    assert_eq!(dataset.name(), "tiny");
    assert_eq!(dataset.num_classes(), 2);
    let g = dataset.snapshot();
    assert_eq!(g.num_nodes(), 3);
    assert_eq!(g.features()[[0, 0]], 0.5);
    assert_eq!(g.features()[[2, 0]], 0.75);
}

#[test]
fn test_json_dataset_missing_file() {
    let err = JsonGraphDataset::load("/definitely/not/here.json", false).unwrap_err();
    assert!(matches!(err, DataError::FileNotFound(_)));
}
