use ndarray::array;

use crate::data::adjacency::*;

#[test]
fn test_to_dense_and_back() {
    let edges = vec![(0, 1), (1, 0), (1, 2), (2, 1)];
    let adj = to_dense(3, &edges, Some(&[1.0, 1.0, 0.5, 0.5]));
    assert_eq!(adj, array![[0.0, 1.0, 0.0], [1.0, 0.0, 0.5], [0.0, 0.5, 0.0]]);

    // 重复边权重相加
    let dup = to_dense(2, &[(0, 1), (0, 1)], Some(&[0.5, 0.25]));
    assert_eq!(dup[[0, 1]], 0.75);
}

#[test]
fn test_structure_ignores_weights() {
    let edges = vec![(0, 2), (2, 0), (0, 1)];
    let adj = to_dense(3, &edges, Some(&[0.0, 0.0, 1.0]));
    assert_eq!(adj[[0, 2]], 0.0);
    let s = structure(3, &edges);
    assert_eq!(s, array![[0.0, 1.0, 1.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
}

#[test]
fn test_self_loops() {
    let adj = array![[0.0, 1.0], [1.0, 0.0]];
    let with = with_self_loops(&adj);
    assert_eq!(with, array![[1.0, 1.0], [1.0, 1.0]]);
    assert_eq!(without_self_loops(&with), adj);
}

#[test]
fn test_is_symmetric() {
    let adj = array![[0.0, 1.0, 0.0], [0.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
    assert!(!is_symmetric(&adj));
    assert!(is_symmetric(&array![[0.0, 0.5], [0.5, 0.0]]));
}

#[test]
fn test_co_membership() {
    let y = array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0]];
    let yyt = co_membership(&y);
    assert_eq!(yyt, array![[1.0, 0.0, 1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 1.0]]);
}

#[test]
fn test_undirected_pairs() {
    // (0,1) 只存了一个方向，(1,2) 存了两个方向，(2,2) 是自环
    let pairs = undirected_pairs(&[(1, 0), (1, 2), (2, 1), (2, 2)]);
    assert_eq!(pairs.into_iter().collect::<Vec<_>>(), vec![(0, 1), (1, 2)]);
}
