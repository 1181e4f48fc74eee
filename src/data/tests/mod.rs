mod adjacency;
mod datasets;

use crate::data::{GraphSnapshot, Masks};
use ndarray::Array2;

/// 5 节点、2 类的小图：标签 [0,0,1,1,0]，边 {(0,1),(2,3)} 双向存储
pub(crate) fn five_node_graph() -> GraphSnapshot {
    let features = Array2::from_shape_fn((5, 3), |(i, j)| (i * 3 + j) as f32 * 0.1);
    let labels = vec![0, 0, 1, 1, 0];
    let edges = vec![(0, 1), (1, 0), (2, 3), (3, 2)];
    let masks = Masks {
        train: vec![true, false, true, false, false],
        val: vec![false, true, false, true, false],
        test: vec![false, false, false, false, true],
    };
    GraphSnapshot::new(features, labels, edges, None, masks, 2).unwrap()
}
