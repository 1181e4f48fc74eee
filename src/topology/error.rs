use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("{what} 形状不匹配: 期望 {expected:?}, 实际 {got:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("阈值须在 [0, 1] 区间内, 实际为 {0}")]
    InvalidThreshold(f32),

    #[error(transparent)]
    Data(#[from] crate::data::DataError),
}
