//! 优化器模块，实现 PyTorch 风格的梯度优化算法（带参数组与 L2 weight decay）

mod core;

pub use core::{Adam, Optimizer, SGD};
