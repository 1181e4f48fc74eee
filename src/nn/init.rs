use ndarray::Array2;
use rand::Rng;

use crate::distribution::Distribution;

/// 参数初始化策略
#[derive(Debug, Clone)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// Kaiming/He 初始化（适用于 `ReLU`）
    Kaiming,
    /// Xavier/Glorot 初始化
    Xavier,
}

impl Init {
    /// 生成初始化后的矩阵（使用指定的 RNG）
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        shape: (usize, usize),
        rng: &mut R,
    ) -> Array2<f32> {
        match self {
            Self::Constant(v) => Array2::from_elem(shape, *v),
            Self::Zeros => Array2::zeros(shape),
            Self::Normal { mean, std } => Distribution::new_normal(*mean, *std, shape, rng),
            Self::Kaiming => {
                let std = (2.0 / shape.0.max(1) as f32).sqrt();
                Distribution::new_normal(0.0, std, shape, rng)
            }
            Self::Xavier => {
                let std = (2.0 / (shape.0 + shape.1).max(1) as f32).sqrt();
                Distribution::new_normal(0.0, std, shape, rng)
            }
        }
    }
}
