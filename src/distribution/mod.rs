use ndarray::Array2;
use rand::Rng;

#[cfg(test)]
mod tests;

/// 随机矩阵生成。所有方法都显式接收 RNG，保证给定种子时结果可复现
pub struct Distribution;

impl Distribution {
    /// Box-Muller 采样一个正态分布随机数
    pub fn sample_normal<R: Rng + ?Sized>(mean: f32, std_dev: f32, rng: &mut R) -> f32 {
        // u1 不能为 0，否则 ln(0) = -inf
        let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
        let u2: f32 = rng.gen_range(0.0..1.0);
        let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
        mean + std_dev * z0
    }

    pub fn new_normal<R: Rng + ?Sized>(
        mean: f32,
        std_dev: f32,
        shape: (usize, usize),
        rng: &mut R,
    ) -> Array2<f32> {
        Array2::from_shape_simple_fn(shape, || Self::sample_normal(mean, std_dev, rng))
    }

    /// 闭区间 [min, max] 上的均匀分布
    pub fn new_uniform<R: Rng + ?Sized>(
        min: f32,
        max: f32,
        shape: (usize, usize),
        rng: &mut R,
    ) -> Array2<f32> {
        Array2::from_shape_simple_fn(shape, || rng.gen_range(min..=max))
    }
}
