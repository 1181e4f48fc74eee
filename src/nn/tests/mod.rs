mod classifier;
mod optimizer;

use ndarray::Array2;

/// 中心差分求标量函数对 `x` 每个元素的数值梯度
pub(crate) fn numeric_grad<F>(x: &Array2<f32>, eps: f32, mut f: F) -> Array2<f32>
where
    F: FnMut(&Array2<f32>) -> f32,
{
    let mut grad = Array2::zeros(x.raw_dim());
    let mut probe = x.clone();
    for idx in 0..x.len() {
        let (r, c) = (idx / x.ncols(), idx % x.ncols());
        let orig = probe[[r, c]];
        probe[[r, c]] = orig + eps;
        let plus = f(&probe);
        probe[[r, c]] = orig - eps;
        let minus = f(&probe);
        probe[[r, c]] = orig;
        grad[[r, c]] = (plus - minus) / (2.0 * eps);
    }
    grad
}

/// 与输出同形状的固定权重，把输出变成标量损失 `Σ out ⊙ R`
pub(crate) fn probe_weights(shape: (usize, usize)) -> Array2<f32> {
    Array2::from_shape_fn(shape, |(i, j)| ((i * 7 + j * 3) % 5) as f32 * 0.25 - 0.5)
}
