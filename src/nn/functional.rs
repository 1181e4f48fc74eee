//! 逐元素激活、按行 softmax 与 dropout，以及对应的反向传播

use ndarray::{Array1, Array2, Axis, Zip};
use rand::Rng;

pub fn relu(x: &Array2<f32>) -> Array2<f32> {
    x.mapv(|v| v.max(0.0))
}

/// `grad * 1[x > 0]`
pub fn relu_backward(grad: &Array2<f32>, input: &Array2<f32>) -> Array2<f32> {
    Zip::from(grad)
        .and(input)
        .map_collect(|&g, &x| if x > 0.0 { g } else { 0.0 })
}

/// ELU（alpha = 1）
pub fn elu(x: &Array2<f32>) -> Array2<f32> {
    x.mapv(|v| if v > 0.0 { v } else { v.exp_m1() })
}

pub fn elu_backward(grad: &Array2<f32>, input: &Array2<f32>) -> Array2<f32> {
    Zip::from(grad)
        .and(input)
        .map_collect(|&g, &x| if x > 0.0 { g } else { g * x.exp() })
}

pub fn leaky_relu(x: f32, negative_slope: f32) -> f32 {
    if x > 0.0 { x } else { negative_slope * x }
}

pub fn leaky_relu_grad(x: f32, negative_slope: f32) -> f32 {
    if x > 0.0 { 1.0 } else { negative_slope }
}

pub fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// 按行 log_softmax（减去行最大值保证数值稳定）
pub fn log_softmax_rows(x: &Array2<f32>) -> Array2<f32> {
    let mut out = x.clone();
    for mut row in out.axis_iter_mut(Axis(0)) {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        let lse = row.mapv(|v| (v - max).exp()).sum().ln();
        row.mapv_inplace(|v| v - max - lse);
    }
    out
}

pub fn softmax_rows(x: &Array2<f32>) -> Array2<f32> {
    log_softmax_rows(x).mapv(f32::exp)
}

/// 行 L2 范数，下限为 `eps`
pub fn row_norms(x: &Array2<f32>, eps: f32) -> Array1<f32> {
    x.map_axis(Axis(1), |row| row.dot(&row).sqrt().max(eps))
}

/// 倒置 dropout：返回 (输出, 掩码)，掩码元素为 0 或 `1 / (1 - p)`。
/// `p == 0` 时掩码全为 1
pub fn dropout<R: Rng + ?Sized>(
    x: &Array2<f32>,
    p: f32,
    rng: &mut R,
) -> (Array2<f32>, Array2<f32>) {
    let mask = dropout_mask(x.dim(), p, rng);
    (x * &mask, mask)
}

pub fn dropout_mask<R: Rng + ?Sized>(shape: (usize, usize), p: f32, rng: &mut R) -> Array2<f32> {
    if p <= 0.0 {
        return Array2::ones(shape);
    }
    if p >= 1.0 {
        return Array2::zeros(shape);
    }
    let scale = 1.0 / (1.0 - p);
    Array2::from_shape_simple_fn(shape, || {
        if rng.gen_range(0.0..1.0) < p {
            0.0
        } else {
            scale
        }
    })
}
