//! 损失函数
//!
//! 每个损失同时返回标量值和对分类器原始输出（raw scores）的梯度，
//! Trainer 把各项梯度按系数加权求和后交给 `Classifier::backward`。

use ndarray::{Array2, Axis, Zip};

use super::NnError;
use super::classifier::{Cosine, LinkPredictor};
use super::functional::sigmoid;

/// 损失值与对 raw 输出的梯度
#[derive(Debug, Clone)]
pub struct LossOutput {
    pub value: f32,
    pub grad: Array2<f32>,
}

impl LossOutput {
    fn zero(shape: (usize, usize)) -> Self {
        Self {
            value: 0.0,
            grad: Array2::zeros(shape),
        }
    }
}

/// 负对数似然（mask 内节点取平均）。mask 为空时损失与梯度均为 0
///
/// 对 raw 的梯度：`(softmax - onehot) / n_mask`
pub fn nll_loss(log_probs: &Array2<f32>, labels: &[usize], mask: &[bool]) -> Result<LossOutput, NnError> {
    let (n, c) = log_probs.dim();
    if labels.len() != n || mask.len() != n {
        return Err(NnError::shape(
            &[n],
            &[labels.len().min(mask.len())],
            "NLL 损失的标签/mask 长度",
        ));
    }
    let count = mask.iter().filter(|&&m| m).count();
    if count == 0 {
        return Ok(LossOutput::zero((n, c)));
    }

    let scale = 1.0 / count as f32;
    let mut value = 0.0;
    let mut grad = Array2::<f32>::zeros((n, c));
    for i in (0..n).filter(|&i| mask[i]) {
        let label = labels[i];
        value -= log_probs[[i, label]];
        let mut row = grad.row_mut(i);
        row.assign(&log_probs.row(i).mapv(f32::exp));
        row[label] -= 1.0;
        row *= scale;
    }
    Ok(LossOutput {
        value: value * scale,
        grad,
    })
}

/// 均方误差（对全部节点、全部类别取平均）
pub fn mse_loss(raw: &Array2<f32>, target: &Array2<f32>) -> Result<LossOutput, NnError> {
    if raw.dim() != target.dim() {
        return Err(NnError::shape(target.shape(), raw.shape(), "MSE 损失"));
    }
    if raw.is_empty() {
        return Ok(LossOutput::zero(raw.dim()));
    }
    let diff = raw - target;
    let numel = diff.len() as f32;
    let value = diff.mapv(|d| d * d).sum() / numel;
    Ok(LossOutput {
        value,
        grad: diff * (2.0 / numel),
    })
}

/// 链接预测损失：`BCE(sigmoid(tau·cos(f_i, f_j) + beta), T_ij)`，对全部 N² 个节点对取平均
///
/// - `target`: [N, N] 的 0/1 共属矩阵
///
/// 反向：设 `z = tau·C + beta`，则 `dz = (s - T) / N²`，`dC = tau·dz`，
/// `dU = (dC + dCᵀ)·U`，`df_i = (dU_i - (dU_i·u_i)·u_i) / ‖f_i‖`
pub fn link_loss(
    raw: &Array2<f32>,
    target: &Array2<f32>,
    link: &LinkPredictor,
) -> Result<LossOutput, NnError> {
    let n = raw.nrows();
    if target.dim() != (n, n) {
        return Err(NnError::shape(&[n, n], target.shape(), "链接预测目标"));
    }
    if n == 0 {
        return Ok(LossOutput::zero(raw.dim()));
    }

    let cosine = Cosine::new(raw);
    let logits = cosine.similarity.mapv(|c| link.tau * c + link.beta);
    let pairs = (n * n) as f32;

    // BCE with logits：max(z, 0) - t·z + ln(1 + e^{-|z|})
    let value = logits
        .iter()
        .zip(target.iter())
        .map(|(&z, &t)| z.max(0.0) - t * z + (-z.abs()).exp().ln_1p())
        .sum::<f32>()
        / pairs;

    let grad_logits = Zip::from(&logits)
        .and(target)
        .map_collect(|&z, &t| (sigmoid(z) - t) / pairs);
    let grad_sim = grad_logits * link.tau;
    let grad_sym = &grad_sim + &grad_sim.t();
    let grad_unit = grad_sym.dot(&cosine.unit);

    let mut grad = Array2::<f32>::zeros(raw.dim());
    for (i, mut row) in grad.axis_iter_mut(Axis(0)).enumerate() {
        let u = cosine.unit.row(i);
        let du = grad_unit.row(i);
        let proj = du.dot(&u);
        row.assign(&((&du - &(&u * proj)) / cosine.norms[i]));
    }
    Ok(LossOutput { value, grad })
}
