//! 可训练参数与参数组
//!
//! 参数统一存成二维矩阵（偏置为 [1, out]），梯度与值同形状，
//! 每次 backward 累加到 `grad`，由 `zero_grad()` 清零。

use ndarray::Array2;

use super::NnError;

/// 一个命名的可训练参数
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    value: Array2<f32>,
    grad: Array2<f32>,
}

impl Param {
    pub fn new(name: impl Into<String>, value: Array2<f32>) -> Self {
        let grad = Array2::zeros(value.raw_dim());
        Self {
            name: name.into(),
            value,
            grad,
        }
    }

    /// 全局唯一的参数名（如 `conv1.weight`），优化器按它键控状态
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Array2<f32> {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Array2<f32> {
        &mut self.value
    }

    pub fn grad(&self) -> &Array2<f32> {
        &self.grad
    }

    pub fn shape(&self) -> (usize, usize) {
        self.value.dim()
    }

    pub fn accumulate_grad(&mut self, grad: &Array2<f32>) -> Result<(), NnError> {
        if grad.dim() != self.value.dim() {
            return Err(NnError::shape(
                self.value.shape(),
                grad.shape(),
                format!("参数 {} 的梯度", self.name),
            ));
        }
        self.grad += grad;
        Ok(())
    }

    pub fn zero_grad(&mut self) {
        self.grad.fill(0.0);
    }

    /// 覆盖参数值（加载状态时使用），形状必须一致
    pub fn set_value(&mut self, value: &Array2<f32>) -> Result<(), NnError> {
        if value.dim() != self.value.dim() {
            return Err(NnError::shape(
                self.value.shape(),
                value.shape(),
                format!("加载参数 {}", self.name),
            ));
        }
        self.value.assign(value);
        Ok(())
    }
}

/// 共享同一 weight decay 的一组参数（对应 torch 的 param_groups）
pub struct ParamGroup<'a> {
    pub weight_decay: f32,
    pub params: Vec<&'a mut Param>,
}

impl<'a> ParamGroup<'a> {
    pub fn new(weight_decay: f32, params: Vec<&'a mut Param>) -> Self {
        Self {
            weight_decay,
            params,
        }
    }
}
