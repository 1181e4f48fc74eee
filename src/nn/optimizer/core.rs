//! Optimizer API - PyTorch 风格
//!
//! 核心特性：
//! - 参数由分类器以 `ParamGroup` 的形式按组交给 `step()`，每组有自己的 weight decay
//! - weight decay 以 L2 形式加到梯度上：g = ∇θ + λ·θ（与 torch.optim.Adam 一致）
//! - Adam 的动量状态按参数名键控

use std::collections::HashMap;

use ndarray::Array2;

use crate::nn::ParamGroup;

/// Optimizer trait（PyTorch 风格）
///
/// # 使用示例
/// ```ignore
/// let mut optimizer = Adam::new(0.01);
///
/// model.zero_grad();
/// let out = model.forward(&snapshot, true)?;
/// model.backward(&snapshot, &grad)?;
/// optimizer.step(model.param_groups_mut());
/// ```
pub trait Optimizer {
    /// 用各参数已累积的梯度更新参数
    fn step(&mut self, groups: Vec<ParamGroup<'_>>);

    /// 获取学习率
    fn learning_rate(&self) -> f32;

    /// 设置学习率
    fn set_learning_rate(&mut self, lr: f32);

    /// 重置累积状态（如 Adam 的动量）
    fn reset(&mut self);
}

/// SGD 优化器
///
/// 随机梯度下降：θ = θ - α * (∇θ + λ·θ)
pub struct SGD {
    /// 学习率
    lr: f32,
}

impl SGD {
    pub fn new(lr: f32) -> Self {
        Self { lr }
    }
}

impl Optimizer for SGD {
    fn step(&mut self, groups: Vec<ParamGroup<'_>>) {
        for group in groups {
            for param in group.params {
                let grad = param.grad() + &(param.value() * group.weight_decay);
                param.value_mut().scaled_add(-self.lr, &grad);
            }
        }
    }

    fn learning_rate(&self) -> f32 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn reset(&mut self) {
        // SGD 无状态
    }
}

/// Adam 优化器
///
/// Adam: Adaptive Moment Estimation
/// - m = β1 * m + (1 - β1) * g
/// - v = β2 * v + (1 - β2) * g²
/// - θ = θ - α * `m_hat` / (√`v_hat` + ε)
pub struct Adam {
    /// 学习率
    lr: f32,
    /// β1 (一阶矩衰减)
    beta1: f32,
    /// β2 (二阶矩衰减)
    beta2: f32,
    /// 数值稳定项
    epsilon: f32,
    /// 一阶矩估计（按参数名索引）
    m: HashMap<String, Array2<f32>>,
    /// 二阶矩估计（按参数名索引）
    v: HashMap<String, Array2<f32>>,
    /// 时间步
    t: usize,
}

impl Adam {
    pub fn new(lr: f32) -> Self {
        Self::new_with_config(lr, 0.9, 0.999, 1e-8)
    }

    /// 创建带完整配置的 Adam 优化器
    pub fn new_with_config(lr: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            lr,
            beta1,
            beta2,
            epsilon,
            m: HashMap::new(),
            v: HashMap::new(),
            t: 0,
        }
    }

    /// 获取指定参数的动量状态（一阶矩 m）
    pub fn get_momentum(&self, name: &str) -> Option<&Array2<f32>> {
        self.m.get(name)
    }

    /// 获取指定参数的速度状态（二阶矩 v）
    pub fn get_velocity(&self, name: &str) -> Option<&Array2<f32>> {
        self.v.get(name)
    }

    /// 获取当前时间步
    pub const fn timestep(&self) -> usize {
        self.t
    }
}

impl Optimizer for Adam {
    fn step(&mut self, groups: Vec<ParamGroup<'_>>) {
        self.t += 1;
        let bias1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias2 = 1.0 - self.beta2.powi(self.t as i32);

        for group in groups {
            for param in group.params {
                let grad = param.grad() + &(param.value() * group.weight_decay);

                // 更新一阶矩
                let m = self
                    .m
                    .entry(param.name().to_string())
                    .or_insert_with(|| Array2::zeros(grad.raw_dim()));
                *m *= self.beta1;
                m.scaled_add(1.0 - self.beta1, &grad);

                // 更新二阶矩
                let v = self
                    .v
                    .entry(param.name().to_string())
                    .or_insert_with(|| Array2::zeros(grad.raw_dim()));
                *v *= self.beta2;
                v.scaled_add(1.0 - self.beta2, &grad.mapv(|g| g * g));

                // 偏差修正后更新参数
                let eps = self.epsilon;
                let update = ndarray::Zip::from(&*m)
                    .and(&*v)
                    .map_collect(|&mi, &vi| (mi / bias1) / ((vi / bias2).sqrt() + eps));
                param.value_mut().scaled_add(-self.lr, &update);
            }
        }
    }

    fn learning_rate(&self) -> f32 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn reset(&mut self) {
        self.m.clear();
        self.v.clear();
        self.t = 0;
    }
}
