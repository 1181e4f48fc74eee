//! GCN 图卷积层
//!
//! `output = Â · (X · W) + b`，其中 Â 为归一化后的传播矩阵
//! （见 `GraphSnapshot::gcn_adjacency`）。

use ndarray::{Array2, Axis};
use rand::Rng;

use crate::nn::{Init, NnError, Param};

/// GCN 图卷积层
///
/// # 输入/输出形状
/// - 输入：[num_nodes, in_features]
/// - 传播矩阵：[num_nodes, num_nodes]
/// - 输出：[num_nodes, out_features]
pub struct GcnConv {
    /// 权重 [in_features, out_features]
    weight: Param,
    /// 偏置 [1, out_features]
    bias: Param,
    /// 前向时的输入，反向计算 dW 用
    input: Option<Array2<f32>>,
}

impl GcnConv {
    pub fn new<R: Rng + ?Sized>(
        in_features: usize,
        out_features: usize,
        name: &str,
        rng: &mut R,
    ) -> Self {
        Self {
            weight: Param::new(
                format!("{name}.weight"),
                Init::Xavier.generate_with_rng((in_features, out_features), rng),
            ),
            bias: Param::new(format!("{name}.bias"), Array2::zeros((1, out_features))),
            input: None,
        }
    }

    pub fn in_features(&self) -> usize {
        self.weight.shape().0
    }

    pub fn out_features(&self) -> usize {
        self.weight.shape().1
    }

    pub fn forward(&mut self, x: &Array2<f32>, adj: &Array2<f32>) -> Result<Array2<f32>, NnError> {
        if x.ncols() != self.in_features() {
            return Err(NnError::shape(
                &[x.nrows(), self.in_features()],
                x.shape(),
                format!("{} 的输入", self.weight.name()),
            ));
        }
        if adj.dim() != (x.nrows(), x.nrows()) {
            return Err(NnError::shape(
                &[x.nrows(), x.nrows()],
                adj.shape(),
                "GCN 传播矩阵",
            ));
        }
        let support = x.dot(self.weight.value());
        let out = adj.dot(&support) + self.bias.value();
        self.input = Some(x.clone());
        Ok(out)
    }

    /// 累积参数梯度并返回对输入的梯度
    ///
    /// - `G = Âᵀ · dO`
    /// - `dW = Xᵀ · G`，`db = Σ_rows dO`，`dX = G · Wᵀ`
    pub fn backward(
        &mut self,
        grad_out: &Array2<f32>,
        adj: &Array2<f32>,
    ) -> Result<Array2<f32>, NnError> {
        let input = self
            .input
            .as_ref()
            .ok_or(NnError::MissingForward("GcnConv"))?;
        let g = adj.t().dot(grad_out);
        let grad_w = input.t().dot(&g);
        let grad_b = grad_out.sum_axis(Axis(0)).insert_axis(Axis(0));
        let grad_x = g.dot(&self.weight.value().t());
        self.weight.accumulate_grad(&grad_w)?;
        self.bias.accumulate_grad(&grad_b)?;
        Ok(grad_x)
    }

    pub fn params(&self) -> [&Param; 2] {
        [&self.weight, &self.bias]
    }

    pub fn params_mut(&mut self) -> Vec<&mut Param> {
        vec![&mut self.weight, &mut self.bias]
    }
}
