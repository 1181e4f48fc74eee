//! GAT 图注意力层（稠密掩码实现）
//!
//! 对每个注意力头 h（i 为目标节点，j 为源节点，只在注意力掩码为 1 的位置上归一化）：
//!
//! ```text
//! H_h   = X · W_h
//! Z_ij  = t_i + s_j,  t = H_h · a_dst,  s = H_h · a_src
//! α_i·  = softmax_j( LeakyReLU(Z_ij) )
//! out_h = dropout(α) · H_h
//! ```
//!
//! 多头结果拼接（concat）或取平均，最后加偏置。边权不参与计算。

use ndarray::{Array1, Array2, Axis, s};
use rand::Rng;

use crate::nn::functional::{dropout_mask, leaky_relu, leaky_relu_grad};
use crate::nn::{Init, NnError, Param};

struct HeadCache {
    /// 注意力打分的 LeakyReLU 输入
    logits: Array2<f32>,
    /// softmax 后、dropout 前的注意力系数
    alpha: Array2<f32>,
    /// 注意力 dropout 掩码
    drop_mask: Array2<f32>,
}

struct GatCache {
    input: Array2<f32>,
    projected: Array2<f32>,
    heads: Vec<HeadCache>,
}

/// GAT 图注意力层
pub struct GatConv {
    heads: usize,
    out_per_head: usize,
    concat: bool,
    negative_slope: f32,
    /// 注意力系数上的 dropout 概率
    attention_dropout: f32,
    /// [in_features, heads * out_per_head]
    weight: Param,
    /// [heads, out_per_head]
    att_src: Param,
    att_dst: Param,
    /// [1, heads * out_per_head]（concat）或 [1, out_per_head]
    bias: Param,
    cache: Option<GatCache>,
}

impl GatConv {
    pub fn new<R: Rng + ?Sized>(
        in_features: usize,
        out_per_head: usize,
        heads: usize,
        concat: bool,
        attention_dropout: f32,
        name: &str,
        rng: &mut R,
    ) -> Self {
        let heads = heads.max(1);
        let bias_width = if concat {
            heads * out_per_head
        } else {
            out_per_head
        };
        Self {
            heads,
            out_per_head,
            concat,
            negative_slope: 0.2,
            attention_dropout,
            weight: Param::new(
                format!("{name}.weight"),
                Init::Xavier.generate_with_rng((in_features, heads * out_per_head), rng),
            ),
            att_src: Param::new(
                format!("{name}.att_src"),
                Init::Xavier.generate_with_rng((heads, out_per_head), rng),
            ),
            att_dst: Param::new(
                format!("{name}.att_dst"),
                Init::Xavier.generate_with_rng((heads, out_per_head), rng),
            ),
            bias: Param::new(format!("{name}.bias"), Array2::zeros((1, bias_width))),
            cache: None,
        }
    }

    pub fn in_features(&self) -> usize {
        self.weight.shape().0
    }

    pub fn out_features(&self) -> usize {
        self.bias.shape().1
    }

    pub fn heads(&self) -> usize {
        self.heads
    }

    /// # 参数
    /// - `mask`: 注意力掩码 [N, N]，`mask[i][j] = 1` 表示 j 是 i 的入邻居（含自身）
    /// - `train`: 训练模式下对注意力系数做 dropout
    pub fn forward<R: Rng + ?Sized>(
        &mut self,
        x: &Array2<f32>,
        mask: &Array2<f32>,
        train: bool,
        rng: &mut R,
    ) -> Result<Array2<f32>, NnError> {
        let n = x.nrows();
        if x.ncols() != self.in_features() {
            return Err(NnError::shape(
                &[n, self.in_features()],
                x.shape(),
                format!("{} 的输入", self.weight.name()),
            ));
        }
        if mask.dim() != (n, n) {
            return Err(NnError::shape(&[n, n], mask.shape(), "GAT 注意力掩码"));
        }

        let f = self.out_per_head;
        let projected = x.dot(self.weight.value());
        let mut out = Array2::<f32>::zeros((n, self.out_features()));
        let mut head_caches = Vec::with_capacity(self.heads);

        for h in 0..self.heads {
            let hh = projected.slice(s![.., h * f..(h + 1) * f]);
            let src_score: Array1<f32> = hh.dot(&self.att_src.value().row(h));
            let dst_score: Array1<f32> = hh.dot(&self.att_dst.value().row(h));

            let mut logits = Array2::<f32>::zeros((n, n));
            let mut alpha = Array2::<f32>::zeros((n, n));
            for i in 0..n {
                let mut max = f32::NEG_INFINITY;
                for j in 0..n {
                    if mask[[i, j]] != 0.0 {
                        let z = dst_score[i] + src_score[j];
                        logits[[i, j]] = z;
                        max = max.max(leaky_relu(z, self.negative_slope));
                    }
                }
                if max == f32::NEG_INFINITY {
                    continue;
                }
                let mut sum = 0.0;
                for j in 0..n {
                    if mask[[i, j]] != 0.0 {
                        let e = (leaky_relu(logits[[i, j]], self.negative_slope) - max).exp();
                        alpha[[i, j]] = e;
                        sum += e;
                    }
                }
                alpha.row_mut(i).mapv_inplace(|v| v / sum);
            }

            let drop_mask = if train {
                dropout_mask((n, n), self.attention_dropout, rng)
            } else {
                Array2::ones((n, n))
            };
            let head_out = (&alpha * &drop_mask).dot(&hh);
            if self.concat {
                out.slice_mut(s![.., h * f..(h + 1) * f]).assign(&head_out);
            } else {
                out += &(head_out / self.heads as f32);
            }
            head_caches.push(HeadCache {
                logits,
                alpha,
                drop_mask,
            });
        }

        out += self.bias.value();
        self.cache = Some(GatCache {
            input: x.clone(),
            projected,
            heads: head_caches,
        });
        Ok(out)
    }

    /// 累积参数梯度并返回对输入的梯度
    pub fn backward(&mut self, grad_out: &Array2<f32>) -> Result<Array2<f32>, NnError> {
        let cache = self
            .cache
            .as_ref()
            .ok_or(NnError::MissingForward("GatConv"))?;
        let n = cache.input.nrows();
        let f = self.out_per_head;

        let grad_b = grad_out.sum_axis(Axis(0)).insert_axis(Axis(0));
        let mut grad_projected = Array2::<f32>::zeros(cache.projected.raw_dim());
        let mut grad_att_src = Array2::<f32>::zeros((self.heads, f));
        let mut grad_att_dst = Array2::<f32>::zeros((self.heads, f));

        for (h, head) in cache.heads.iter().enumerate() {
            let hh = cache.projected.slice(s![.., h * f..(h + 1) * f]);
            let grad_head = if self.concat {
                grad_out.slice(s![.., h * f..(h + 1) * f]).to_owned()
            } else {
                grad_out / self.heads as f32
            };

            let dropped = &head.alpha * &head.drop_mask;
            // 通过 α·H 对 H 的梯度
            let mut grad_hh = dropped.t().dot(&grad_head);

            let grad_alpha = grad_head.dot(&hh.t()) * &head.drop_mask;
            // softmax 反向：dE_ij = α_ij (dα_ij - Σ_k α_ik dα_ik)
            let row_dot = (&head.alpha * &grad_alpha).sum_axis(Axis(1));
            let mut grad_logits = Array2::<f32>::zeros((n, n));
            for i in 0..n {
                for j in 0..n {
                    let a = head.alpha[[i, j]];
                    if a != 0.0 {
                        grad_logits[[i, j]] = a
                            * (grad_alpha[[i, j]] - row_dot[i])
                            * leaky_relu_grad(head.logits[[i, j]], self.negative_slope);
                    }
                }
            }
            let grad_dst_score = grad_logits.sum_axis(Axis(1));
            let grad_src_score = grad_logits.sum_axis(Axis(0));

            grad_att_dst
                .row_mut(h)
                .assign(&hh.t().dot(&grad_dst_score));
            grad_att_src
                .row_mut(h)
                .assign(&hh.t().dot(&grad_src_score));

            let a_dst = self.att_dst.value().row(h);
            let a_src = self.att_src.value().row(h);
            for i in 0..n {
                let mut row = grad_hh.row_mut(i);
                row.scaled_add(grad_dst_score[i], &a_dst);
                row.scaled_add(grad_src_score[i], &a_src);
            }

            grad_projected
                .slice_mut(s![.., h * f..(h + 1) * f])
                .assign(&grad_hh);
        }

        let grad_w = cache.input.t().dot(&grad_projected);
        let grad_x = grad_projected.dot(&self.weight.value().t());

        self.weight.accumulate_grad(&grad_w)?;
        self.att_src.accumulate_grad(&grad_att_src)?;
        self.att_dst.accumulate_grad(&grad_att_dst)?;
        self.bias.accumulate_grad(&grad_b)?;
        Ok(grad_x)
    }

    pub fn params(&self) -> [&Param; 4] {
        [&self.weight, &self.att_src, &self.att_dst, &self.bias]
    }

    pub fn params_mut(&mut self) -> Vec<&mut Param> {
        vec![
            &mut self.weight,
            &mut self.att_src,
            &mut self.att_dst,
            &mut self.bias,
        ]
    }
}
