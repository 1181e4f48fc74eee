use ndarray::Array2;

use super::TrainError;

/// 每次 `fit()` 结束时采用哪个 epoch 的权重
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpochSelection {
    /// 验证精度严格更高时才更新
    #[default]
    BestValidation,
    /// 最后一个 epoch
    LastEpoch,
    /// 训练损失最低的 epoch
    LowestLoss,
}

impl EpochSelection {
    /// 两个开关同时打开时报错，不猜优先级
    pub fn from_flags(use_last_epoch: bool, use_loss_epoch: bool) -> Result<Self, TrainError> {
        match (use_last_epoch, use_loss_epoch) {
            (true, true) => Err(TrainError::ConflictingEpochPolicy),
            (true, false) => Ok(Self::LastEpoch),
            (false, true) => Ok(Self::LowestLoss),
            (false, false) => Ok(Self::BestValidation),
        }
    }
}

/// 一次 `fit()` 的参数
///
/// # 使用示例
/// ```ignore
/// // 基线：只有分类损失
/// let opts = FitOptions::new(0, 200);
///
/// // 学生：自蒸馏 + 链接预测
/// let opts = FitOptions::new(step, 300)
///     .teacher(&teacher, 1.0)
///     .link_prediction(10.0)
///     .best_final(&teacher);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FitOptions<'a> {
    pub round: usize,
    pub max_epochs: usize,
    /// 蒸馏损失权重
    pub lambda1: f32,
    /// 链接预测损失权重
    pub lambda2: f32,
    pub link_prediction: bool,
    /// 上一轮的 raw 输出 [N, C]
    pub teacher: Option<&'a Array2<f32>>,
    pub use_last_epoch: bool,
    pub use_loss_epoch: bool,
    /// 链接预测目标的来源；缺省回退到 teacher，再回退到当前输出
    pub best_final: Option<&'a Array2<f32>>,
    /// 只用于离线评估
    pub gold_adjacency: Option<&'a Array2<f32>>,
}

impl<'a> FitOptions<'a> {
    pub fn new(round: usize, max_epochs: usize) -> Self {
        Self {
            round,
            max_epochs,
            lambda1: 0.0,
            lambda2: 0.0,
            link_prediction: false,
            teacher: None,
            use_last_epoch: false,
            use_loss_epoch: false,
            best_final: None,
            gold_adjacency: None,
        }
    }

    pub fn teacher(mut self, teacher: &'a Array2<f32>, lambda1: f32) -> Self {
        self.teacher = Some(teacher);
        self.lambda1 = lambda1;
        self
    }

    pub fn link_prediction(mut self, lambda2: f32) -> Self {
        self.link_prediction = true;
        self.lambda2 = lambda2;
        self
    }

    pub fn best_final(mut self, best_final: &'a Array2<f32>) -> Self {
        self.best_final = Some(best_final);
        self
    }

    pub fn gold_adjacency(mut self, gold: &'a Array2<f32>) -> Self {
        self.gold_adjacency = Some(gold);
        self
    }

    pub fn epoch_flags(mut self, use_last_epoch: bool, use_loss_epoch: bool) -> Self {
        self.use_last_epoch = use_last_epoch;
        self.use_loss_epoch = use_loss_epoch;
        self
    }

    pub fn selection(&self) -> Result<EpochSelection, TrainError> {
        EpochSelection::from_flags(self.use_last_epoch, self.use_loss_epoch)
    }
}
