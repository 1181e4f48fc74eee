//! toptimize 命令行
//!
//! 在一个图数据集上运行"基线 + 多轮自蒸馏/拓扑增强 + 逐轮集成"实验。

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;

use toptimize::data::{JsonGraphDataset, SyntheticGraph};
use toptimize::ensemble::EnsembleStrategy;
use toptimize::nn::ClassifierKind;
use toptimize::round_loop::{RoundLoop, RunConfig, experiment_dir};

#[derive(Parser)]
#[command(name = "toptimize")]
#[command(about = "图拓扑迭代优化实验", long_about = None)]
struct Cli {
    /// 实验别名，实验目录为 `<root>/<alias>_<dataset>_<model>`
    exp_alias: String,

    /// JSON 图数据集文件
    #[arg(short, long, conflicts_with = "synthetic")]
    dataset: Option<PathBuf>,

    /// 使用合成图（CSBM）：节点数
    #[arg(long)]
    synthetic: Option<usize>,

    /// 合成图的类别数
    #[arg(long, default_value_t = 4)]
    synthetic_classes: usize,

    /// 加载 JSON 数据集时按行归一化特征
    #[arg(long)]
    normalize_features: bool,

    /// 基础模型：gcn / gat
    #[arg(short, long)]
    basemodel: Option<ClassifierKind>,

    #[arg(long)]
    total_run: Option<usize>,

    #[arg(long)]
    total_step: Option<usize>,

    #[arg(long)]
    total_epoch: Option<usize>,

    /// 随机种子；未给出时沿用配置文件中的值，两者都没有则随机选取
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(long)]
    hidden_sizes: Option<usize>,

    #[arg(long)]
    lambda1: Option<f32>,

    #[arg(long)]
    lambda2: Option<f32>,

    #[arg(long)]
    tau: Option<f32>,

    #[arg(long, allow_hyphen_values = true)]
    beta: Option<f32>,

    #[arg(long)]
    cold_start_ratio: Option<f32>,

    #[arg(long)]
    use_last_epoch: bool,

    #[arg(long)]
    use_loss_epoch: bool,

    #[arg(long)]
    drop_edge: bool,

    /// 保留逐轮模型文件
    #[arg(long)]
    save_model: bool,

    /// 每轮把增强后的邻接与 gold 邻接比较
    #[arg(long)]
    eval_new_adj: bool,

    /// 统计整次运行新增边的同类比例
    #[arg(long)]
    use_metric: bool,

    /// 集成策略：mean_log_prob / majority_vote
    #[arg(long)]
    ensemble: Option<EnsembleStrategy>,

    /// JSON 配置文件；命令行参数会覆盖其中的值
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 实验根目录
    #[arg(long, default_value = "experiment")]
    output_root: PathBuf,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn run_config(&self) -> anyhow::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_json_file(path)
                .with_context(|| format!("读取配置文件 {} 失败", path.display()))?,
            None => RunConfig::default(),
        };

        if let Some(v) = self.basemodel {
            config.classifier = v;
        }
        if let Some(v) = self.total_run {
            config.total_run = v;
        }
        if let Some(v) = self.total_step {
            config.total_step = v;
        }
        if let Some(v) = self.total_epoch {
            config.total_epoch = v;
        }
        if let Some(v) = self.lambda1 {
            config.lambda1 = v;
        }
        if let Some(v) = self.lambda2 {
            config.lambda2 = v;
        }
        if let Some(v) = self.tau {
            config.tau = v;
        }
        if let Some(v) = self.beta {
            config.beta = v;
        }
        if let Some(v) = self.cold_start_ratio {
            config.cold_start_ratio = v;
        }
        if let Some(v) = self.ensemble {
            config.ensemble = v;
        }
        if self.hidden_sizes.is_some() {
            config.hidden = self.hidden_sizes;
        }
        // 种子优先级：命令行 > 配置文件 > 随机
        match (self.seed, &self.config) {
            (Some(seed), _) => config.seed = seed,
            (None, Some(_)) => {}
            (None, None) => config.seed = u64::from(rand::random::<u32>()),
        }
        config.use_last_epoch |= self.use_last_epoch;
        config.use_loss_epoch |= self.use_loss_epoch;
        config.drop_edge |= self.drop_edge;
        config.keep_models |= self.save_model;
        config.eval_new_adj |= self.eval_new_adj;
        config.use_metric |= self.use_metric;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    let mut config = cli.run_config()?;
    let dataset = match (&cli.dataset, cli.synthetic) {
        (Some(path), _) => JsonGraphDataset::load(path, cli.normalize_features)
            .with_context(|| format!("加载数据集 {} 失败", path.display()))?,
        (None, Some(nodes)) => SyntheticGraph::new(nodes, cli.synthetic_classes)
            .seed(config.seed)
            .generate()?,
        (None, None) => bail!("需要指定 --dataset <json> 或 --synthetic <节点数>"),
    };
    config.output_dir = experiment_dir(&cli.output_root, &cli.exp_alias, dataset.name(), &config);

    log::info!("toptimize v{}", env!("CARGO_PKG_VERSION"));
    log::info!("配置: {}", serde_json::to_string(&config)?);

    let summary = RoundLoop::new(config)?.run_all(&dataset)?;
    println!("{summary}");
    if summary.outcomes.is_empty() {
        bail!("全部 {} 次运行都发散了", summary.failed_runs.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn config_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_config_file_seed_is_kept() {
        let file = config_file(r#"{"seed": 7, "total_step": 2}"#);
        let cli = Cli::try_parse_from([
            "toptimize",
            "exp",
            "--synthetic",
            "20",
            "--config",
            file.path().to_str().unwrap(),
        ])
        .unwrap();
        let config = cli.run_config().unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.total_step, 2);
    }

    #[test]
    fn test_command_line_seed_overrides_config_file() {
        let file = config_file(r#"{"seed": 7}"#);
        let cli = Cli::try_parse_from([
            "toptimize",
            "exp",
            "--synthetic",
            "20",
            "--seed",
            "11",
            "--config",
            file.path().to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(cli.run_config().unwrap().seed, 11);
    }
}
