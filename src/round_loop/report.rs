//! 实验目录中的 JSON 报告与模型文件清理

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use log::debug;
use serde::Serialize;

use super::history::{ExperimentSummary, RoundHistory};
use crate::errors::ToptimizeError;

pub const STEP_PERF_FILE: &str = "step_perf.json";
pub const RUN_PERF_FILE: &str = "run_perf.json";

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ToptimizeError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    debug!("写入 {}", path.display());
    Ok(())
}

/// 写入一次运行的逐轮精度
pub fn write_step_perf(run_dir: &Path, history: &RoundHistory) -> Result<(), ToptimizeError> {
    write_json(&run_dir.join(STEP_PERF_FILE), history)
}

/// 写入全部运行的汇总
pub fn write_run_perf(exp_dir: &Path, summary: &ExperimentSummary) -> Result<(), ToptimizeError> {
    write_json(&exp_dir.join(RUN_PERF_FILE), summary)
}

/// 删除运行目录下的所有 `.bin` 模型文件，返回删除数量
pub fn remove_models(run_dir: &Path) -> Result<usize, ToptimizeError> {
    let mut removed = 0;
    for entry in fs::read_dir(run_dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "bin") {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// 目录存在则整体删除
pub fn reset_dir(dir: &Path) -> Result<(), ToptimizeError> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}
