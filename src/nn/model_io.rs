//! 逐轮模型文件（save/load）
//!
//! 每轮保存的模型文件除了参数，还带着该轮使用的边表与边权，
//! 集成时每个模型在自己保存时的拓扑上推理。
//!
//! 文件格式：魔数 `TPMD` + u32 小端版本号 + bincode 序列化的 [`RoundArtifact`]

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::NnError;
use super::classifier::ModelState;

/// 模型文件魔数
const MODEL_MAGIC: &[u8; 4] = b"TPMD";
/// 模型文件版本
const MODEL_VERSION: u32 = 1;

/// 一轮训练的产物：模型参数 + 该轮的拓扑
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundArtifact {
    pub step: usize,
    pub state: ModelState,
    pub edge_list: Vec<(usize, usize)>,
    pub edge_weight: Option<Vec<f32>>,
}

impl RoundArtifact {
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), NnError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(MODEL_MAGIC)?;
        writer.write_all(&MODEL_VERSION.to_le_bytes())?;
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NnError> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MODEL_MAGIC {
            return Err(NnError::InvalidModelFile(format!(
                "{} 不是 toptimize 格式的模型文件",
                path.display()
            )));
        }

        let mut version_bytes = [0u8; 4];
        reader.read_exact(&mut version_bytes)?;
        let version = u32::from_le_bytes(version_bytes);
        if version != MODEL_VERSION {
            return Err(NnError::UnsupportedVersion(version));
        }

        Ok(bincode::deserialize_from(reader)?)
    }
}

/// 第 `step` 轮模型的文件名
pub fn model_file_name(step: usize) -> String {
    format!("model_{step}.bin")
}

/// 列出目录中所有 `model_<step>.bin`，按 step 升序
pub fn list_round_artifacts<P: AsRef<Path>>(dir: P) -> Result<Vec<(usize, PathBuf)>, NnError> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        let step = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix("model_"))
            .and_then(|n| n.strip_suffix(".bin"))
            .and_then(|n| n.parse::<usize>().ok());
        if let Some(step) = step {
            found.push((step, path));
        }
    }
    found.sort_by_key(|(step, _)| *step);
    Ok(found)
}
