use std::fs;
use std::path::{Path, PathBuf};

use candle_core::Device;
use serde::{Deserialize, Serialize};

use super::model::{NetworkSize, SongoNet};
use crate::errors::{SongoError, SongoResult};

pub const DEFAULT_CHECKPOINT_DIR: &str = "checkpoints";
pub const LATEST_STEM: &str = "latest";

/// The evaluator runs on CPU; acceleration would be a drop-in `Device`
/// change here and is deliberately not autodetected.
pub fn device() -> Device {
    Device::Cpu
}

/// Sidecar metadata stored next to the safetensors weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMeta {
    pub architecture: String,
    pub hidden_size: usize,
    /// Last completed training iteration.
    pub iteration: usize,
}

pub fn weights_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}.safetensors"))
}

pub fn meta_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}.json"))
}

/// Persists the network as `<dir>/<stem>.safetensors` plus a JSON sidecar.
/// Optimizer moments are not part of the checkpoint; resuming rebuilds the
/// optimizer from the restored weights.
pub fn save_checkpoint(net: &SongoNet, iteration: usize, dir: &Path, stem: &str) -> SongoResult<()> {
    fs::create_dir_all(dir)?;
    net.varmap.save(weights_path(dir, stem))?;

    let meta = CheckpointMeta {
        architecture: net.size().architecture().to_string(),
        hidden_size: net.hidden_size(),
        iteration,
    };
    let file = fs::File::create(meta_path(dir, stem))?;
    serde_json::to_writer_pretty(file, &meta)?;
    Ok(())
}

/// Restores weights into an already-built network of the matching shape.
/// `path` may point at the `.safetensors`, the `.json`, or the bare stem.
pub fn load_checkpoint(net: &mut SongoNet, path: &Path) -> SongoResult<CheckpointMeta> {
    let (weights, meta_file) = checkpoint_files(path);
    let meta: CheckpointMeta = serde_json::from_reader(fs::File::open(&meta_file)?)?;
    if meta.architecture != net.size().architecture() || meta.hidden_size != net.hidden_size() {
        return Err(SongoError::Persistence(format!(
            "checkpoint {} holds {} with hidden size {}, expected {} with hidden size {}",
            weights.display(),
            meta.architecture,
            meta.hidden_size,
            net.size().architecture(),
            net.hidden_size(),
        )));
    }
    net.varmap.load(&weights)?;
    Ok(meta)
}

/// Builds a network of the checkpointed shape and loads it, so callers need
/// not know the architecture in advance.
pub fn open_checkpoint(path: &Path, device: Device) -> SongoResult<(SongoNet, CheckpointMeta)> {
    let (_, meta_file) = checkpoint_files(path);
    let meta: CheckpointMeta = serde_json::from_reader(fs::File::open(&meta_file)?)?;
    let size = NetworkSize::from_architecture(&meta.architecture).ok_or_else(|| {
        SongoError::Persistence(format!("unknown architecture {}", meta.architecture))
    })?;
    let mut net = SongoNet::new(size, meta.hidden_size, device)?;
    let meta = load_checkpoint(&mut net, path)?;
    Ok((net, meta))
}

fn checkpoint_files(path: &Path) -> (PathBuf, PathBuf) {
    let stem = path.with_extension("");
    (stem.with_extension("safetensors"), stem.with_extension("json"))
}
