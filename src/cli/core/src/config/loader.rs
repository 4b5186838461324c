/* src/cli/core/src/config/loader.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::PrewarmConfig;

pub const CONFIG_FILE: &str = "prewarm.toml";

/// Walk upward from `start` to find `prewarm.toml`, like Cargo.toml discovery
pub fn find_prewarm_config(start: &Path) -> Result<PathBuf> {
  let mut dir =
    start.canonicalize().with_context(|| format!("failed to canonicalize {}", start.display()))?;
  loop {
    let candidate = dir.join(CONFIG_FILE);
    if candidate.is_file() {
      return Ok(candidate);
    }
    if !dir.pop() {
      bail!("{CONFIG_FILE} not found (searched upward from {})", start.display());
    }
  }
}

/// An explicit `--config` may name the file itself or the directory holding it.
pub fn resolve_explicit_config(path: &Path) -> Result<PathBuf> {
  if path.is_dir() {
    let candidate = path.join(CONFIG_FILE);
    if !candidate.is_file() {
      bail!("no {CONFIG_FILE} in directory {}", path.display());
    }
    return Ok(candidate);
  }
  if !path.is_file() {
    bail!("config file {} does not exist", path.display());
  }
  Ok(path.to_path_buf())
}

pub fn load_prewarm_config(path: &Path) -> Result<PrewarmConfig> {
  let path = resolve_explicit_config(path)?;
  let content =
    std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
  let config: PrewarmConfig =
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
  config.validate().with_context(|| format!("invalid {}", path.display()))?;
  Ok(config)
}
