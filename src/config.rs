use crate::calc::GradeScale;
use crate::input;
use anyhow::{anyhow, Context};
use std::path::{Path, PathBuf};

pub const SCALE_ENV: &str = "GPACALCD_SCALE";
pub const SCALE_FILE_ENV: &str = "GPACALCD_SCALE_FILE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleSource {
    Builtin,
    File,
    Override,
}

impl ScaleSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ScaleSource::Builtin => "builtin",
            ScaleSource::File => "file",
            ScaleSource::Override => "override",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub scale: GradeScale,
    pub source: ScaleSource,
    pub scale_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scale: GradeScale::standard(),
            source: ScaleSource::Builtin,
            scale_file: None,
        }
    }
}

pub fn load_scale_file(path: &Path) -> anyhow::Result<GradeScale> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read scale file {}", path.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("parse scale file {}", path.display()))?;
    let fallback = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("custom");
    input::parse_scale(&raw, fallback).map_err(|e| anyhow!("{}: {}", path.display(), e))
}

/// Resolves the configured scale from explicit values. A scale file wins
/// over a builtin name.
pub fn resolve(scale_name: Option<&str>, scale_file: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = scale_file {
        let scale = load_scale_file(path)?;
        return Ok(Config {
            scale,
            source: ScaleSource::File,
            scale_file: Some(path.to_path_buf()),
        });
    }

    let Some(name) = scale_name.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Config::default());
    };
    let scale = GradeScale::builtin(name).ok_or_else(|| {
        anyhow!(
            "unknown {} value {:?}; expected one of: standard, strict",
            SCALE_ENV,
            name
        )
    })?;
    Ok(Config {
        scale,
        source: ScaleSource::Builtin,
        scale_file: None,
    })
}

pub fn from_env() -> anyhow::Result<Config> {
    let name = std::env::var(SCALE_ENV).ok();
    let file = std::env::var_os(SCALE_FILE_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    resolve(name.as_deref(), file.as_deref())
}
