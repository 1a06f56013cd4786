//! Tool configuration, read from JSON.
//!
//! Every field has a default, so an empty object (or no file at all) gives
//! the standard restoration-model batch.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    SerdeJSONError(#[from] serde_json::Error),
}

/// One conversion job, as file names relative to the model directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelPair {
    pub input: String,
    pub output: String,
}

impl ModelPair {
    pub fn new(input: &str, output: &str) -> Self {
        Self {
            input: input.to_string(),
            output: output.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    pub ui_source: PathBuf,
    pub manifest: PathBuf,
    pub asset_root: PathBuf,
    pub asset_suffix: String,
    pub served_dir: Option<String>,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            ui_source: PathBuf::from("src/components/RestorationCard.tsx"),
            manifest: PathBuf::from("scripts/copy-ai-assets.cjs"),
            asset_root: PathBuf::from("."),
            asset_suffix: ".onnx".to_string(),
            served_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WidenConfig {
    pub model_dir: PathBuf,
    pub models: Vec<ModelPair>,
    /// Models the cleanup pass keeps; everything else in `model_dir` goes.
    pub keep_models: Vec<String>,
    pub audit: AuditSettings,
}

impl Default for WidenConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("local_models/restoration"),
            models: vec![
                ModelPair::new(
                    "ffanet-dehazing_indoor-fp16.onnx",
                    "ffanet-dehazing_indoor-fp32.onnx",
                ),
                ModelPair::new(
                    "ffanet-dehazing_outdoor-fp16.onnx",
                    "ffanet-dehazing_outdoor-fp32.onnx",
                ),
                ModelPair::new("mirnet_v2-lowlight-fp16.onnx", "mirnet_v2-lowlight-fp32.onnx"),
                ModelPair::new("mprnet-deraining-fp16.onnx", "mprnet-deraining-fp32.onnx"),
            ],
            keep_models: [
                "mirnet_v2-lowlight-fp16.onnx",
                "mprnet-deraining-fp16.onnx",
                "nafnet-image-deblurringfp16.onnx",
                "nafnet-motion-deblurring-fp16.onnx",
                "nafnet-denoising-fp16.onnx",
                "ffanet-dehazing_indoor-fp16.onnx",
                "ffanet-dehazing_outdoor-fp16.onnx",
            ]
            .iter()
            .map(|x| x.to_string())
            .collect(),
            audit: AuditSettings::default(),
        }
    }
}

impl WidenConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Loads `path` when given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
