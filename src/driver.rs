//! Batch conversion: load, widen, save, one model at a time.

use crate::config::ModelPair;
use crate::model_io::{self, ModelIoError};
use crate::rewrite::{self, WidenError, WidenReport};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Error loading model: {0}")]
    Load(ModelIoError),
    #[error(transparent)]
    Widen(#[from] WidenError),
    #[error("Error saving model: {0}")]
    Save(ModelIoError),
}

#[derive(Debug)]
pub enum ConversionOutcome {
    Converted(WidenReport),
    Skipped,
    Failed(ConversionError),
}

#[derive(Debug)]
pub struct BatchEntry {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outcome: ConversionOutcome,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub entries: Vec<BatchEntry>,
}

impl BatchSummary {
    fn count(&self, f: impl Fn(&ConversionOutcome) -> bool) -> usize {
        self.entries.iter().filter(|x| f(&x.outcome)).count()
    }

    pub fn converted(&self) -> usize {
        self.count(|x| matches!(x, ConversionOutcome::Converted(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|x| matches!(x, ConversionOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|x| matches!(x, ConversionOutcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

/// Converts one model file. The output is written only after the whole model
/// was widened; a model with nothing to widen is copied byte for byte.
pub fn convert_model(input: &Path, output: &Path) -> Result<WidenReport, ConversionError> {
    log::info!("Converting {} to FP32...", input.display());
    let onnx_data = model_io::read_model_bytes(input).map_err(ConversionError::Load)?;
    let mut model = model_io::decode_model(&onnx_data).map_err(ConversionError::Load)?;
    let report = rewrite::widen_model(&mut model)?;
    if report.is_unchanged() {
        log::info!("{} has no float16 data, copying unchanged", input.display());
        model_io::write_model_bytes(output, &onnx_data).map_err(ConversionError::Save)?;
    } else {
        model_io::save_model(output, &model).map_err(ConversionError::Save)?;
    }
    log::info!("Saved FP32 model to {} ({report})", output.display());
    Ok(report)
}

/// Runs every pair under `model_dir`. Missing inputs are skipped and a failed
/// file does not stop the rest of the batch.
pub fn run_batch(model_dir: &Path, pairs: &[ModelPair]) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for pair in pairs {
        let input = model_dir.join(&pair.input);
        let output = model_dir.join(&pair.output);
        let outcome = if !input.exists() {
            log::warn!("Skipping {} (not found)", pair.input);
            ConversionOutcome::Skipped
        } else {
            match convert_model(&input, &output) {
                Ok(report) => ConversionOutcome::Converted(report),
                Err(err) => {
                    log::error!("Error converting {}: {err}", input.display());
                    ConversionOutcome::Failed(err)
                }
            }
        };
        summary.entries.push(BatchEntry {
            input,
            output,
            outcome,
        });
    }
    summary
}
