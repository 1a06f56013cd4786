use crate::onnx::ModelProto;
use prost::{DecodeError, Message};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ModelIoError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    DecodeError(#[from] DecodeError),
    #[error("Model has no graph")]
    MissingGraph,
}

pub fn decode_model(onnx_data: &[u8]) -> Result<ModelProto, ModelIoError> {
    let model = ModelProto::decode(onnx_data)?;
    if model.graph.is_none() {
        Err(ModelIoError::MissingGraph)?;
    }
    Ok(model)
}

pub fn encode_model(model: &ModelProto) -> Vec<u8> {
    model.encode_to_vec()
}

pub fn read_model_bytes(path: &Path) -> Result<Vec<u8>, ModelIoError> {
    std::fs::read(path).map_err(|source| ModelIoError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_model(path: &Path) -> Result<ModelProto, ModelIoError> {
    decode_model(&read_model_bytes(path)?)
}

/// Writes through a temporary file in the destination directory and renames
/// it into place, so a failed write never leaves a truncated model behind.
pub fn write_model_bytes(path: &Path, onnx_data: &[u8]) -> Result<(), ModelIoError> {
    let io_err = |source: std::io::Error| ModelIoError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    temp_file.write_all(onnx_data).map_err(io_err)?;
    temp_file.as_file().sync_all().map_err(io_err)?;
    temp_file.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

pub fn save_model(path: &Path, model: &ModelProto) -> Result<(), ModelIoError> {
    write_model_bytes(path, &encode_model(model))
}
