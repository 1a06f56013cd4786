//! Float16 → float32 widening of ONNX models, plus the batch and cleanup
//! tooling around it.

pub mod cleanup;
pub mod config;
pub mod driver;
pub mod dtype;
pub mod model_io;
pub mod onnx;
pub mod rewrite;
pub mod tensor_view;
pub mod walker;

pub use rewrite::{WidenError, WidenReport, widen_graph, widen_model};
