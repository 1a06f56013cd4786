use crate::dtype::{DType, DTypeError};
use crate::onnx;
use half::f16;

/// Why a half-precision payload could not be widened.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadProblem {
    #[error("raw_data holds {0} bytes, which is not a whole number of float16 elements")]
    OddPayloadLength(usize),
    #[error("raw_data holds {actual} float16 elements but dims describe {expected}")]
    PayloadLengthMismatch { expected: u64, actual: u64 },
    #[error("float16 payload is stored in {0}, only raw_data is supported")]
    UnsupportedEncoding(&'static str),
    #[error("dims describe {0} elements but the tensor carries no payload")]
    MissingPayload(u64),
    #[error("dims contain a negative extent")]
    NegativeDimension,
}

/// Mutable view over one named tensor: element type tag plus raw byte payload.
pub struct TensorView<'a> {
    tensor: &'a mut onnx::TensorProto,
}

impl<'a> TensorView<'a> {
    pub fn new(tensor: &'a mut onnx::TensorProto) -> Self {
        Self { tensor }
    }

    pub fn name(&self) -> &str {
        &self.tensor.name
    }

    pub fn element_type(&self) -> Result<DType, DTypeError> {
        DType::from_onnx_code(self.tensor.data_type)
    }

    pub fn is_half(&self) -> bool {
        self.element_type().is_ok_and(|dtype| dtype == DType::F16)
    }

    pub fn payload(&self) -> &[u8] {
        &self.tensor.raw_data
    }

    /// Product of `dims`; a tensor without dims is a scalar.
    pub fn element_count(&self) -> Option<u64> {
        self.tensor
            .dims
            .iter()
            .try_fold(1u64, |acc, &d| u64::try_from(d).ok().map(|d| acc.saturating_mul(d)))
    }

    fn is_external(&self) -> bool {
        self.tensor.data_location == onnx::tensor_proto::DataLocation::External as i32
            || !self.tensor.external_data.is_empty()
    }

    /// Checks that `raw_data` holds exactly `element_count` elements of
    /// `dtype`, returning that count.
    fn check_payload(&self, dtype: DType) -> Result<u64, PayloadProblem> {
        if self.is_external() {
            return Err(PayloadProblem::UnsupportedEncoding("external data"));
        }
        let Some(elem_size) = dtype.size() else {
            return Err(PayloadProblem::UnsupportedEncoding("string_data"));
        };
        let count = self.element_count().ok_or(PayloadProblem::NegativeDimension)?;
        let raw = &self.tensor.raw_data;
        if raw.is_empty() {
            if !self.tensor.int32_data.is_empty() {
                return Err(PayloadProblem::UnsupportedEncoding("int32_data"));
            }
            if count != 0 {
                return Err(PayloadProblem::MissingPayload(count));
            }
            return Ok(0);
        }
        if raw.len() % elem_size != 0 {
            return Err(PayloadProblem::OddPayloadLength(raw.len()));
        }
        let actual = (raw.len() / elem_size) as u64;
        if actual != count {
            return Err(PayloadProblem::PayloadLengthMismatch {
                expected: count,
                actual,
            });
        }
        Ok(count)
    }

    /// Rewrites a float16 tensor as float32 in place. Returns the number of
    /// payload bytes added. The tensor is untouched when an error is returned.
    pub fn widen_half(&mut self) -> Result<usize, PayloadProblem> {
        self.check_payload(DType::F16)?;
        let widened = widen_half_bytes(&self.tensor.raw_data);
        let added = widened.len() - self.tensor.raw_data.len();
        self.tensor.raw_data = widened;
        self.tensor.data_type = DType::F32.onnx_code();
        Ok(added)
    }
}

/// Converts little-endian binary16 elements to little-endian binary32.
/// Every half value has an exact single-precision representative.
pub fn widen_half_bytes(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len() * 2);
    for chunk in raw.chunks_exact(2) {
        let value = f16::from_le_bytes([chunk[0], chunk[1]]).to_f32();
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}
