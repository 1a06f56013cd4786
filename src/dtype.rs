use crate::onnx;

#[derive(Debug, thiserror::Error)]
pub enum DTypeError {
    #[error("The onnx dtype {0:?} is not supported")]
    UnsupportedONNXDtype(onnx::tensor_proto::DataType),
    #[error("Unknown onnx dtype code {0}")]
    UnknownONNXDtypeCode(i32),
}

/// Element types a tensor payload can be sized and decoded as.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum DType {
    F64,
    F32,
    BF16,
    F16,
    U64,
    I64,
    U32,
    I32,
    U16,
    I16,
    U8,
    I8,
    BOOL,
    STRING,
}

impl DType {
    /// Size in bytes of one element in `raw_data`. Strings have no fixed size.
    pub fn size(&self) -> Option<usize> {
        match self {
            DType::F64 => Some(8),
            DType::F32 => Some(4),
            DType::BF16 => Some(2),
            DType::F16 => Some(2),
            DType::U64 => Some(8),
            DType::I64 => Some(8),
            DType::U32 => Some(4),
            DType::I32 => Some(4),
            DType::U16 => Some(2),
            DType::I16 => Some(2),
            DType::U8 => Some(1),
            DType::I8 => Some(1),
            DType::BOOL => Some(1),
            DType::STRING => None,
        }
    }

    pub fn from_onnx_code(code: i32) -> Result<Self, DTypeError> {
        let onnx_dtype = onnx::tensor_proto::DataType::try_from(code)
            .map_err(|_| DTypeError::UnknownONNXDtypeCode(code))?;
        DType::try_from(onnx_dtype)
    }

    pub fn onnx_code(&self) -> i32 {
        onnx::tensor_proto::DataType::from(*self) as i32
    }
}

impl TryFrom<onnx::tensor_proto::DataType> for DType {
    type Error = DTypeError;
    fn try_from(onnx_dtype: onnx::tensor_proto::DataType) -> Result<Self, DTypeError> {
        Ok(match onnx_dtype {
            onnx::tensor_proto::DataType::Double => DType::F64,
            onnx::tensor_proto::DataType::Float => DType::F32,
            onnx::tensor_proto::DataType::Bfloat16 => DType::BF16,
            onnx::tensor_proto::DataType::Float16 => DType::F16,
            onnx::tensor_proto::DataType::Int64 => DType::I64,
            onnx::tensor_proto::DataType::Int32 => DType::I32,
            onnx::tensor_proto::DataType::Uint64 => DType::U64,
            onnx::tensor_proto::DataType::Uint32 => DType::U32,
            onnx::tensor_proto::DataType::Uint16 => DType::U16,
            onnx::tensor_proto::DataType::Int16 => DType::I16,
            onnx::tensor_proto::DataType::Uint8 => DType::U8,
            onnx::tensor_proto::DataType::Int8 => DType::I8,
            onnx::tensor_proto::DataType::Bool => DType::BOOL,
            onnx::tensor_proto::DataType::String => DType::STRING,
            _ => Err(DTypeError::UnsupportedONNXDtype(onnx_dtype))?,
        })
    }
}

impl From<DType> for onnx::tensor_proto::DataType {
    fn from(dtype: DType) -> Self {
        match dtype {
            DType::F64 => onnx::tensor_proto::DataType::Double,
            DType::F32 => onnx::tensor_proto::DataType::Float,
            DType::BF16 => onnx::tensor_proto::DataType::Bfloat16,
            DType::F16 => onnx::tensor_proto::DataType::Float16,
            DType::I64 => onnx::tensor_proto::DataType::Int64,
            DType::I32 => onnx::tensor_proto::DataType::Int32,
            DType::U64 => onnx::tensor_proto::DataType::Uint64,
            DType::U32 => onnx::tensor_proto::DataType::Uint32,
            DType::U16 => onnx::tensor_proto::DataType::Uint16,
            DType::I16 => onnx::tensor_proto::DataType::Int16,
            DType::U8 => onnx::tensor_proto::DataType::Uint8,
            DType::I8 => onnx::tensor_proto::DataType::Int8,
            DType::BOOL => onnx::tensor_proto::DataType::Bool,
            DType::STRING => onnx::tensor_proto::DataType::String,
        }
    }
}
