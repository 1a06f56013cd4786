use half::f16;
use onnx_widen::onnx;

pub mod batch;
pub mod values;

pub const FLOAT16: i32 = onnx::tensor_proto::DataType::Float16 as i32;
pub const FLOAT: i32 = onnx::tensor_proto::DataType::Float as i32;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn half_bytes(values: &[f32]) -> Vec<u8> {
    values
        .iter()
        .flat_map(|v| f16::from_f32(*v).to_le_bytes())
        .collect()
}

pub fn decode_f32(raw: &[u8]) -> Vec<f32> {
    raw.chunks_exact(4)
        .map(|x| f32::from_le_bytes(x.try_into().unwrap()))
        .collect()
}

pub fn half_tensor(name: &str, values: &[f32]) -> onnx::TensorProto {
    onnx::TensorProto {
        name: name.to_string(),
        dims: vec![values.len() as i64],
        data_type: FLOAT16,
        raw_data: half_bytes(values),
        ..Default::default()
    }
}

pub fn tensor_value(name: &str, elem_type: i32) -> onnx::ValueInfoProto {
    onnx::ValueInfoProto {
        name: name.to_string(),
        r#type: Some(onnx::TypeProto {
            value: Some(onnx::type_proto::Value::TensorType(
                onnx::type_proto::Tensor {
                    elem_type,
                    shape: Some(onnx::TensorShapeProto {
                        dim: vec![onnx::tensor_shape_proto::Dimension {
                            value: Some(onnx::tensor_shape_proto::dimension::Value::DimParam(
                                "N".to_string(),
                            )),
                            ..Default::default()
                        }],
                    }),
                },
            )),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn elem_type_of(value: &onnx::ValueInfoProto) -> i32 {
    match value.r#type.as_ref().and_then(|t| t.value.as_ref()) {
        Some(onnx::type_proto::Value::TensorType(t)) => t.elem_type,
        _ => panic!("{} is not a tensor value", value.name),
    }
}

pub fn attr_tensor(name: &str, tensor: onnx::TensorProto) -> onnx::AttributeProto {
    onnx::AttributeProto {
        name: name.to_string(),
        r#type: onnx::attribute_proto::AttributeType::Tensor as i32,
        t: Some(tensor),
        ..Default::default()
    }
}

pub fn attr_int(name: &str, i: i64) -> onnx::AttributeProto {
    onnx::AttributeProto {
        name: name.to_string(),
        r#type: onnx::attribute_proto::AttributeType::Int as i32,
        i,
        ..Default::default()
    }
}

pub fn node(
    op_type: &str,
    inputs: &[&str],
    outputs: &[&str],
    attribute: Vec<onnx::AttributeProto>,
) -> onnx::NodeProto {
    onnx::NodeProto {
        name: format!("{op_type}_{}", outputs.first().unwrap_or(&"")),
        op_type: op_type.to_string(),
        input: inputs.iter().map(|x| x.to_string()).collect(),
        output: outputs.iter().map(|x| x.to_string()).collect(),
        attribute,
        ..Default::default()
    }
}

pub fn model(graph: onnx::GraphProto) -> onnx::ModelProto {
    onnx::ModelProto {
        ir_version: onnx::Version::IrVersion2024325 as i64,
        producer_name: "pytorch".to_string(),
        producer_version: "2.3.0".to_string(),
        opset_import: vec![onnx::OperatorSetIdProto {
            domain: String::new(),
            version: 17,
        }],
        graph: Some(graph),
        ..Default::default()
    }
}

/// A small float16 restoration-style network:
/// `x(f16) -> Conv(w, b) -> Mul(scale) -> Cast(to=f16) -> y(f16)`.
pub fn half_network() -> onnx::ModelProto {
    model(onnx::GraphProto {
        name: "restoration".to_string(),
        initializer: vec![
            half_tensor("conv.weight", &[0.5, -1.25, 2.0, 0.0]),
            half_tensor("conv.bias", &[0.1]),
        ],
        input: vec![tensor_value("x", FLOAT16)],
        output: vec![tensor_value("y", FLOAT16)],
        value_info: vec![
            tensor_value("conv_out", FLOAT16),
            tensor_value("scaled", FLOAT16),
        ],
        node: vec![
            node(
                "Conv",
                &["x", "conv.weight", "conv.bias"],
                &["conv_out"],
                vec![onnx::AttributeProto {
                    name: "kernel_shape".to_string(),
                    r#type: onnx::attribute_proto::AttributeType::Ints as i32,
                    ints: vec![1, 1],
                    ..Default::default()
                }],
            ),
            node(
                "Constant",
                &[],
                &["scale"],
                vec![attr_tensor("value", half_tensor("scale", &[1.5]))],
            ),
            node("Mul", &["conv_out", "scale"], &["scaled"], vec![]),
            node("Cast", &["scaled"], &["y"], vec![attr_int("to", FLOAT16 as i64)]),
        ],
        ..Default::default()
    })
}

/// Collects the element type of every tensor and declaration in a graph,
/// including subgraphs, for "no float16 left" assertions.
pub fn all_elem_types(graph: &onnx::GraphProto, out: &mut Vec<i32>) {
    for t in &graph.initializer {
        out.push(t.data_type);
    }
    for v in graph.input.iter().chain(&graph.output).chain(&graph.value_info) {
        out.push(elem_type_of(v));
    }
    for n in &graph.node {
        for a in &n.attribute {
            if let Some(t) = &a.t {
                out.push(t.data_type);
            }
            for t in &a.tensors {
                out.push(t.data_type);
            }
            if let Some(g) = &a.g {
                all_elem_types(g, out);
            }
            for g in &a.graphs {
                all_elem_types(g, out);
            }
        }
    }
}

/// Records every site that still carries float16 after a pass.
#[derive(Default)]
pub struct HalfFinder {
    pub sites: Vec<onnx_widen::walker::Site>,
}

impl onnx_widen::walker::SiteVisitor for HalfFinder {
    fn visit_tensor(
        &mut self,
        site: &onnx_widen::walker::Site,
        tensor: onnx_widen::tensor_view::TensorView<'_>,
    ) {
        if tensor.is_half() {
            self.sites.push(site.clone());
        }
    }

    fn visit_elem_type(&mut self, site: &onnx_widen::walker::Site, elem_type: &mut i32) {
        if *elem_type == FLOAT16 {
            self.sites.push(site.clone());
        }
    }

    fn visit_cast_target(&mut self, site: &onnx_widen::walker::Site, to: &mut i64) {
        if *to == FLOAT16 as i64 {
            self.sites.push(site.clone());
        }
    }
}

pub fn half_sites(model: &mut onnx::ModelProto) -> Vec<String> {
    let mut finder = HalfFinder::default();
    onnx_widen::walker::GraphWalker::walk_model(&mut finder, model);
    finder.sites.iter().map(|x| x.to_string()).collect()
}
