use super::*;
use onnx_widen::config::ModelPair;
use onnx_widen::driver::{self, ConversionError, ConversionOutcome};
use onnx_widen::model_io;
use onnx_widen::onnx;
use std::path::Path;

fn write_model(path: &Path, model: &onnx::ModelProto) {
    std::fs::write(path, model_io::encode_model(model)).unwrap();
}

fn float_network() -> onnx::ModelProto {
    model(onnx::GraphProto {
        name: "fp32".to_string(),
        initializer: vec![onnx::TensorProto {
            name: "w".to_string(),
            dims: vec![2],
            data_type: FLOAT,
            raw_data: [1.0f32, 2.0].iter().flat_map(|v| v.to_le_bytes()).collect(),
            ..Default::default()
        }],
        input: vec![tensor_value("x", FLOAT)],
        output: vec![tensor_value("y", FLOAT)],
        node: vec![node("Add", &["x", "w"], &["y"], vec![])],
        ..Default::default()
    })
}

#[test]
fn converted_model_reloads_as_float32() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("net-fp16.onnx");
    let output = dir.path().join("net-fp32.onnx");
    write_model(&input, &half_network());

    let report = driver::convert_model(&input, &output).unwrap();
    assert_eq!(report.casts_rewritten, 1);

    let reloaded = model_io::load_model(&output).unwrap();
    let mut types = vec![];
    all_elem_types(reloaded.graph.as_ref().unwrap(), &mut types);
    assert!(types.iter().all(|t| *t == FLOAT));
    // The input file is left alone.
    assert_eq!(
        std::fs::read(&input).unwrap(),
        model_io::encode_model(&half_network())
    );
}

#[test]
fn model_without_half_data_is_copied_byte_for_byte() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plain.onnx");
    let output = dir.path().join("plain-copy.onnx");
    write_model(&input, &float_network());

    let report = driver::convert_model(&input, &output).unwrap();
    assert!(report.is_unchanged());
    assert_eq!(std::fs::read(&input).unwrap(), std::fs::read(&output).unwrap());
}

#[test]
fn unsupported_payload_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.onnx");
    let output = dir.path().join("bad-fp32.onnx");
    let mut bad = half_network();
    bad.graph.as_mut().unwrap().initializer[0].raw_data.push(0);
    write_model(&input, &bad);

    let err = driver::convert_model(&input, &output).unwrap_err();
    assert!(matches!(err, ConversionError::Widen(_)));
    assert!(!output.exists());
}

#[test]
fn batch_skips_missing_and_isolates_failures() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_model(&root.join("a-fp16.onnx"), &half_network());
    std::fs::write(root.join("corrupt-fp16.onnx"), [0xff, 0xff, 0xff]).unwrap();
    write_model(&root.join("plain.onnx"), &float_network());

    let pairs = vec![
        ModelPair::new("missing-fp16.onnx", "missing-fp32.onnx"),
        ModelPair::new("corrupt-fp16.onnx", "corrupt-fp32.onnx"),
        ModelPair::new("a-fp16.onnx", "a-fp32.onnx"),
        ModelPair::new("plain.onnx", "plain-fp32.onnx"),
    ];
    let summary = driver::run_batch(root, &pairs);

    assert_eq!(summary.entries.len(), 4);
    assert!(matches!(summary.entries[0].outcome, ConversionOutcome::Skipped));
    assert!(matches!(
        summary.entries[1].outcome,
        ConversionOutcome::Failed(ConversionError::Load(_))
    ));
    assert!(matches!(summary.entries[2].outcome, ConversionOutcome::Converted(_)));
    assert!(matches!(summary.entries[3].outcome, ConversionOutcome::Converted(_)));
    assert_eq!(
        (summary.converted(), summary.skipped(), summary.failed()),
        (2, 1, 1)
    );
    assert!(summary.has_failures());

    assert!(!root.join("missing-fp32.onnx").exists());
    assert!(!root.join("corrupt-fp32.onnx").exists());
    assert!(root.join("a-fp32.onnx").exists());
    assert_eq!(
        std::fs::read(root.join("plain.onnx")).unwrap(),
        std::fs::read(root.join("plain-fp32.onnx")).unwrap()
    );
}

#[test]
fn batch_output_can_replace_input() {
    let dir = tempfile::tempdir().unwrap();
    write_model(&dir.path().join("net.onnx"), &half_network());
    let summary = driver::run_batch(dir.path(), &[ModelPair::new("net.onnx", "net.onnx")]);
    assert!(!summary.has_failures());
    let reloaded = model_io::load_model(&dir.path().join("net.onnx")).unwrap();
    assert_eq!(reloaded.graph.unwrap().initializer[0].data_type, FLOAT);
}

#[test]
fn device_configuration_survives_conversion() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sharded-fp16.onnx");
    let output = dir.path().join("sharded-fp32.onnx");
    let mut sharded = half_network();
    sharded.configuration = vec![onnx::DeviceConfigurationProto {
        name: "pair".to_string(),
        num_devices: 2,
        device: vec!["cuda:0".to_string(), "cuda:1".to_string()],
    }];
    let device_configuration = onnx::NodeDeviceConfigurationProto {
        configuration_id: "pair".to_string(),
        sharding_spec: vec![onnx::ShardingSpecProto {
            tensor_name: "conv.weight".to_string(),
            device: vec![0, 1],
            sharded_dim: vec![onnx::ShardedDimProto {
                axis: 0,
                simple_sharding: vec![onnx::SimpleShardedDimProto {
                    dim: Some(onnx::simple_sharded_dim_proto::Dim::DimValue(4)),
                    num_shards: 2,
                }],
            }],
            ..Default::default()
        }],
        pipeline_stage: 1,
    };
    sharded.graph.as_mut().unwrap().node[0].device_configurations =
        vec![device_configuration.clone()];
    write_model(&input, &sharded);

    driver::convert_model(&input, &output).unwrap();
    let reloaded = model_io::load_model(&output).unwrap();
    assert_eq!(reloaded.configuration, sharded.configuration);
    assert_eq!(
        reloaded.graph.unwrap().node[0].device_configurations,
        vec![device_configuration]
    );
}
