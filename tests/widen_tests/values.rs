use super::*;
use half::f16;
use onnx_widen::tensor_view::{TensorView, widen_half_bytes};
use proptest::prelude::*;

#[test]
fn every_half_bit_pattern_widens_exactly() {
    let raw: Vec<u8> = (0..=u16::MAX).flat_map(|bits| bits.to_le_bytes()).collect();
    let widened = widen_half_bytes(&raw);
    assert_eq!(widened.len(), raw.len() * 2);

    for (bits, chunk) in (0..=u16::MAX).zip(widened.chunks_exact(4)) {
        let half = f16::from_bits(bits);
        let single = f32::from_le_bytes(chunk.try_into().unwrap());
        if half.is_nan() {
            assert!(single.is_nan(), "{bits:#06x} should stay NaN");
            assert_eq!(
                single.is_sign_negative(),
                half.is_sign_negative(),
                "{bits:#06x} lost its NaN sign"
            );
        } else {
            assert_eq!(single.to_bits(), half.to_f32().to_bits(), "{bits:#06x}");
            // The narrowing direction is exact for every finite or infinite half.
            assert_eq!(f16::from_f32(single).to_bits(), bits, "{bits:#06x}");
        }
    }
}

#[test]
fn special_values() {
    let cases: [(u16, f32); 6] = [
        (0x0000, 0.0),
        (0x8000, -0.0),
        (0x7c00, f32::INFINITY),
        (0xfc00, f32::NEG_INFINITY),
        (0x0001, f32::from_bits(0x3380_0000)),
        (0x7bff, 65504.0),
    ];
    for (bits, expected) in cases {
        let widened = decode_f32(&widen_half_bytes(&bits.to_le_bytes()));
        assert_eq!(widened[0].to_bits(), expected.to_bits(), "{bits:#06x}");
    }
}

#[test]
fn tensor_view_widens_in_place() {
    let mut tensor = half_tensor("w", &[1.0, -2.5, 0.125]);
    tensor.dims = vec![1, 3];
    let added = TensorView::new(&mut tensor).widen_half().unwrap();
    assert_eq!(added, 6);
    assert_eq!(tensor.data_type, FLOAT);
    assert_eq!(tensor.dims, vec![1, 3]);
    assert_eq!(tensor.name, "w");
    assert_eq!(decode_f32(&tensor.raw_data), vec![1.0, -2.5, 0.125]);
}

proptest! {
    #[test]
    fn widening_preserves_length_and_order(bits in prop::collection::vec(any::<u16>(), 0..256)) {
        let raw: Vec<u8> = bits.iter().flat_map(|b| b.to_le_bytes()).collect();
        let widened = decode_f32(&widen_half_bytes(&raw));
        prop_assert_eq!(widened.len(), bits.len());
        for (b, single) in bits.iter().zip(&widened) {
            let half = f16::from_bits(*b);
            if half.is_nan() {
                prop_assert!(single.is_nan());
            } else {
                prop_assert_eq!(single.to_bits(), half.to_f32().to_bits());
            }
        }
    }
}
