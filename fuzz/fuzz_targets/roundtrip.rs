#![no_main]

use libfuzzer_sys::fuzz_target;

use ubjson_draft8::{decode_slice, encode_to_vec, DecodeLimits, DecodeOptions, Value};

/// Non-finite floats re-encode as null.
fn changes_kind(v: &Value) -> bool {
    match v {
        Value::Float32(f) => !f.is_finite(),
        Value::Float64(f) => !f.is_finite(),
        Value::Array(items) => items.iter().any(changes_kind),
        Value::Object(map) => map.values().any(changes_kind),
        _ => false,
    }
}

fuzz_target!(|data: &[u8]| {
    let mut limits = DecodeLimits::for_bytes(data.len().min(1 << 20));
    limits.max_depth = 64;
    let opts = DecodeOptions::new().limits(limits);

    let Ok(v) = decode_slice(data, opts) else {
        return;
    };
    if changes_kind(&v) {
        return;
    }
    let bytes = encode_to_vec(&v).expect("decoded values must encode");
    let back = decode_slice(&bytes, DecodeOptions::default()).expect("encoded bytes must decode");
    assert_eq!(back, v);
});
