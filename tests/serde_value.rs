#![cfg(feature = "serde")]

use core::str::FromStr;

use ubjson_draft8::{decode_slice, encode_to_vec, BigDecimal, DecodeOptions, Map, Value};

#[test]
fn value_from_json() {
    let v: Value = serde_json::from_str(r#"{"a":[1,2.5,null,true],"b":"x"}"#).unwrap();
    let expected: Map = [
        (
            "a",
            Value::Array(vec![
                Value::Int(1),
                Value::Float64(2.5),
                Value::Null,
                Value::Bool(true),
            ]),
        ),
        ("b", Value::from("x")),
    ]
    .into_iter()
    .collect();
    assert_eq!(v, Value::Object(expected));
}

#[test]
fn large_unsigned_becomes_decimal() {
    let v: Value = serde_json::from_str("18446744073709551615").unwrap();
    assert_eq!(
        v,
        Value::Decimal(BigDecimal::from_str("18446744073709551615").unwrap())
    );
    let v: Value = serde_json::from_str("42").unwrap();
    assert_eq!(v, Value::Int(42));
}

#[test]
fn value_to_json() {
    let bytes = b"o\x03s\x01nZs\x01dh\x0218s\x01la\x02B\x01s\x01x";
    let v = decode_slice(bytes, DecodeOptions::default()).unwrap();
    let json = serde_json::to_string(&v).unwrap();
    assert_eq!(json, r#"{"n":null,"d":"18","l":[1,"x"]}"#);
}

#[test]
fn json_through_ubjson_and_back() {
    let src = r#"{"name":"ubjson","tags":["a","b"],"size":70000,"ok":false}"#;
    let v: Value = serde_json::from_str(src).unwrap();
    let bytes = encode_to_vec(&v).unwrap();
    let back = decode_slice(&bytes, DecodeOptions::default()).unwrap();
    assert_eq!(back, v);
    assert_eq!(serde_json::to_string(&back).unwrap(), src);
}

#[test]
fn map_rejects_non_objects() {
    let err = serde_json::from_str::<Map>("[1]").unwrap_err();
    assert!(err.to_string().contains("expected object"));
}
