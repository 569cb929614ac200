use core::str::FromStr;
use std::collections::BTreeMap;

use ubjson_draft8::{
    decode_slice, encode_into, encode_to_vec, BigDecimal, DecodeOptions, Encoder, ErrorCode,
    ErrorKind, Map, Noop, UbjsonError, Value,
};

fn encode_one(f: impl FnOnce(&mut Encoder) -> Result<(), UbjsonError>) -> Vec<u8> {
    let mut enc = Encoder::new();
    f(&mut enc).unwrap();
    enc.into_vec()
}

#[test]
fn constants() {
    assert_eq!(encode_one(Encoder::noop), b"N");
    assert_eq!(encode_one(Encoder::null), b"Z");
    assert_eq!(encode_one(|e| e.bool(true)), b"T");
    assert_eq!(encode_one(|e| e.bool(false)), b"F");
    assert_eq!(encode_to_vec(&()).unwrap(), b"Z");
    assert_eq!(encode_to_vec(&Noop).unwrap(), b"N");
}

#[test]
fn integer_width_boundaries() {
    assert_eq!(encode_one(|e| e.int(0)), b"B\x00");
    assert_eq!(encode_one(|e| e.int(127)), b"B\x7f");
    assert_eq!(encode_one(|e| e.int(-128)), b"B\x80");
    assert_eq!(encode_one(|e| e.int(128)), b"i\x00\x80");
    assert_eq!(encode_one(|e| e.int(-129)), b"i\xff\x7f");
    assert_eq!(encode_one(|e| e.int(32_767)), b"i\x7f\xff");
    assert_eq!(encode_one(|e| e.int(32_768)), b"I\x00\x00\x80\x00");
    assert_eq!(encode_one(|e| e.int(-2_147_483_648)), b"I\x80\x00\x00\x00");
    assert_eq!(
        encode_one(|e| e.int(1 << 31)),
        b"L\x00\x00\x00\x00\x80\x00\x00\x00"
    );
    assert_eq!(
        encode_one(|e| e.int(i64::MIN)),
        b"L\x80\x00\x00\x00\x00\x00\x00\x00"
    );
}

#[test]
fn integers_beyond_i64_become_decimal() {
    let bytes = encode_to_vec(&u64::MAX).unwrap();
    assert_eq!(bytes, b"h\x1418446744073709551615");

    let bytes = encode_to_vec(&(i128::from(i64::MIN) - 1)).unwrap();
    assert_eq!(bytes, b"h\x14-9223372036854775809");

    assert_eq!(encode_to_vec(&(i64::MAX as u64)).unwrap()[0], b'L');
    assert_eq!(encode_to_vec(&7u128).unwrap(), b"B\x07");
}

#[test]
fn primitive_integer_impls_use_narrowest_width() {
    assert_eq!(encode_to_vec(&200u8).unwrap(), b"i\x00\xc8");
    assert_eq!(encode_to_vec(&-1i8).unwrap(), b"B\xff");
    assert_eq!(encode_to_vec(&70_000u32).unwrap(), b"I\x00\x01\x11\x70");
    assert_eq!(encode_to_vec(&5usize).unwrap(), b"B\x05");
    assert_eq!(encode_to_vec(&-5isize).unwrap(), b"B\xfb");
}

#[test]
fn float_prefers_exact_float32() {
    let mut expected = vec![b'd'];
    expected.extend_from_slice(&1.5f32.to_be_bytes());
    assert_eq!(encode_one(|e| e.float(1.5)), expected);
    assert_eq!(encode_to_vec(&1.5f32).unwrap(), expected);

    let mut expected = vec![b'd'];
    expected.extend_from_slice(&0.0f32.to_be_bytes());
    assert_eq!(encode_one(|e| e.float(0.0)), expected);
}

#[test]
fn float_keeps_float64_when_narrowing_loses_bits() {
    let mut expected = vec![b'D'];
    expected.extend_from_slice(&0.1f64.to_be_bytes());
    assert_eq!(encode_one(|e| e.float(0.1)), expected);

    let mut expected = vec![b'D'];
    expected.extend_from_slice(&1.0e300f64.to_be_bytes());
    assert_eq!(encode_one(|e| e.float(1.0e300)), expected);
}

#[test]
fn non_finite_floats_encode_as_null() {
    assert_eq!(encode_one(|e| e.float(f64::INFINITY)), b"Z");
    assert_eq!(encode_one(|e| e.float(f64::NEG_INFINITY)), b"Z");
    assert_eq!(encode_one(|e| e.float(f64::NAN)), b"Z");
    assert_eq!(encode_one(|e| e.float32(f32::NAN)), b"Z");
}

#[test]
fn subnormal_floats_encode_as_exact_decimal() {
    let bytes = encode_one(|e| e.float(5e-324));
    assert_eq!(bytes[0], b'H');
    let len = u32::from_be_bytes(bytes[1..5].try_into().unwrap()) as usize;
    assert_eq!(bytes.len(), 5 + len);
    let text = core::str::from_utf8(&bytes[5..]).unwrap();
    let d = BigDecimal::from_str(text).unwrap();
    assert!(d > BigDecimal::from_str("4.9e-324").unwrap());
    assert!(d < BigDecimal::from_str("5.0e-324").unwrap());
}

#[test]
fn mixed_width_floats_roundtrip_as_equal_values() {
    let v = Value::from(vec![
        Value::Float64(1.5),
        Value::Float64(0.0),
        Value::Float64(-0.1),
        Value::Float32(1e-40),
        Value::Float32(3.25),
        Value::Float64(5e-324),
        Value::Float64(f64::MAX),
    ]);
    let bytes = encode_to_vec(&v).unwrap();
    let back = decode_slice(&bytes, DecodeOptions::default()).unwrap();
    assert_eq!(back, v);

    let items = back.as_array().unwrap();
    assert!(matches!(items[0], Value::Float32(_)));
    assert!(matches!(items[3], Value::Float64(_)));
    assert!(matches!(items[5], Value::Decimal(_)));
}

#[test]
fn text_length_prefix_boundaries() {
    let s = "a".repeat(254);
    let bytes = encode_one(|e| e.text(&s));
    assert_eq!(&bytes[..2], b"s\xfe");
    assert_eq!(bytes.len(), 2 + 254);

    let s = "a".repeat(255);
    let bytes = encode_one(|e| e.text(&s));
    assert_eq!(&bytes[..5], b"S\x00\x00\x00\xff");
    assert_eq!(&bytes[5..], s.as_bytes());

    assert_eq!(encode_one(|e| e.text("")), b"s\x00");
}

#[test]
fn text_length_counts_utf8_bytes() {
    assert_eq!(encode_one(|e| e.text("é")), b"s\x02\xc3\xa9");
}

#[test]
fn decimal_text() {
    let d = BigDecimal::from_str("18.5").unwrap();
    assert_eq!(encode_to_vec(&d).unwrap(), b"h\x0418.5");
}

#[test]
fn sized_array_from_collections() {
    assert_eq!(encode_to_vec(&vec![1i64, 2]).unwrap(), b"a\x02B\x01B\x02");
    assert_eq!(encode_to_vec(&[true, false]).unwrap(), b"a\x02TF");
    assert_eq!(encode_to_vec(&Vec::<i64>::new()).unwrap(), b"a\x00");
    let slice: &[&str] = &["x"];
    assert_eq!(encode_to_vec(slice).unwrap(), b"a\x01s\x01x");
}

#[test]
fn sized_array_switches_to_long_form_at_255() {
    let items = vec![(); 254];
    let bytes = encode_to_vec(&items).unwrap();
    assert_eq!(&bytes[..2], b"a\xfe");

    let items = vec![(); 255];
    let bytes = encode_to_vec(&items).unwrap();
    assert_eq!(&bytes[..5], b"A\x00\x00\x00\xff");
    assert_eq!(bytes.len(), 5 + 255);
}

#[test]
fn sized_object_from_maps() {
    let mut m = BTreeMap::new();
    m.insert("a", 1i64);
    m.insert("b", 2i64);
    assert_eq!(
        encode_to_vec(&m).unwrap(),
        b"o\x02s\x01aB\x01s\x01bB\x02"
    );

    let mut map = Map::new();
    map.insert("z", Value::Null);
    map.insert("a", Value::Bool(true));
    assert_eq!(encode_to_vec(&map).unwrap(), b"o\x02s\x01zZs\x01aT");
}

#[test]
fn sized_object_switches_to_long_form_at_255() {
    let m: BTreeMap<String, ()> = (0..255).map(|i| (format!("{i:03}"), ())).collect();
    let bytes = encode_to_vec(&m).unwrap();
    assert_eq!(&bytes[..5], b"O\x00\x00\x00\xff");
}

#[test]
fn sized_object_rejects_non_text_keys() {
    let mut m = BTreeMap::new();
    m.insert(1i64, "one");
    let err = encode_to_vec(&m).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Encode);
    assert_eq!(err.code, ErrorCode::ObjectKeyMustBeText);
}

#[test]
fn option_encodes_inner_or_null() {
    assert_eq!(encode_to_vec(&Some(1i64)).unwrap(), b"B\x01");
    assert_eq!(encode_to_vec(&None::<i64>).unwrap(), b"Z");
}

#[test]
fn value_tree() {
    let mut map = Map::new();
    map.insert("n", Value::Int(300));
    map.insert("l", Value::from(vec![Value::Null, Value::from("x")]));
    let bytes = encode_to_vec(&Value::Object(map)).unwrap();
    assert_eq!(bytes, b"o\x02s\x01ni\x01\x2cs\x01la\x02Zs\x01x");
}

#[test]
fn array_stream_is_unsized() {
    let bytes = encode_one(|e| e.array_stream(1..=2i64));
    assert_eq!(bytes, b"a\xffB\x01B\x02E");
    assert_eq!(encode_one(|e| e.array_stream(Vec::<i64>::new())), b"a\xffE");
}

#[test]
fn object_stream_is_unsized() {
    let pairs = vec![("a", Value::Int(1)), ("b", Value::Null)];
    let bytes = encode_one(|e| e.object_stream(pairs));
    assert_eq!(bytes, b"o\xffs\x01aB\x01s\x01bZE");
}

#[test]
fn object_stream_rejects_non_text_keys() {
    let mut enc = Encoder::new();
    let err = enc
        .object_stream(vec![(Value::Int(1), Value::Null)])
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Encode);
    assert_eq!(err.code, ErrorCode::StreamKeyMustBeText);
    assert_eq!(err.offset, 2);
}

struct LyingIter(usize);

impl Iterator for LyingIter {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if self.0 == 0 {
            return None;
        }
        self.0 -= 1;
        Some(0)
    }
}

impl ExactSizeIterator for LyingIter {
    fn len(&self) -> usize {
        self.0 + 1
    }
}

#[test]
fn seq_detects_length_mismatch() {
    let err = Encoder::new().seq(LyingIter(2)).unwrap_err();
    assert_eq!(err.code, ErrorCode::LengthMismatch);
}

#[test]
fn encode_into_writer_matches_vec() {
    let v = vec![Value::from("hello"), Value::Int(-1)];
    let expected = encode_to_vec(&v).unwrap();
    let written = encode_into(&v, Vec::new()).unwrap();
    assert_eq!(written, expected);

    let mut enc = Encoder::from_writer(std::io::Cursor::new(Vec::new()));
    enc.encode(&v).unwrap();
    assert_eq!(enc.position(), expected.len() as u64);
    assert_eq!(enc.into_inner().into_inner(), expected);
}

#[derive(Debug)]
struct FailingWriter;

impl std::io::Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn writer_errors_surface_as_io() {
    let err = encode_into(&1i64, FailingWriter).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Io);
    assert_eq!(err.code, ErrorCode::Io(std::io::ErrorKind::BrokenPipe));
}
