use core::str::FromStr;

use ubjson_draft8::{
    decode_slice, BigDecimal, DecodeOptions, Decoder, ErrorCode, ErrorKind, Map, Marker, Value,
};

fn decode(bytes: &[u8]) -> Value {
    decode_slice(bytes, DecodeOptions::default()).unwrap()
}

fn decode_err(bytes: &[u8]) -> ubjson_draft8::UbjsonError {
    decode_slice(bytes, DecodeOptions::default()).unwrap_err()
}

#[test]
fn empty_source_has_nothing_to_decode() {
    let err = decode_err(b"");
    assert_eq!(err.kind, ErrorKind::EndOfStream);
    assert_eq!(err.code, ErrorCode::NothingToDecode);
    assert_eq!(err.code.to_string(), "nothing to decode");
    assert_eq!(err.offset, 0);
}

#[test]
fn unknown_marker_names_the_byte() {
    let err = decode_err(&[0x00]);
    assert_eq!(err.kind, ErrorKind::Marker);
    assert_eq!(err.code, ErrorCode::InvalidMarker(0x00));

    let err = decode_err(b"x");
    assert_eq!(err.code, ErrorCode::InvalidMarker(b'x'));
}

#[test]
fn constants() {
    assert_eq!(decode(b"Z"), Value::Null);
    assert_eq!(decode(b"T"), Value::Bool(true));
    assert_eq!(decode(b"F"), Value::Bool(false));
}

#[test]
fn noop_run_before_null_is_consumed() {
    let bytes = b"NNNNZ";
    let mut dec = Decoder::from_slice(bytes, DecodeOptions::default());
    assert_eq!(dec.decode_value().unwrap(), Value::Null);
    assert_eq!(dec.position(), 5);
}

#[test]
fn only_noops_is_nothing_to_decode() {
    let err = decode_err(b"NNN");
    assert_eq!(err.code, ErrorCode::NothingToDecode);
}

#[test]
fn noop_surfaces_when_allowed() {
    let opts = DecodeOptions::new().allow_noop(true);
    let mut dec = Decoder::from_slice(b"NZ", opts);
    assert_eq!(dec.decode_value().unwrap(), Value::Noop);
    assert_eq!(dec.decode_value().unwrap(), Value::Null);
}

#[test]
fn integers_are_big_endian_twos_complement() {
    assert_eq!(decode(b"B\x7f"), Value::Int(127));
    assert_eq!(decode(b"B\x80"), Value::Int(-128));
    assert_eq!(decode(b"B\xff"), Value::Int(-1));
    assert_eq!(decode(b"i\x00\x80"), Value::Int(128));
    assert_eq!(decode(b"i\xff\x7f"), Value::Int(-129));
    assert_eq!(decode(b"I\x80\x00\x00\x00"), Value::Int(i64::from(i32::MIN)));
    assert_eq!(
        decode(b"L\x00\x00\x00\x00\x80\x00\x00\x00"),
        Value::Int(1 << 31)
    );
    assert_eq!(
        decode(b"L\x7f\xff\xff\xff\xff\xff\xff\xff"),
        Value::Int(i64::MAX)
    );
}

#[test]
fn floats() {
    let mut bytes = vec![b'd'];
    bytes.extend_from_slice(&1.5f32.to_be_bytes());
    assert_eq!(decode(&bytes), Value::Float32(1.5));

    let mut bytes = vec![b'D'];
    bytes.extend_from_slice(&0.1f64.to_be_bytes());
    assert_eq!(decode(&bytes), Value::Float64(0.1));
}

#[test]
fn text_short_and_long() {
    assert_eq!(decode(b"s\x05hello"), Value::from("hello"));
    assert_eq!(decode(b"s\x00"), Value::from(""));
    assert_eq!(decode(b"S\x00\x00\x00\x02hi"), Value::from("hi"));

    let long = "x".repeat(300);
    let mut bytes = vec![b'S'];
    bytes.extend_from_slice(&300u32.to_be_bytes());
    bytes.extend_from_slice(long.as_bytes());
    assert_eq!(decode(&bytes), Value::Text(long));
}

#[test]
fn short_text_rejects_reserved_length() {
    let err = decode_err(b"s\xff");
    assert_eq!(err.code, ErrorCode::ReservedLength);
    let err = decode_err(b"h\xff");
    assert_eq!(err.code, ErrorCode::ReservedLength);
}

#[test]
fn text_must_be_utf8() {
    let err = decode_err(b"s\x02\xc3\x28");
    assert_eq!(err.kind, ErrorKind::Malformed);
    assert_eq!(err.code, ErrorCode::Utf8Invalid);
}

#[test]
fn decimal_text_parses() {
    assert_eq!(
        decode(b"h\x0418.5"),
        Value::Decimal(BigDecimal::from_str("18.5").unwrap())
    );
    let big = "123456789012345678901234567890";
    let mut bytes = vec![b'h', u8::try_from(big.len()).unwrap()];
    bytes.extend_from_slice(big.as_bytes());
    assert_eq!(
        decode(&bytes),
        Value::Decimal(BigDecimal::from_str(big).unwrap())
    );
}

#[test]
fn decimal_special_spellings_become_floats() {
    assert!(decode(b"h\x03NaN").as_f64().is_some_and(f64::is_nan));
    assert!(decode(b"h\x04sNaN").as_f64().is_some_and(f64::is_nan));
    assert_eq!(decode(b"h\x08Infinity"), Value::Float64(f64::INFINITY));
    assert_eq!(decode(b"h\x09-Infinity"), Value::Float64(f64::NEG_INFINITY));
    assert_eq!(decode(b"h\x04+inf"), Value::Float64(f64::INFINITY));
}

#[test]
fn negative_zero_decimal_keeps_its_sign() {
    let v = decode(b"h\x02-0");
    assert!(matches!(v, Value::Float64(f) if f == 0.0 && f.is_sign_negative()));
    let v = decode(b"h\x04-0.0");
    assert!(v.as_f64().is_some_and(f64::is_sign_negative));
    assert_eq!(decode(b"h\x010"), Value::Decimal(BigDecimal::from(0)));
}

#[test]
fn decimal_rejects_garbage() {
    let err = decode_err(b"h\x03abc");
    assert_eq!(err.code, ErrorCode::InvalidDecimal);
}

#[test]
fn truncated_payloads() {
    let cases: [&[u8]; 5] = [b"i\x00", b"L\x00\x00", b"s\x05hel", b"S\x00\x00", b"a\x02B\x01"];
    for bytes in cases {
        let err = decode_err(bytes);
        assert_eq!(err.kind, ErrorKind::EndOfStream, "{bytes:?}");
        assert_eq!(err.code, ErrorCode::UnexpectedEof, "{bytes:?}");
    }
}

#[test]
fn sized_array() {
    assert_eq!(
        decode(b"a\x03B\x01Zs\x01x"),
        Value::Array(vec![Value::Int(1), Value::Null, Value::from("x")])
    );
    assert_eq!(decode(b"A\x00\x00\x00\x00"), Value::Array(Vec::new()));
}

#[test]
fn sized_array_skips_noop_filler() {
    assert_eq!(
        decode(b"a\x02NB\x01NB\x02"),
        Value::from(vec![1i64, 2])
    );
}

#[test]
fn sized_array_rejects_eos_and_surfaced_noop() {
    let err = decode_err(b"a\x02B\x01E");
    assert_eq!(err.code, ErrorCode::UnexpectedMarker(b'E'));

    let opts = DecodeOptions::new().allow_noop(true);
    let err = decode_slice(b"a\x01N", opts).unwrap_err();
    assert_eq!(err.code, ErrorCode::UnexpectedMarker(b'N'));
}

#[test]
fn nested_unsized_array_is_materialized() {
    let v = decode(b"a\x01a\xffB\x01B\x02E");
    assert_eq!(v, Value::Array(vec![Value::from(vec![1i64, 2])]));
}

#[test]
fn nested_unsized_object_is_materialized() {
    let v = decode(b"o\x01s\x01ko\xffs\x01aB\x01E");
    let inner: Map = [("a", Value::Int(1))].into_iter().collect();
    let outer: Map = [("k", Value::Object(inner))].into_iter().collect();
    assert_eq!(v, Value::Object(outer));
}

#[test]
fn sized_object() {
    let v = decode(b"o\x02s\x01aB\x01S\x00\x00\x00\x01bT");
    let expected: Map = [("a", Value::Int(1)), ("b", Value::Bool(true))]
        .into_iter()
        .collect();
    assert_eq!(v, Value::Object(expected));
}

#[test]
fn sized_object_later_duplicate_wins() {
    let v = decode(b"o\x02s\x01kB\x01s\x01kB\x02");
    let map = v.as_object().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("k"), Some(&Value::Int(2)));
}

#[test]
fn sized_object_requires_text_keys() {
    let err = decode_err(b"o\x01B\x01B\x02");
    assert_eq!(err.kind, ErrorKind::KeyType);
    assert_eq!(err.code, ErrorCode::KeyMustBeText(b'B'));

    let err = decode_err(b"o\x01h\x011B\x02");
    assert_eq!(err.code, ErrorCode::KeyMustBeText(b'h'));
}

#[test]
fn top_level_eos_is_unexpected() {
    let err = decode_err(b"E");
    assert_eq!(err.code, ErrorCode::UnexpectedMarker(Marker::Eos.byte()));
}

#[test]
fn trailing_bytes_are_rejected_by_slice_decode() {
    let err = decode_err(b"ZZ");
    assert_eq!(err.code, ErrorCode::TrailingBytes);
    assert_eq!(err.offset, 1);
}

#[test]
fn trailing_noop_filler_is_skipped() {
    assert_eq!(decode(b"B\x07NNN"), Value::Int(7));
    assert_eq!(decode(b"NB\x07N"), Value::Int(7));

    let err = decode_err(b"B\x07NZ");
    assert_eq!(err.code, ErrorCode::TrailingBytes);
    assert_eq!(err.offset, 2);

    let opts = DecodeOptions::new().allow_noop(true);
    let err = decode_slice(b"ZN", opts).unwrap_err();
    assert_eq!(err.code, ErrorCode::TrailingBytes);
    assert_eq!(decode_slice(b"Z", opts).unwrap(), Value::Null);
}

#[test]
fn values_iterates_until_exhausted() {
    let mut dec = Decoder::from_slice(b"B\x01s\x01xNa\xffZE", DecodeOptions::default());
    let all: Vec<Value> = dec.values().collect::<Result<_, _>>().unwrap();
    assert_eq!(
        all,
        vec![
            Value::Int(1),
            Value::from("x"),
            Value::Array(vec![Value::Null]),
        ]
    );
}

#[test]
fn values_reports_mid_value_truncation() {
    let mut dec = Decoder::from_slice(b"Zi\x01", DecodeOptions::default());
    let mut it = dec.values();
    assert_eq!(it.next().unwrap().unwrap(), Value::Null);
    assert_eq!(it.next().unwrap().unwrap_err().code, ErrorCode::UnexpectedEof);
    assert!(it.next().is_none());
}

#[test]
fn read_unit_exposes_tlv() {
    let mut dec = Decoder::from_slice(b"s\x02hia\x03", DecodeOptions::default());
    let unit = dec.read_unit().unwrap();
    assert_eq!(unit.marker, Marker::TextShort);
    assert_eq!(unit.length, Some(2));
    assert_eq!(unit.payload, ubjson_draft8::Payload::Raw(b"hi".to_vec()));

    let unit = dec.read_unit().unwrap();
    assert_eq!(unit.marker, Marker::ArrayShort);
    assert_eq!(unit.offset, 4);
    assert_eq!(unit.length, Some(3));
    assert!(!unit.is_unsized());
}

#[test]
fn decoder_reads_from_io_reader() {
    let cursor = std::io::Cursor::new(b"i\x01\x00".to_vec());
    let mut dec = Decoder::new(cursor);
    assert_eq!(dec.decode_value().unwrap(), Value::Int(256));
    assert_eq!(dec.into_inner().position(), 3);
}
