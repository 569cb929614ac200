//! TLV reader: one marker, its length and its raw payload per call.
//!
//! The reader never looks inside composites. Array and object units stop after their length
//! field; their elements are pulled by the decoder with further calls.

use std::io::Read;

use tracing::trace;

use crate::limits::DecodeLimits;
use crate::marker::{Marker, UNSIZED};
use crate::stream::ByteSource;
use crate::{ErrorCode, UbjsonError};

/// Payload of a [`Unit`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Constants, and containers whose elements follow separately.
    Empty,
    /// Integer markers of any width.
    Int(i64),
    /// `d` marker.
    Float32(f32),
    /// `D` marker.
    Float64(f64),
    /// Raw UTF-8 bytes of a text or decimal marker.
    Raw(Vec<u8>),
}

/// One tag-length-value unit, consumed as soon as it is read.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    /// The marker.
    pub marker: Marker,
    /// Source offset of the marker byte.
    pub offset: u64,
    /// Declared length for short and long markers.
    pub length: Option<u32>,
    /// Numeric value or raw text payload.
    pub payload: Payload,
}

impl Unit {
    /// Returns `true` for an Array/Object header carrying the unsized sentinel.
    #[inline]
    #[must_use]
    pub fn is_unsized(&self) -> bool {
        self.marker.is_streaming_capable() && self.length == Some(u32::from(UNSIZED))
    }
}

/// Read one unit from `src`.
///
/// Unless `allow_noop` is set, Noop markers are consumed and skipped until another marker
/// appears; an exhausted source fails with `NothingToDecode`.
pub fn read_unit<R: Read>(
    src: &mut ByteSource<R>,
    allow_noop: bool,
    limits: &DecodeLimits,
) -> Result<Unit, UbjsonError> {
    let (offset, marker) = loop {
        let off = src.position();
        let b = src
            .next_u8()?
            .ok_or_else(|| UbjsonError::new(ErrorCode::NothingToDecode, off))?;
        let marker =
            Marker::from_byte(b).ok_or_else(|| UbjsonError::new(ErrorCode::InvalidMarker(b), off))?;
        if marker == Marker::Noop && !allow_noop {
            trace!(offset = off, "skipping noop marker");
            continue;
        }
        break (off, marker);
    };

    if let Some(payload) = read_numeric(src, marker)? {
        return Ok(Unit {
            marker,
            offset,
            length: None,
            payload,
        });
    }

    if marker.is_constant() {
        return Ok(Unit {
            marker,
            offset,
            length: None,
            payload: Payload::Empty,
        });
    }

    let length = if marker.is_short() {
        let len = src.read_u8()?;
        if len == UNSIZED && marker.is_text_bearing() {
            return Err(UbjsonError::new(ErrorCode::ReservedLength, offset));
        }
        u32::from(len)
    } else {
        src.read_be_u32()?
    };

    let payload = if marker.is_text_bearing() {
        let len = usize::try_from(length)
            .map_err(|_| UbjsonError::new(ErrorCode::LengthOverflow, offset))?;
        if len > limits.max_text_len {
            return Err(UbjsonError::new(ErrorCode::TextLenLimitExceeded, offset));
        }
        Payload::Raw(src.read_vec(len)?)
    } else {
        Payload::Empty
    };

    Ok(Unit {
        marker,
        offset,
        length: Some(length),
        payload,
    })
}

fn read_numeric<R: Read>(
    src: &mut ByteSource<R>,
    marker: Marker,
) -> Result<Option<Payload>, UbjsonError> {
    let payload = match marker {
        Marker::Int8 => Payload::Int(i64::from(i8::from_be_bytes(src.read_array()?))),
        Marker::Int16 => Payload::Int(i64::from(i16::from_be_bytes(src.read_array()?))),
        Marker::Int32 => Payload::Int(i64::from(i32::from_be_bytes(src.read_array()?))),
        Marker::Int64 => Payload::Int(i64::from_be_bytes(src.read_array()?)),
        Marker::Float32 => Payload::Float32(f32::from_be_bytes(src.read_array()?)),
        Marker::Float64 => Payload::Float64(f64::from_be_bytes(src.read_array()?)),
        _ => return Ok(None),
    };
    Ok(Some(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(bytes: &[u8], allow_noop: bool) -> Result<Unit, UbjsonError> {
        let mut src = ByteSource::new(bytes);
        read_unit(&mut src, allow_noop, &DecodeLimits::default())
    }

    #[test]
    fn reads_numeric_payloads_big_endian() {
        assert_eq!(unit(b"B\x80", false).unwrap().payload, Payload::Int(-128));
        assert_eq!(unit(b"B\x7f", false).unwrap().payload, Payload::Int(127));
        assert_eq!(unit(b"i\x00\x80", false).unwrap().payload, Payload::Int(128));
        assert_eq!(
            unit(b"I\xff\xff\xff\xfe", false).unwrap().payload,
            Payload::Int(-2)
        );
        assert_eq!(
            unit(b"L\x00\x00\x00\x00\x80\x00\x00\x00", false)
                .unwrap()
                .payload,
            Payload::Int(1 << 31)
        );
        assert_eq!(
            unit(b"d\x3f\xc0\x00\x00", false).unwrap().payload,
            Payload::Float32(1.5)
        );
    }

    #[test]
    fn short_text_reads_length_and_bytes() {
        let u = unit(b"s\x03abc", false).unwrap();
        assert_eq!(u.marker, Marker::TextShort);
        assert_eq!(u.length, Some(3));
        assert_eq!(u.payload, Payload::Raw(b"abc".to_vec()));
    }

    #[test]
    fn long_text_reads_four_byte_length() {
        let u = unit(b"S\x00\x00\x00\x02hi", false).unwrap();
        assert_eq!(u.length, Some(2));
        assert_eq!(u.payload, Payload::Raw(b"hi".to_vec()));
    }

    #[test]
    fn containers_stop_after_length() {
        let u = unit(b"a\xffB\x01", false).unwrap();
        assert!(u.is_unsized());
        assert_eq!(u.payload, Payload::Empty);

        let u = unit(b"O\x00\x00\x01\x00", false).unwrap();
        assert_eq!(u.length, Some(256));
        assert!(!u.is_unsized());
    }

    #[test]
    fn short_text_rejects_reserved_length() {
        let err = unit(b"s\xff", false).unwrap_err();
        assert_eq!(err.code, ErrorCode::ReservedLength);
        let err = unit(b"h\xff", false).unwrap_err();
        assert_eq!(err.code, ErrorCode::ReservedLength);
    }

    #[test]
    fn noop_is_skipped_unless_allowed() {
        let u = unit(b"NNNZ", false).unwrap();
        assert_eq!(u.marker, Marker::Null);
        assert_eq!(u.offset, 3);

        assert_eq!(unit(b"NZ", true).unwrap().marker, Marker::Noop);

        let err = unit(b"NN", false).unwrap_err();
        assert_eq!(err.code, ErrorCode::NothingToDecode);
    }

    #[test]
    fn empty_and_invalid_inputs() {
        let err = unit(b"", false).unwrap_err();
        assert_eq!(err.code, ErrorCode::NothingToDecode);
        assert!(err.is_eof());

        let err = unit(b"\x00", false).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidMarker(0x00));

        let err = unit(b"i\x01", false).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedEof);

        let err = unit(b"s\x05ab", false).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedEof);
    }

    #[test]
    fn text_limit_checked_before_reading() {
        let limits = DecodeLimits {
            max_text_len: 2,
            ..DecodeLimits::default()
        };
        let mut src = ByteSource::new(&b"S\xff\xff\xff\xff"[..]);
        let err = read_unit(&mut src, false, &limits).unwrap_err();
        assert_eq!(err.code, ErrorCode::TextLenLimitExceeded);
    }
}
