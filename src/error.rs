use core::fmt;

use thiserror::Error;

use crate::value::ValueKind;

/// The high-level class of an error.
///
/// - **EndOfStream**: required bytes were not available (including an empty source).
/// - **Marker**: an unrecognized, misplaced or disabled marker byte.
/// - **KeyType**: a decoded object key did not come from a text marker.
/// - **Encode**: a value could not be represented on the wire.
/// - **Malformed**: a well-framed unit carried an invalid payload or violated limits.
/// - **Io**: the underlying reader or writer failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source exhausted.
    EndOfStream,
    /// Invalid marker.
    Marker,
    /// Object key was not text.
    KeyType,
    /// Encoding failure.
    Encode,
    /// Invalid payload or limit violation.
    Malformed,
    /// Reader/writer failure.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EndOfStream => "end of stream",
            Self::Marker => "marker error",
            Self::KeyType => "key type error",
            Self::Encode => "encode error",
            Self::Malformed => "malformed input",
            Self::Io => "i/o error",
        })
    }
}

/// A structured error code identifying why a unit or value was rejected.
///
/// Codes are `Copy` and carry the offending marker byte where one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The source was empty where a marker was expected.
    #[error("nothing to decode")]
    NothingToDecode,
    /// The source ended inside a length or payload.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// An unsized object ended after a key without its value.
    #[error("value missing for key")]
    MissingValue,

    /// A byte outside the Draft-8 marker table.
    #[error("invalid marker 0x{0:02x}")]
    InvalidMarker(u8),
    /// Noop or EOS where a sized container expected an element.
    #[error("invalid marker occurs: 0x{0:02x}")]
    UnexpectedMarker(u8),
    /// A marker removed from the session's dispatch table.
    #[error("unsupported marker 0x{0:02x}")]
    UnsupportedMarker(u8),

    /// An object key was decoded from a non-text marker.
    #[error("key should be string, got marker 0x{0:02x}")]
    KeyMustBeText(u8),

    /// Text or decimal payload is not valid UTF-8.
    #[error("text must be valid UTF-8")]
    Utf8Invalid,
    /// Decimal payload is not a parsable decimal number.
    #[error("invalid decimal text")]
    InvalidDecimal,
    /// A short text or decimal header declared the reserved length 255.
    #[error("invalid string length 255")]
    ReservedLength,
    /// Arithmetic overflow computing a length.
    #[error("length overflow")]
    LengthOverflow,
    /// Bytes remained after a single-value slice decode.
    #[error("trailing bytes after value")]
    TrailingBytes,
    /// Nesting depth limit exceeded.
    #[error("nesting depth limit exceeded")]
    DepthLimitExceeded,
    /// Container count exceeds limits.
    #[error("container length exceeds decode limits")]
    ContainerLenLimitExceeded,
    /// Text or decimal length exceeds limits.
    #[error("text length exceeds decode limits")]
    TextLenLimitExceeded,

    /// No encoding rule for the value kind and no fallback configured.
    #[error("unable to encode {0} value")]
    UnsupportedKind(ValueKind),
    /// The fallback chain exceeded its configured depth.
    #[error("encode fallback depth exceeded")]
    FallbackDepthExceeded,
    /// A fallback declined to transform a value.
    #[error("encode fallback rejected value")]
    FallbackRejected,
    /// A sized object entry used a key that does not encode as text.
    #[error("object key must be text")]
    ObjectKeyMustBeText,
    /// An unsized object pair used a key that does not encode as text.
    #[error("invalid object key in stream")]
    StreamKeyMustBeText,
    /// A sized sequence yielded a different number of items than it declared.
    #[error("sequence length does not match its declared count")]
    LengthMismatch,

    /// The reader or writer failed.
    #[error("i/o failure: {0:?}")]
    Io(std::io::ErrorKind),
}

impl ErrorCode {
    /// The class this code belongs to.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::NothingToDecode | Self::UnexpectedEof | Self::MissingValue => {
                ErrorKind::EndOfStream
            }
            Self::InvalidMarker(_) | Self::UnexpectedMarker(_) | Self::UnsupportedMarker(_) => {
                ErrorKind::Marker
            }
            Self::KeyMustBeText(_) => ErrorKind::KeyType,
            Self::Utf8Invalid
            | Self::InvalidDecimal
            | Self::ReservedLength
            | Self::LengthOverflow
            | Self::TrailingBytes
            | Self::DepthLimitExceeded
            | Self::ContainerLenLimitExceeded
            | Self::TextLenLimitExceeded => ErrorKind::Malformed,
            Self::UnsupportedKind(_)
            | Self::FallbackDepthExceeded
            | Self::FallbackRejected
            | Self::ObjectKeyMustBeText
            | Self::StreamKeyMustBeText
            | Self::LengthMismatch => ErrorKind::Encode,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// A UBJSON error with classification, a stable code, and a byte offset.
///
/// For decode errors `offset` is the position in the source where the failing unit started
/// (or where the read failed). For encode errors it is the number of bytes written so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("ubjson {kind} at byte {offset}: {code}")]
pub struct UbjsonError {
    /// The error kind.
    pub kind: ErrorKind,
    /// The error code.
    pub code: ErrorCode,
    /// Byte offset where the error was detected.
    pub offset: u64,
}

impl UbjsonError {
    /// Construct an error at `offset`; the kind is derived from the code.
    #[inline]
    #[must_use]
    pub const fn new(code: ErrorCode, offset: u64) -> Self {
        Self {
            kind: code.kind(),
            code,
            offset,
        }
    }

    /// Construct the error a fallback returns when it cannot transform a value.
    #[inline]
    #[must_use]
    pub const fn fallback_rejected() -> Self {
        Self::new(ErrorCode::FallbackRejected, 0)
    }

    /// Map an I/O error, folding short reads into `UnexpectedEof`.
    pub(crate) fn io(err: &std::io::Error, offset: u64) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => Self::new(ErrorCode::UnexpectedEof, offset),
            other => Self::new(ErrorCode::Io(other), offset),
        }
    }

    /// Returns true iff the source ran out of bytes.
    #[inline]
    #[must_use]
    pub const fn is_eof(self) -> bool {
        matches!(self.kind, ErrorKind::EndOfStream)
    }
}
