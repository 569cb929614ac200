//! Value decoder: turns TLV units into [`Value`]s.
//!
//! Sized containers are read eagerly. An unsized container at the top level is handed to the
//! caller as a lazy, single-pass stream that borrows the decoder; unsized containers nested
//! anywhere else are materialized before they are inserted into their parent.

use core::iter::FusedIterator;
use core::str::FromStr;
use std::io::Read;

use bigdecimal::num_bigint::Sign;
use bigdecimal::BigDecimal;
use tracing::debug;

use crate::marker::{Marker, UNSIZED};
use crate::options::DecodeOptions;
use crate::stream::ByteSource;
use crate::utf8;
use crate::value::{Map, Value};
use crate::wire::{self, Payload, Unit};
use crate::{ErrorCode, UbjsonError};

/// Upper bound on pre-allocated container slots; larger containers grow as elements arrive.
const PREALLOC_ITEMS: usize = 1024;

/// Streaming decoder over a pull-based byte source.
///
/// A decoder exclusively owns its source for the whole session. Its options are copied in at
/// construction.
pub struct Decoder<R> {
    src: ByteSource<R>,
    opts: DecodeOptions,
    depth: usize,
}

/// Result of a top-level decode.
pub enum Decoded<'a, R> {
    /// A fully materialized value.
    Value(Value),
    /// A top-level unsized array, read lazily.
    Array(ArrayStream<'a, R>),
    /// A top-level unsized object, read lazily.
    Object(ObjectStream<'a, R>),
}

impl<'a, R: Read> Decoded<'a, R> {
    /// Returns `true` for the lazy variants.
    #[must_use]
    pub const fn is_stream(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// Materialize the result, draining a lazy stream to its end.
    ///
    /// # Errors
    ///
    /// Returns the first error met while draining the stream.
    pub fn into_value(self) -> Result<Value, UbjsonError> {
        match self {
            Self::Value(v) => Ok(v),
            Self::Array(s) => s.into_vec().map(Value::Array),
            Self::Object(s) => s.into_map().map(Value::Object),
        }
    }
}

impl<R: Read> Decoder<R> {
    /// Construct a decoder with default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, DecodeOptions::default())
    }

    /// Construct a decoder with the provided options.
    pub const fn with_options(reader: R, opts: DecodeOptions) -> Self {
        Self {
            src: ByteSource::new(reader),
            opts,
            depth: 0,
        }
    }

    /// The options this session was built with.
    #[must_use]
    pub const fn options(&self) -> &DecodeOptions {
        &self.opts
    }

    /// Number of bytes consumed from the source.
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.src.position()
    }

    /// Release the source. Its position is wherever decoding stopped.
    pub fn into_inner(self) -> R {
        self.src.into_inner()
    }

    /// Read a single TLV unit without interpreting composites.
    ///
    /// # Errors
    ///
    /// Returns `NothingToDecode` on an exhausted source, `InvalidMarker` for bytes outside the
    /// marker table, or an end-of-stream error for truncated lengths and payloads.
    pub fn read_unit(&mut self) -> Result<Unit, UbjsonError> {
        wire::read_unit(&mut self.src, self.opts.allow_noop, &self.opts.limits)
    }

    /// Decode the next top-level value.
    ///
    /// An unsized array or object is returned as a lazy stream that keeps the decoder
    /// borrowed until it is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is empty, malformed, or uses an unsupported marker.
    pub fn decode(&mut self) -> Result<Decoded<'_, R>, UbjsonError> {
        let unit = self.read_unit()?;
        self.check_dispatch(&unit)?;
        if unit.is_unsized() {
            if unit.marker.is_array() {
                return ArrayStream::open(self, unit.offset).map(Decoded::Array);
            }
            return ObjectStream::open(self, unit.offset).map(Decoded::Object);
        }
        self.value_from_unit(unit).map(Decoded::Value)
    }

    /// Decode the next top-level value, materializing unsized containers.
    ///
    /// # Errors
    ///
    /// See [`Decoder::decode`].
    pub fn decode_value(&mut self) -> Result<Value, UbjsonError> {
        self.decode()?.into_value()
    }

    /// Iterate over successive top-level values until the source is exhausted.
    pub fn values(&mut self) -> Values<'_, R> {
        Values {
            dec: self,
            done: false,
        }
    }

    /// Read a unit inside a container, where running out of input is always premature.
    fn next_element(&mut self) -> Result<Unit, UbjsonError> {
        self.read_unit().map_err(|err| {
            if err.code == ErrorCode::NothingToDecode {
                UbjsonError::new(ErrorCode::UnexpectedEof, err.offset)
            } else {
                err
            }
        })
    }

    fn check_dispatch(&self, unit: &Unit) -> Result<(), UbjsonError> {
        if self.opts.markers.contains(unit.marker) {
            return Ok(());
        }
        Err(UbjsonError::new(
            ErrorCode::UnsupportedMarker(unit.marker.byte()),
            unit.offset,
        ))
    }

    fn value_from_unit(&mut self, unit: Unit) -> Result<Value, UbjsonError> {
        self.check_dispatch(&unit)?;
        let Unit {
            marker,
            offset,
            length,
            payload,
        } = unit;

        match payload {
            Payload::Int(v) => return Ok(Value::Int(v)),
            Payload::Float32(v) => return Ok(Value::Float32(v)),
            Payload::Float64(v) => return Ok(Value::Float64(v)),
            Payload::Raw(bytes) if marker.is_key() => {
                return utf8::into_string(bytes, offset).map(Value::Text);
            }
            Payload::Raw(bytes) => return parse_decimal(&bytes, offset),
            Payload::Empty => {}
        }

        let len = length.unwrap_or(0);
        match marker {
            Marker::Noop => Ok(Value::Noop),
            Marker::Null => Ok(Value::Null),
            Marker::False => Ok(Value::Bool(false)),
            Marker::True => Ok(Value::Bool(true)),
            Marker::ArrayShort | Marker::ArrayLong => {
                if marker.is_streaming_capable() && len == u32::from(UNSIZED) {
                    return ArrayStream::open(self, offset)?.into_vec().map(Value::Array);
                }
                self.sized_array(len, offset).map(Value::Array)
            }
            Marker::ObjectShort | Marker::ObjectLong => {
                if marker.is_streaming_capable() && len == u32::from(UNSIZED) {
                    return ObjectStream::open(self, offset)?.into_map().map(Value::Object);
                }
                self.sized_object(len, offset).map(Value::Object)
            }
            _ => Err(UbjsonError::new(
                ErrorCode::UnexpectedMarker(marker.byte()),
                offset,
            )),
        }
    }

    fn key_from_unit(&self, unit: Unit) -> Result<String, UbjsonError> {
        if !unit.marker.is_key() {
            return Err(UbjsonError::new(
                ErrorCode::KeyMustBeText(unit.marker.byte()),
                unit.offset,
            ));
        }
        self.check_dispatch(&unit)?;
        match unit.payload {
            Payload::Raw(bytes) => utf8::into_string(bytes, unit.offset),
            _ => Err(UbjsonError::new(
                ErrorCode::KeyMustBeText(unit.marker.byte()),
                unit.offset,
            )),
        }
    }

    fn sized_element(&mut self) -> Result<Unit, UbjsonError> {
        let unit = self.next_element()?;
        if unit.marker.is_forbidden_value() {
            return Err(UbjsonError::new(
                ErrorCode::UnexpectedMarker(unit.marker.byte()),
                unit.offset,
            ));
        }
        Ok(unit)
    }

    fn container_len(&self, len: u32, offset: u64) -> Result<usize, UbjsonError> {
        let len =
            usize::try_from(len).map_err(|_| UbjsonError::new(ErrorCode::LengthOverflow, offset))?;
        if len > self.opts.limits.max_container_len {
            return Err(UbjsonError::new(
                ErrorCode::ContainerLenLimitExceeded,
                offset,
            ));
        }
        Ok(len)
    }

    fn sized_array(&mut self, len: u32, offset: u64) -> Result<Vec<Value>, UbjsonError> {
        let len = self.container_len(len, offset)?;
        self.enter(offset)?;
        let res = self.sized_array_items(len);
        self.exit();
        res
    }

    fn sized_array_items(&mut self, len: usize) -> Result<Vec<Value>, UbjsonError> {
        let mut items = Vec::with_capacity(len.min(PREALLOC_ITEMS));
        for _ in 0..len {
            let unit = self.sized_element()?;
            items.push(self.value_from_unit(unit)?);
        }
        Ok(items)
    }

    fn sized_object(&mut self, len: u32, offset: u64) -> Result<Map, UbjsonError> {
        let len = self.container_len(len, offset)?;
        self.enter(offset)?;
        let res = self.sized_object_entries(len);
        self.exit();
        res
    }

    fn sized_object_entries(&mut self, len: usize) -> Result<Map, UbjsonError> {
        let mut map = Map::with_capacity(len.min(PREALLOC_ITEMS));
        for _ in 0..len {
            let key = self.sized_element()?;
            let key = self.key_from_unit(key)?;
            let unit = self.sized_element()?;
            let value = self.value_from_unit(unit)?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<R> Decoder<R> {
    fn enter(&mut self, offset: u64) -> Result<(), UbjsonError> {
        let next = self.depth + 1;
        if next > self.opts.limits.max_depth {
            return Err(UbjsonError::new(ErrorCode::DepthLimitExceeded, offset));
        }
        self.depth = next;
        Ok(())
    }

    fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl<'a> Decoder<&'a [u8]> {
    /// Construct a decoder over an in-memory buffer.
    #[must_use]
    pub fn from_slice(bytes: &'a [u8], opts: DecodeOptions) -> Self {
        Self::with_options(bytes, opts)
    }
}

/// Parse decimal text. NaN, the infinities and negative zero have no `BigDecimal` form and
/// come back as binary64 floats.
fn parse_decimal(bytes: &[u8], offset: u64) -> Result<Value, UbjsonError> {
    let text = utf8::validate(bytes, offset)?;
    if let Some(v) = special_decimal(text) {
        return Ok(Value::Float64(v));
    }
    let d = BigDecimal::from_str(text)
        .map_err(|_| UbjsonError::new(ErrorCode::InvalidDecimal, offset))?;
    if d.sign() == Sign::NoSign && text.starts_with('-') {
        return Ok(Value::Float64(-0.0));
    }
    Ok(Value::Decimal(d))
}

fn special_decimal(text: &str) -> Option<f64> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let v = if body.eq_ignore_ascii_case("nan") || body.eq_ignore_ascii_case("snan") {
        f64::NAN
    } else if body.eq_ignore_ascii_case("infinity") || body.eq_ignore_ascii_case("inf") {
        f64::INFINITY
    } else {
        return None;
    };
    Some(if negative { -v } else { v })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Open,
    Finished,
    Failed,
}

/// Lazy, single-pass reader over an unsized array.
///
/// Yields elements until the EOS marker. After the first error the stream yields nothing
/// more; the source is left wherever the error occurred.
pub struct ArrayStream<'a, R> {
    dec: &'a mut Decoder<R>,
    state: StreamState,
}

impl<'a, R: Read> ArrayStream<'a, R> {
    fn open(dec: &'a mut Decoder<R>, offset: u64) -> Result<Self, UbjsonError> {
        dec.enter(offset)?;
        debug!(offset, "opened unsized array");
        Ok(Self {
            dec,
            state: StreamState::Open,
        })
    }

    /// Returns `true` once the EOS marker has been consumed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == StreamState::Finished
    }

    /// Drain the remaining elements. Noop elements are dropped.
    ///
    /// # Errors
    ///
    /// Returns the first element error.
    pub fn into_vec(mut self) -> Result<Vec<Value>, UbjsonError> {
        let mut items = Vec::new();
        for item in self.by_ref() {
            let item = item?;
            if !item.is_noop() {
                items.push(item);
            }
        }
        Ok(items)
    }

    fn next_item(&mut self) -> Result<Option<Value>, UbjsonError> {
        let unit = self.dec.next_element()?;
        if unit.marker == Marker::Eos {
            return Ok(None);
        }
        self.dec.value_from_unit(unit).map(Some)
    }
}

impl<R: Read> Iterator for ArrayStream<'_, R> {
    type Item = Result<Value, UbjsonError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state != StreamState::Open {
            return None;
        }
        match self.next_item() {
            Ok(Some(v)) => Some(Ok(v)),
            Ok(None) => {
                self.state = StreamState::Finished;
                debug!(offset = self.dec.position(), "closed unsized array");
                None
            }
            Err(err) => {
                self.state = StreamState::Failed;
                debug!(error = %err, "unsized array failed");
                Some(Err(err))
            }
        }
    }
}

impl<R: Read> FusedIterator for ArrayStream<'_, R> {}

impl<R> Drop for ArrayStream<'_, R> {
    fn drop(&mut self) {
        self.dec.exit();
    }
}

/// One item of an unsized object.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEntry {
    /// A key and its value.
    Pair(String, Value),
    /// A Noop marker in key position, surfaced only when Noop markers are allowed.
    Noop,
}

/// Lazy, single-pass reader over an unsized object.
///
/// Keys must come from text markers. A Noop marker between a key and its value is filler and
/// is discarded; an EOS marker there fails with `MissingValue`.
pub struct ObjectStream<'a, R> {
    dec: &'a mut Decoder<R>,
    state: StreamState,
    pending: Option<String>,
}

impl<'a, R: Read> ObjectStream<'a, R> {
    fn open(dec: &'a mut Decoder<R>, offset: u64) -> Result<Self, UbjsonError> {
        dec.enter(offset)?;
        debug!(offset, "opened unsized object");
        Ok(Self {
            dec,
            state: StreamState::Open,
            pending: None,
        })
    }

    /// Returns `true` once the EOS marker has been consumed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == StreamState::Finished
    }

    /// Drain the remaining pairs into a map. Noop entries are dropped and later duplicate
    /// keys replace earlier values.
    ///
    /// # Errors
    ///
    /// Returns the first pair error.
    pub fn into_map(mut self) -> Result<Map, UbjsonError> {
        let mut map = Map::new();
        for entry in self.by_ref() {
            if let StreamEntry::Pair(k, v) = entry? {
                map.insert(k, v);
            }
        }
        Ok(map)
    }

    fn next_entry(&mut self) -> Result<Option<StreamEntry>, UbjsonError> {
        loop {
            let unit = self.dec.next_element()?;
            match (unit.marker, self.pending.is_some()) {
                (Marker::Noop, false) => return Ok(Some(StreamEntry::Noop)),
                (Marker::Noop, true) => continue,
                (Marker::Eos, true) => {
                    return Err(UbjsonError::new(ErrorCode::MissingValue, unit.offset));
                }
                (Marker::Eos, false) => return Ok(None),
                _ => {}
            }
            match self.pending.take() {
                None => self.pending = Some(self.dec.key_from_unit(unit)?),
                Some(key) => {
                    let value = self.dec.value_from_unit(unit)?;
                    return Ok(Some(StreamEntry::Pair(key, value)));
                }
            }
        }
    }
}

impl<R: Read> Iterator for ObjectStream<'_, R> {
    type Item = Result<StreamEntry, UbjsonError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state != StreamState::Open {
            return None;
        }
        match self.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.state = StreamState::Finished;
                debug!(offset = self.dec.position(), "closed unsized object");
                None
            }
            Err(err) => {
                self.state = StreamState::Failed;
                debug!(error = %err, "unsized object failed");
                Some(Err(err))
            }
        }
    }
}

impl<R: Read> FusedIterator for ObjectStream<'_, R> {}

impl<R> Drop for ObjectStream<'_, R> {
    fn drop(&mut self) {
        self.dec.exit();
    }
}

/// Iterator over successive materialized top-level values.
pub struct Values<'a, R> {
    dec: &'a mut Decoder<R>,
    done: bool,
}

impl<R: Read> Iterator for Values<'_, R> {
    type Item = Result<Value, UbjsonError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.dec.decode_value() {
            Ok(v) => Some(Ok(v)),
            Err(err) => {
                self.done = true;
                if err.code == ErrorCode::NothingToDecode {
                    return None;
                }
                Some(Err(err))
            }
        }
    }
}

impl<R: Read> FusedIterator for Values<'_, R> {}

/// Decode exactly one value from `bytes`, materializing unsized containers.
///
/// # Errors
///
/// Returns a decode error, or `TrailingBytes` if input remains after the value. Trailing
/// Noop filler is accepted unless Noop markers are decoded as values.
pub fn decode_slice(bytes: &[u8], opts: DecodeOptions) -> Result<Value, UbjsonError> {
    let mut dec = Decoder::from_slice(bytes, opts);
    let value = dec.decode_value()?;
    let pos = dec.position();
    let rest = usize::try_from(pos)
        .ok()
        .and_then(|p| bytes.get(p..))
        .unwrap_or_default();
    if !rest.is_empty() && (opts.allow_noop || rest.iter().any(|&b| b != Marker::Noop.byte())) {
        return Err(UbjsonError::new(ErrorCode::TrailingBytes, pos));
    }
    Ok(value)
}
