//! Value encoder: picks the most compact exact wire form for each value.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::io::Write;

use bigdecimal::BigDecimal;
use tracing::debug;

use crate::float::{self, FloatRepr};
use crate::int::IntRepr;
use crate::marker::{Marker, UNSIZED};
use crate::options::EncodeOptions;
use crate::value::{decimal_from_i128, decimal_from_u128, Map, Noop, Value};
use crate::{ErrorCode, UbjsonError};

/// Destination for encoded bytes.
pub trait Sink {
    /// Write all of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination rejects the bytes.
    fn write(&mut self, bytes: &[u8]) -> Result<(), UbjsonError>;

    /// Write one byte.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination rejects the byte.
    fn write_u8(&mut self, byte: u8) -> Result<(), UbjsonError> {
        self.write(&[byte])
    }

    /// Number of bytes written so far.
    fn position(&self) -> u64;
}

/// Sink collecting into a `Vec<u8>`.
#[derive(Debug, Default)]
pub struct VecSink {
    buf: Vec<u8>,
}

impl VecSink {
    const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }
}

impl Sink for VecSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), UbjsonError> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn write_u8(&mut self, byte: u8) -> Result<(), UbjsonError> {
        self.buf.push(byte);
        Ok(())
    }

    fn position(&self) -> u64 {
        self.buf.len() as u64
    }
}

/// Push-based sink over any [`std::io::Write`].
#[derive(Debug)]
pub struct WriteSink<W> {
    inner: W,
    written: u64,
}

impl<W: Write> Sink for WriteSink<W> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), UbjsonError> {
        self.inner
            .write_all(bytes)
            .map_err(|err| UbjsonError::io(&err, self.written))?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.written
    }
}

/// Encode a value into the encoder.
pub trait Encode {
    /// Encode `self` into the provided encoder.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError>;

    /// Whether `self` is written with a text marker, and so may be used as an object key.
    fn is_text(&self) -> bool {
        false
    }
}

/// Encoder writing Draft-8 bytes into a [`Sink`].
///
/// Each encoder owns a copy of its [`EncodeOptions`]; the rule table and fallback cannot
/// change while it runs.
pub struct Encoder<S = VecSink> {
    sink: S,
    opts: EncodeOptions,
    fallback_depth: usize,
}

impl Encoder<VecSink> {
    /// Create an encoder collecting into memory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(EncodeOptions::default())
    }

    /// Create an in-memory encoder with the provided options.
    #[must_use]
    pub fn with_options(opts: EncodeOptions) -> Self {
        Self {
            sink: VecSink::new(),
            opts,
            fallback_depth: 0,
        }
    }

    /// Create an in-memory encoder with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sink: VecSink::with_capacity(capacity),
            opts: EncodeOptions::default(),
            fallback_depth: 0,
        }
    }

    /// Borrow the bytes emitted so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.sink.buf
    }

    /// Consume and return the encoded bytes.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.sink.buf
    }
}

impl Default for Encoder<VecSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Encoder<WriteSink<W>> {
    /// Create an encoder that pushes bytes into `writer` as they are produced.
    pub fn from_writer(writer: W) -> Self {
        Self::from_writer_with_options(writer, EncodeOptions::default())
    }

    /// Create a writer-backed encoder with the provided options.
    pub fn from_writer_with_options(writer: W, opts: EncodeOptions) -> Self {
        Self {
            sink: WriteSink {
                inner: writer,
                written: 0,
            },
            opts,
            fallback_depth: 0,
        }
    }

    /// Release the writer.
    pub fn into_inner(self) -> W {
        self.sink.inner
    }
}

impl<S: Sink> Encoder<S> {
    /// Number of bytes written so far.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.sink.position()
    }

    fn err(&self, code: ErrorCode) -> UbjsonError {
        UbjsonError::new(code, self.sink.position())
    }

    /// Encode a Noop marker.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the sink fails.
    pub fn noop(&mut self) -> Result<(), UbjsonError> {
        self.sink.write_u8(Marker::Noop.byte())
    }

    /// Encode null.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the sink fails.
    pub fn null(&mut self) -> Result<(), UbjsonError> {
        self.sink.write_u8(Marker::Null.byte())
    }

    /// Encode a boolean.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the sink fails.
    pub fn bool(&mut self, v: bool) -> Result<(), UbjsonError> {
        let m = if v { Marker::True } else { Marker::False };
        self.sink.write_u8(m.byte())
    }

    /// Encode an integer with the narrowest signed width that holds it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the sink fails.
    pub fn int(&mut self, v: i64) -> Result<(), UbjsonError> {
        let mut buf = [0u8; 9];
        let n = IntRepr::narrowest(v).write_into(&mut buf);
        self.sink.write(&buf[..n])
    }

    /// Encode a signed integer, as decimal text when outside the 64-bit range.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the sink fails.
    pub fn int_i128(&mut self, v: i128) -> Result<(), UbjsonError> {
        match i64::try_from(v) {
            Ok(v) => self.int(v),
            Err(_) => self.decimal(&decimal_from_i128(v)),
        }
    }

    /// Encode an unsigned integer, as decimal text when outside the signed 64-bit range.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the sink fails.
    pub fn int_u128(&mut self, v: u128) -> Result<(), UbjsonError> {
        match i64::try_from(v) {
            Ok(v) => self.int(v),
            Err(_) => self.decimal(&decimal_from_u128(v)),
        }
    }

    /// Encode a float.
    ///
    /// Uses Float32 when the value is in its range and survives the narrowing unchanged,
    /// Float64 for other binary64 normals, null for infinities and NaN, and exact decimal
    /// text for magnitudes below the Float64 threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the sink fails.
    pub fn float(&mut self, v: f64) -> Result<(), UbjsonError> {
        match float::classify(v) {
            FloatRepr::F32(n) => {
                let mut buf = [0u8; 5];
                buf[0] = Marker::Float32.byte();
                buf[1..].copy_from_slice(&n.to_be_bytes());
                self.sink.write(&buf)
            }
            FloatRepr::F64(n) => {
                let mut buf = [0u8; 9];
                buf[0] = Marker::Float64.byte();
                buf[1..].copy_from_slice(&n.to_be_bytes());
                self.sink.write(&buf)
            }
            FloatRepr::Null => self.null(),
            FloatRepr::Decimal => self.decimal(&float::exact_decimal(v)),
        }
    }

    /// Encode a binary32 float with the same selection rules as [`Encoder::float`].
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the sink fails.
    pub fn float32(&mut self, v: f32) -> Result<(), UbjsonError> {
        self.float(f64::from(v))
    }

    /// Encode an arbitrary-precision decimal as its decimal text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is too long for a 4-byte length or writing fails.
    pub fn decimal(&mut self, v: &BigDecimal) -> Result<(), UbjsonError> {
        let text = v.to_string();
        self.length_header(Marker::DecimalShort, Marker::DecimalLong, text.len())?;
        self.sink.write(text.as_bytes())
    }

    /// Encode UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is too long for a 4-byte length or writing fails.
    pub fn text(&mut self, s: &str) -> Result<(), UbjsonError> {
        let b = s.as_bytes();
        self.length_header(Marker::TextShort, Marker::TextLong, b.len())?;
        self.sink.write(b)
    }

    /// Short form for lengths up to 254; the long form's 4-byte length follows its marker
    /// directly.
    fn length_header(&mut self, short: Marker, long: Marker, len: usize) -> Result<(), UbjsonError> {
        if let Ok(n) = u8::try_from(len) {
            if n != UNSIZED {
                return self.sink.write(&[short.byte(), n]);
            }
        }
        let n = u32::try_from(len).map_err(|_| self.err(ErrorCode::LengthOverflow))?;
        let mut buf = [0u8; 5];
        buf[0] = long.byte();
        buf[1..].copy_from_slice(&n.to_be_bytes());
        self.sink.write(&buf)
    }

    /// Write the header of a sized array; exactly `len` values must follow.
    ///
    /// # Errors
    ///
    /// Returns an error if `len` does not fit a 4-byte count or writing fails.
    pub fn begin_array(&mut self, len: usize) -> Result<(), UbjsonError> {
        self.length_header(Marker::ArrayShort, Marker::ArrayLong, len)
    }

    /// Write the header of a sized object; exactly `len` key/value pairs must follow, each key
    /// written with [`Encoder::text`].
    ///
    /// # Errors
    ///
    /// Returns an error if `len` does not fit a 4-byte count or writing fails.
    pub fn begin_object(&mut self, len: usize) -> Result<(), UbjsonError> {
        self.length_header(Marker::ObjectShort, Marker::ObjectLong, len)
    }

    fn check_len(&self, declared: usize, written: usize) -> Result<(), UbjsonError> {
        if declared == written {
            Ok(())
        } else {
            Err(self.err(ErrorCode::LengthMismatch))
        }
    }

    /// Encode a sized array from an exact-size sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if an element fails to encode or the iterator yields a different
    /// number of items than it reported.
    pub fn seq<I>(&mut self, items: I) -> Result<(), UbjsonError>
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator,
        I::Item: Encode,
    {
        let iter = items.into_iter();
        let len = iter.len();
        self.begin_array(len)?;
        let mut written = 0usize;
        for item in iter {
            item.encode(self)?;
            written += 1;
        }
        self.check_len(len, written)
    }

    /// Encode a sized object from an exact-size sequence of entries.
    ///
    /// # Errors
    ///
    /// Returns `ObjectKeyMustBeText` for a key that does not encode as text, or any
    /// entry's encoding error.
    pub fn map<I, K, V>(&mut self, entries: I) -> Result<(), UbjsonError>
    where
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: ExactSizeIterator,
        K: Encode,
        V: Encode,
    {
        let iter = entries.into_iter();
        let len = iter.len();
        self.begin_object(len)?;
        let mut written = 0usize;
        for (k, v) in iter {
            if !k.is_text() {
                return Err(self.err(ErrorCode::ObjectKeyMustBeText));
            }
            k.encode(self)?;
            v.encode(self)?;
            written += 1;
        }
        self.check_len(len, written)
    }

    /// Encode an unsized array: the sentinel header, each element, then EOS.
    ///
    /// The sequence may be unbounded; elements are written as they are pulled.
    ///
    /// # Errors
    ///
    /// Returns the first element error.
    pub fn array_stream<I>(&mut self, items: I) -> Result<(), UbjsonError>
    where
        I: IntoIterator,
        I::Item: Encode,
    {
        self.sink.write(&[Marker::ArrayShort.byte(), UNSIZED])?;
        for item in items {
            item.encode(self)?;
        }
        self.sink.write_u8(Marker::Eos.byte())
    }

    /// Encode an unsized object from a sequence of pairs, terminated by EOS.
    ///
    /// # Errors
    ///
    /// Returns `StreamKeyMustBeText` for a key that does not encode as text, or the first
    /// pair error.
    pub fn object_stream<I, K, V>(&mut self, pairs: I) -> Result<(), UbjsonError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Encode,
        V: Encode,
    {
        self.sink.write(&[Marker::ObjectShort.byte(), UNSIZED])?;
        for (k, v) in pairs {
            if !k.is_text() {
                return Err(self.err(ErrorCode::StreamKeyMustBeText));
            }
            k.encode(self)?;
            v.encode(self)?;
        }
        self.sink.write_u8(Marker::Eos.byte())
    }

    /// Encode a [`Value`] through this session's rule table.
    ///
    /// A value whose kind has no rule is passed to the fallback and the result is
    /// dispatched again.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedKind` when no rule and no fallback apply, or
    /// `FallbackDepthExceeded` when fallbacks chain too deep.
    pub fn value(&mut self, v: &Value) -> Result<(), UbjsonError> {
        if !self.opts.rules.contains(v.kind()) {
            return self.fallback(v);
        }
        match v {
            Value::Noop => self.noop(),
            Value::Null => self.null(),
            Value::Bool(b) => self.bool(*b),
            Value::Int(i) => self.int(*i),
            Value::Float32(f) => self.float32(*f),
            Value::Float64(f) => self.float(*f),
            Value::Decimal(d) => self.decimal(d),
            Value::Text(s) => self.text(s),
            Value::Array(items) => {
                self.begin_array(items.len())?;
                for item in items {
                    self.value(item)?;
                }
                Ok(())
            }
            Value::Object(map) => {
                self.begin_object(map.len())?;
                for (k, item) in map.iter() {
                    self.text(k)?;
                    self.value(item)?;
                }
                Ok(())
            }
        }
    }

    fn fallback(&mut self, v: &Value) -> Result<(), UbjsonError> {
        let kind = v.kind();
        let Some(f) = self.opts.fallback.clone() else {
            return Err(self.err(ErrorCode::UnsupportedKind(kind)));
        };
        if self.fallback_depth >= self.opts.max_fallback_depth {
            return Err(self.err(ErrorCode::FallbackDepthExceeded));
        }
        debug!(%kind, depth = self.fallback_depth, "applying encode fallback");
        let replacement = f(v).map_err(|err| self.err(err.code))?;
        self.fallback_depth += 1;
        let res = self.value(&replacement);
        self.fallback_depth -= 1;
        res
    }

    /// Encode any [`Encode`] value.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn encode<T: Encode + ?Sized>(&mut self, v: &T) -> Result<(), UbjsonError> {
        v.encode(self)
    }
}

/// Encode a value into a new byte vector.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode_to_vec<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>, UbjsonError> {
    let mut enc = Encoder::new();
    value.encode(&mut enc)?;
    Ok(enc.into_vec())
}

/// Encode a value incrementally into `writer`, returning the writer.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn encode_into<T: Encode + ?Sized, W: Write>(value: &T, writer: W) -> Result<W, UbjsonError> {
    let mut enc = Encoder::from_writer(writer);
    value.encode(&mut enc)?;
    Ok(enc.into_inner())
}

/// Encode a [`Value`] with explicit options.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode_value(value: &Value, opts: EncodeOptions) -> Result<Vec<u8>, UbjsonError> {
    let mut enc = Encoder::with_options(opts);
    enc.value(value)?;
    Ok(enc.into_vec())
}

impl Encode for () {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.null()
    }
}

impl Encode for Noop {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.noop()
    }
}

impl Encode for bool {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.bool(*self)
    }
}

macro_rules! encode_small_int {
    ($($t:ty),*) => {
        $(
            impl Encode for $t {
                fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
                    enc.int(i64::from(*self))
                }
            }
        )*
    };
}

encode_small_int!(i8, i16, i32, i64, u8, u16, u32);

impl Encode for isize {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        let v = i128::try_from(*self).map_err(|_| enc.err(ErrorCode::LengthOverflow))?;
        enc.int_i128(v)
    }
}

impl Encode for usize {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        let v = u128::try_from(*self).map_err(|_| enc.err(ErrorCode::LengthOverflow))?;
        enc.int_u128(v)
    }
}

impl Encode for u64 {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.int_u128(u128::from(*self))
    }
}

impl Encode for i128 {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.int_i128(*self)
    }
}

impl Encode for u128 {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.int_u128(*self)
    }
}

impl Encode for f32 {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.float32(*self)
    }
}

impl Encode for f64 {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.float(*self)
    }
}

impl Encode for BigDecimal {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.decimal(self)
    }
}

impl Encode for str {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.text(self)
    }

    fn is_text(&self) -> bool {
        true
    }
}

impl Encode for String {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.text(self)
    }

    fn is_text(&self) -> bool {
        true
    }
}

impl Encode for Value {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.value(self)
    }

    fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl Encode for Map {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.map(self.iter())
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        (**self).encode(enc)
    }

    fn is_text(&self) -> bool {
        (**self).is_text()
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        (**self).encode(enc)
    }

    fn is_text(&self) -> bool {
        (**self).is_text()
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        match self {
            Some(v) => v.encode(enc),
            None => enc.null(),
        }
    }

    fn is_text(&self) -> bool {
        self.as_ref().is_some_and(Encode::is_text)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.seq(self.iter())
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.seq(self.iter())
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.seq(self.iter())
    }
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.map(self.iter())
    }
}

impl<K: Encode, V: Encode, H: BuildHasher> Encode for HashMap<K, V, H> {
    fn encode<S: Sink>(&self, enc: &mut Encoder<S>) -> Result<(), UbjsonError> {
        enc.map(self.iter())
    }
}
