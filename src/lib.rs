//! # ubjson-draft8
//!
//! Streaming encoder and decoder for **UBJSON Draft 8**, the compact binary JSON format built
//! from one-byte markers, big-endian fixed-width numbers and length-prefixed text.
//!
//! ## Design principles
//!
//! - **Single pass, forward only.**
//!   The [`Decoder`] pulls bytes from any [`std::io::Read`] and never seeks or buffers ahead.
//! - **Top-level streams stay lazy.**
//!   An unsized array or object at the top level is returned as an [`ArrayStream`] or
//!   [`ObjectStream`] that yields one element at a time; everything nested is materialized.
//! - **Most compact exact form.**
//!   The [`Encoder`] picks the narrowest integer width, prefers Float32 only when it reproduces
//!   the value exactly, and switches to long-form markers only when a length needs it.
//!
//! ## Draft-8 wire format
//!
//! | Marker | Meaning | Payload |
//! |---|---|---|
//! | `N` | Noop | none (skipped unless [`DecodeOptions::allow_noop`]) |
//! | `E` | end of an unsized container | none |
//! | `Z` `F` `T` | null, false, true | none |
//! | `B` `i` `I` `L` | signed integers | 1, 2, 4, 8 bytes big-endian |
//! | `d` `D` | Float32, Float64 | 4, 8 bytes big-endian |
//! | `s` `S` | UTF-8 text | 1-byte / 4-byte length, bytes |
//! | `h` `H` | decimal text | 1-byte / 4-byte length, bytes |
//! | `a` `A` | array | 1-byte / 4-byte count, elements |
//! | `o` `O` | object | 1-byte / 4-byte count, key/value pairs |
//!
//! A short array or object with count `0xFF` is unsized and ends at `E`. The short text and
//! decimal forms reserve `0xFF` and reject it.
//!
//! ## Example
//!
//! ```
//! use ubjson_draft8::{decode_slice, encode_to_vec, DecodeOptions, Value};
//!
//! let bytes = encode_to_vec(&vec![1i64, 300, 70_000]).unwrap();
//! assert_eq!(bytes, b"a\x03B\x01i\x01\x2cI\x00\x01\x11\x70");
//!
//! let v = decode_slice(&bytes, DecodeOptions::default()).unwrap();
//! assert_eq!(v, Value::from(vec![1i64, 300, 70_000]));
//! ```
//!
//! ## Feature flags
//!
//! - `serde`: implements `Serialize`/`Deserialize` for [`Value`].
//! - `simdutf8`: enables SIMD-accelerated UTF-8 validation of decimal payloads.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `trace` for skipped Noop markers, `debug` when a stream
//! opens or closes and when an encode fallback is applied. No subscriber is installed.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod decode;
mod encode;
mod error;
mod float;
mod int;
mod limits;
mod marker;
mod options;
#[cfg(feature = "serde")]
mod serde_impl;
mod stream;
mod utf8;
mod value;
mod wire;

pub use crate::decode::{
    decode_slice, ArrayStream, Decoded, Decoder, ObjectStream, StreamEntry, Values,
};
pub use crate::encode::{
    encode_into, encode_to_vec, encode_value, Encode, Encoder, Sink, VecSink, WriteSink,
};
pub use crate::error::{ErrorCode, ErrorKind, UbjsonError};
pub use crate::limits::{DecodeLimits, DEFAULT_MAX_DEPTH};
pub use crate::marker::{Marker, MarkerSet, UNSIZED};
pub use crate::options::{DecodeOptions, EncodeOptions, Fallback, DEFAULT_MAX_FALLBACK_DEPTH};
pub use crate::value::{KindSet, Map, Noop, Value, ValueKind};
pub use crate::wire::{Payload, Unit};

pub use bigdecimal::BigDecimal;

/// Derive [`Encode`] for structs and enums.
///
/// Named structs encode as sized objects, tuple structs as arrays, newtypes as their inner
/// value and unit structs as null. Unit enum variants encode as their name; data variants as a
/// one-entry object keyed by the name. Fields accept `#[ubjson(rename = "...")]` and
/// `#[ubjson(skip)]`.
pub use ubjson_draft8_derive::Encode;
