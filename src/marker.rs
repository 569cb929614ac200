//! Draft-8 marker table.
//!
//! Every wire unit starts with one ASCII marker byte. This module only classifies markers;
//! it never reads or writes payloads.

use core::fmt;

/// Length byte that turns a short Array/Object header into an unsized (EOS-terminated) container.
pub const UNSIZED: u8 = 0xff;

/// A Draft-8 marker byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Marker {
    /// `N`: filler, no payload.
    Noop = b'N',
    /// `E`: end of an unsized container.
    Eos = b'E',
    /// `Z`: null.
    Null = b'Z',
    /// `F`: false.
    False = b'F',
    /// `T`: true.
    True = b'T',
    /// `B`: signed 8-bit integer.
    Int8 = b'B',
    /// `i`: signed 16-bit integer.
    Int16 = b'i',
    /// `I`: signed 32-bit integer.
    Int32 = b'I',
    /// `L`: signed 64-bit integer.
    Int64 = b'L',
    /// `d`: IEEE-754 binary32.
    Float32 = b'd',
    /// `D`: IEEE-754 binary64.
    Float64 = b'D',
    /// `s`: text with a 1-byte length.
    TextShort = b's',
    /// `S`: text with a 4-byte length.
    TextLong = b'S',
    /// `h`: decimal text with a 1-byte length.
    DecimalShort = b'h',
    /// `H`: decimal text with a 4-byte length.
    DecimalLong = b'H',
    /// `a`: array with a 1-byte count (255 = unsized).
    ArrayShort = b'a',
    /// `A`: array with a 4-byte count.
    ArrayLong = b'A',
    /// `o`: object with a 1-byte pair count (255 = unsized).
    ObjectShort = b'o',
    /// `O`: object with a 4-byte pair count.
    ObjectLong = b'O',
}

impl Marker {
    /// All markers in wire-table order.
    pub const ALL: [Self; 19] = [
        Self::Noop,
        Self::Eos,
        Self::Null,
        Self::False,
        Self::True,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Float32,
        Self::Float64,
        Self::TextShort,
        Self::TextLong,
        Self::DecimalShort,
        Self::DecimalLong,
        Self::ArrayShort,
        Self::ArrayLong,
        Self::ObjectShort,
        Self::ObjectLong,
    ];

    /// Classify a raw byte, returning `None` for bytes outside the Draft-8 table.
    #[must_use]
    pub const fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            b'N' => Self::Noop,
            b'E' => Self::Eos,
            b'Z' => Self::Null,
            b'F' => Self::False,
            b'T' => Self::True,
            b'B' => Self::Int8,
            b'i' => Self::Int16,
            b'I' => Self::Int32,
            b'L' => Self::Int64,
            b'd' => Self::Float32,
            b'D' => Self::Float64,
            b's' => Self::TextShort,
            b'S' => Self::TextLong,
            b'h' => Self::DecimalShort,
            b'H' => Self::DecimalLong,
            b'a' => Self::ArrayShort,
            b'A' => Self::ArrayLong,
            b'o' => Self::ObjectShort,
            b'O' => Self::ObjectLong,
            _ => return None,
        })
    }

    /// The wire byte.
    #[inline]
    #[must_use]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    #[inline]
    const fn index(self) -> u32 {
        match self {
            Self::Noop => 0,
            Self::Eos => 1,
            Self::Null => 2,
            Self::False => 3,
            Self::True => 4,
            Self::Int8 => 5,
            Self::Int16 => 6,
            Self::Int32 => 7,
            Self::Int64 => 8,
            Self::Float32 => 9,
            Self::Float64 => 10,
            Self::TextShort => 11,
            Self::TextLong => 12,
            Self::DecimalShort => 13,
            Self::DecimalLong => 14,
            Self::ArrayShort => 15,
            Self::ArrayLong => 16,
            Self::ObjectShort => 17,
            Self::ObjectLong => 18,
        }
    }

    /// Payload-free markers: Noop, EOS, Null, False, True.
    #[must_use]
    pub const fn is_constant(self) -> bool {
        matches!(
            self,
            Self::Noop | Self::Eos | Self::Null | Self::False | Self::True
        )
    }

    /// Fixed-width numeric payload size in bytes, or `None` for non-numeric markers.
    #[must_use]
    pub const fn numeric_width(self) -> Option<usize> {
        match self {
            Self::Int8 => Some(1),
            Self::Int16 => Some(2),
            Self::Int32 | Self::Float32 => Some(4),
            Self::Int64 | Self::Float64 => Some(8),
            _ => None,
        }
    }

    /// Markers followed by a 1-byte length.
    #[must_use]
    pub const fn is_short(self) -> bool {
        matches!(
            self,
            Self::TextShort | Self::DecimalShort | Self::ArrayShort | Self::ObjectShort
        )
    }

    /// Markers followed by a 4-byte big-endian length.
    #[must_use]
    pub const fn is_long(self) -> bool {
        matches!(
            self,
            Self::TextLong | Self::DecimalLong | Self::ArrayLong | Self::ObjectLong
        )
    }

    /// Markers whose length is followed by raw UTF-8 bytes.
    #[must_use]
    pub const fn is_text_bearing(self) -> bool {
        matches!(
            self,
            Self::TextShort | Self::TextLong | Self::DecimalShort | Self::DecimalLong
        )
    }

    /// Markers accepted in object key position.
    #[must_use]
    pub const fn is_key(self) -> bool {
        matches!(self, Self::TextShort | Self::TextLong)
    }

    /// The only markers that may carry the [`UNSIZED`] length.
    #[must_use]
    pub const fn is_streaming_capable(self) -> bool {
        matches!(self, Self::ArrayShort | Self::ObjectShort)
    }

    /// Markers that are never valid as a value inside a sized container.
    #[must_use]
    pub const fn is_forbidden_value(self) -> bool {
        matches!(self, Self::Noop | Self::Eos)
    }

    /// Array markers, short or long.
    #[must_use]
    pub const fn is_array(self) -> bool {
        matches!(self, Self::ArrayShort | Self::ArrayLong)
    }

    /// Object markers, short or long.
    #[must_use]
    pub const fn is_object(self) -> bool {
        matches!(self, Self::ObjectShort | Self::ObjectLong)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (0x{:02x})", char::from(self.byte()), self.byte())
    }
}

/// A set of markers, used as a decoding session's dispatch table.
///
/// The set is `Copy`; every decoder owns its own copy, so editing a shared default never
/// affects a session that is already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSet(u32);

impl MarkerSet {
    /// Every Draft-8 marker.
    pub const ALL: Self = Self((1 << 19) - 1);

    /// No markers.
    pub const EMPTY: Self = Self(0);

    /// Returns `true` if `marker` is in the set.
    #[inline]
    #[must_use]
    pub const fn contains(self, marker: Marker) -> bool {
        self.0 & (1 << marker.index()) != 0
    }

    /// Return a copy with `marker` added.
    #[must_use]
    pub const fn with(self, marker: Marker) -> Self {
        Self(self.0 | (1 << marker.index()))
    }

    /// Return a copy with `marker` removed.
    #[must_use]
    pub const fn without(self, marker: Marker) -> Self {
        Self(self.0 & !(1 << marker.index()))
    }
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self::ALL
    }
}
