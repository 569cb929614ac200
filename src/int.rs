use crate::marker::Marker;

/// Fixed-width integer encoding chosen for a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntRepr {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
}

impl IntRepr {
    /// Smallest signed width whose range contains `v`.
    pub fn narrowest(v: i64) -> Self {
        if let Ok(b) = i8::try_from(v) {
            return Self::I8(b);
        }
        if let Ok(h) = i16::try_from(v) {
            return Self::I16(h);
        }
        if let Ok(w) = i32::try_from(v) {
            return Self::I32(w);
        }
        Self::I64(v)
    }

    pub const fn marker(self) -> Marker {
        match self {
            Self::I8(_) => Marker::Int8,
            Self::I16(_) => Marker::Int16,
            Self::I32(_) => Marker::Int32,
            Self::I64(_) => Marker::Int64,
        }
    }

    /// Marker byte followed by the big-endian payload.
    pub fn write_into(self, buf: &mut [u8; 9]) -> usize {
        buf[0] = self.marker().byte();
        match self {
            Self::I8(v) => {
                buf[1..2].copy_from_slice(&v.to_be_bytes());
                2
            }
            Self::I16(v) => {
                buf[1..3].copy_from_slice(&v.to_be_bytes());
                3
            }
            Self::I32(v) => {
                buf[1..5].copy_from_slice(&v.to_be_bytes());
                5
            }
            Self::I64(v) => {
                buf[1..9].copy_from_slice(&v.to_be_bytes());
                9
            }
        }
    }
}
