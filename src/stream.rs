use std::io::{self, Read};

use crate::{ErrorCode, UbjsonError};

/// Pull-based byte source with offset tracking.
///
/// The source only ever moves forward; there is no peeking or backtracking.
pub struct ByteSource<R> {
    inner: R,
    pos: u64,
}

impl<R: Read> ByteSource<R> {
    pub const fn new(inner: R) -> Self {
        Self { inner, pos: 0 }
    }

    pub const fn position(&self) -> u64 {
        self.pos
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read one byte, or `None` if the source is exhausted.
    pub fn next_u8(&mut self) -> Result<Option<u8>, UbjsonError> {
        let mut b = [0u8; 1];
        loop {
            match self.inner.read(&mut b) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.pos += 1;
                    return Ok(Some(b[0]));
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(UbjsonError::io(&err, self.pos)),
            }
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, UbjsonError> {
        let off = self.pos;
        self.next_u8()?
            .ok_or_else(|| UbjsonError::new(ErrorCode::UnexpectedEof, off))
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], UbjsonError> {
        let mut buf = [0u8; N];
        self.inner
            .read_exact(&mut buf)
            .map_err(|err| UbjsonError::io(&err, self.pos))?;
        self.pos += N as u64;
        Ok(buf)
    }

    pub fn read_be_u32(&mut self) -> Result<u32, UbjsonError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Read exactly `len` bytes.
    ///
    /// The buffer grows with the bytes actually delivered, so a declared length larger than
    /// the remaining input fails with `UnexpectedEof` instead of allocating up front.
    pub fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, UbjsonError> {
        let off = self.pos;
        let want = u64::try_from(len).map_err(|_| UbjsonError::new(ErrorCode::LengthOverflow, off))?;
        let mut buf = Vec::new();
        let got = (&mut self.inner)
            .take(want)
            .read_to_end(&mut buf)
            .map_err(|err| UbjsonError::io(&err, off))?;
        self.pos += got as u64;
        if got != len {
            return Err(UbjsonError::new(ErrorCode::UnexpectedEof, self.pos));
        }
        Ok(buf)
    }
}
