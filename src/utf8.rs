#[cfg(feature = "simdutf8")]
use simdutf8::basic as simd_utf8;

use crate::{ErrorCode, UbjsonError};

/// Validates UTF-8 bytes and returns a borrowed `&str` on success.
#[inline]
pub fn validate(bytes: &[u8], offset: u64) -> Result<&str, UbjsonError> {
    #[cfg(feature = "simdutf8")]
    {
        simd_utf8::from_utf8(bytes).map_err(|_| UbjsonError::new(ErrorCode::Utf8Invalid, offset))
    }

    #[cfg(not(feature = "simdutf8"))]
    {
        core::str::from_utf8(bytes).map_err(|_| UbjsonError::new(ErrorCode::Utf8Invalid, offset))
    }
}

/// Converts an owned text payload into a `String` without copying.
///
/// Always validated by std; the owned conversion has no safe SIMD path.
#[inline]
pub fn into_string(bytes: Vec<u8>, offset: u64) -> Result<String, UbjsonError> {
    String::from_utf8(bytes).map_err(|_| UbjsonError::new(ErrorCode::Utf8Invalid, offset))
}
