/// Default maximum nesting depth limit.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Largest length a long-form header can declare.
pub const WIRE_MAX_LEN: usize = u32::MAX as usize;

/// Decode-time resource limits.
///
/// Limits are checked against declared lengths before any payload is read, so a hostile
/// header cannot force a large allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum container nesting depth.
    pub max_depth: usize,
    /// Maximum declared element count of a sized array, or pair count of a sized object.
    pub max_container_len: usize,
    /// Maximum text or decimal payload length in bytes.
    pub max_text_len: usize,
}

impl DecodeLimits {
    /// Construct conservative limits derived from a maximum message size.
    ///
    /// Every element occupies at least one byte on the wire, so no valid message of
    /// `max_message_bytes` can declare more elements or text bytes than that.
    #[must_use]
    pub fn for_bytes(max_message_bytes: usize) -> Self {
        let cap = max_message_bytes.min(WIRE_MAX_LEN);
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_container_len: cap,
            max_text_len: cap,
        }
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_container_len: WIRE_MAX_LEN,
            max_text_len: WIRE_MAX_LEN,
        }
    }
}
