use core::fmt;
use std::sync::Arc;

use crate::limits::DecodeLimits;
use crate::marker::{Marker, MarkerSet};
use crate::value::{KindSet, Value, ValueKind};
use crate::UbjsonError;

/// Default bound on chained encode fallbacks.
pub const DEFAULT_MAX_FALLBACK_DEPTH: usize = 16;

/// Decoder configuration.
///
/// Options are `Copy` and are copied into each [`Decoder`](crate::Decoder) when it is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Surface Noop markers as values instead of skipping them.
    pub allow_noop: bool,
    /// Resource limits.
    pub limits: DecodeLimits,
    /// Markers this session will dispatch.
    pub markers: MarkerSet,
}

impl DecodeOptions {
    /// Default options: Noop markers skipped, default limits, every marker supported.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether Noop markers are surfaced.
    #[must_use]
    pub const fn allow_noop(mut self, allow: bool) -> Self {
        self.allow_noop = allow;
        self
    }

    /// Replace the resource limits.
    #[must_use]
    pub const fn limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Remove `marker` from the dispatch table; decoding it as a value then fails with
    /// `UnsupportedMarker`.
    #[must_use]
    pub const fn without_marker(mut self, marker: Marker) -> Self {
        self.markers = self.markers.without(marker);
        self
    }
}

/// Transform applied to values whose kind has no encoding rule.
///
/// The returned value is dispatched again.
pub type Fallback = Arc<dyn Fn(&Value) -> Result<Value, UbjsonError> + Send + Sync>;

/// Encoder configuration.
#[derive(Clone)]
pub struct EncodeOptions {
    /// Transform for values without a rule.
    pub fallback: Option<Fallback>,
    /// Maximum number of nested fallback applications.
    pub max_fallback_depth: usize,
    /// Kinds this session has rules for.
    pub rules: KindSet,
}

impl EncodeOptions {
    /// Default options: every kind has a rule, no fallback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fallback transform.
    #[must_use]
    pub fn fallback<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, UbjsonError> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(f));
        self
    }

    /// Set the maximum number of nested fallback applications.
    #[must_use]
    pub fn max_fallback_depth(mut self, depth: usize) -> Self {
        self.max_fallback_depth = depth;
        self
    }

    /// Remove the rule for `kind`; such values are routed to the fallback.
    #[must_use]
    pub fn without_rule(mut self, kind: ValueKind) -> Self {
        self.rules = self.rules.without(kind);
        self
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            fallback: None,
            max_fallback_depth: DEFAULT_MAX_FALLBACK_DEPTH,
            rules: KindSet::ALL,
        }
    }
}

impl fmt::Debug for EncodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodeOptions")
            .field("fallback", &self.fallback.as_ref().map(|_| "<fn>"))
            .field("max_fallback_depth", &self.max_fallback_depth)
            .field("rules", &self.rules)
            .finish()
    }
}
