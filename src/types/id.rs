//! Identifier types for spans and executions.
//!
//! Both identifiers are 64-bit values rendered as 16 lowercase hex characters
//! for interoperability with downstream trace consumers. The all-zero
//! rendering is reserved: it is the "no parent" sentinel, so [`SpanId`] is
//! non-zero by construction and an absent parent is `Option::<SpanId>::None`.

use core::fmt;
use core::num::NonZeroU64;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// A unique identifier for a span within a capture window.
///
/// Span ids are non-zero; the zero rendering is the no-parent sentinel and
/// never names a real span.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanId(NonZeroU64);

impl SpanId {
    /// The rendering of "this span has no parent": sixteen hex zeros.
    pub const NO_PARENT_HEX: &'static str = "0000000000000000";

    /// Creates a span id from a raw value, rejecting zero.
    #[inline]
    #[must_use]
    pub const fn from_u64(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Returns the raw 64-bit value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0.get()
    }

    /// Renders the id as 16 lowercase hex characters.
    #[inline]
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0.get())
    }

    /// Renders an optional parent id, mapping `None` to the sentinel.
    #[inline]
    #[must_use]
    pub fn render_parent(parent: Option<Self>) -> String {
        parent.map_or_else(|| Self::NO_PARENT_HEX.to_owned(), Self::to_hex)
    }
}

impl fmt::Debug for SpanId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpanId({:016x})", self.0.get())
    }
}

impl fmt::Display for SpanId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0.get())
    }
}

impl Serialize for SpanId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&format_args!("{:016x}", self.0.get()))
    }
}

impl<'de> Deserialize<'de> for SpanId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        let raw = parse_hex16::<D>(&hex)?;
        Self::from_u64(raw)
            .ok_or_else(|| de::Error::custom("span id must not be the zero sentinel"))
    }
}

/// Serde adapter rendering `Option<SpanId>` with the no-parent sentinel.
///
/// Used with `#[serde(with = "...")]` so captured spans always carry a
/// 16-hex-char parent field, never a JSON `null`.
pub(crate) mod hex_parent {
    use super::{SpanId, parse_hex16};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(parent: &Option<SpanId>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match parent {
            Some(id) => serializer.collect_str(&format_args!("{:016x}", id.as_u64())),
            None => serializer.serialize_str(SpanId::NO_PARENT_HEX),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SpanId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        let raw = parse_hex16::<D>(&hex)?;
        Ok(SpanId::from_u64(raw))
    }
}

fn parse_hex16<'de, D>(hex: &str) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    if hex.len() != 16 {
        return Err(de::Error::custom(format!(
            "expected 16 hex characters, got {} in {hex:?}",
            hex.len()
        )));
    }
    u64::from_str_radix(hex, 16)
        .map_err(|e| de::Error::custom(format!("invalid hex id {hex:?}: {e}")))
}

/// A unique identifier for one message execution.
///
/// Every span of one trace carries the execution id of the run that produced
/// it; branch forks inherit the id unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExecutionId(u64);

impl ExecutionId {
    /// Creates an execution id from a raw value.
    #[inline]
    #[must_use]
    pub const fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw 64-bit value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Renders the id as 16 lowercase hex characters.
    #[inline]
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Debug for ExecutionId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExecutionId({:016x})", self.0)
    }
}

impl fmt::Display for ExecutionId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl Serialize for ExecutionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&format_args!("{:016x}", self.0))
    }
}

impl<'de> Deserialize<'de> for ExecutionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        parse_hex16::<D>(&hex).map(Self)
    }
}
