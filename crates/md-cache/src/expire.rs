//! Cache entry expiration.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// When a cache entry stops being served.
///
/// Serialized as a signed Unix timestamp where `-1` means permanent, so the
/// value can be stored inline in cache headers and in serialized payloads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Expire {
    /// Never expires.
    #[default]
    Permanent,
    /// Expires at the given Unix timestamp (seconds).
    At(u64),
}

impl Expire {
    /// Expiration `ttl` from now.
    #[must_use]
    pub fn after(ttl: Duration) -> Self {
        Self::At(unix_now().saturating_add(ttl.as_secs()))
    }

    /// Build from a settings value in seconds; negative means permanent.
    #[must_use]
    pub fn from_ttl_secs(secs: i64) -> Self {
        u64::try_from(secs).map_or(Self::Permanent, |secs| {
            Self::after(Duration::from_secs(secs))
        })
    }

    /// Whether the entry is expired at Unix time `now`.
    ///
    /// An entry stays valid through the second it expires at.
    #[must_use]
    pub fn is_expired_at(self, now: u64) -> bool {
        match self {
            Self::Permanent => false,
            Self::At(at) => at < now,
        }
    }

    /// Whether the entry is expired right now.
    #[must_use]
    pub fn is_expired(self) -> bool {
        self.is_expired_at(unix_now())
    }
}

impl From<i64> for Expire {
    fn from(value: i64) -> Self {
        u64::try_from(value).map_or(Self::Permanent, Self::At)
    }
}

impl From<Expire> for i64 {
    fn from(value: Expire) -> Self {
        match value {
            Expire::Permanent => -1,
            Expire::At(at) => i64::try_from(at).unwrap_or(i64::MAX),
        }
    }
}

/// Current Unix time in seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
