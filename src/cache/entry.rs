//! Cache Entry Module
//!
//! Entry kinds and the expiry record kept for every live key.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

// == Kind ==
/// Structural shape of a store entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Scalar,
    Set,
    List,
    Dictionary,
    Queue,
}

impl Kind {
    /// Every kind, in a fixed order.
    pub const ALL: [Kind; 5] = [
        Kind::Scalar,
        Kind::Set,
        Kind::List,
        Kind::Dictionary,
        Kind::Queue,
    ];
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Scalar => "scalar",
            Kind::Set => "set",
            Kind::List => "list",
            Kind::Dictionary => "dictionary",
            Kind::Queue => "queue",
        };
        f.write_str(name)
    }
}

// == Expiry Record ==
/// Expiry bookkeeping for a single key: which kind it holds and when it
/// stops being visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryRecord {
    /// Kind of the entry stored under the key
    pub kind: Kind,
    /// Absolute expiry instant (UTC)
    pub expires_at: DateTime<Utc>,
}

impl ExpiryRecord {
    // == Constructor ==
    /// Creates a record expiring `ttl` after `now`. A ttl reaching past the
    /// representable range saturates to the latest instant.
    pub fn new(kind: Kind, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            kind,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now` reaches its expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Checks against the current clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    // == Time To Live ==
    /// Remaining lifetime, or zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        let remaining = self.expires_at - Utc::now();
        if remaining > Duration::zero() {
            remaining
        } else {
            Duration::zero()
        }
    }
}
