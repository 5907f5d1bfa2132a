//! Object lifetime policy
//!
//! An object is `Fresh` until `mtime + TTL` and `Expired` from then on. The
//! transition is purely time based; nothing is written when it happens.
//! A zero TTL disables expiry entirely.

use std::time::{Duration, SystemTime};

/// Lifecycle state of a stored object
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectState {
    /// Within its lifetime
    Fresh,
    /// Lifetime elapsed, eligible for eviction
    Expired,
}

/// Time-to-live policy applied to payload modification times
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExpiryPolicy {
    ttl: Option<Duration>,
}

impl ExpiryPolicy {
    /// Policy from a TTL in seconds; `0` means objects never expire
    pub fn from_secs(secs: u64) -> Self {
        Self {
            ttl: (secs > 0).then(|| Duration::from_secs(secs)),
        }
    }

    /// Policy under which nothing expires
    pub fn never() -> Self {
        Self { ttl: None }
    }

    /// The configured TTL, if expiry is enabled
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// State of an object modified at `modified`, evaluated at `now`
    ///
    /// A modification time in the future (clock skew) is always fresh.
    pub fn state_at(&self, modified: SystemTime, now: SystemTime) -> ObjectState {
        let Some(ttl) = self.ttl else {
            return ObjectState::Fresh;
        };
        match now.duration_since(modified) {
            Ok(age) if age >= ttl => ObjectState::Expired,
            _ => ObjectState::Fresh,
        }
    }

    /// State of an object modified at `modified`, evaluated now
    pub fn state(&self, modified: SystemTime) -> ObjectState {
        self.state_at(modified, SystemTime::now())
    }

    /// Instant at which an object modified at `modified` expires
    pub fn expires_at(&self, modified: SystemTime) -> Option<SystemTime> {
        self.ttl.and_then(|ttl| modified.checked_add(ttl))
    }
}
