//! # Entity Versions
//!
//! Every entity held by a [`StoreActor`](crate::StoreActor) is paired with a [`Version`].
//! A freshly created entity starts at version 0 and each applied update or action advances
//! it by one. Callers that observed a version can later make a mutation conditional on it
//! (see [`StoreClient::perform_guarded_action`](crate::StoreClient::perform_guarded_action)).
//!
//! On the wire a version is rendered as an opaque token, `t<n>`.

use std::fmt::{self, Display};
use std::str::FromStr;

/// Monotonic per-entity version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version(pub u64);

impl Version {
    /// The version every entity is created with.
    pub const INITIAL: Version = Version(0);

    /// The version that follows this one.
    pub fn next(self) -> Self {
        Version(self.0 + 1)
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Error returned when a token is not of the form `t<n>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version token: {0:?}")]
pub struct ParseVersionError(pub String);

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('t')
            .and_then(|n| n.parse::<u64>().ok())
            .map(Version)
            .ok_or_else(|| ParseVersionError(s.to_string()))
    }
}

/// A value together with the entity version it was observed at (or produced).
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: Version,
}

impl<T> Versioned<T> {
    pub fn new(value: T, version: Version) -> Self {
        Self { value, version }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_form() {
        assert_eq!(Version::INITIAL.to_string(), "t0");
        assert_eq!(Version(41).next().to_string(), "t42");
        assert_eq!("t7".parse::<Version>(), Ok(Version(7)));
    }

    #[test]
    fn rejects_foreign_tokens() {
        assert!("7".parse::<Version>().is_err());
        assert!("t".parse::<Version>().is_err());
        assert!("t-1".parse::<Version>().is_err());
        assert!("etag-abc".parse::<Version>().is_err());
    }
}
