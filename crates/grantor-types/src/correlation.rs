use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag tying a host signal back to the request that triggered it.
///
/// Automatically allocated ids live in `0..AUTO_SPACE`. Navigations opened
/// outside of a request use [`CorrelationId::MANUAL_NAVIGATION`], which never
/// collides with an allocated id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(u16);

impl CorrelationId {
    pub const AUTO_SPACE: u16 = 256;
    pub const MANUAL_NAVIGATION: Self = Self(1025);

    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    pub fn is_auto(self) -> bool {
        self.0 < Self::AUTO_SPACE
    }
}

impl From<u8> for CorrelationId {
    fn from(raw: u8) -> Self {
        Self(u16::from(raw))
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
