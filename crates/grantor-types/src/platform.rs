use serde::{Deserialize, Serialize};
use std::fmt;

/// Revision of the host platform. Capabilities and settings screens are gated
/// on these numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformVersion(u32);

impl PlatformVersion {
    /// First revision where grants are checked at runtime instead of at install time.
    pub const RUNTIME_GRANTS: Self = Self(23);
    /// Per-app settings screens for unknown sources and notifications exist.
    pub const APP_SETTINGS_SCREENS: Self = Self(26);
    /// Call handover between apps exists.
    pub const HANDOVER: Self = Self(28);
    /// Background location becomes its own capability and must follow a
    /// foreground location grant.
    pub const BACKGROUND_LOCATION: Self = Self(29);
    /// All-files access exists; background location stops being reported
    /// reliably by the combined prompt.
    pub const ALL_FILES_ACCESS: Self = Self(30);

    pub const fn new(level: u32) -> Self {
        Self(level)
    }

    pub const fn level(self) -> u32 {
        self.0
    }

    pub fn at_least(self, other: PlatformVersion) -> bool {
        self >= other
    }

    pub fn supports_runtime_grants(self) -> bool {
        self.at_least(Self::RUNTIME_GRANTS)
    }
}

impl From<u32> for PlatformVersion {
    fn from(level: u32) -> Self {
        Self(level)
    }
}

impl fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
