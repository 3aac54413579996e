use serde::{Deserialize, Serialize};

/// Classified state of a capability after a query or a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityStatus {
    Granted,
    Denied,
    /// Denied, and the authority will not show a prompt for it again.
    PermanentlyDenied,
}

impl CapabilityStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, CapabilityStatus::Granted)
    }
}

/// Per-capability answer carried by a prompt result, before classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawOutcome {
    Granted,
    Denied,
}

impl RawOutcome {
    pub fn is_granted(self) -> bool {
        matches!(self, RawOutcome::Granted)
    }
}

impl From<bool> for RawOutcome {
    fn from(granted: bool) -> Self {
        if granted {
            RawOutcome::Granted
        } else {
            RawOutcome::Denied
        }
    }
}
