use serde::{Deserialize, Serialize};

use crate::{Capability, CorrelationId, NavigationTarget, RawOutcome};

/// Ask the host to show a settings screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationIntent {
    pub id: CorrelationId,
    pub target: NavigationTarget,
    /// Capability the screen was opened for, if any.
    pub capability: Option<Capability>,
}

/// Ask the host to show the runtime prompt for a set of capabilities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptIntent {
    pub id: CorrelationId,
    pub capabilities: Vec<Capability>,
}

/// Signal delivered back from the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostSignal {
    /// The user came back from a settings screen.
    NavigationReturned { id: CorrelationId },
    /// The runtime prompt finished. `outcomes` pairs with `capabilities` by
    /// position and may be shorter when the host dropped entries.
    PromptResult {
        id: CorrelationId,
        capabilities: Vec<Capability>,
        outcomes: Vec<RawOutcome>,
    },
}

impl HostSignal {
    pub fn id(&self) -> CorrelationId {
        match self {
            HostSignal::NavigationReturned { id } => *id,
            HostSignal::PromptResult { id, .. } => *id,
        }
    }

    /// Raw outcome reported for `capability`. `None` for navigation returns and
    /// for capabilities the host left out of the result.
    pub fn outcome_for(&self, capability: Capability) -> Option<RawOutcome> {
        match self {
            HostSignal::NavigationReturned { .. } => None,
            HostSignal::PromptResult {
                capabilities,
                outcomes,
                ..
            } => capabilities
                .iter()
                .position(|cap| *cap == capability)
                .and_then(|idx| outcomes.get(idx).copied()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_lookup_tolerates_short_results() {
        let signal = HostSignal::PromptResult {
            id: CorrelationId::new(7),
            capabilities: vec![Capability::CAMERA, Capability::MICROPHONE],
            outcomes: vec![RawOutcome::Granted],
        };
        assert_eq!(signal.outcome_for(Capability::CAMERA), Some(RawOutcome::Granted));
        assert_eq!(signal.outcome_for(Capability::MICROPHONE), None);
        assert_eq!(signal.outcome_for(Capability::OVERLAY), None);
    }

    #[test]
    fn signal_wire_shape() {
        let signal = HostSignal::NavigationReturned {
            id: CorrelationId::MANUAL_NAVIGATION,
        };
        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "navigation_returned", "id": 1025}));
    }
}
