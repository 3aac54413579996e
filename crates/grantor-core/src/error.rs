use grantor_types::{Capability, NavigationTarget, UnknownCapability};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GrantorError {
    #[error("request names no capabilities")]
    EmptyRequest,
    #[error("host context is no longer available")]
    HostUnavailable,
    #[error(transparent)]
    UnknownCapability(#[from] UnknownCapability),
    #[error("capability '{0}' requested more than once")]
    DuplicateCapability(Capability),
    #[error("'{capability}' needs one of {required:?} in the same request")]
    MissingPrerequisite {
        capability: Capability,
        required: &'static [Capability],
    },
    #[error("all correlation ids are in flight")]
    CorrelationExhausted,
    #[error("entropy error: {0}")]
    Entropy(String),
}

/// Failure reported by a host implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("host destroyed")]
    Destroyed,
    #[error("settings target {0} unavailable")]
    TargetUnavailable(NavigationTarget),
    #[error("host rejected request: {0}")]
    Rejected(String),
}
