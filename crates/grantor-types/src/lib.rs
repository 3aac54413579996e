//! Shared capability, correlation and host signal types.

pub mod group;

mod capability;
mod correlation;
mod orientation;
mod platform;
mod signal;
mod status;
mod target;

pub use capability::{
    Capability, CapabilityKind, FOREGROUND_LOCATION, SPECIAL_NAVIGATION_ORDER, UnknownCapability,
    catalogue, find,
};
pub use correlation::CorrelationId;
pub use orientation::Orientation;
pub use platform::PlatformVersion;
pub use signal::{HostSignal, NavigationIntent, PromptIntent};
pub use status::{CapabilityStatus, RawOutcome};
pub use target::NavigationTarget;
