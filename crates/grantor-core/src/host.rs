use std::sync::{Arc, Weak};

use grantor_types::{
    Capability, NavigationIntent, NavigationTarget, Orientation, PlatformVersion, PromptIntent,
};

use crate::error::HostError;

/// Raw grant state as the platform reports it. No version rules applied.
pub trait Authority: Send + Sync {
    fn platform(&self) -> PlatformVersion;
    fn check(&self, capability: Capability) -> bool;
    /// Whether the authority would explain `capability` before prompting again.
    fn should_show_rationale(&self, capability: Capability) -> bool;
}

/// The window a request runs against.
///
/// Navigation and prompt calls only start the interaction. Their results come
/// back through a [`crate::SignalSink`], tagged with the intent's correlation id.
pub trait HostContext: Authority {
    fn is_alive(&self) -> bool;
    fn requested_orientation(&self) -> Orientation;
    fn display_orientation(&self) -> Orientation;
    fn set_requested_orientation(&self, orientation: Orientation) -> Result<(), HostError>;
    fn can_open(&self, target: NavigationTarget) -> bool;
    fn navigate_to_settings(&self, intent: NavigationIntent) -> Result<(), HostError>;
    fn prompt_for(&self, intent: PromptIntent) -> Result<(), HostError>;
}

/// Non-owning handle onto a host context.
#[derive(Clone)]
pub struct HostHandle {
    inner: Weak<dyn HostContext>,
}

impl HostHandle {
    pub fn new<H: HostContext + 'static>(host: &Arc<H>) -> Self {
        let inner: Weak<H> = Arc::downgrade(host);
        Self { inner }
    }

    pub fn from_dyn(host: &Arc<dyn HostContext>) -> Self {
        Self {
            inner: Arc::downgrade(host),
        }
    }

    /// Strong reference to the host, provided it still exists and reports alive.
    pub fn upgrade(&self) -> Option<Arc<dyn HostContext>> {
        self.inner.upgrade().filter(|host| host.is_alive())
    }

    pub fn is_alive(&self) -> bool {
        self.upgrade().is_some()
    }
}

impl std::fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}
