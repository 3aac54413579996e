//! Version-aware grant queries on top of a raw [`Authority`].
//!
//! The authority only knows what the running platform enforces. This layer
//! applies the catalogue's version rules: platforms without runtime grants
//! grant everything, capabilities the platform predates fall back to their
//! legacy checks, and special capabilities never count as permanently denied.

use grantor_types::{Capability, CapabilityStatus, PlatformVersion};

use crate::host::Authority;

pub struct AccessQuery<'a, A: Authority + ?Sized> {
    authority: &'a A,
}

impl<'a, A: Authority + ?Sized> AccessQuery<'a, A> {
    pub fn new(authority: &'a A) -> Self {
        Self { authority }
    }

    pub fn platform(&self) -> PlatformVersion {
        self.authority.platform()
    }

    pub fn is_granted(&self, capability: Capability) -> bool {
        let platform = self.authority.platform();
        if !platform.supports_runtime_grants() {
            return true;
        }
        if !capability.is_supported_on(platform) {
            // An empty legacy list grants unconditionally.
            return capability
                .legacy()
                .iter()
                .all(|legacy| self.is_granted(*legacy));
        }
        self.authority.check(capability)
    }

    pub fn is_granted_all(&self, capabilities: &[Capability]) -> bool {
        capabilities.iter().all(|cap| self.is_granted(*cap))
    }

    pub fn is_permanently_denied(&self, capability: Capability) -> bool {
        let platform = self.authority.platform();
        if !platform.supports_runtime_grants() || capability.is_special() {
            return false;
        }
        if !capability.is_supported_on(platform) {
            return capability
                .legacy()
                .iter()
                .any(|legacy| self.is_permanently_denied(*legacy));
        }
        !self.authority.check(capability) && !self.authority.should_show_rationale(capability)
    }

    pub fn any_permanently_denied(&self, capabilities: &[Capability]) -> bool {
        capabilities
            .iter()
            .any(|cap| self.is_permanently_denied(*cap))
    }

    pub fn is_special(&self, capability: Capability) -> bool {
        capability.is_special()
    }

    pub fn status(&self, capability: Capability) -> CapabilityStatus {
        if self.is_granted(capability) {
            CapabilityStatus::Granted
        } else if self.is_permanently_denied(capability) {
            CapabilityStatus::PermanentlyDenied
        } else {
            CapabilityStatus::Denied
        }
    }

    /// Subset of `capabilities` that is not granted, in request order.
    pub fn denied(&self, capabilities: &[Capability]) -> Vec<Capability> {
        capabilities
            .iter()
            .copied()
            .filter(|cap| !self.is_granted(*cap))
            .collect()
    }
}
