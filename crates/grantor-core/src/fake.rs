//! In-crate test doubles for the host traits.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use grantor_types::{
    Capability, NavigationIntent, NavigationTarget, Orientation, PlatformVersion, PromptIntent,
};

use crate::error::HostError;
use crate::host::{Authority, HostContext};

pub(crate) struct FakeAuthority {
    platform: PlatformVersion,
    granted: Mutex<HashSet<Capability>>,
    rationale: Mutex<HashSet<Capability>>,
}

impl FakeAuthority {
    pub(crate) fn new(level: u32) -> Self {
        Self {
            platform: PlatformVersion::new(level),
            granted: Mutex::new(HashSet::new()),
            rationale: Mutex::new(HashSet::new()),
        }
    }

    pub(crate) fn grant(&self, capability: Capability) {
        self.granted.lock().unwrap().insert(capability);
    }

    pub(crate) fn set_rationale(&self, capability: Capability, show: bool) {
        let mut rationale = self.rationale.lock().unwrap();
        if show {
            rationale.insert(capability);
        } else {
            rationale.remove(&capability);
        }
    }
}

impl Authority for FakeAuthority {
    fn platform(&self) -> PlatformVersion {
        self.platform
    }

    fn check(&self, capability: Capability) -> bool {
        self.granted.lock().unwrap().contains(&capability)
    }

    fn should_show_rationale(&self, capability: Capability) -> bool {
        self.rationale.lock().unwrap().contains(&capability)
    }
}

pub(crate) struct FakeHost {
    pub(crate) authority: FakeAuthority,
    alive: AtomicBool,
    requested: Mutex<Orientation>,
    closed: Mutex<HashSet<NavigationTarget>>,
    pub(crate) navigations: Mutex<Vec<NavigationIntent>>,
    pub(crate) prompts: Mutex<Vec<PromptIntent>>,
}

impl FakeHost {
    pub(crate) fn new(level: u32) -> Arc<Self> {
        Arc::new(Self {
            authority: FakeAuthority::new(level),
            alive: AtomicBool::new(true),
            requested: Mutex::new(Orientation::Unspecified),
            closed: Mutex::new(HashSet::new()),
            navigations: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn kill(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub(crate) fn close_target(&self, target: NavigationTarget) {
        self.closed.lock().unwrap().insert(target);
    }
}

impl Authority for FakeHost {
    fn platform(&self) -> PlatformVersion {
        self.authority.platform()
    }

    fn check(&self, capability: Capability) -> bool {
        self.authority.check(capability)
    }

    fn should_show_rationale(&self, capability: Capability) -> bool {
        self.authority.should_show_rationale(capability)
    }
}

impl HostContext for FakeHost {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn requested_orientation(&self) -> Orientation {
        *self.requested.lock().unwrap()
    }

    fn display_orientation(&self) -> Orientation {
        Orientation::Portrait
    }

    fn set_requested_orientation(&self, orientation: Orientation) -> Result<(), HostError> {
        *self.requested.lock().unwrap() = orientation;
        Ok(())
    }

    fn can_open(&self, target: NavigationTarget) -> bool {
        !self.closed.lock().unwrap().contains(&target)
    }

    fn navigate_to_settings(&self, intent: NavigationIntent) -> Result<(), HostError> {
        self.navigations.lock().unwrap().push(intent);
        Ok(())
    }

    fn prompt_for(&self, intent: PromptIntent) -> Result<(), HostError> {
        self.prompts.lock().unwrap().push(intent);
        Ok(())
    }
}
