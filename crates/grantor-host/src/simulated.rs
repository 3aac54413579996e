use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use grantor_core::{Authority, Delivery, HostContext, HostError, SignalSink};
use grantor_types::{
    Capability, CorrelationId, HostSignal, NavigationIntent, NavigationTarget, Orientation,
    PlatformVersion, PromptIntent, RawOutcome,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::script::{PromptDecision, SettingsDecision, UserScript};

/// When the simulated user answers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseMode {
    /// Answer inside the navigation or prompt call.
    #[default]
    Immediate,
    /// Queue answers until [`SimulatedHost::respond_next`] is called.
    Manual,
}

/// Something the host was asked to do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Navigated(NavigationIntent),
    Prompted(PromptIntent),
    OrientationSet { orientation: Orientation },
}

struct State {
    granted: HashSet<Capability>,
    rationale: HashSet<Capability>,
    dont_ask: HashSet<Capability>,
    script: UserScript,
    mode: ResponseMode,
    requested_orientation: Orientation,
    display_orientation: Orientation,
    unavailable: HashSet<NavigationTarget>,
    queued: VecDeque<HostSignal>,
    journal: Vec<HostEvent>,
}

pub struct SimulatedHost {
    platform: PlatformVersion,
    sink: SignalSink,
    alive: AtomicBool,
    state: Mutex<State>,
}

impl SimulatedHost {
    pub fn new(platform: impl Into<PlatformVersion>, sink: SignalSink) -> Arc<Self> {
        Arc::new(Self {
            platform: platform.into(),
            sink,
            alive: AtomicBool::new(true),
            state: Mutex::new(State {
                granted: HashSet::new(),
                rationale: HashSet::new(),
                dont_ask: HashSet::new(),
                script: UserScript::default(),
                mode: ResponseMode::default(),
                requested_orientation: Orientation::Unspecified,
                display_orientation: Orientation::Portrait,
                unavailable: HashSet::new(),
                queued: VecDeque::new(),
                journal: Vec::new(),
            }),
        })
    }

    pub fn grant(&self, capability: Capability) {
        let mut state = self.state();
        state.granted.insert(capability);
        state.dont_ask.remove(&capability);
    }

    pub fn revoke(&self, capability: Capability) {
        self.state().granted.remove(&capability);
    }

    /// Mark `capability` as denied once before, so the authority shows a rationale.
    pub fn deny(&self, capability: Capability) {
        let mut state = self.state();
        state.granted.remove(&capability);
        state.rationale.insert(capability);
    }

    /// Mark `capability` as denied with "don't ask again".
    pub fn deny_permanently(&self, capability: Capability) {
        let mut state = self.state();
        state.granted.remove(&capability);
        state.rationale.remove(&capability);
        state.dont_ask.insert(capability);
    }

    pub fn set_script(&self, script: UserScript) {
        self.state().script = script;
    }

    pub fn set_mode(&self, mode: ResponseMode) {
        self.state().mode = mode;
    }

    pub fn set_display_orientation(&self, orientation: Orientation) {
        self.state().display_orientation = orientation;
    }

    pub fn make_unavailable(&self, target: NavigationTarget) {
        self.state().unavailable.insert(target);
    }

    pub fn journal(&self) -> Vec<HostEvent> {
        self.state().journal.clone()
    }

    /// Prompts shown so far, in order.
    pub fn prompts(&self) -> Vec<PromptIntent> {
        self.state()
            .journal
            .iter()
            .filter_map(|event| match event {
                HostEvent::Prompted(intent) => Some(intent.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn navigations(&self) -> Vec<NavigationIntent> {
        self.state()
            .journal
            .iter()
            .filter_map(|event| match event {
                HostEvent::Navigated(intent) => Some(intent.clone()),
                _ => None,
            })
            .collect()
    }

    /// Correlation ids of answers queued in manual mode.
    pub fn pending_responses(&self) -> Vec<CorrelationId> {
        self.state().queued.iter().map(HostSignal::id).collect()
    }

    /// Deliver the oldest queued answer.
    pub fn respond_next(&self) -> Option<Delivery> {
        let signal = self.state().queued.pop_front()?;
        Some(self.sink.deliver(signal))
    }

    /// Tear the host down. Requests still waiting on it are abandoned.
    pub fn destroy(&self) {
        self.alive.store(false, Ordering::SeqCst);
        let queued: Vec<HostSignal> = self.state().queued.drain(..).collect();
        for signal in queued {
            self.sink.abandon(signal.id());
        }
        debug!("simulated host destroyed");
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_alive(&self) -> Result<(), HostError> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(HostError::Destroyed)
        }
    }

    fn respond(&self, signal: HostSignal) {
        let mode = self.state().mode;
        match mode {
            ResponseMode::Immediate => {
                let delivery = self.sink.deliver(signal);
                debug!(?delivery, "answered immediately");
            }
            ResponseMode::Manual => self.state().queued.push_back(signal),
        }
    }

    /// Show one capability in a prompt and record the user's answer.
    fn answer(&self, state: &mut State, capability: Capability) -> RawOutcome {
        if !capability.is_supported_on(self.platform) {
            // The platform has never heard of it.
            return RawOutcome::Denied;
        }
        if state.granted.contains(&capability) {
            return RawOutcome::Granted;
        }
        if state.dont_ask.contains(&capability) {
            return RawOutcome::Denied;
        }
        let required = capability.requires_any_of();
        if !required.is_empty() && !required.iter().any(|cap| state.granted.contains(cap)) {
            return RawOutcome::Denied;
        }
        match state.script.prompt_decision(capability) {
            PromptDecision::Allow => {
                state.granted.insert(capability);
                state.rationale.remove(&capability);
            }
            PromptDecision::Deny => {
                state.rationale.insert(capability);
            }
            PromptDecision::DenyAlways => {
                state.rationale.remove(&capability);
                state.dont_ask.insert(capability);
            }
        }
        if capability.reports_reliably_on(self.platform) {
            RawOutcome::from(state.granted.contains(&capability))
        } else {
            RawOutcome::Denied
        }
    }
}

impl Authority for SimulatedHost {
    fn platform(&self) -> PlatformVersion {
        self.platform
    }

    fn check(&self, capability: Capability) -> bool {
        self.state().granted.contains(&capability)
    }

    fn should_show_rationale(&self, capability: Capability) -> bool {
        self.state().rationale.contains(&capability)
    }
}

impl HostContext for SimulatedHost {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn requested_orientation(&self) -> Orientation {
        self.state().requested_orientation
    }

    fn display_orientation(&self) -> Orientation {
        self.state().display_orientation
    }

    fn set_requested_orientation(&self, orientation: Orientation) -> Result<(), HostError> {
        self.ensure_alive()?;
        let mut state = self.state();
        state.requested_orientation = orientation;
        state.journal.push(HostEvent::OrientationSet { orientation });
        Ok(())
    }

    fn can_open(&self, target: NavigationTarget) -> bool {
        target == NavigationTarget::AppDetails || !self.state().unavailable.contains(&target)
    }

    fn navigate_to_settings(&self, intent: NavigationIntent) -> Result<(), HostError> {
        self.ensure_alive()?;
        if !self.can_open(intent.target) {
            return Err(HostError::TargetUnavailable(intent.target));
        }
        let id = intent.id;
        {
            let mut state = self.state();
            if let Some(capability) = intent.capability {
                match state.script.settings_decision(capability) {
                    SettingsDecision::Allow => {
                        state.granted.insert(capability);
                        state.dont_ask.remove(&capability);
                    }
                    SettingsDecision::Deny => {}
                }
            }
            state.journal.push(HostEvent::Navigated(intent));
        }
        self.respond(HostSignal::NavigationReturned { id });
        Ok(())
    }

    fn prompt_for(&self, intent: PromptIntent) -> Result<(), HostError> {
        self.ensure_alive()?;
        let signal = {
            let mut state = self.state();
            let outcomes = intent
                .capabilities
                .iter()
                .map(|cap| self.answer(&mut state, *cap))
                .collect();
            let signal = HostSignal::PromptResult {
                id: intent.id,
                capabilities: intent.capabilities.clone(),
                outcomes,
            };
            state.journal.push(HostEvent::Prompted(intent));
            signal
        };
        self.respond(signal);
        Ok(())
    }
}
