//! The request state machine.
//!
//! One [`Orchestrator`] owns one request from attach to detach. It walks the
//! phases in a fixed order, suspending only while the host shows a settings
//! screen or a prompt, and finishes with a single dispatch through the
//! interceptor. Losing the host at any point abandons the request silently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use grantor_types::{
    Capability, CorrelationId, FOREGROUND_LOCATION, HostSignal, NavigationIntent, Orientation,
    PlatformVersion, PromptIntent, RawOutcome, SPECIAL_NAVIGATION_ORDER,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::arena::RequestSlot;
use crate::error::HostError;
use crate::host::{HostContext, HostHandle};
use crate::interceptor::{Interceptor, PermissionCallback};
use crate::query::AccessQuery;
use crate::settings::SettingsResolver;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    SpecialPhase,
    LocationPrelude,
    DangerousPhase,
    AwaitingResult,
    Classify,
    Done,
}

/// Classified result of a request, as dispatched to the callback.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub granted: Vec<Capability>,
    pub denied: Vec<Capability>,
    /// Some denied capability is permanently denied.
    pub never: bool,
}

impl Outcome {
    pub fn all_granted(&self) -> bool {
        self.denied.is_empty()
    }
}

/// How a request ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "completion", rename_all = "snake_case")]
pub enum Completion {
    /// Everything was granted up front; the callback ran without any host interaction.
    AlreadyGranted,
    /// The interceptor was handed this outcome.
    Dispatched(Outcome),
    /// The host went away or failed mid-flight. No callback.
    Abandoned,
    /// An interceptor chose not to proceed. No callback.
    Unresolved,
}

/// Raw per-capability answers collected from prompts.
type RawResults = HashMap<Capability, RawOutcome>;

enum Prelude {
    Continue,
    /// Foreground location was refused, so background location cannot be
    /// granted either. Carries a denial for the whole request.
    ShortCircuit(RawResults),
}

pub(crate) struct Orchestrator {
    host: HostHandle,
    slot: RequestSlot,
    capabilities: Vec<Capability>,
    callback: Box<dyn PermissionCallback>,
    interceptor: Arc<dyn Interceptor>,
    settings: Arc<dyn SettingsResolver>,
    settle_delay: Duration,
    phase: Phase,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        host: HostHandle,
        slot: RequestSlot,
        capabilities: Vec<Capability>,
        callback: Box<dyn PermissionCallback>,
        interceptor: Arc<dyn Interceptor>,
        settings: Arc<dyn SettingsResolver>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            host,
            slot,
            capabilities,
            callback,
            interceptor,
            settings,
            settle_delay,
            phase: Phase::Idle,
        }
    }

    pub(crate) fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub(crate) fn id(&self) -> CorrelationId {
        self.slot.id()
    }

    /// Drive the request to completion. Consumes the orchestrator so the
    /// callback, the correlation id and the orientation lock are all released
    /// when this returns.
    pub(crate) async fn run(mut self) -> Completion {
        let lock = match self.live_host() {
            Some(host) => OrientationLock::engage(host.as_ref(), self.host.clone()),
            None => Err(HostError::Destroyed),
        };
        let completion = match lock {
            Ok(_lock) => match self.drive().await {
                Some(outcome) => Completion::Dispatched(outcome),
                None => Completion::Abandoned,
            },
            Err(err) => {
                warn!(id = %self.id(), %err, "could not attach to host; abandoning request");
                Completion::Abandoned
            }
        };
        self.transition(Phase::Done);
        completion
    }

    async fn drive(&mut self) -> Option<Outcome> {
        self.transition(Phase::SpecialPhase);
        self.special_phase().await?;

        self.transition(Phase::LocationPrelude);
        let raw = match self.location_prelude().await? {
            Prelude::ShortCircuit(raw) => raw,
            Prelude::Continue => {
                self.transition(Phase::DangerousPhase);
                self.dangerous_phase().await?
            }
        };

        self.transition(Phase::Classify);
        let outcome = self.classify(&raw)?;
        self.dispatch(&outcome).await?;
        Some(outcome)
    }

    async fn special_phase(&mut self) -> Option<()> {
        let mut navigated = false;
        for capability in SPECIAL_NAVIGATION_ORDER.iter().copied() {
            if !self.capabilities.contains(&capability) {
                continue;
            }
            let host = self.live_host()?;
            let query = AccessQuery::new(host.as_ref());
            // An earlier screen may already have granted this one.
            if !capability.is_supported_on(query.platform()) || query.is_granted(capability) {
                continue;
            }
            let target = self.settings.resolve(capability, host.as_ref());
            let pending = self.slot.expect_signal();
            debug!(id = %self.id(), %capability, %target, "navigating to settings");
            self.host_call(
                "settings navigation",
                host.navigate_to_settings(NavigationIntent {
                    id: self.id(),
                    target,
                    capability: Some(capability),
                }),
            )?;
            drop(host);
            pending.navigation_return(&self.host).await?;
            navigated = true;
        }
        if navigated {
            tokio::time::sleep(self.settle_delay).await;
        } else {
            debug!(id = %self.id(), "no special capability needs a settings screen");
        }
        Some(())
    }

    async fn location_prelude(&mut self) -> Option<Prelude> {
        let host = self.live_host()?;
        if !self.capabilities.contains(&Capability::LOCATION_BACKGROUND)
            || !host.platform().at_least(PlatformVersion::BACKGROUND_LOCATION)
        {
            return Some(Prelude::Continue);
        }
        let query = AccessQuery::new(host.as_ref());
        let foreground: Vec<Capability> = self
            .capabilities
            .iter()
            .copied()
            .filter(|cap| FOREGROUND_LOCATION.contains(cap) && !query.is_granted(*cap))
            .collect();
        if foreground.is_empty() {
            debug!(id = %self.id(), "foreground location already granted");
            return Some(Prelude::Continue);
        }

        // The sub-request gets its own id so its result cannot be mistaken for
        // the main prompt's.
        let sub = match self.slot.arena().lease() {
            Ok(sub) => sub,
            Err(err) => {
                warn!(id = %self.id(), %err, "could not lease id for location prelude; abandoning request");
                return None;
            }
        };
        debug!(id = %self.id(), sub = %sub.id(), ?foreground, "requesting foreground location first");
        let pending = sub.expect_signal();
        self.host_call(
            "location prompt",
            host.prompt_for(PromptIntent {
                id: sub.id(),
                capabilities: foreground.clone(),
            }),
        )?;
        drop(host);
        let result = pending.prompt_result(&self.host).await?;
        drop(sub);

        let host = self.live_host()?;
        let query = AccessQuery::new(host.as_ref());
        let denied = foreground
            .iter()
            .filter(|cap| match result.outcome_for(**cap) {
                Some(outcome) => !outcome.is_granted(),
                None => !query.is_granted(**cap),
            })
            .count();
        if denied > 0 && denied == self.capabilities.len() - 1 {
            debug!(id = %self.id(), denied, "foreground location refused; denying the whole request");
            let raw = self
                .capabilities
                .iter()
                .map(|cap| (*cap, RawOutcome::Denied))
                .collect();
            return Some(Prelude::ShortCircuit(raw));
        }
        Some(Prelude::Continue)
    }

    async fn dangerous_phase(&mut self) -> Option<RawResults> {
        let dangerous: Vec<Capability> = self
            .capabilities
            .iter()
            .copied()
            .filter(|cap| !cap.is_special())
            .collect();
        if dangerous.is_empty() {
            debug!(id = %self.id(), "nothing left to prompt for");
            return Some(RawResults::new());
        }

        let host = self.live_host()?;
        let pending = self.slot.expect_signal();
        self.host_call(
            "prompt",
            host.prompt_for(PromptIntent {
                id: self.id(),
                capabilities: dangerous,
            }),
        )?;
        drop(host);

        self.transition(Phase::AwaitingResult);
        let signal = pending.prompt_result(&self.host).await?;
        Some(raw_results(&signal))
    }

    fn classify(&self, raw: &RawResults) -> Option<Outcome> {
        let host = self.live_host()?;
        let query = AccessQuery::new(host.as_ref());
        let platform = query.platform();

        let mut outcome = Outcome::default();
        for capability in self.capabilities.iter().copied() {
            let reported = raw.get(&capability).copied();
            let granted = match reported {
                Some(raw) if !capability.is_special() && capability.reports_reliably_on(platform) => {
                    raw.is_granted()
                }
                _ => {
                    let fresh = query.is_granted(capability);
                    if reported.is_some_and(|raw| raw.is_granted() != fresh) {
                        debug!(id = %self.id(), %capability, fresh, "authority result corrected by re-query");
                    }
                    fresh
                }
            };
            if granted {
                outcome.granted.push(capability);
            } else {
                outcome.denied.push(capability);
            }
        }
        outcome.never = query.any_permanently_denied(&outcome.denied);
        Some(outcome)
    }

    async fn dispatch(&self, outcome: &Outcome) -> Option<()> {
        let host = self.live_host()?;
        let callback = self.callback.as_ref();
        if outcome.all_granted() {
            info!(id = %self.id(), granted = ?outcome.granted, "request fully granted");
            self.interceptor
                .granted(&host, callback, &outcome.granted, true)
                .await;
            return Some(());
        }

        info!(
            id = %self.id(),
            granted = ?outcome.granted,
            denied = ?outcome.denied,
            never = outcome.never,
            "request resolved with denials"
        );
        self.interceptor
            .denied(&host, callback, &outcome.denied, outcome.never)
            .await;
        if !outcome.granted.is_empty() {
            self.interceptor
                .granted(&host, callback, &outcome.granted, false)
                .await;
        }
        Some(())
    }

    fn live_host(&self) -> Option<Arc<dyn HostContext>> {
        let host = self.host.upgrade();
        if host.is_none() {
            warn!(id = %self.id(), phase = ?self.phase, "host unavailable; abandoning request");
        }
        host
    }

    fn host_call(&self, what: &str, result: Result<(), HostError>) -> Option<()> {
        match result {
            Ok(()) => Some(()),
            Err(err) => {
                warn!(id = %self.id(), phase = ?self.phase, %err, "{what} failed; abandoning request");
                None
            }
        }
    }

    fn transition(&mut self, next: Phase) {
        debug!(id = %self.id(), from = ?self.phase, to = ?next, "phase transition");
        self.phase = next;
    }
}

fn raw_results(signal: &HostSignal) -> RawResults {
    match signal {
        HostSignal::PromptResult { capabilities, .. } => capabilities
            .iter()
            .filter_map(|cap| signal.outcome_for(*cap).map(|outcome| (*cap, outcome)))
            .collect(),
        HostSignal::NavigationReturned { .. } => RawResults::new(),
    }
}

/// Pins an unspecified orientation to the current display orientation for
/// the life of the request, so the host window is not rebuilt mid-flight.
struct OrientationLock {
    host: HostHandle,
    locked: bool,
}

impl OrientationLock {
    fn engage(host: &dyn HostContext, handle: HostHandle) -> Result<Self, HostError> {
        let mut lock = Self {
            host: handle,
            locked: false,
        };
        if !host.requested_orientation().is_unspecified() {
            return Ok(lock);
        }
        let orientation = host.display_orientation();
        if orientation.is_unspecified() {
            return Ok(lock);
        }
        host.set_requested_orientation(orientation)?;
        debug!(?orientation, "locked orientation");
        lock.locked = true;
        Ok(lock)
    }
}

impl Drop for OrientationLock {
    fn drop(&mut self) {
        if !self.locked {
            return;
        }
        let Some(host) = self.host.upgrade() else {
            return;
        };
        if let Err(err) = host.set_requested_orientation(Orientation::Unspecified) {
            warn!(%err, "failed to restore orientation");
        }
    }
}
