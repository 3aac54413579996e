//! Request-scoped ownership of correlation ids and pending host signals.
//!
//! Every in-flight request leases one id from the arena. While it waits on the
//! host it parks a one-shot slot under that id; hosts push signals back through
//! a [`SignalSink`]. Dropping the lease tears both down, so an abandoned
//! request never leaks its id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use grantor_types::{CorrelationId, HostSignal};
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::correlation::{CorrelationIds, EntropySource};
use crate::error::GrantorError;
use crate::host::HostHandle;

const MIN_LIVENESS_INTERVAL: Duration = Duration::from_millis(1);

type Slots = HashMap<CorrelationId, oneshot::Sender<HostSignal>>;

pub(crate) struct Arena {
    ids: CorrelationIds,
    slots: Mutex<Slots>,
    liveness_interval: Duration,
}

impl Arena {
    pub(crate) fn new(entropy: Arc<dyn EntropySource>, liveness_interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            ids: CorrelationIds::new(entropy),
            slots: Mutex::new(HashMap::new()),
            liveness_interval: liveness_interval.max(MIN_LIVENESS_INTERVAL),
        })
    }

    pub(crate) fn lease(self: &Arc<Self>) -> Result<RequestSlot, GrantorError> {
        let id = self.ids.allocate()?;
        debug!(%id, "leased correlation id");
        Ok(RequestSlot {
            id,
            arena: Arc::clone(self),
        })
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn park(&self, id: CorrelationId) -> oneshot::Receiver<HostSignal> {
        let (tx, rx) = oneshot::channel();
        if self.slots().insert(id, tx).is_some() {
            debug!(%id, "replaced stale signal slot");
        }
        rx
    }
}

/// One leased correlation id. Dropping it cancels any parked slot and
/// releases the id.
pub(crate) struct RequestSlot {
    id: CorrelationId,
    arena: Arc<Arena>,
}

impl RequestSlot {
    pub(crate) fn id(&self) -> CorrelationId {
        self.id
    }

    pub(crate) fn arena(&self) -> &Arc<Arena> {
        &self.arena
    }

    /// Park a slot for the next signal. Must happen before the host call that
    /// produces the signal, since hosts may answer synchronously.
    pub(crate) fn expect_signal(&self) -> PendingSignal {
        PendingSignal {
            id: self.id,
            rx: self.arena.park(self.id),
            arena: Arc::clone(&self.arena),
        }
    }
}

impl Drop for RequestSlot {
    fn drop(&mut self) {
        self.arena.slots().remove(&self.id);
        self.arena.ids.release(self.id);
        debug!(id = %self.id, "released correlation id");
    }
}

pub(crate) struct PendingSignal {
    id: CorrelationId,
    rx: oneshot::Receiver<HostSignal>,
    arena: Arc<Arena>,
}

impl PendingSignal {
    /// Wait for the user to come back from a settings screen. `None` means the
    /// host went away first.
    pub(crate) async fn navigation_return(mut self, host: &HostHandle) -> Option<()> {
        loop {
            match self.next(host).await? {
                HostSignal::NavigationReturned { .. } => return Some(()),
                other => self.ignore(&other),
            }
        }
    }

    /// Wait for the prompt result. `None` means the host went away first.
    pub(crate) async fn prompt_result(mut self, host: &HostHandle) -> Option<HostSignal> {
        loop {
            match self.next(host).await? {
                signal @ HostSignal::PromptResult { .. } => return Some(signal),
                other => self.ignore(&other),
            }
        }
    }

    fn ignore(&mut self, signal: &HostSignal) {
        warn!(id = %self.id, ?signal, "ignoring signal of unexpected kind");
        self.rx = self.arena.park(self.id);
    }

    async fn next(&mut self, host: &HostHandle) -> Option<HostSignal> {
        let mut liveness = tokio::time::interval(self.arena.liveness_interval);
        liveness.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                received = &mut self.rx => {
                    if received.is_err() {
                        debug!(id = %self.id, "signal slot abandoned");
                    }
                    return received.ok();
                }
                _ = liveness.tick() => {
                    if !host.is_alive() {
                        debug!(id = %self.id, "host gone while waiting for signal");
                        return None;
                    }
                }
            }
        }
    }
}

/// Result of handing a signal to the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Routed,
    /// No request is waiting on this id. Manual navigations and stale ids end
    /// up here.
    Unclaimed(HostSignal),
}

/// Entry point for hosts to push signals back to waiting requests.
#[derive(Clone)]
pub struct SignalSink {
    arena: Arc<Arena>,
}

impl SignalSink {
    pub(crate) fn new(arena: Arc<Arena>) -> Self {
        Self { arena }
    }

    pub fn deliver(&self, signal: HostSignal) -> Delivery {
        let id = signal.id();
        let slot = self.arena.slots().remove(&id);
        match slot {
            Some(tx) => match tx.send(signal) {
                Ok(()) => Delivery::Routed,
                Err(signal) => Delivery::Unclaimed(signal),
            },
            None => {
                debug!(%id, "no request waiting on signal");
                Delivery::Unclaimed(signal)
            }
        }
    }

    /// Drop whatever slot is parked under `id` so its request abandons.
    /// Used by hosts tearing down with requests still in flight.
    pub fn abandon(&self, id: CorrelationId) -> bool {
        let dropped = self.arena.slots().remove(&id).is_some();
        if dropped {
            debug!(%id, "abandoned signal slot");
        }
        dropped
    }

    pub fn in_flight(&self) -> usize {
        self.arena.ids.in_flight()
    }

    pub fn is_in_flight(&self, id: CorrelationId) -> bool {
        self.arena.ids.is_in_flight(id)
    }
}

impl std::fmt::Debug for SignalSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalSink")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
