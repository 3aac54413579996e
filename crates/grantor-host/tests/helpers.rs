#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use grantor_core::{Grantor, GrantorConfig, PermissionCallback};
use grantor_host::SimulatedHost;
use grantor_types::Capability;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Granted(Vec<Capability>, bool),
    Denied(Vec<Capability>, bool),
}

/// Callback that remembers every invocation in order.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Call>>>);

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }
}

impl PermissionCallback for Recorder {
    fn on_granted(&self, capabilities: &[Capability], all: bool) {
        self.0
            .lock()
            .unwrap()
            .push(Call::Granted(capabilities.to_vec(), all));
    }

    fn on_denied(&self, capabilities: &[Capability], never: bool) {
        self.0
            .lock()
            .unwrap()
            .push(Call::Denied(capabilities.to_vec(), never));
    }
}

pub fn test_config() -> GrantorConfig {
    GrantorConfig {
        settle_delay: Duration::ZERO,
        liveness_interval: Duration::from_millis(5),
        strict: false,
    }
}

pub fn grantor() -> Grantor {
    Grantor::new(test_config())
}

pub fn setup(level: u32) -> (Grantor, Arc<SimulatedHost>) {
    let grantor = grantor();
    let host = SimulatedHost::new(level, grantor.signal_sink());
    (grantor, host)
}

/// Poll until the host has queued `count` answers.
pub async fn wait_for_pending(host: &SimulatedHost, count: usize) {
    for _ in 0..1000 {
        if host.pending_responses().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!(
        "expected {count} pending responses, found {}",
        host.pending_responses().len()
    );
}
