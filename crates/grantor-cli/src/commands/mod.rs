//! CLI command handlers.

pub mod catalogue;
pub mod request;
pub mod status;

use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::Args;
use grantor_core::SignalSink;
use grantor_host::SimulatedHost;
use grantor_types::{Capability, PlatformVersion, group};

/// Capabilities named on the command line, individually or by group.
#[derive(Args, Debug, Clone)]
pub struct CapabilityArgs {
    /// Capability ids, e.g. `camera` or `location.fine`
    pub capabilities: Vec<Capability>,

    /// Add every capability of a group (calendar, contacts, location, ...)
    #[arg(long = "group", value_parser = parse_group)]
    pub groups: Vec<&'static [Capability]>,
}

impl CapabilityArgs {
    /// Named capabilities followed by group members, in command-line order.
    pub fn resolve(&self) -> Result<Vec<Capability>> {
        let mut out = self.capabilities.clone();
        for members in &self.groups {
            out.extend_from_slice(members);
        }
        if out.is_empty() {
            return Err(anyhow!("name at least one capability or --group"));
        }
        Ok(out)
    }
}

/// Grant state the simulated host starts from.
#[derive(Args, Debug, Clone, Default)]
pub struct HostStateArgs {
    /// Capability already granted
    #[arg(long = "granted")]
    pub granted: Vec<Capability>,

    /// Capability denied once before (the authority shows a rationale)
    #[arg(long = "denied")]
    pub denied: Vec<Capability>,

    /// Capability denied with "don't ask again"
    #[arg(long = "denied-always")]
    pub denied_always: Vec<Capability>,
}

impl HostStateArgs {
    pub fn build_host(&self, platform: PlatformVersion, sink: SignalSink) -> Arc<SimulatedHost> {
        let host = SimulatedHost::new(platform, sink);
        for cap in &self.granted {
            host.grant(*cap);
        }
        for cap in &self.denied {
            host.deny(*cap);
        }
        for cap in &self.denied_always {
            host.deny_permanently(*cap);
        }
        host
    }
}

fn parse_group(name: &str) -> Result<&'static [Capability], String> {
    group::by_name(name).ok_or_else(|| format!("unknown group '{name}'"))
}
