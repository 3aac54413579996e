use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use grantor_core::{
    Completion, Grantor, HostContext, Interceptor, PermissionCallback, SettingsResolver,
    settings,
};
use grantor_host::UserScript;
use grantor_types::Capability;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use super::{CapabilityArgs, HostStateArgs};
use crate::opts::GlobalOpts;
use crate::output::print_success;
use crate::util::grantor_config;

#[derive(Args, Debug)]
pub struct RequestArgs {
    #[command(flatten)]
    pub capabilities: CapabilityArgs,

    #[command(flatten)]
    pub host: HostStateArgs,

    /// The simulated user allows this capability (anything unlisted is denied)
    #[arg(long = "allow")]
    pub allow: Vec<Capability>,

    /// The simulated user denies this capability with "don't ask again"
    #[arg(long = "deny-always")]
    pub deny_always: Vec<Capability>,

    /// Offer the settings screen when something ends up permanently denied
    #[arg(long)]
    pub guide: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "callback", rename_all = "snake_case")]
enum CallbackEvent {
    Granted { capabilities: Vec<Capability>, all: bool },
    Denied { capabilities: Vec<Capability>, never: bool },
}

#[derive(Clone, Default)]
struct Transcript(Arc<Mutex<Vec<CallbackEvent>>>);

impl Transcript {
    fn push(&self, event: CallbackEvent) {
        self.0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event);
    }

    fn events(&self) -> Vec<CallbackEvent> {
        self.0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl PermissionCallback for Transcript {
    fn on_granted(&self, capabilities: &[Capability], all: bool) {
        self.push(CallbackEvent::Granted {
            capabilities: capabilities.to_vec(),
            all,
        });
    }

    fn on_denied(&self, capabilities: &[Capability], never: bool) {
        self.push(CallbackEvent::Denied {
            capabilities: capabilities.to_vec(),
            never,
        });
    }
}

/// Sends the user to settings when a denial is permanent, then forwards as usual.
struct GuideToSettings<S> {
    settings: S,
}

#[async_trait]
impl<S: SettingsResolver> Interceptor for GuideToSettings<S> {
    async fn denied(
        &self,
        host: &Arc<dyn HostContext>,
        callback: &dyn PermissionCallback,
        capabilities: &[Capability],
        never: bool,
    ) {
        if never {
            match settings::open_settings(&self.settings, host.as_ref(), capabilities) {
                Ok(target) => info!(%target, "guided user to settings"),
                Err(err) => warn!(%err, "could not open settings"),
            }
        }
        callback.on_denied(capabilities, never);
    }
}

pub async fn cmd_request(opts: &GlobalOpts, args: &RequestArgs) -> Result<()> {
    let capabilities = args.capabilities.resolve()?;
    let grantor = Grantor::new(grantor_config(opts));
    let host = args.host.build_host(opts.platform(), grantor.signal_sink());

    let mut script = UserScript::new();
    for cap in &args.allow {
        script = script.allow(*cap);
    }
    for cap in &args.deny_always {
        script = script.deny_always(*cap);
    }
    host.set_script(script);

    let transcript = Transcript::default();
    let mut request = grantor.with_context(&host).capabilities(&capabilities);
    if args.guide {
        request = request.interceptor(GuideToSettings {
            settings: grantor_core::DefaultSettings,
        });
    }
    let completion = request
        .request(transcript.clone())
        .await
        .context("request capabilities")?;

    let events = transcript.events();
    let journal = host.journal();

    let mut human = String::new();
    for event in &events {
        match event {
            CallbackEvent::Granted { capabilities, all } => {
                human.push_str(&format!("granted {} (all: {all})\n", ids(capabilities)));
            }
            CallbackEvent::Denied { capabilities, never } => {
                human.push_str(&format!("denied  {} (never: {never})\n", ids(capabilities)));
            }
        }
    }
    human.push_str(&format!("completion: {}\n", completion_label(&completion)));
    for event in &journal {
        human.push_str(&format!("host: {}\n", serde_json::to_string(event)?));
    }

    print_success(
        opts,
        json!({
            "completion": completion,
            "callbacks": events,
            "journal": journal,
        }),
        Some(human),
    )
}

fn ids(capabilities: &[Capability]) -> String {
    capabilities
        .iter()
        .map(|cap| cap.id())
        .collect::<Vec<_>>()
        .join(", ")
}

fn completion_label(completion: &Completion) -> &'static str {
    match completion {
        Completion::AlreadyGranted => "already granted",
        Completion::Dispatched(_) => "dispatched",
        Completion::Abandoned => "abandoned",
        Completion::Unresolved => "unresolved",
    }
}
