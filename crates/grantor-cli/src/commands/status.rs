use anyhow::Result;
use clap::Args;
use grantor_core::Grantor;
use serde_json::json;

use super::{CapabilityArgs, HostStateArgs};
use crate::opts::GlobalOpts;
use crate::output::print_success;

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub capabilities: CapabilityArgs,

    #[command(flatten)]
    pub host: HostStateArgs,
}

pub fn cmd_status(opts: &GlobalOpts, args: &StatusArgs) -> Result<()> {
    let capabilities = args.capabilities.resolve()?;
    let grantor = Grantor::default();
    let host = args.host.build_host(opts.platform(), grantor.signal_sink());
    let query = grantor.query(host.as_ref());

    let mut human = String::new();
    let mut rows = Vec::with_capacity(capabilities.len());
    for cap in capabilities {
        let status = query.status(cap);
        human.push_str(&format!("{:<24} {:?}\n", cap.id(), status));
        rows.push(json!({
            "id": cap,
            "status": status,
            "special": query.is_special(cap),
        }));
    }

    print_success(
        opts,
        json!({ "platform": opts.platform(), "capabilities": rows }),
        Some(human),
    )
}
