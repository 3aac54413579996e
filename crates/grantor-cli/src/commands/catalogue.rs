use anyhow::Result;
use clap::{Args, ValueEnum};
use grantor_types::{Capability, CapabilityKind, catalogue};
use serde_json::json;

use crate::opts::GlobalOpts;
use crate::output::print_success;

#[derive(Args, Debug)]
pub struct CatalogueArgs {
    /// Only list capabilities of this kind
    #[arg(long, value_enum)]
    pub kind: Option<KindFilter>,

    /// Only list capabilities the selected platform knows about
    #[arg(long)]
    pub supported: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    Dangerous,
    Special,
}

impl KindFilter {
    fn matches(self, kind: CapabilityKind) -> bool {
        matches!(
            (self, kind),
            (KindFilter::Dangerous, CapabilityKind::Dangerous)
                | (KindFilter::Special, CapabilityKind::Special)
        )
    }
}

pub fn cmd_catalogue(opts: &GlobalOpts, args: &CatalogueArgs) -> Result<()> {
    let platform = opts.platform();
    let entries: Vec<Capability> = catalogue()
        .values()
        .copied()
        .filter(|cap| args.kind.is_none_or(|kind| kind.matches(cap.kind())))
        .filter(|cap| !args.supported || cap.is_supported_on(platform))
        .collect();

    let data = entries
        .iter()
        .map(|cap| {
            json!({
                "id": cap,
                "kind": cap.kind(),
                "since": cap.since(),
                "legacy": cap.legacy(),
                "requires_any_of": cap.requires_any_of(),
            })
        })
        .collect();

    let mut human = String::new();
    for cap in &entries {
        let kind = match cap.kind() {
            CapabilityKind::Dangerous => "dangerous",
            CapabilityKind::Special => "special",
        };
        human.push_str(&format!("{:<24} {:<9} since {}", cap.id(), kind, cap.since()));
        if !cap.legacy().is_empty() {
            let legacy: Vec<&str> = cap.legacy().iter().map(|c| c.id()).collect();
            human.push_str(&format!("  (legacy: {})", legacy.join(", ")));
        }
        human.push('\n');
    }

    print_success(opts, serde_json::Value::Array(data), Some(human))
}
