//! Global CLI options.

use clap::Args;
use grantor_types::PlatformVersion;

#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Platform revision the simulated host runs (env: GRANTOR_PLATFORM)
    #[arg(long, global = true, default_value_t = 33, env = "GRANTOR_PLATFORM")]
    pub platform: u32,

    /// Pause after settings screens return, in milliseconds (env: GRANTOR_SETTLE_DELAY_MS)
    #[arg(long, global = true, env = "GRANTOR_SETTLE_DELAY_MS")]
    pub settle_delay_ms: Option<u64>,

    /// Reject duplicate capabilities and missing prerequisites
    #[arg(long, global = true)]
    pub strict: bool,

    /// JSON output envelope
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output (implies --json)
    #[arg(long, global = true)]
    pub pretty: bool,
}

impl GlobalOpts {
    pub fn platform(&self) -> PlatformVersion {
        PlatformVersion::new(self.platform)
    }
}
