use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use grantor_core::GrantorConfig;
use tracing_subscriber::EnvFilter;

use crate::opts::GlobalOpts;

/// Load `.env` from `dir` without overriding existing environment variables.
/// Must run before any other thread is spawned.
pub fn load_env(dir: &Path) -> Result<()> {
    let env_path = dir.join(".env");
    if env_path.exists() {
        for item in dotenvy::from_path_iter(&env_path).context("load .env")? {
            let (key, val) = item?;
            if std::env::var_os(&key).is_none() {
                unsafe {
                    std::env::set_var(&key, &val);
                }
            }
        }
    }
    Ok(())
}

/// Logs go to stderr so `--json` output stays parseable.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .init();
}

pub fn grantor_config(opts: &GlobalOpts) -> GrantorConfig {
    let mut config = GrantorConfig::from_env();
    if let Some(ms) = opts.settle_delay_ms {
        config.settle_delay = Duration::from_millis(ms);
    }
    if opts.strict {
        config.strict = true;
    }
    config
}
