mod commands;
mod opts;
mod output;
mod util;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::catalogue::CatalogueArgs;
use commands::request::RequestArgs;
use commands::status::StatusArgs;
use opts::GlobalOpts;

#[derive(Parser, Debug)]
#[command(name = "grantor", version, about = "Capability request simulator")]
struct Cli {
    #[command(flatten)]
    opts: GlobalOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List known capabilities
    Catalogue(CatalogueArgs),

    /// Query capability status on a simulated host
    Status(StatusArgs),

    /// Run a full request against a simulated host
    Request(RequestArgs),
}

fn main() -> Result<()> {
    // `.env` is applied before the runtime spawns threads and before parsing,
    // so its values can back env-aware flags.
    util::load_env(Path::new("."))?;
    util::setup_logging();

    let cli = Cli::parse();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let opts = &cli.opts;
    match cli.command {
        Command::Catalogue(args) => commands::catalogue::cmd_catalogue(opts, &args),
        Command::Status(args) => commands::status::cmd_status(opts, &args),
        Command::Request(args) => commands::request::cmd_request(opts, &args).await,
    }
}
