use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    about = env!("CARGO_PKG_DESCRIPTION"),
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, short, default_value = "storefrontd.toml")]
    pub config: PathBuf,

    /// Overrides `rpc.addr` from the configuration file.
    #[arg(long)]
    pub rpc_addr: Option<String>,
}
