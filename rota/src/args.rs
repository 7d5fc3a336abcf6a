use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// Staff scheduling backend
#[derive(Debug, Parser)]
#[command(name = "rota", about = "Staff, appointment, and share link API")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "rota.toml", env = "ROTA_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "ROTA_LISTEN")]
    pub listen: Option<SocketAddr>,
}
