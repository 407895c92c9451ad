use std::path::PathBuf;

use clap::Parser;

/// Hush generation gateway
#[derive(Debug, Parser)]
#[command(name = "hush", about = "Mood to bedtime narration and whisper audio gateway")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "hush.toml", env = "HUSH_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "HUSH_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
