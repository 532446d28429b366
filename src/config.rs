use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

use crate::store::DATA_DIR;

/// Local backend for the pomodoro timer UI.
#[derive(Debug, Clone, Parser)]
#[command(name = "pomodoro_tracker", version)]
pub struct Config {
    /// Directory holding the stats, tasks and settings records
    #[arg(long, env = "POMODORO_DATA_DIR", default_value = DATA_DIR)]
    pub data_dir: PathBuf,

    /// Address the API listens on
    #[arg(long, env = "POMODORO_ADDR", default_value = "127.0.0.1:3000")]
    pub addr: SocketAddr,

    /// Directory with the timer UI's static files
    #[arg(long, env = "POMODORO_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Keep all records in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Log at debug level regardless of RUST_LOG
    #[arg(long)]
    pub debug: bool,
}
