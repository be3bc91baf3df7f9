//! Command-line configuration.

use addressbook_core::default_log_level;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Address book HTTP service.
#[derive(Debug, Clone, Parser)]
#[command(name = "addressbook", version, about, disable_help_flag = true)]
pub struct ServerConfig {
    /// Host IP address that the server should listen on.
    #[arg(long, short = 'h', default_value = "0.0.0.0")]
    pub host: String,

    /// Port to run the API on.
    #[arg(long, short = 'p', default_value_t = 8000)]
    pub port: u16,

    /// SQLite database file holding the contacts table.
    #[arg(long, default_value = "db.sqlite")]
    pub db: PathBuf,

    /// One of trace|debug|info|warn|error.
    #[arg(long, default_value = default_log_level())]
    pub log_level: String,

    /// Absolute directory for rolling log files; logs go to stderr when unset.
    #[arg(long)]
    pub log_dir: Option<String>,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl ServerConfig {
    /// Address handed to the TCP listener; host names are resolved on bind.
    pub fn bind_target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}
