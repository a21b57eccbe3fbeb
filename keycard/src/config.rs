use clap::Parser;
use keycard_core::api::client::DEFAULT_SERVER;
use keycard_core::Route;
use std::path::PathBuf;
use std::time::Duration;

/// A terminal client for logging in and registering accounts
#[derive(Debug, Parser)]
#[clap(version)]
pub struct Config {
    /// Base URL of the account API
    #[clap(long, env = "KEYCARD_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Where should we store the session and logs?
    #[clap(long, env = "KEYCARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Give up on a request after this many seconds
    #[clap(long, env = "KEYCARD_REQUEST_TIMEOUT", default_value = "30", value_parser = duration_parser)]
    pub request_timeout: Duration,

    /// Which page to open first
    #[clap(long, default_value = "/home")]
    pub start_at: Route,
}

fn duration_parser(s: &str) -> Result<Duration, std::num::ParseIntError> {
    s.parse().map(Duration::from_secs)
}

impl Config {
    /// Get either the configured or a default data directory. If no data
    /// directory can be found (e.g. because `$HOME` is unset) we will use the
    /// current directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| {
                directories::ProjectDirs::from("dev", "keycard", "keycard")
                    .map(|dirs| dirs.data_local_dir().to_owned())
            })
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Where the session lives on disk
    pub fn session_path(&self) -> PathBuf {
        self.data_dir().join("session.json")
    }
}
