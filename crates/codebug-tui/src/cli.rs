//! Command-line arguments.

use clap::Parser;
use codebug_editor_http::{DEFAULT_BASE_URL, ServiceConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Terminal code editor that sends code to an analysis service
#[derive(Parser, Debug)]
#[command(name = "codebug-tui", version, about)]
pub struct CliArgs {
    /// Base URL of the analysis service
    #[arg(long, env = "CODEBUG_ENDPOINT", default_value = DEFAULT_BASE_URL)]
    pub endpoint: String,

    /// Transport timeout for one analysis request, in seconds
    #[arg(long, env = "CODEBUG_TIMEOUT_SECS", default_value_t = 30, value_name = "SECS")]
    pub timeout_secs: u64,

    /// Load the initial editor text from this file
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Disable syntax highlighting (render escaped plain text)
    #[arg(long)]
    pub plain: bool,

    /// Write logs to this file (logging is off without it)
    #[arg(long, env = "CODEBUG_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl CliArgs {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            base_url: self.endpoint.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
