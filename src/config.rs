//! Process configuration.
//!
//! Every setting is a command-line flag with an environment fallback, so
//! the same binary runs under a shell, a service manager, or a container.

use clap::Parser;

/// Runtime settings for the `rollcall` binary.
#[derive(Clone, Debug, Parser, PartialEq, Eq)]
#[command(name = "rollcall", version, about = "Server-rendered user directory")]
pub struct Config {
    /// Socket address to listen on.
    #[arg(long, env = "ROLLCALL_BIND", default_value = "0.0.0.0:3000")]
    pub bind: String,

    /// Default log filter, used when `RUST_LOG` is unset.
    #[arg(long, env = "ROLLCALL_LOG", default_value = "info")]
    pub log_filter: String,

    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, env = "ROLLCALL_LOG_JSON")]
    pub log_json: bool,
}
