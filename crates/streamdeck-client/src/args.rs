//! Startup parameters passed by the Stream Deck application.
//!
//! Plugins are launched as
//! `plugin -port 28196 -pluginUUID <id> -registerEvent registerPlugin -info <json>`.
//! The single-dash long flags are rewritten to `--flag` before clap sees them.

use std::ffi::OsString;

use clap::Parser;
use thiserror::Error;

const LAUNCH_FLAGS: [&str; 4] = ["-port", "-pluginUUID", "-registerEvent", "-info"];

/// Everything needed before `connect`.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(about = "Stream Deck plugin")]
pub struct RegistrationArgs {
    /// Local port of the Stream Deck WebSocket server.
    #[arg(long, env = "STREAMDECK_PORT")]
    pub port: u16,

    /// Identifier of this plugin instance; sent back in the registration frame.
    #[arg(long = "pluginUUID", env = "STREAMDECK_PLUGIN_UUID")]
    pub plugin_uuid: String,

    /// Event name to register with.
    #[arg(long = "registerEvent", env = "STREAMDECK_REGISTER_EVENT")]
    pub register_event: String,

    /// JSON describing the application, plugin and devices.
    #[arg(long, default_value = "{}")]
    pub info: String,
}

impl RegistrationArgs {
    pub fn new(port: u16, plugin_uuid: impl Into<String>, register_event: impl Into<String>) -> Self {
        Self {
            port,
            plugin_uuid: plugin_uuid.into(),
            register_event: register_event.into(),
            info: "{}".to_string(),
        }
    }

    /// Parse the current process arguments.
    pub fn from_env() -> Result<Self, ArgsError> {
        Self::from_args(std::env::args_os())
    }

    /// Parse an argument list whose first item is the program name.
    pub fn from_args<I, T>(args: I) -> Result<Self, ArgsError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let normalized = args.into_iter().map(|arg| normalize_flag(arg.into()));
        Ok(Self::try_parse_from(normalized)?)
    }

    /// The WebSocket endpoint for `port`.
    pub fn url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }

    /// Decode the `-info` blob.
    pub fn info(&self) -> Result<serde_json::Value, ArgsError> {
        Ok(serde_json::from_str(&self.info)?)
    }
}

fn normalize_flag(arg: OsString) -> OsString {
    match arg.to_str() {
        Some(flag) if LAUNCH_FLAGS.contains(&flag) => format!("-{flag}").into(),
        _ => arg,
    }
}

/// Error reading startup parameters.
#[derive(Debug, Error)]
pub enum ArgsError {
    #[error(transparent)]
    Parse(#[from] clap::Error),

    #[error("invalid -info JSON: {0}")]
    Info(#[from] serde_json::Error),
}
