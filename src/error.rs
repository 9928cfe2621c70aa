//! Error types for wifilink

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::interface::AdapterState;

#[derive(Debug, Error)]
pub enum WifiError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Appending the network block to the WPA config file failed
    #[error("Unable to set network config block in {}", .path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Bringing the adapter up or down failed
    #[error("Unable to {action} {interface} adapter")]
    AdapterToggle {
        interface: String,
        action: &'static str,
        #[source]
        source: Box<WifiError>,
    },

    /// The adapter never reported the requested state
    #[error("{interface} did not report {expected} after {polls} polls ({elapsed_ms}ms)")]
    AdapterTimeout {
        interface: String,
        expected: AdapterState,
        polls: u32,
        elapsed_ms: u128,
    },

    /// Scanning for networks failed
    #[error("An error occurred while running `iwlist {interface} scanning`")]
    Scan {
        interface: String,
        #[source]
        source: Box<WifiError>,
    },

    /// Command produced stderr output or exited unsuccessfully
    #[error("An error occurred while running `{command}`: {stderr}")]
    CommandExecution {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Interface status output could not be interpreted
    #[error("Unable to determine adapter status of {interface} ({reason}). To debug run `ifconfig` and ensure {interface} is present.")]
    AdapterStatusUnknown { interface: String, reason: String },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type WifiResult<T> = Result<T, WifiError>;
