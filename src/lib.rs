//! wifilink - WiFi connection library
//!
//! Joins WPA-PSK networks on Linux by driving the usual command-line tools:
//! - wpa_supplicant configuration (network blocks)
//! - Interface control (ifconfig up/down and status)
//! - WiFi scanning (iwlist)
//! - Connectivity checks (ping)
//!
//! All commands go through the [`CommandRunner`] capability so the whole flow
//! can run against scripted output.

pub mod error;
pub mod validation;
pub mod config;
pub mod command;
pub mod parse;
pub mod interface;
pub mod wifi;
pub mod connectivity;
pub mod wpa_supplicant;
pub mod network;

// Re-export commonly used types
pub use error::{WifiError, WifiResult};
pub use config::WifiConfig;
pub use command::{CommandLine, CommandOutput, CommandRunner, SystemRunner};
pub use interface::{AdapterState, InterfaceController, WaitPolicy};
pub use wifi::WifiController;
pub use connectivity::ConnectivityChecker;
pub use wpa_supplicant::{NetworkCredential, WpaConfigFile};
pub use network::NetworkController;
