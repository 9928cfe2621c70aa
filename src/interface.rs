//! Wireless interface control
//!
//! Toggles the adapter with ifconfig and infers its state from the first line
//! of `ifconfig <iface>` output.

use crate::command::{run_checked, CommandLine, CommandRunner};
use crate::error::{WifiError, WifiResult};
use crate::parse;
use crate::validation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterState {
    Up,
    Down,
}

impl fmt::Display for AdapterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterState::Up => write!(f, "up"),
            AdapterState::Down => write!(f, "down"),
        }
    }
}

/// Bounds for waiting on an adapter state change
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub timeout: Duration,
    pub max_polls: u32,
}

/// Interface controller
pub struct InterfaceController {
    runner: Arc<dyn CommandRunner>,
    interface: String,
    use_sudo: bool,
}

impl InterfaceController {
    pub fn new(runner: Arc<dyn CommandRunner>, interface: &str, use_sudo: bool) -> WifiResult<Self> {
        validation::validate_interface_name(interface)?;
        Ok(Self {
            runner,
            interface: interface.to_string(),
            use_sudo,
        })
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Bring interface up
    pub async fn up(&self) -> WifiResult<()> {
        self.toggle("up", "enable").await
    }

    /// Bring interface down
    pub async fn down(&self) -> WifiResult<()> {
        self.toggle("down", "disable").await
    }

    /// Current adapter state
    pub async fn state(&self) -> WifiResult<AdapterState> {
        let cmd = CommandLine::new("ifconfig", [self.interface.as_str()]);
        let lines = match run_checked(self.runner.as_ref(), &cmd).await {
            Ok(lines) => lines,
            Err(e) => {
                error!("A error occurred while trying to run `{}`: {}", cmd, e);
                return Err(WifiError::AdapterStatusUnknown {
                    interface: self.interface.clone(),
                    reason: e.to_string(),
                });
            }
        };

        parse::adapter_state(&lines).map_err(|e| WifiError::AdapterStatusUnknown {
            interface: self.interface.clone(),
            reason: e.to_string(),
        })
    }

    pub async fn is_up(&self) -> WifiResult<bool> {
        Ok(self.state().await? == AdapterState::Up)
    }

    /// Poll until the adapter reports `expected`, within the policy bounds
    pub async fn wait_for(&self, expected: AdapterState, policy: WaitPolicy) -> WifiResult<()> {
        let start = Instant::now();
        let mut polls = 0u32;

        loop {
            polls += 1;
            let state = self.state().await?;
            if state == expected {
                debug!("{} reported {} after {} poll(s)", self.interface, expected, polls);
                return Ok(());
            }

            if polls >= policy.max_polls || start.elapsed() + policy.interval > policy.timeout {
                return Err(WifiError::AdapterTimeout {
                    interface: self.interface.clone(),
                    expected,
                    polls,
                    elapsed_ms: start.elapsed().as_millis(),
                });
            }

            tokio::time::sleep(policy.interval).await;
        }
    }

    async fn toggle(&self, direction: &str, action: &'static str) -> WifiResult<()> {
        let cmd = CommandLine::new("ifconfig", [self.interface.as_str(), direction])
            .elevated(self.use_sudo);

        info!("Bringing {} {}", self.interface, direction);
        run_checked(self.runner.as_ref(), &cmd)
            .await
            .map(|_| ())
            .map_err(|e| WifiError::AdapterToggle {
                interface: self.interface.clone(),
                action,
                source: Box::new(e),
            })
    }
}
