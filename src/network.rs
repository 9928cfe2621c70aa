//! Network controller
//!
//! Joins a WPA-PSK network: append the credential to the wpa_supplicant
//! config, bounce the adapter so wpa_supplicant picks it up, then check
//! connectivity with a bounded number of pings.

use crate::command::{run_checked, CommandLine, CommandRunner, SystemRunner};
use crate::config::WifiConfig;
use crate::connectivity::ConnectivityChecker;
use crate::error::WifiResult;
use crate::interface::{AdapterState, InterfaceController, WaitPolicy};
use crate::wifi::WifiController;
use crate::wpa_supplicant::{NetworkCredential, WpaConfigFile};
use std::sync::Arc;
use tracing::info;

pub struct NetworkController {
    config: WifiConfig,
    runner: Arc<dyn CommandRunner>,
    interface: InterfaceController,
    wifi: WifiController,
    connectivity: ConnectivityChecker,
    wpa_conf: WpaConfigFile,
}

impl NetworkController {
    /// Controller that runs real system commands
    pub fn new(config: WifiConfig) -> WifiResult<Self> {
        Self::with_runner(config, Arc::new(SystemRunner::new()))
    }

    pub fn with_runner(config: WifiConfig, runner: Arc<dyn CommandRunner>) -> WifiResult<Self> {
        config.validate()?;

        Ok(Self {
            interface: InterfaceController::new(runner.clone(), &config.interface, config.use_sudo)?,
            wifi: WifiController::new(runner.clone(), &config.interface)?,
            connectivity: ConnectivityChecker::new(runner.clone(), &config.ping_target, config.ping_count)?,
            wpa_conf: WpaConfigFile::new(config.wpa_conf_path.clone()),
            runner,
            config,
        })
    }

    pub fn config(&self) -> &WifiConfig {
        &self.config
    }

    /// Join `ssid`, returning whether connectivity was established.
    ///
    /// Configuration and adapter failures are errors; never reaching the
    /// ping target within the attempt budget is `Ok(false)`.
    pub async fn connect(&self, ssid: &str, passphrase: &str) -> WifiResult<bool> {
        let credential = NetworkCredential::new(ssid, passphrase);
        credential.validate()?;

        info!("Connecting to WiFi network '{}' on {}", ssid, self.config.interface);
        self.wpa_conf.append_network(&credential).await?;

        let policy = self.wait_policy();

        self.interface.down().await?;
        self.interface.wait_for(AdapterState::Down, policy).await?;

        self.interface.up().await?;
        self.interface.wait_for(AdapterState::Up, policy).await?;

        let connected = self
            .connectivity
            .wait_for_connectivity(self.config.connect_attempts, self.config.retry_delay())
            .await;

        if connected {
            info!("Connected to '{}'", ssid);
        }
        Ok(connected)
    }

    /// SSIDs visible to the adapter
    pub async fn scan(&self) -> WifiResult<Vec<String>> {
        self.wifi.scan().await
    }

    /// Alias of [`scan`](Self::scan)
    pub async fn get_available_networks(&self) -> WifiResult<Vec<String>> {
        self.scan().await
    }

    /// Single connectivity check
    pub async fn is_connected(&self) -> bool {
        self.connectivity.test_connection().await
    }

    /// Alias of [`is_connected`](Self::is_connected)
    pub async fn test_connection(&self) -> bool {
        self.is_connected().await
    }

    pub async fn is_adapter_up(&self) -> WifiResult<bool> {
        self.interface.is_up().await
    }

    /// Alias of [`is_adapter_up`](Self::is_adapter_up)
    pub async fn wifi_adapter_up(&self) -> WifiResult<bool> {
        self.is_adapter_up().await
    }

    /// Run an arbitrary command with the stderr-is-failure policy
    pub async fn run_command(&self, command: &CommandLine) -> WifiResult<Vec<String>> {
        run_checked(self.runner.as_ref(), command).await
    }

    /// SSIDs already present in the wpa_supplicant config
    pub async fn configured_networks(&self) -> WifiResult<Vec<String>> {
        self.wpa_conf.configured_networks().await
    }

    /// Drop every config block for `ssid`
    pub async fn forget(&self, ssid: &str) -> WifiResult<usize> {
        self.wpa_conf.forget(ssid).await
    }

    fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            interval: self.config.poll_interval(),
            timeout: self.config.adapter_timeout(),
            max_polls: self.config.adapter_max_polls,
        }
    }
}
