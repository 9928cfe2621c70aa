//! WiFi scanning
//!
//! Lists nearby networks with `iwlist <iface> scanning`.

use crate::command::{run_checked, CommandLine, CommandRunner};
use crate::error::{WifiError, WifiResult};
use crate::parse;
use crate::validation;
use std::sync::Arc;
use tracing::debug;

/// WiFi controller
pub struct WifiController {
    runner: Arc<dyn CommandRunner>,
    interface: String,
}

impl WifiController {
    pub fn new(runner: Arc<dyn CommandRunner>, interface: &str) -> WifiResult<Self> {
        validation::validate_interface_name(interface)?;
        Ok(Self {
            runner,
            interface: interface.to_string(),
        })
    }

    /// Scan for WiFi networks, returning advertised SSIDs in scan order
    pub async fn scan(&self) -> WifiResult<Vec<String>> {
        let cmd = CommandLine::new("iwlist", [self.interface.as_str(), "scanning"]);

        let lines = run_checked(self.runner.as_ref(), &cmd)
            .await
            .map_err(|e| WifiError::Scan {
                interface: self.interface.clone(),
                source: Box::new(e),
            })?;

        let ssids = parse::scan_ssids(&lines);
        debug!("Scan on {} found {} network(s)", self.interface, ssids.len());
        Ok(ssids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandOutput, MockCommandRunner};

    #[tokio::test]
    async fn test_scan() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| cmd.to_string() == "iwlist wlan0 scanning")
            .times(1)
            .returning(|_| {
                Ok(CommandOutput::success([
                    "wlan0     Scan completed :",
                    "          Cell 01 - Address: 00:11:22:33:44:55",
                    "                    ESSID:\"HomeNet\"",
                    "          Cell 02 - Address: 66:77:88:99:AA:BB",
                    "                    ESSID:\"Neighbour\"",
                ]))
            });

        let wifi = WifiController::new(Arc::new(runner), "wlan0").unwrap();
        assert_eq!(wifi.scan().await.unwrap(), vec!["HomeNet", "Neighbour"]);
    }

    #[tokio::test]
    async fn test_scan_error() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_| {
            Ok(CommandOutput {
                stdout: Vec::new(),
                stderr: vec!["wlan0     Interface doesn't support scanning.".to_string()],
                code: Some(255),
            })
        });

        let wifi = WifiController::new(Arc::new(runner), "wlan0").unwrap();
        match wifi.scan().await {
            Err(WifiError::Scan { interface, source }) => {
                assert_eq!(interface, "wlan0");
                assert!(matches!(*source, WifiError::CommandExecution { .. }));
            }
            other => panic!("expected Scan error, got {:?}", other),
        }
    }
}
