//! Connectivity check using ping

use crate::command::{run_checked, CommandLine, CommandRunner};
use crate::error::{WifiError, WifiResult};
use crate::parse;
use crate::validation;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct ConnectivityChecker {
    runner: Arc<dyn CommandRunner>,
    target: String,
    count: u32,
}

impl ConnectivityChecker {
    pub fn new(runner: Arc<dyn CommandRunner>, target: &str, count: u32) -> WifiResult<Self> {
        validation::validate_hostname(target)?;
        if count == 0 {
            return Err(WifiError::InvalidParameter(
                "Ping count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            runner,
            target: target.to_string(),
            count,
        })
    }

    /// Ping the target once; any failure counts as "not connected"
    pub async fn test_connection(&self) -> bool {
        let cmd = CommandLine::new("ping", ["-c".to_string(), self.count.to_string(), self.target.clone()]);

        match run_checked(self.runner.as_ref(), &cmd).await {
            Ok(lines) => {
                let ok = parse::ping_succeeded(&lines, self.count);
                debug!("Ping {} -> {}", self.target, if ok { "reachable" } else { "unreachable" });
                ok
            }
            Err(e) => {
                warn!("A error occurred while testing connectivity: {}", e);
                false
            }
        }
    }

    /// Check up to `attempts` times, sleeping `delay` between failed checks
    pub async fn wait_for_connectivity(&self, attempts: u32, delay: Duration) -> bool {
        for attempt in 1..=attempts {
            if self.test_connection().await {
                info!("Connectivity established on attempt {}/{}", attempt, attempts);
                return true;
            }
            if attempt < attempts {
                tokio::time::sleep(delay).await;
            }
        }

        warn!("No connectivity to {} after {} attempts", self.target, attempts);
        false
    }
}
