//! wifilink - WiFi connection CLI
//!
//! Appends a WPA-PSK network to wpa_supplicant, bounces the wireless
//! interface and checks that the internet is reachable.
//!
//! # Usage
//!
//! ```bash
//! # Join a network (passphrase may also come from WIFILINK_PASSPHRASE)
//! sudo wifilink connect MyNetwork -p 'secret passphrase'
//!
//! # List nearby networks
//! wifilink scan
//!
//! # Adapter and connectivity status as JSON
//! wifilink -o json status
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use libwifilink::{AdapterState, NetworkController, WifiConfig};
use serde::Serialize;
use std::path::PathBuf;
use std::process;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable consulted when `--passphrase` is not given
const PASSPHRASE_ENV: &str = "WIFILINK_PASSPHRASE";

#[derive(Parser)]
#[command(name = "wifilink")]
#[command(version)]
#[command(about = "WiFi connection tool - join WPA networks via wpa_supplicant and verify connectivity", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Wireless interface, overrides the configuration file
    #[arg(short, long, global = true)]
    interface: Option<String>,

    /// Output format: text, json
    #[arg(short = 'o', long, default_value = "text", global = true)]
    output: String,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Join a WPA-PSK network and wait for connectivity
    Connect {
        ssid: String,
        /// Passphrase (8-63 characters) or 64 hex digit PSK
        #[arg(short, long)]
        passphrase: Option<String>,
    },
    /// Scan for networks
    Scan,
    /// Show adapter state and connectivity
    Status,
    /// List networks configured in wpa_supplicant
    Networks,
    /// Remove a network from the wpa_supplicant configuration
    Forget { ssid: String },
}

#[derive(Serialize)]
struct StatusReport {
    interface: String,
    adapter: Option<AdapterState>,
    adapter_error: Option<String>,
    connected: bool,
}

#[derive(Serialize)]
struct ConnectReport<'a> {
    ssid: &'a str,
    connected: bool,
}

#[derive(Serialize)]
struct ForgetReport<'a> {
    ssid: &'a str,
    removed: usize,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<WifiConfig> {
    let mut config = match &cli.config {
        Some(path) => WifiConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => WifiConfig::default(),
    };

    if let Some(interface) = &cli.interface {
        config.interface = interface.clone();
    }

    debug!("Using configuration: {:?}", config);
    Ok(config)
}

/// Returns whether the requested operation succeeded
async fn run(cli: &Cli) -> Result<bool> {
    let config = load_config(cli)?;

    if !config.use_sudo && unsafe { libc::geteuid() } != 0 {
        warn!("Running unprivileged with use_sudo = false; interface changes will likely fail");
    }

    let controller = NetworkController::new(config)?;
    let json = cli.output == "json";

    match &cli.command {
        Commands::Connect { ssid, passphrase } => {
            let passphrase = match passphrase {
                Some(p) => p.clone(),
                None => match std::env::var(PASSPHRASE_ENV) {
                    Ok(p) => p,
                    Err(_) => bail!("No passphrase given; use --passphrase or set {}", PASSPHRASE_ENV),
                },
            };

            let connected = controller.connect(ssid, &passphrase).await?;
            if json {
                print_json(&ConnectReport { ssid, connected })?;
            } else if connected {
                println!("Connected to '{}'", ssid);
            } else {
                println!(
                    "Joined '{}' but no connectivity to {}",
                    ssid,
                    controller.config().ping_target
                );
            }
            Ok(connected)
        }
        Commands::Scan => {
            let ssids = controller.scan().await?;
            if json {
                print_json(&ssids)?;
            } else {
                println!("SSID");
                for ssid in ssids {
                    println!("{}", ssid);
                }
            }
            Ok(true)
        }
        Commands::Status => {
            let (adapter, adapter_error) = match controller.is_adapter_up().await {
                Ok(true) => (Some(AdapterState::Up), None),
                Ok(false) => (Some(AdapterState::Down), None),
                Err(e) => (None, Some(e.to_string())),
            };
            let report = StatusReport {
                interface: controller.config().interface.clone(),
                adapter,
                adapter_error,
                connected: controller.is_connected().await,
            };

            if json {
                print_json(&report)?;
            } else {
                println!("Interface:    {}", report.interface);
                match (&report.adapter, &report.adapter_error) {
                    (Some(state), _) => println!("Adapter:      {}", state),
                    (None, Some(e)) => println!("Adapter:      unknown ({})", e),
                    (None, None) => println!("Adapter:      unknown"),
                }
                println!(
                    "Connectivity: {}",
                    if report.connected { "yes" } else { "no" }
                );
            }
            Ok(report.adapter_error.is_none())
        }
        Commands::Networks => {
            let networks = controller.configured_networks().await?;
            if json {
                print_json(&networks)?;
            } else {
                println!("CONFIGURED SSID");
                for ssid in networks {
                    println!("{}", ssid);
                }
            }
            Ok(true)
        }
        Commands::Forget { ssid } => {
            let removed = controller.forget(ssid).await?;
            if json {
                print_json(&ForgetReport { ssid, removed })?;
            } else if removed == 0 {
                println!("No configured network named '{}'", ssid);
            } else {
                println!("Removed {} network block(s) for '{}'", removed, ssid);
            }
            Ok(true)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("JSON serialization error")?
    );
    Ok(())
}
