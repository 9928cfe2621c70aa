//! Input validation
//!
//! Everything that ends up on a command line or in the wpa_supplicant config
//! passes through here first.

use crate::error::{WifiError, WifiResult};
use std::net::IpAddr;

/// Maximum length for interface names (Linux kernel limit is 15)
const MAX_INTERFACE_NAME_LEN: usize = 15;

/// Maximum SSID length in bytes (IEEE 802.11)
const MAX_SSID_LEN: usize = 32;

/// Length of a raw hex-encoded PSK
const RAW_PSK_LEN: usize = 64;

/// Validate interface name
///
/// Interface names must be alphanumeric with optional dashes and underscores,
/// and no longer than 15 characters (Linux kernel limit)
pub fn validate_interface_name(name: &str) -> WifiResult<()> {
    if name.is_empty() {
        return Err(WifiError::InvalidParameter(
            "Interface name cannot be empty".to_string(),
        ));
    }

    if name.len() > MAX_INTERFACE_NAME_LEN {
        return Err(WifiError::InvalidParameter(format!(
            "Interface name too long (max {} characters)",
            MAX_INTERFACE_NAME_LEN
        )));
    }

    for c in name.chars() {
        if !c.is_ascii_alphanumeric() && c != '-' && c != '_' {
            return Err(WifiError::InvalidParameter(format!(
                "Invalid interface name '{}': contains invalid character '{}'",
                name, c
            )));
        }
    }

    // Would be parsed as an option by ifconfig/iwlist
    if name.starts_with('-') {
        return Err(WifiError::InvalidParameter(
            "Interface name cannot start with dash".to_string(),
        ));
    }

    Ok(())
}

/// Validate WiFi SSID
///
/// SSIDs are 1-32 bytes. Control characters are rejected since a newline
/// would end the config line early.
pub fn validate_ssid(ssid: &str) -> WifiResult<()> {
    if ssid.is_empty() {
        return Err(WifiError::InvalidParameter(
            "SSID cannot be empty".to_string(),
        ));
    }

    if ssid.len() > MAX_SSID_LEN {
        return Err(WifiError::InvalidParameter(format!(
            "SSID cannot exceed {} bytes",
            MAX_SSID_LEN
        )));
    }

    if ssid.chars().any(|c| c.is_control()) {
        return Err(WifiError::InvalidParameter(
            "SSID contains invalid control characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate a WPA passphrase
///
/// Either 8-63 printable ASCII characters or a 64 digit hex PSK.
pub fn validate_passphrase(passphrase: &str) -> WifiResult<()> {
    if is_raw_psk(passphrase) {
        return Ok(());
    }

    if passphrase.len() < 8 {
        return Err(WifiError::InvalidParameter(
            "WiFi passphrase must be at least 8 characters".to_string(),
        ));
    }

    if passphrase.len() > 63 {
        return Err(WifiError::InvalidParameter(
            "WiFi passphrase cannot exceed 63 characters".to_string(),
        ));
    }

    if !passphrase.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
        return Err(WifiError::InvalidParameter(
            "WiFi passphrase must contain only printable ASCII characters".to_string(),
        ));
    }

    Ok(())
}

/// True for a 64 hex digit pre-computed PSK
pub fn is_raw_psk(passphrase: &str) -> bool {
    passphrase.len() == RAW_PSK_LEN && passphrase.chars().all(|c| c.is_ascii_hexdigit())
}

/// Validate hostname or address for the connectivity check
pub fn validate_hostname(host: &str) -> WifiResult<()> {
    if host.is_empty() {
        return Err(WifiError::InvalidParameter(
            "Hostname cannot be empty".to_string(),
        ));
    }

    if host.len() > 253 {
        return Err(WifiError::InvalidParameter("Hostname too long".to_string()));
    }

    if host.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    for c in host.chars() {
        if !c.is_ascii_alphanumeric() && c != '-' && c != '.' {
            return Err(WifiError::InvalidParameter(format!(
                "Invalid hostname character: {}",
                c
            )));
        }
    }

    if host.starts_with('-') || host.starts_with('.') || host.ends_with('-') || host.ends_with('.')
    {
        return Err(WifiError::InvalidParameter(
            "Invalid hostname format".to_string(),
        ));
    }

    Ok(())
}
