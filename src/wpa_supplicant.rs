//! WPA Supplicant configuration file
//!
//! Network blocks are written with direct file I/O. Credentials are never
//! interpolated into a shell command.

use crate::error::{WifiError, WifiResult};
use crate::validation;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// SSID and passphrase for a WPA-PSK network
#[derive(Clone)]
pub struct NetworkCredential {
    pub ssid: String,
    pub passphrase: String,
}

impl std::fmt::Debug for NetworkCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkCredential")
            .field("ssid", &self.ssid)
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

impl NetworkCredential {
    pub fn new(ssid: impl Into<String>, passphrase: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            passphrase: passphrase.into(),
        }
    }

    pub fn validate(&self) -> WifiResult<()> {
        validation::validate_ssid(&self.ssid)?;
        validation::validate_passphrase(&self.passphrase)
    }

    /// Render the `network={...}` block
    pub fn network_block(&self) -> String {
        let psk = if validation::is_raw_psk(&self.passphrase) {
            self.passphrase.clone()
        } else {
            format!("\"{}\"", self.passphrase)
        };

        format!(
            "network={{\n ssid={}\n scan_ssid=1\n psk={}\n key_mgmt=WPA-PSK\n}}\n",
            encode_ssid(&self.ssid),
            psk
        )
    }
}

/// Quote plain SSIDs, hex-encode anything wpa_supplicant could misread
fn encode_ssid(ssid: &str) -> String {
    let plain = ssid
        .chars()
        .all(|c| c.is_ascii() && !c.is_ascii_control() && c != '"');
    if plain {
        format!("\"{}\"", ssid)
    } else {
        ssid.bytes().map(|b| format!("{:02x}", b)).collect()
    }
}

fn decode_ssid(value: &str) -> Option<String> {
    let value = value.trim();
    if let Some(quoted) = value.strip_prefix('"') {
        let end = quoted.rfind('"')?;
        return Some(quoted[..end].to_string());
    }

    if value.len() % 2 != 0 {
        return None;
    }
    let bytes = (0..value.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(value.get(i..i + 2)?, 16).ok())
        .collect::<Option<Vec<u8>>>()?;
    Some(String::from_utf8_lossy(&bytes).to_string())
}

/// Config file section: a network block with its SSID, or any other line
enum Section<'a> {
    Line(&'a str),
    Network {
        lines: Vec<&'a str>,
        ssid: Option<String>,
    },
}

fn sections(content: &str) -> Vec<Section<'_>> {
    let mut out = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(mut lines) = current.take() {
            lines.push(line);
            if trimmed == "}" {
                let ssid = block_ssid(&lines);
                out.push(Section::Network { lines, ssid });
            } else {
                current = Some(lines);
            }
        } else if trimmed == "network={" {
            current = Some(vec![line]);
        } else {
            out.push(Section::Line(line));
        }
    }

    // Unterminated block, keep it as-is
    if let Some(lines) = current {
        out.extend(lines.into_iter().map(Section::Line));
    }

    out
}

fn block_ssid(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .find_map(|line| line.trim().strip_prefix("ssid="))
        .and_then(decode_ssid)
}

/// The wpa_supplicant configuration file
#[derive(Debug, Clone)]
pub struct WpaConfigFile {
    path: PathBuf,
}

impl WpaConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a network block, preceded by a blank line
    pub async fn append_network(&self, credential: &NetworkCredential) -> WifiResult<()> {
        let block = format!("\n{}", credential.network_block());

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.write_error(e))?;
        file.write_all(block.as_bytes())
            .await
            .map_err(|e| self.write_error(e))?;
        file.flush().await.map_err(|e| self.write_error(e))?;

        info!(
            "Added network block for '{}' to {}",
            credential.ssid,
            self.path.display()
        );
        Ok(())
    }

    /// SSIDs of all configured network blocks, in file order
    pub async fn configured_networks(&self) -> WifiResult<Vec<String>> {
        let content = fs::read_to_string(&self.path).await?;
        Ok(sections(&content)
            .into_iter()
            .filter_map(|section| match section {
                Section::Network { ssid, .. } => ssid,
                Section::Line(_) => None,
            })
            .collect())
    }

    /// Remove every network block for `ssid`, returning how many were removed
    pub async fn forget(&self, ssid: &str) -> WifiResult<usize> {
        let content = fs::read_to_string(&self.path).await?;

        let mut kept: Vec<&str> = Vec::new();
        let mut removed = 0;
        for section in sections(&content) {
            match section {
                Section::Network { ssid: Some(ref s), .. } if s == ssid => {
                    // Drop the separator written in front of the block
                    if kept.last().is_some_and(|l| l.trim().is_empty()) {
                        kept.pop();
                    }
                    removed += 1;
                }
                Section::Network { lines, .. } => kept.extend(lines),
                Section::Line(line) => kept.push(line),
            }
        }

        if removed == 0 {
            debug!("No network block for '{}' in {}", ssid, self.path.display());
            return Ok(0);
        }

        let mut rewritten = kept.join("\n");
        rewritten.push('\n');
        self.replace_contents(&rewritten)
            .await
            .map_err(|e| self.write_error(e))?;

        info!(
            "Removed {} network block(s) for '{}' from {}",
            removed,
            ssid,
            self.path.display()
        );
        Ok(removed)
    }

    /// Sibling file the rewrite is staged in before it replaces the config
    fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "wpa_supplicant.conf".to_string());
        self.path.with_file_name(format!(".{}.wifilink-tmp", name))
    }

    /// Write to a sibling file with the original permissions, then rename it
    /// over the config so a failed write never truncates it
    async fn replace_contents(&self, content: &str) -> std::io::Result<()> {
        let permissions = fs::metadata(&self.path).await?.permissions();
        let staging = self.staging_path();

        let staged = async {
            fs::write(&staging, content).await?;
            fs::set_permissions(&staging, permissions).await?;
            fs::rename(&staging, &self.path).await
        }
        .await;

        if staged.is_err() {
            let _ = fs::remove_file(&staging).await;
        }
        staged
    }

    fn write_error(&self, source: std::io::Error) -> WifiError {
        WifiError::ConfigWrite {
            path: self.path.clone(),
            source,
        }
    }
}
