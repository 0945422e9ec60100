//! Machine fingerprint derived from the platform machine id.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::process::Command;
use tracing::debug;

use super::IdentityProvider;

/// Linux machine id files, in lookup order.
#[cfg_attr(any(target_os = "macos", windows), allow(dead_code))]
const MACHINE_ID_PATHS: &[&str] = &["/etc/machine-id", "/var/lib/dbus/machine-id"];

/// Registry key holding the Windows machine GUID.
#[cfg_attr(not(windows), allow(dead_code))]
const CRYPTOGRAPHY_KEY: &str = r"HKLM\SOFTWARE\Microsoft\Cryptography";

/// Hex characters kept from the digest.
const FINGERPRINT_LEN: usize = 32;

/// Where a machine id can be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineIdSource {
    /// File whose trimmed contents are the id (systemd / dbus)
    File(PathBuf),
    /// `IOPlatformUUID` reported by `ioreg` (macOS)
    #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
    Ioreg,
    /// `MachineGuid` registry value queried with `reg` (Windows)
    #[cfg_attr(not(windows), allow(dead_code))]
    Registry,
}

impl MachineIdSource {
    /// Read the id, `Ok(None)` when the source exists but holds nothing usable.
    async fn read(&self) -> Result<Option<String>> {
        match self {
            MachineIdSource::File(path) => {
                let contents = tokio::fs::read_to_string(path).await?;
                Ok(Some(contents.trim().to_string()).filter(|id| !id.is_empty()))
            }
            MachineIdSource::Ioreg => {
                let output = run("ioreg", &["-rd1", "-c", "IOPlatformExpertDevice"]).await?;
                Ok(parse_ioreg_uuid(&output))
            }
            MachineIdSource::Registry => {
                let output = run("reg", &["query", CRYPTOGRAPHY_KEY, "/v", "MachineGuid"]).await?;
                Ok(parse_machine_guid(&output))
            }
        }
    }
}

/// Identifies the device by hashing the machine id with the OS and architecture.
/// The raw machine id never leaves the process.
#[derive(Debug, Clone)]
pub struct MachineFingerprint {
    sources: Vec<MachineIdSource>,
}

impl Default for MachineFingerprint {
    fn default() -> Self {
        Self::with_sources(platform_sources())
    }
}

impl MachineFingerprint {
    /// Look for the machine id in `sources` instead of the platform defaults.
    pub fn with_sources(sources: Vec<MachineIdSource>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl IdentityProvider for MachineFingerprint {
    async fn identify(&self) -> Result<String> {
        for source in &self.sources {
            match source.read().await {
                Ok(Some(id)) => {
                    debug!("Using machine id from {:?}", source);
                    return Ok(fingerprint(&[&id, std::env::consts::OS, std::env::consts::ARCH]));
                }
                Ok(None) => debug!("Machine id source {:?} is empty", source),
                Err(e) => debug!("Cannot read machine id from {:?}: {:#}", source, e),
            }
        }

        anyhow::bail!("No machine id available on this platform")
    }
}

/// Machine id sources for the current platform.
fn platform_sources() -> Vec<MachineIdSource> {
    #[cfg(target_os = "macos")]
    {
        vec![MachineIdSource::Ioreg]
    }

    #[cfg(windows)]
    {
        vec![MachineIdSource::Registry]
    }

    #[cfg(not(any(target_os = "macos", windows)))]
    {
        MACHINE_ID_PATHS.iter().map(|p| MachineIdSource::File(PathBuf::from(p))).collect()
    }
}

/// Run a platform tool and return its stdout.
async fn run(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program).args(args).output().await?;
    if !output.status.success() {
        anyhow::bail!("{} exited with {}", program, output.status);
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Extract `IOPlatformUUID` from `ioreg -rd1 -c IOPlatformExpertDevice` output.
fn parse_ioreg_uuid(output: &str) -> Option<String> {
    output
        .lines()
        .find(|line| line.contains("\"IOPlatformUUID\""))
        .and_then(|line| line.split_once('='))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|id| !id.is_empty())
}

/// Extract the `MachineGuid` value from `reg query` output.
fn parse_machine_guid(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("MachineGuid"))
        .and_then(|line| line.split_whitespace().nth(2))
        .map(str::to_string)
}

/// Hash the components into a short hex fingerprint.
fn fingerprint(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]); // separator so ("ab","c") != ("a","bc")
    }

    let mut encoded = hex::encode(hasher.finalize());
    encoded.truncate(FINGERPRINT_LEN);
    encoded
}
