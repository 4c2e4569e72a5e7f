//! Bridge configuration, stored as TOML under the user's home directory.
//!
//! A default file is written on first start so the deployment can be adjusted
//! without rebuilding. Every value has a default matching the deployed
//! installation.

use std::path::PathBuf;

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

const CONFIG_DIR: &str = ".config/aquabridge";
const CONFIG_FILE: &str = "bridge.toml";

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(default)]
pub struct BridgeConfig {
    pub broker: BrokerSettings,
    pub serial: SerialSettings,
    pub timing: TimingSettings,
}

/// Broker address and session identity. Plain TCP, no TLS, no credentials.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct BrokerSettings {
    pub host: String,
    pub port: u16,
    /// Fixed client identifier; running two bridges with the same identifier
    /// causes broker-side session churn.
    pub client_id: String,
    pub keep_alive_secs: u64,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            host: "192.168.1.102".to_string(),
            port: 1883,
            client_id: "ESP8266Client".to_string(),
            keep_alive_secs: 5,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct SerialSettings {
    pub port: String,
    pub baud_rate: u32,
    /// Bound on one board line; longer lines are a protocol violation.
    pub max_line_bytes: usize,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            max_line_bytes: 200,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct TimingSettings {
    /// Wait between failed broker connect attempts.
    pub reconnect_delay_secs: u64,
    /// Pause after each message forwarded to the board.
    pub receive_debounce_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            reconnect_delay_secs: 5,
            receive_debounce_ms: 200,
        }
    }
}

impl BridgeConfig {
    /// Loads the configuration, writing the defaults first if no file
    /// exists yet.
    pub async fn load_or_create() -> Result<Self> {
        let path = config_path()?;

        if !tokio::fs::try_exists(&path)
            .await
            .map_err(|e| eyre!("Failed to check for config file: {}", e))?
        {
            let parent = path
                .parent()
                .ok_or_else(|| eyre!("Config path has no parent directory"))?;
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;

            let content = toml::to_string_pretty(&Self::default())
                .map_err(|e| eyre!("Failed to serialize default config: {}", e))?;
            tokio::fs::write(&path, content)
                .await
                .map_err(|e| eyre!("Failed to write default config: {}", e))?;
            info!("Wrote default configuration to {}", path.display());
        }

        Self::load_from(&path).await
    }

    pub async fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
        toml::from_str(&content).map_err(|e| eyre!("Invalid config file: {}", e))
    }
}

fn config_path() -> Result<PathBuf> {
    let mut path = dirs::home_dir().ok_or_else(|| eyre!("Could not determine home directory"))?;
    path.push(CONFIG_DIR);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let config = BridgeConfig::default();
        assert_eq!(config.broker.port, 1883);
        assert_eq!(config.broker.client_id, "ESP8266Client");
        assert_eq!(config.serial.max_line_bytes, 200);
        assert_eq!(config.timing.reconnect_delay_secs, 5);
        assert_eq!(config.timing.receive_debounce_ms, 200);
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let content = toml::to_string_pretty(&BridgeConfig::default()).unwrap();
        let parsed: BridgeConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed.broker.host, BridgeConfig::default().broker.host);
        assert_eq!(parsed.serial.baud_rate, 115_200);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let parsed: BridgeConfig = toml::from_str("[broker]\nhost = \"10.0.0.7\"\n").unwrap();
        assert_eq!(parsed.broker.host, "10.0.0.7");
        assert_eq!(parsed.broker.port, 1883);
        assert_eq!(parsed.timing.receive_debounce_ms, 200);
    }

    #[tokio::test]
    async fn load_from_reads_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.toml");
        tokio::fs::write(&path, "[serial]\nport = \"/dev/ttyS1\"\n")
            .await
            .unwrap();

        let config = BridgeConfig::load_from(&path).await.unwrap();
        assert_eq!(config.serial.port, "/dev/ttyS1");
        assert_eq!(config.serial.baud_rate, 115_200);
    }
}
