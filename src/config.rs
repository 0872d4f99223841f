//! Node configuration loading.
//!
//! All values default to the reference cadence (10 ms tick, heartbeat every
//! 500 ticks, 150 ms transceiver settle), so a node runs without any config
//! file present.

use anyhow::Context;
use embassy_time::Duration;
use serde::Deserialize;
use std::path::Path;

use crate::message::NodeAddress;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct NodeConfig {
    /// Link-layer address assigned at startup (255 = broadcast).
    pub node_address: u8,
    /// Driver-loop scheduling quantum in milliseconds.
    pub tick_interval_ms: u64,
    /// Loop iterations between heartbeat emissions.
    pub heartbeat_ticks: u32,
    /// Minimum transceiver power-on settling time, measured from node start.
    pub power_settle_ms: u64,
    /// Indicator pulse length for the ping/button handlers.
    pub handler_pulse_ms: u64,
    /// Indicator pulse length around a heartbeat emission.
    pub heartbeat_pulse_ms: u64,
    /// Indicator hold time in the key-press path.
    pub key_pulse_ms: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_address: NodeAddress::BROADCAST.0,
            tick_interval_ms: 10,
            heartbeat_ticks: 500,
            power_settle_ms: 150,
            handler_pulse_ms: 20,
            heartbeat_pulse_ms: 20,
            key_pulse_ms: 10,
        }
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read config file {}", config_path.display()))?;
        let config: NodeConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", config_path.display()))?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Reject values that would stall or spin the driver loop.
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval_ms == 0 {
            return Err("tick-interval-ms must be greater than zero".to_string());
        }
        if self.heartbeat_ticks == 0 {
            return Err("heartbeat-ticks must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn node_address(&self) -> NodeAddress {
        NodeAddress(self.node_address)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn power_settle(&self) -> Duration {
        Duration::from_millis(self.power_settle_ms)
    }

    pub fn handler_pulse(&self) -> Duration {
        Duration::from_millis(self.handler_pulse_ms)
    }

    pub fn heartbeat_pulse(&self) -> Duration {
        Duration::from_millis(self.heartbeat_pulse_ms)
    }

    pub fn key_pulse(&self) -> Duration {
        Duration::from_millis(self.key_pulse_ms)
    }
}
