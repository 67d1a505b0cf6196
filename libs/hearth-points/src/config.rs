//! Point Configuration Types
//!
//! Typed configuration surface for buffers and points. File parsing and
//! schema validation belong to the host platform; these structs only define
//! the fields and their defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-bus configuration shared by every point on a buffer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// Seconds between full-range refreshes; 0 disables time-based staleness
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: f64,
    /// Modbus slave / unit id
    #[serde(default = "default_slave")]
    pub slave: u8,
}

fn default_scan_interval_secs() -> f64 {
    30.0
}

fn default_slave() -> u8 {
    1
}

impl BusConfig {
    /// Staleness window, or None when disabled
    pub fn scan_interval(&self) -> Option<Duration> {
        if self.scan_interval_secs > 0.0 {
            Some(Duration::from_secs_f64(self.scan_interval_secs))
        } else {
            None
        }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval_secs(),
            slave: default_slave(),
        }
    }
}

/// Configuration for a single-coil point (binary sensor, light, switch)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoilPointConfig {
    /// Display name reported with readings
    pub name: String,
    /// Coil address
    #[serde(alias = "coil")]
    pub address: u16,
}

/// Configuration for a numeric register sensor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericPointConfig {
    /// Display name reported with readings
    pub name: String,
    /// First register address
    #[serde(alias = "register")]
    pub address: u16,
    /// Number of 16-bit words, low word first
    #[serde(default = "default_count")]
    pub count: u16,
    /// Scale factor for linear transformation (value = raw * scale + offset)
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Offset for linear transformation
    #[serde(default)]
    pub offset: f64,
    /// Fixed decimal places in the rendered value
    #[serde(default)]
    pub precision: usize,
    /// Apply the low-word sign convention when decoding
    #[serde(default)]
    pub signed: bool,
    /// Unit of measurement passed through with readings
    #[serde(default)]
    pub unit_of_measurement: Option<String>,
}

fn default_count() -> u16 {
    1
}

fn default_scale() -> f64 {
    1.0
}

/// Configuration for a register-commanded toggle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterToggleConfig {
    /// Display name reported with readings
    pub name: String,
    /// Register the commands are written to
    #[serde(alias = "register")]
    pub address: u16,
    /// Word written to turn the point on
    pub command_on: u16,
    /// Word written to turn the point off
    pub command_off: u16,
    /// Read state back on each poll cycle
    #[serde(default = "default_verify_state")]
    pub verify_state: bool,
    /// Register read back for state; defaults to the command register
    #[serde(default)]
    pub verify_address: Option<u16>,
    /// Word meaning "on" in readback; defaults to command_on
    #[serde(default)]
    pub state_on: Option<u16>,
    /// Word meaning "off" in readback; defaults to command_off
    #[serde(default)]
    pub state_off: Option<u16>,
}

fn default_verify_state() -> bool {
    true
}

// ============================================================================
// Tests
// ============================================================================
