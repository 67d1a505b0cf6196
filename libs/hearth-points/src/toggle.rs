//! Toggle Points
//!
//! Writable points: a coil toggle (light/switch on one coil) and a register
//! toggle that commands word values into a register and maps readback words
//! to a boolean state.
//!
//! Writes are optimistic on accepted commands only: a failed transport write
//! leaves the local state untouched.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use hearth_buffer::{CoilBuffer, RegisterBuffer, WriteOutcome};
use hearth_fieldbus::PointValue;

use crate::config::{CoilPointConfig, RegisterToggleConfig};
use crate::reading::{PointReading, PollingPoint};

// ============================================================================
// Coil toggle
// ============================================================================

pub struct CoilTogglePoint {
    name: String,
    address: u16,
    buffer: Arc<CoilBuffer>,
    verify_writes: bool,
    state: Option<bool>,
    available: bool,
}

impl CoilTogglePoint {
    /// Create the point and register its coil with the shared buffer.
    /// `verify_writes` re-reads the coil after each accepted command.
    pub async fn new(
        config: CoilPointConfig,
        buffer: Arc<CoilBuffer>,
        verify_writes: bool,
    ) -> Self {
        buffer.register(config.address, 1).await;
        debug!("toggle '{}' at coil {}", config.name, config.address);
        Self {
            name: config.name,
            address: config.address,
            buffer,
            verify_writes,
            state: None,
            available: false,
        }
    }

    pub fn is_on(&self) -> Option<bool> {
        self.state
    }

    pub fn available(&self) -> bool {
        self.available
    }

    pub async fn turn_on(&mut self) -> bool {
        self.command(true).await
    }

    pub async fn turn_off(&mut self) -> bool {
        self.command(false).await
    }

    async fn command(&mut self, on: bool) -> bool {
        match self
            .buffer
            .write_point(self.address, on, self.verify_writes)
            .await
        {
            Ok(outcome) => {
                // Commanded state, optimistic; verification result is advisory
                self.state = Some(on);
                self.available = true;
                self.log_verify(on, &outcome);
                true
            },
            Err(e) => {
                warn!("toggle '{}' write failed: {}", self.name, e);
                false
            },
        }
    }

    fn log_verify(&self, on: bool, outcome: &WriteOutcome<bool>) {
        if outcome.verified == Some(false) {
            warn!(
                "toggle '{}' commanded {} but device reports {:?}",
                self.name, on, outcome.readback
            );
        }
    }

    /// Uncached refresh, bypassing the shared snapshot
    pub async fn force_refresh(&mut self) {
        match self.buffer.force_read_point(self.address, 1).await {
            Ok(bits) => {
                if let Some(&bit) = bits.first() {
                    self.state = Some(bit);
                    self.available = true;
                }
            },
            Err(e) => {
                warn!("toggle '{}' force refresh failed: {}", self.name, e);
                self.available = false;
            },
        }
    }
}

#[async_trait]
impl PollingPoint for CoilTogglePoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn update(&mut self) {
        if let Err(e) = self.buffer.read_full_range().await {
            debug!("toggle '{}' range read unavailable: {}", self.name, e);
        }

        match self.buffer.read_point(self.address, 1).await {
            Ok(bits) => {
                if let Some(&bit) = bits.first() {
                    self.state = Some(bit);
                    self.available = true;
                }
            },
            Err(e) => {
                warn!("toggle '{}' read failed: {}", self.name, e);
                self.available = false;
            },
        }
    }

    fn reading(&self) -> PointReading {
        let value = match self.state {
            Some(bit) => PointValue::Bool(bit),
            None => PointValue::Null,
        };
        PointReading::new(self.name.clone(), value, self.available)
    }
}

// ============================================================================
// Register toggle
// ============================================================================

pub struct RegisterTogglePoint {
    name: String,
    address: u16,
    command_on: u16,
    command_off: u16,
    verify_state: bool,
    verify_address: u16,
    state_on: u16,
    state_off: u16,
    buffer: Arc<RegisterBuffer>,
    state: Option<bool>,
    available: bool,
}

impl RegisterTogglePoint {
    /// Create the point and register its command and readback registers
    pub async fn new(config: RegisterToggleConfig, buffer: Arc<RegisterBuffer>) -> Self {
        let verify_address = config.verify_address.unwrap_or(config.address);
        buffer.register(config.address, 1).await;
        buffer.register(verify_address, 1).await;
        debug!(
            "register toggle '{}' at {} (readback {})",
            config.name, config.address, verify_address
        );
        Self {
            name: config.name,
            address: config.address,
            command_on: config.command_on,
            command_off: config.command_off,
            verify_state: config.verify_state,
            verify_address,
            state_on: config.state_on.unwrap_or(config.command_on),
            state_off: config.state_off.unwrap_or(config.command_off),
            buffer,
            state: None,
            available: false,
        }
    }

    pub fn is_on(&self) -> Option<bool> {
        self.state
    }

    pub fn available(&self) -> bool {
        self.available
    }

    pub async fn turn_on(&mut self) -> bool {
        self.command(self.command_on, true).await
    }

    pub async fn turn_off(&mut self) -> bool {
        self.command(self.command_off, false).await
    }

    async fn command(&mut self, word: u16, on: bool) -> bool {
        match self.buffer.write_point(self.address, word, false).await {
            Ok(_) => {
                self.state = Some(on);
                self.available = true;
                true
            },
            Err(e) => {
                warn!("register toggle '{}' write failed: {}", self.name, e);
                false
            },
        }
    }

    fn apply_readback(&mut self, word: u16) {
        if word == self.state_on {
            self.state = Some(true);
            self.available = true;
        } else if word == self.state_off {
            self.state = Some(false);
            self.available = true;
        } else {
            warn!(
                "register toggle '{}' unexpected readback from {}: 0x{:04X}",
                self.name, self.verify_address, word
            );
        }
    }

    /// Uncached readback refresh, bypassing the shared snapshot
    pub async fn force_refresh(&mut self) {
        match self.buffer.force_read_point(self.verify_address, 1).await {
            Ok(words) => {
                if let Some(&word) = words.first() {
                    self.apply_readback(word);
                }
            },
            Err(e) => {
                warn!("register toggle '{}' force refresh failed: {}", self.name, e);
                self.available = false;
            },
        }
    }
}

#[async_trait]
impl PollingPoint for RegisterTogglePoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn update(&mut self) {
        // Without state verification the point trusts its commanded state
        if !self.verify_state {
            return;
        }

        if let Err(e) = self.buffer.read_full_range().await {
            debug!(
                "register toggle '{}' range read unavailable: {}",
                self.name, e
            );
        }

        match self.buffer.read_point(self.verify_address, 1).await {
            Ok(words) => {
                if let Some(&word) = words.first() {
                    self.apply_readback(word);
                }
            },
            Err(e) => {
                warn!("register toggle '{}' read failed: {}", self.name, e);
                self.available = false;
            },
        }
    }

    fn reading(&self) -> PointReading {
        let value = match self.state {
            Some(bit) => PointValue::Bool(bit),
            None => PointValue::Null,
        };
        PointReading::new(self.name.clone(), value, self.available)
    }
}
