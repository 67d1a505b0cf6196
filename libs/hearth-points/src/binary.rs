//! Binary Sensor Point
//!
//! Read-only coil mapped to a boolean. Shares its buffer with every other
//! coil point on the same slave, so a poll cycle across N sensors costs one
//! range read.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use hearth_buffer::CoilBuffer;
use hearth_fieldbus::PointValue;

use crate::config::CoilPointConfig;
use crate::reading::{PointReading, PollingPoint};

pub struct BinarySensorPoint {
    name: String,
    address: u16,
    buffer: Arc<CoilBuffer>,
    state: Option<bool>,
    available: bool,
}

impl BinarySensorPoint {
    /// Create the point and register its coil with the shared buffer
    pub async fn new(config: CoilPointConfig, buffer: Arc<CoilBuffer>) -> Self {
        buffer.register(config.address, 1).await;
        debug!("binary sensor '{}' at coil {}", config.name, config.address);
        Self {
            name: config.name,
            address: config.address,
            buffer,
            state: None,
            available: false,
        }
    }

    /// Last observed state, None before the first successful read
    pub fn is_on(&self) -> Option<bool> {
        self.state
    }

    pub fn available(&self) -> bool {
        self.available
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
                warn!("binary sensor '{}' force refresh failed: {}", self.name, e);
                self.available = false;
            },
        }
    }
}

#[async_trait]
impl PollingPoint for BinarySensorPoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn update(&mut self) {
        // First poller of the cycle pays for the range read; the rest of the
        // points on this buffer hit the cache below.
        if let Err(e) = self.buffer.read_full_range().await {
            debug!("binary sensor '{}' range read unavailable: {}", self.name, e);
        }

        match self.buffer.read_point(self.address, 1).await {
            Ok(bits) => {
                if let Some(&bit) = bits.first() {
                    self.state = Some(bit);
                    self.available = true;
                }
            },
            Err(e) => {
                warn!("binary sensor '{}' read failed: {}", self.name, e);
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
