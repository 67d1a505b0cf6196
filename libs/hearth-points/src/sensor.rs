//! Numeric Register Sensor Point
//!
//! Reads `count` holding registers, decodes them low word first, applies the
//! linear transformation and renders at fixed precision.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use hearth_buffer::RegisterBuffer;
use hearth_fieldbus::PointValue;

use crate::config::NumericPointConfig;
use crate::decode::{decode_words, render_precision, scale_magnitude};
use crate::reading::{PointReading, PollingPoint};

pub struct NumericSensorPoint {
    config: NumericPointConfig,
    buffer: Arc<RegisterBuffer>,
    value: Option<f64>,
    rendered: Option<String>,
    available: bool,
}

impl NumericSensorPoint {
    /// Create the point and register its word span with the shared buffer
    pub async fn new(config: NumericPointConfig, buffer: Arc<RegisterBuffer>) -> Self {
        buffer.register(config.address, config.count).await;
        debug!(
            "numeric sensor '{}' at register {} x{} scale={} offset={} signed={}",
            config.name, config.address, config.count, config.scale, config.offset, config.signed
        );
        Self {
            config,
            buffer,
            value: None,
            rendered: None,
            available: false,
        }
    }

    /// Scaled value, None before the first successful read
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Value rendered at the configured precision
    pub fn rendered(&self) -> Option<&str> {
        self.rendered.as_deref()
    }

    pub fn available(&self) -> bool {
        self.available
    }

    pub fn unit_of_measurement(&self) -> Option<&str> {
        self.config.unit_of_measurement.as_deref()
    }

    fn apply(&mut self, words: &[u16]) {
        let magnitude = decode_words(words, self.config.signed);
        let value = scale_magnitude(magnitude, self.config.scale, self.config.offset);
        self.rendered = Some(render_precision(value, self.config.precision));
        self.value = Some(value);
        self.available = true;
    }

    /// Uncached refresh, bypassing the shared snapshot
    pub async fn force_refresh(&mut self) {
        match self
            .buffer
            .force_read_point(self.config.address, self.config.count)
            .await
        {
            Ok(words) => self.apply(&words),
            Err(e) => {
                warn!(
                    "numeric sensor '{}' force refresh failed: {}",
                    self.config.name, e
                );
                self.available = false;
            },
        }
    }
}

#[async_trait]
impl PollingPoint for NumericSensorPoint {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn update(&mut self) {
        if let Err(e) = self.buffer.read_full_range().await {
            debug!(
                "numeric sensor '{}' range read unavailable: {}",
                self.config.name, e
            );
        }

        match self
            .buffer
            .read_point(self.config.address, self.config.count)
            .await
        {
            Ok(words) => self.apply(&words),
            Err(e) => {
                warn!("numeric sensor '{}' read failed: {}", self.config.name, e);
                self.available = false;
            },
        }
    }

    fn reading(&self) -> PointReading {
        let value = match self.value {
            Some(v) => PointValue::Float(v),
            None => PointValue::Null,
        };
        PointReading::new(self.config.name.clone(), value, self.available)
    }
}
