//! Point Output Surface
//!
//! What a point reports upward to the platform, and the polling contract the
//! scheduler drives.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use hearth_fieldbus::PointValue;

/// One reported point state
#[derive(Debug, Clone, Serialize)]
pub struct PointReading {
    pub name: String,
    pub value: PointValue,
    pub available: bool,
    pub timestamp: DateTime<Utc>,
}

impl PointReading {
    pub fn new(name: impl Into<String>, value: PointValue, available: bool) -> Self {
        Self {
            name: name.into(),
            value,
            available,
            timestamp: Utc::now(),
        }
    }
}

/// A point the scheduler can drive on a recurring cycle
#[async_trait]
pub trait PollingPoint: Send + Sync {
    /// Display name
    fn name(&self) -> &str;

    /// One poll cycle. Read failures are absorbed here: the point keeps its
    /// previous value, drops availability and logs - never panics or
    /// propagates.
    async fn update(&mut self);

    /// Current reported state
    fn reading(&self) -> PointReading;
}
