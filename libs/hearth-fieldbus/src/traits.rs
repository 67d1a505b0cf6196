//! Core Transport Traits
//!
//! This module defines the transport contract the buffers depend on.
//! Implementations wrap a real Modbus client (TCP or RTU); tests use
//! `SimDevice` from this crate.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{FieldbusError, Result};

// ============================================================================
// Transport Contract
// ============================================================================

/// The four Modbus primitives the buffering layer requires.
///
/// All calls are one-shot: a single wire attempt, failure surfaced
/// immediately. The buffer layer never retries; the next poll cycle does.
#[async_trait]
pub trait FieldbusTransport: Send + Sync {
    /// Read `count` coils starting at `address`
    async fn read_coils(&self, slave: u8, address: u16, count: u16) -> Result<Vec<bool>>;

    /// Read `count` holding registers starting at `address`
    async fn read_holding_registers(&self, slave: u8, address: u16, count: u16)
        -> Result<Vec<u16>>;

    /// Write a single coil
    async fn write_coil(&self, slave: u8, address: u16, value: bool) -> Result<()>;

    /// Write a single holding register
    async fn write_register(&self, slave: u8, address: u16, value: u16) -> Result<()>;
}

// ============================================================================
// Provider Seam
// ============================================================================

/// Source of the transport handle.
///
/// Buffers hold a provider instead of a raw handle so that deployments where
/// the bus client comes up after the points are built get a typed
/// `TransportUnavailable` error instead of a crash. The buffer re-queries on
/// every operation, so resolution is picked up on the next poll cycle
/// automatically.
pub trait TransportProvider: Send + Sync {
    /// Current transport handle, or `TransportUnavailable` if unresolved
    fn transport(&self) -> Result<Arc<dyn FieldbusTransport>>;
}

/// Provider backed by an always-ready handle
pub struct FixedTransport {
    inner: Arc<dyn FieldbusTransport>,
}

impl FixedTransport {
    pub fn new(inner: Arc<dyn FieldbusTransport>) -> Self {
        Self { inner }
    }
}

impl TransportProvider for FixedTransport {
    fn transport(&self) -> Result<Arc<dyn FieldbusTransport>> {
        Ok(Arc::clone(&self.inner))
    }
}

/// Provider whose handle is bound after construction.
///
/// Starts unresolved; `bind()` installs the handle once the bus client is up.
pub struct LateTransport {
    slot: RwLock<Option<Arc<dyn FieldbusTransport>>>,
}

impl LateTransport {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Install the resolved transport handle
    pub fn bind(&self, transport: Arc<dyn FieldbusTransport>) {
        // try_write never contends here: bind happens once, during setup
        if let Ok(mut slot) = self.slot.try_write() {
            *slot = Some(transport);
        }
    }
}

impl Default for LateTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportProvider for LateTransport {
    fn transport(&self) -> Result<Arc<dyn FieldbusTransport>> {
        match self.slot.try_read() {
            Ok(slot) => slot
                .as_ref()
                .map(Arc::clone)
                .ok_or(FieldbusError::TransportUnavailable),
            Err(_) => Err(FieldbusError::TransportUnavailable),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
