//! Simulated Fieldbus Device
//!
//! In-memory Modbus slave data model implementing `FieldbusTransport`.
//! Drives the buffer and point test suites: call counters verify the cache
//! actually avoids wire traffic, and failure injection exercises the error
//! paths without a real device.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{FieldbusError, Result};
use crate::traits::FieldbusTransport;

/// Per-slave data model
#[derive(Debug, Default)]
struct SlaveModel {
    coils: HashMap<u16, bool>,
    holding_registers: HashMap<u16, u16>,
}

/// Snapshot of the simulator's call counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimDeviceStats {
    pub coil_reads: usize,
    pub register_reads: usize,
    pub coil_writes: usize,
    pub register_writes: usize,
}

impl SimDeviceStats {
    /// Total read transactions issued against the device
    pub fn total_reads(&self) -> usize {
        self.coil_reads + self.register_reads
    }
}

/// In-memory simulated device
pub struct SimDevice {
    slaves: RwLock<HashMap<u8, SlaveModel>>,
    coil_reads: AtomicUsize,
    register_reads: AtomicUsize,
    coil_writes: AtomicUsize,
    register_writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    // Accept writes but leave the data model unchanged (stuck output)
    ignore_writes: AtomicBool,
    // When set, read responses are truncated to this many units
    short_response: AtomicUsize,
}

impl SimDevice {
    pub fn new() -> Self {
        Self {
            slaves: RwLock::new(HashMap::new()),
            coil_reads: AtomicUsize::new(0),
            register_reads: AtomicUsize::new(0),
            coil_writes: AtomicUsize::new(0),
            register_writes: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            ignore_writes: AtomicBool::new(false),
            short_response: AtomicUsize::new(usize::MAX),
        }
    }

    /// Seed a coil value
    pub async fn set_coil(&self, slave: u8, address: u16, value: bool) {
        let mut slaves = self.slaves.write().await;
        slaves.entry(slave).or_default().coils.insert(address, value);
    }

    /// Seed a holding register value
    pub async fn set_register(&self, slave: u8, address: u16, value: u16) {
        let mut slaves = self.slaves.write().await;
        slaves
            .entry(slave)
            .or_default()
            .holding_registers
            .insert(address, value);
    }

    /// Read a register directly, bypassing the transport path (test assertions)
    pub async fn peek_register(&self, slave: u8, address: u16) -> u16 {
        let slaves = self.slaves.read().await;
        slaves
            .get(&slave)
            .and_then(|m| m.holding_registers.get(&address).copied())
            .unwrap_or(0)
    }

    /// Read a coil directly, bypassing the transport path (test assertions)
    pub async fn peek_coil(&self, slave: u8, address: u16) -> bool {
        let slaves = self.slaves.read().await;
        slaves
            .get(&slave)
            .and_then(|m| m.coils.get(&address).copied())
            .unwrap_or(false)
    }

    /// Make every read fail until cleared
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write fail until cleared
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Accept writes without applying them (stuck-output device)
    pub fn set_ignore_writes(&self, ignore: bool) {
        self.ignore_writes.store(ignore, Ordering::SeqCst);
    }

    /// Truncate read responses to `units` entries (malformed-response injection)
    pub fn set_short_response(&self, units: Option<usize>) {
        self.short_response
            .store(units.unwrap_or(usize::MAX), Ordering::SeqCst);
    }

    /// Current call counters
    pub fn stats(&self) -> SimDeviceStats {
        SimDeviceStats {
            coil_reads: self.coil_reads.load(Ordering::SeqCst),
            register_reads: self.register_reads.load(Ordering::SeqCst),
            coil_writes: self.coil_writes.load(Ordering::SeqCst),
            register_writes: self.register_writes.load(Ordering::SeqCst),
        }
    }

    fn truncate<T>(&self, mut units: Vec<T>) -> Vec<T> {
        let cap = self.short_response.load(Ordering::SeqCst);
        if units.len() > cap {
            units.truncate(cap);
        }
        units
    }
}

impl Default for SimDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FieldbusTransport for SimDevice {
    async fn read_coils(&self, slave: u8, address: u16, count: u16) -> Result<Vec<bool>> {
        self.coil_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(FieldbusError::transport("simulated read failure"));
        }

        let slaves = self.slaves.read().await;
        let model = slaves.get(&slave);
        let bits: Vec<bool> = (0..count)
            .map(|i| {
                model
                    .and_then(|m| m.coils.get(&(address + i)).copied())
                    .unwrap_or(false)
            })
            .collect();

        debug!("sim read_coils s{} a{} x{}", slave, address, count);
        Ok(self.truncate(bits))
    }

    async fn read_holding_registers(
        &self,
        slave: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>> {
        self.register_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(FieldbusError::transport("simulated read failure"));
        }

        let slaves = self.slaves.read().await;
        let model = slaves.get(&slave);
        let words: Vec<u16> = (0..count)
            .map(|i| {
                model
                    .and_then(|m| m.holding_registers.get(&(address + i)).copied())
                    .unwrap_or(0)
            })
            .collect();

        debug!("sim read_holding_registers s{} a{} x{}", slave, address, count);
        Ok(self.truncate(words))
    }

    async fn write_coil(&self, slave: u8, address: u16, value: bool) -> Result<()> {
        self.coil_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FieldbusError::transport("simulated write failure"));
        }

        if !self.ignore_writes.load(Ordering::SeqCst) {
            self.set_coil(slave, address, value).await;
        }
        debug!("sim write_coil s{} a{} = {}", slave, address, value);
        Ok(())
    }

    async fn write_register(&self, slave: u8, address: u16, value: u16) -> Result<()> {
        self.register_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FieldbusError::transport("simulated write failure"));
        }

        if !self.ignore_writes.load(Ordering::SeqCst) {
            self.set_register(slave, address, value).await;
        }
        debug!("sim write_register s{} a{} = {}", slave, address, value);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
