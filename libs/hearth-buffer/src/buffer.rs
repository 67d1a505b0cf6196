//! Addressable Range Buffer
//!
//! One buffer instance is shared by every point polling the same slave and
//! family. Points register their addresses at setup; from then on the buffer
//! turns N per-point reads into one range read per scan interval, serves
//! repeat reads from its cache, and keeps writes immediately visible through
//! write-through.
//!
//! State machine per instance:
//!
//! ```text
//! EMPTY (no range) -> DIRTY (range set, no snapshot)
//!                  -> FRESH (snapshot within staleness window)
//!                  -> DIRTY (window elapsed, refresh requested, or write)
//! ```
//!
//! Every public operation acquires the internal mutex before touching the
//! dirty flag, cache or range, and holds it across the transport call. Two
//! pollers observing a dirty range therefore collapse into a single wire
//! read, and no caller can observe a cache entry mid-update.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use hearth_fieldbus::{FieldbusError, Result, TransportProvider};

use crate::family::{BusFamily, Coils, HoldingRegisters};
use crate::range::RangeTracker;

/// Settle delay between a write and its verification read
pub const WRITE_SETTLE: Duration = Duration::from_millis(100);

/// Buffer over bit-addressed coils
pub type CoilBuffer = RangeBuffer<Coils>;

/// Buffer over word-addressed holding registers
pub type RegisterBuffer = RangeBuffer<HoldingRegisters>;

/// Result of a `write_point` call.
///
/// The write itself was accepted by the device (otherwise the call errors).
/// `verified` distinguishes commanded from confirmed state: the cache always
/// reflects the commanded value; callers that need confirmation inspect the
/// readback here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WriteOutcome<U> {
    /// Readback comparison result, if verification ran to completion
    pub verified: Option<bool>,
    /// The unit read back during verification
    pub readback: Option<U>,
}

impl<U> WriteOutcome<U> {
    /// True only when verification ran and matched the commanded value
    pub fn confirmed(&self) -> bool {
        self.verified == Some(true)
    }
}

/// Cache performance snapshot
#[derive(Debug, Clone, Serialize)]
pub struct BufferStats {
    pub kind: &'static str,
    pub span_units: u32,
    pub cached_points: usize,
    pub coverage_pct: f64,
    pub last_full_read: Option<DateTime<Utc>>,
    pub scan_interval_ms: Option<u64>,
}

struct BufferState<F: BusFamily> {
    range: RangeTracker,
    cache: HashMap<u16, Vec<F::Unit>>,
    doread: bool,
    last_full_read: Option<Instant>,
    last_full_read_at: Option<DateTime<Utc>>,
}

/// Shared per-slave cache in front of the fieldbus transport
pub struct RangeBuffer<F: BusFamily> {
    name: Arc<str>,
    slave: u8,
    scan_interval: Option<Duration>,
    provider: Arc<dyn TransportProvider>,
    state: Mutex<BufferState<F>>,
}

impl<F: BusFamily> RangeBuffer<F> {
    /// Create a buffer. `scan_interval = None` means entries never go stale
    /// by time and persist until explicitly invalidated.
    pub fn new(
        name: impl Into<Arc<str>>,
        slave: u8,
        scan_interval: Option<Duration>,
        provider: Arc<dyn TransportProvider>,
    ) -> Self {
        let name = name.into();
        debug!(
            "{} buffer '{}' created: slave={} scan_interval={:?}",
            F::KIND,
            name,
            slave,
            scan_interval
        );
        Self {
            name,
            slave,
            scan_interval,
            provider,
            state: Mutex::new(BufferState {
                range: RangeTracker::new(),
                cache: HashMap::new(),
                doread: true,
                last_full_read: None,
                last_full_read_at: None,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slave(&self) -> u8 {
        self.slave
    }

    /// Register a point's address span. Called once per point, at setup.
    ///
    /// Widening the range drops the range-is-fresh flag so the next full
    /// read fetches the enlarged span.
    pub async fn register(&self, address: u16, count: u16) {
        let mut state = self.state.lock().await;
        if state.range.register(address, count) {
            state.doread = true;
            if let Some((min, max)) = state.range.span() {
                debug!("{} buffer '{}' span now [{}, {}]", F::KIND, self.name, min, max);
            }
        }
    }

    /// The registered span, if any point has registered
    pub async fn span(&self) -> Option<(u16, u16)> {
        self.state.lock().await.range.span()
    }

    /// True once the staleness window has elapsed since the last full read
    pub async fn is_stale(&self) -> bool {
        let state = self.state.lock().await;
        self.stale(&state)
    }

    /// Per-point read used by entities on their poll cycle.
    ///
    /// Cached and within the staleness window: returns with zero I/O.
    /// Otherwise falls through to a single-point transport read. Entities
    /// collapse their reads into one wire transaction by calling
    /// `read_full_range` at the top of the cycle, making this a cache hit.
    pub async fn read_point(&self, address: u16, count: u16) -> Result<Vec<F::Unit>> {
        let count = count.max(1);
        let mut state = self.state.lock().await;

        if self.stale(&state) {
            debug!("{} buffer '{}' stale, invalidating cache", F::KIND, self.name);
            state.doread = true;
            state.cache.clear();
        }

        if let Some(units) = Self::cached(&state, address, count) {
            return Ok(units);
        }

        self.read_single_locked(&mut state, address, count).await
    }

    /// Single-point fast path, bypassing the full-range snapshot.
    ///
    /// Serves from cache when possible; otherwise issues one transport read
    /// scoped to exactly `[address, address + count - 1]`.
    pub async fn read_single_point(&self, address: u16, count: u16) -> Result<Vec<F::Unit>> {
        let count = count.max(1);
        let mut state = self.state.lock().await;

        if let Some(units) = Self::cached(&state, address, count) {
            return Ok(units);
        }

        self.read_single_locked(&mut state, address, count).await
    }

    /// Forced uncached read: drop the entry, then read from the wire
    pub async fn force_read_point(&self, address: u16, count: u16) -> Result<Vec<F::Unit>> {
        let count = count.max(1);
        let mut state = self.state.lock().await;
        state.cache.remove(&address);
        self.read_single_locked(&mut state, address, count).await
    }

    /// Refresh the full-range snapshot if it is dirty or stale.
    ///
    /// FRESH: no-op, zero I/O. DIRTY: one transport read spanning the whole
    /// registered range, populating a cache entry per address. On failure the
    /// buffer stays DIRTY and prior entries survive as last-known values.
    pub async fn read_full_range(&self) -> Result<()> {
        let mut state = self.state.lock().await;

        if self.stale(&state) {
            state.doread = true;
        }
        let Some((min, max)) = state.range.span() else {
            return Ok(());
        };
        if !state.doread {
            return Ok(());
        }

        let transport = self.provider.transport()?;
        let count = (u32::from(max) - u32::from(min) + 1) as u16;
        debug!(
            "{} buffer '{}' range read: {} units from {}",
            F::KIND,
            self.name,
            count,
            min
        );

        let units = match F::read(transport.as_ref(), self.slave, min, count).await {
            Ok(units) => units,
            Err(e) => {
                warn!(
                    "{} buffer '{}' range read failed from {} for {} units: {}",
                    F::KIND,
                    self.name,
                    min,
                    count,
                    e
                );
                return Err(e);
            },
        };

        if units.len() < count as usize {
            warn!(
                "{} buffer '{}' short range response: expected {}, got {}",
                F::KIND,
                self.name,
                count,
                units.len()
            );
        }

        for (i, unit) in units.iter().enumerate() {
            state.cache.insert(min + i as u16, vec![*unit]);
        }
        state.doread = false;
        state.last_full_read = Some(Instant::now());
        state.last_full_read_at = Some(Utc::now());
        Ok(())
    }

    /// Write one unit, write-through on success, optional verification.
    ///
    /// The cache entry reflects the commanded value; a verification mismatch
    /// is logged and reported in the outcome but never rolled back.
    pub async fn write_point(
        &self,
        address: u16,
        value: F::Unit,
        verify: bool,
    ) -> Result<WriteOutcome<F::Unit>> {
        let mut state = self.state.lock().await;
        let transport = self.provider.transport()?;

        if let Err(e) = F::write(transport.as_ref(), self.slave, address, value).await {
            warn!(
                "{} buffer '{}' write to {} failed: {}",
                F::KIND,
                self.name,
                address,
                e
            );
            return Err(e);
        }

        state.cache.insert(address, vec![value]);
        state.doread = true;
        debug!(
            "{} buffer '{}' wrote {} = {:?}",
            F::KIND,
            self.name,
            address,
            value
        );

        let mut outcome = WriteOutcome {
            verified: None,
            readback: None,
        };
        if verify {
            sleep(WRITE_SETTLE).await;
            match F::read(transport.as_ref(), self.slave, address, 1).await {
                Ok(units) if !units.is_empty() => {
                    let got = units[0];
                    if got != value {
                        warn!(
                            "{} buffer '{}' verify mismatch at {}: wrote {:?}, read {:?}",
                            F::KIND,
                            self.name,
                            address,
                            value,
                            got
                        );
                    }
                    outcome.verified = Some(got == value);
                    outcome.readback = Some(got);
                },
                Ok(_) => {
                    warn!(
                        "{} buffer '{}' verify read at {} returned no data",
                        F::KIND,
                        self.name,
                        address
                    );
                },
                Err(e) => {
                    warn!(
                        "{} buffer '{}' verify read at {} failed: {}",
                        F::KIND,
                        self.name,
                        address,
                        e
                    );
                },
            }
        }
        Ok(outcome)
    }

    /// Drop one cache entry, or the whole cache (also marking the range
    /// dirty) when `address` is None.
    pub async fn invalidate(&self, address: Option<u16>) {
        let mut state = self.state.lock().await;
        match address {
            Some(address) => {
                state.cache.remove(&address);
            },
            None => {
                state.cache.clear();
                state.doread = true;
                debug!("{} buffer '{}' cache cleared", F::KIND, self.name);
            },
        }
    }

    /// Cache performance snapshot
    pub async fn stats(&self) -> BufferStats {
        let state = self.state.lock().await;
        let span_units = state.range.len();
        let cached_points = state.cache.len();
        let coverage_pct = if span_units > 0 {
            (cached_points as f64 / f64::from(span_units) * 100.0 * 100.0).round() / 100.0
        } else {
            0.0
        };
        BufferStats {
            kind: F::KIND,
            span_units,
            cached_points,
            coverage_pct,
            last_full_read: state.last_full_read_at,
            scan_interval_ms: self.scan_interval.map(|d| d.as_millis() as u64),
        }
    }

    fn stale(&self, state: &BufferState<F>) -> bool {
        match (self.scan_interval, state.last_full_read) {
            (Some(interval), Some(at)) => at.elapsed() >= interval,
            _ => false,
        }
    }

    fn cached(state: &BufferState<F>, address: u16, count: u16) -> Option<Vec<F::Unit>> {
        // An entry shorter than the requested count is a miss, not a short
        // answer: the caller would decode garbage.
        state
            .cache
            .get(&address)
            .filter(|units| units.len() >= count as usize)
            .map(|units| units[..count as usize].to_vec())
    }

    /// One transport read scoped to the point, caching on success only.
    /// Caller holds the state lock.
    async fn read_single_locked(
        &self,
        state: &mut BufferState<F>,
        address: u16,
        count: u16,
    ) -> Result<Vec<F::Unit>> {
        let transport = self.provider.transport()?;

        let units = match F::read(transport.as_ref(), self.slave, address, count).await {
            Ok(units) => units,
            Err(e) => {
                warn!(
                    "{} buffer '{}' single read at {} failed: {}",
                    F::KIND,
                    self.name,
                    address,
                    e
                );
                return Err(e);
            },
        };

        if units.len() < count as usize {
            warn!(
                "{} buffer '{}' short response at {}: expected {}, got {}",
                F::KIND,
                self.name,
                address,
                count,
                units.len()
            );
            return Err(FieldbusError::ShortResponse {
                expected: count as usize,
                got: units.len(),
            });
        }

        state.cache.insert(address, units.clone());
        debug!(
            "{} buffer '{}' single read at {} x{} ok",
            F::KIND,
            self.name,
            address,
            count
        );
        Ok(units)
    }
}

// ============================================================================
// Tests
// ============================================================================
