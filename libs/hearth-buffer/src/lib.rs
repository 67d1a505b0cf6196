//! Hearth Range Buffer Library
//!
//! The register/coil buffering core: many points sharing one buffer collapse
//! their per-point reads into a single range read per scan interval, while
//! single-point fast paths and write-through keep on-demand operations
//! consistent with the cache.
//!
//! # Architecture
//!
//! ```text
//! hearth-buffer
//!     ├── RangeTracker (monotonic [min, max] span over registered points)
//!     ├── BusFamily (bit vs word access strategy: Coils, HoldingRegisters)
//!     └── RangeBuffer<F> (cache, staleness, write-through, verification)
//! ```
//!
//! One buffer instance serves an unbounded number of points. Every operation
//! is serialized by the buffer's internal mutex, held across the transport
//! call, so concurrent pollers can never tear the cache or issue duplicate
//! range reads.

pub mod buffer;
pub mod family;
pub mod range;

// Re-export core types
pub use buffer::{BufferStats, CoilBuffer, RangeBuffer, RegisterBuffer, WriteOutcome};
pub use family::{BusFamily, Coils, HoldingRegisters};
pub use range::RangeTracker;
