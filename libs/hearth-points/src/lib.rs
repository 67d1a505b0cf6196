//! Hearth Point Adapters
//!
//! Entity-facing points built on the shared range buffers. Each point
//! registers its addresses with a buffer at construction, polls through the
//! buffer on its cycle, and maps raw bits/words to a typed value:
//!
//! - `BinarySensorPoint` - read-only coil -> bool
//! - `CoilTogglePoint` - light/switch on a coil, write-through with
//!   optional verification
//! - `NumericSensorPoint` - holding registers -> scaled f64 with fixed
//!   decimal rendering
//! - `RegisterTogglePoint` - switch commanding word values into a register,
//!   with state readback mapping
//!
//! A failed read never propagates: the point keeps its previous value, drops
//! its availability flag and logs. Points polled on a schedule own a
//! cancellable task via `spawn_poller`.

pub mod binary;
pub mod config;
pub mod decode;
pub mod reading;
pub mod scheduler;
pub mod sensor;
pub mod toggle;

// Re-export core types
pub use binary::BinarySensorPoint;
pub use config::{BusConfig, CoilPointConfig, NumericPointConfig, RegisterToggleConfig};
pub use decode::{decode_words, render_precision, scale_magnitude};
pub use reading::{PointReading, PollingPoint};
pub use scheduler::{spawn_poller, PollerHandle};
pub use sensor::NumericSensorPoint;
pub use toggle::{CoilTogglePoint, RegisterTogglePoint};
