//! Polls a simulated device through shared buffers and prints readings.
//!
//! Run with: cargo run -p hearth-points --example poll_demo

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use hearth_buffer::{CoilBuffer, RegisterBuffer};
use hearth_fieldbus::{FixedTransport, SimDevice};
use hearth_points::{
    BinarySensorPoint, BusConfig, CoilPointConfig, CoilTogglePoint, NumericPointConfig,
    NumericSensorPoint, PollingPoint,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let bus = BusConfig::default();

    // Simulated slave standing in for the wire-level client
    let sim = Arc::new(SimDevice::new());
    sim.set_coil(bus.slave, 3, true).await;
    sim.set_register(bus.slave, 100, 215).await;
    sim.set_register(bus.slave, 101, 40000).await;

    let coils = Arc::new(CoilBuffer::new(
        "demo-coils",
        bus.slave,
        bus.scan_interval(),
        Arc::new(FixedTransport::new(sim.clone())),
    ));
    let registers = Arc::new(RegisterBuffer::new(
        "demo-registers",
        bus.slave,
        bus.scan_interval(),
        Arc::new(FixedTransport::new(sim.clone())),
    ));

    let mut door = BinarySensorPoint::new(
        CoilPointConfig {
            name: "door".into(),
            address: 3,
        },
        coils.clone(),
    )
    .await;
    let mut lamp = CoilTogglePoint::new(
        CoilPointConfig {
            name: "lamp".into(),
            address: 9,
        },
        coils.clone(),
        true,
    )
    .await;
    let mut boiler = NumericSensorPoint::new(
        NumericPointConfig {
            name: "boiler_temp".into(),
            address: 100,
            count: 1,
            scale: 0.1,
            offset: 0.0,
            precision: 1,
            signed: false,
            unit_of_measurement: Some("°C".into()),
        },
        registers.clone(),
    )
    .await;
    let mut level = NumericSensorPoint::new(
        NumericPointConfig {
            name: "tank_level".into(),
            address: 101,
            count: 1,
            scale: 1.0,
            offset: 0.0,
            precision: 0,
            signed: true,
            unit_of_measurement: None,
        },
        registers.clone(),
    )
    .await;

    lamp.turn_on().await;

    for cycle in 1..=3 {
        door.update().await;
        lamp.update().await;
        boiler.update().await;
        level.update().await;

        println!("--- cycle {cycle} ---");
        for reading in [
            door.reading(),
            lamp.reading(),
            boiler.reading(),
            level.reading(),
        ] {
            println!(
                "{:<12} {:>10} available={}",
                reading.name,
                reading.value.as_string(),
                reading.available
            );
        }
        println!("coil buffer stats: {:?}", coils.stats().await);

        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    Ok(())
}
