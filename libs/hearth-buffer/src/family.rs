//! Bus Access Families
//!
//! The strategy seam that lets one `RangeBuffer` serve both bit-addressed
//! coils and word-addressed holding registers. A family binds the unit type
//! cached per address to the pair of transport primitives that move it.

use async_trait::async_trait;
use std::fmt::Debug;

use hearth_fieldbus::{FieldbusTransport, Result};

/// One addressable family on the bus: bits (coils) or words (registers).
#[async_trait]
pub trait BusFamily: Send + Sync + 'static {
    /// Value of a single addressable unit
    type Unit: Copy + PartialEq + Debug + Send + Sync;

    /// Family name used in log lines
    const KIND: &'static str;

    /// Read `count` units starting at `address`
    async fn read(
        transport: &dyn FieldbusTransport,
        slave: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<Self::Unit>>;

    /// Write a single unit
    async fn write(
        transport: &dyn FieldbusTransport,
        slave: u8,
        address: u16,
        value: Self::Unit,
    ) -> Result<()>;
}

/// Bit-addressed family (Modbus coils)
pub struct Coils;

#[async_trait]
impl BusFamily for Coils {
    type Unit = bool;

    const KIND: &'static str = "coil";

    async fn read(
        transport: &dyn FieldbusTransport,
        slave: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<bool>> {
        transport.read_coils(slave, address, count).await
    }

    async fn write(
        transport: &dyn FieldbusTransport,
        slave: u8,
        address: u16,
        value: bool,
    ) -> Result<()> {
        transport.write_coil(slave, address, value).await
    }
}

/// Word-addressed family (Modbus holding registers)
pub struct HoldingRegisters;

#[async_trait]
impl BusFamily for HoldingRegisters {
    type Unit = u16;

    const KIND: &'static str = "register";

    async fn read(
        transport: &dyn FieldbusTransport,
        slave: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>> {
        transport.read_holding_registers(slave, address, count).await
    }

    async fn write(
        transport: &dyn FieldbusTransport,
        slave: u8,
        address: u16,
        value: u16,
    ) -> Result<()> {
        transport.write_register(slave, address, value).await
    }
}
