//! LoRaWAN radio abstraction traits
//!
//! Traits for the modem's network side that MCU-specific crates implement
//! (MKRWAN-style AT modems, SX127x drivers, ...).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Regional frequency plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Band {
    As923,
    Au915,
    Cn470,
    Cn779,
    Eu433,
    Eu868,
    Kr920,
    In865,
    Us915,
}

/// Uplink session status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Disconnected,
    Connected,
}

/// Trait for LoRaWAN radio operations
pub trait Radio {
    /// Error type for radio operations
    type Error: fmt::Debug;

    /// Start the module on a frequency plan
    fn begin(&mut self, band: Band) -> Result<(), Self::Error>;

    /// Over-the-air activation. `Ok(false)` means the network did not accept
    /// the join. Empty strings ask the module to use the keys it already
    /// holds.
    fn join_otaa(&mut self, dev_eui: &str, app_eui: &str, app_key: &str)
        -> Result<bool, Self::Error>;

    fn begin_packet(&mut self) -> Result<(), Self::Error>;

    fn write(&mut self, payload: &[u8]) -> Result<usize, Self::Error>;

    /// Transmit the packet. Positive on success, zero or negative on failure.
    fn end_packet(&mut self, confirmed: bool) -> Result<i32, Self::Error>;

    fn set_poll_interval(&mut self, seconds: u32) -> Result<(), Self::Error>;

    fn set_data_rate(&mut self, index: u8) -> Result<(), Self::Error>;
}
