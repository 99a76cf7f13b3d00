//! LoRa modem AT channel
//!
//! The modem answers `AT$` requests with free text. There is no framing and
//! no completion marker we can wait for, so every request is followed by a
//! fixed settle delay and then whatever arrived is taken as the reply.

use std::fmt;

use log::*;

use crate::config::NodeConfig;
use crate::error::ModemError;

/// Blocking delay provider
pub trait Delay {
    fn delay_ms(&mut self, ms: u32);
}

impl<D: Delay + ?Sized> Delay for &mut D {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

/// Delay backed by `std::thread::sleep`, for std targets (ESP-IDF, hosts)
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(ms as u64));
    }
}

/// Raw text channel to the modem (usually a UART)
///
/// MCU-specific crates implement this trait on their serial driver.
pub trait ModemChannel {
    /// Error type for channel operations
    type Error: fmt::Debug;

    /// Write one request; the implementation appends the line terminator
    fn send_line(&mut self, line: &str) -> Result<(), Self::Error>;

    /// Everything received since the last call, empty if nothing arrived
    fn read_available(&mut self) -> Result<String, Self::Error>;
}

/// Revokes read access to the application key once provisioning is done
pub trait KeyLock {
    fn lock_app_key(&mut self) -> Result<(), ModemError>;
}

/// Request/response access to the modem
pub struct Modem<C, D> {
    channel: C,
    delay: D,
    settle_ms: u32,
}

impl<C: ModemChannel, D: Delay> Modem<C, D> {
    pub fn new(channel: C, delay: D, settle_ms: u32) -> Self {
        Self {
            channel,
            delay,
            settle_ms,
        }
    }

    /// Modem using the configured settle delay
    pub fn from_config(channel: C, delay: D, config: &NodeConfig) -> Self {
        Self::new(channel, delay, config.nvm_settle_ms)
    }

    /// Send `line`, wait the settle delay and return the raw reply
    ///
    /// Exactly one request is in flight at a time. A modem that never answers
    /// produces an empty reply, not a hang.
    pub fn request(&mut self, line: &str) -> Result<String, ModemError> {
        debug!("modem <- {line}");
        self.channel
            .send_line(line)
            .map_err(|e| ModemError::Channel(format!("{e:?}")))?;
        self.delay.delay_ms(self.settle_ms);
        let reply = self
            .channel
            .read_available()
            .map_err(|e| ModemError::Channel(format!("{e:?}")))?;
        debug!("modem -> {:?}", reply);
        Ok(reply)
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }
}

impl<C: ModemChannel, D: Delay> KeyLock for Modem<C, D> {
    fn lock_app_key(&mut self) -> Result<(), ModemError> {
        let request = loranode_proto::key_lock_request();
        let reply = self.request(&request)?;
        if loranode_proto::is_ack(&reply) {
            Ok(())
        } else {
            Err(ModemError::NotAcknowledged { request })
        }
    }
}
