//! LoRa Node MCU Library
//!
//! Provisioning and uplink logic for LoRaWAN end-nodes on microcontrollers.
//!
//! This crate provides:
//! - The AT console state machine for entering OTAA credentials
//! - The persisted provisioning record kept in modem NVM
//! - The uplink session with its consecutive-failure circuit breaker
//! - Traits for the modem channel, radio, console and sensor
//!
//! # Note
//! Nothing here touches hardware. MCU-specific crates implement the traits
//! in [`modem`], [`radio`], [`provisioning`] and [`node`] on their drivers.
//! Wire texts come from `loranode-proto`.

pub mod config;
pub mod credentials;
pub mod error;
pub mod modem;
pub mod node;
pub mod provisioning;
pub mod radio;
pub mod session;
pub mod storage;

#[cfg(test)]
mod mock;

pub use config::NodeConfig;
pub use credentials::{CredentialKind, CredentialSet};
pub use error::*;
pub use modem::{Delay, KeyLock, Modem, ModemChannel, ThreadDelay};
pub use node::{boot, halt, BootPath, Node, Sensor, Tick};
pub use provisioning::{run_provisioning, Console, Finalization, Provisioner, Reply};
pub use radio::{Band, LinkStatus, Radio};
pub use session::{SendOutcome, Session};
pub use storage::{commit_provisioned, credentials_already_init, NvmRecord, NvmStore};
