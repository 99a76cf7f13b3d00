//! Persistent provisioning record
//!
//! The modem exposes a handful of non-volatile bytes through `AT$NVM`. Three
//! of them remember whether this node was provisioned:
//!
//! | address | content |
//! |---|---|
//! | 0 | magic, written at the factory |
//! | 1 | state, 1 once provisioned |
//! | 2 | checksum, `magic + state` |
//!
//! The checksum only catches corrupt or blank memory; it is not a MAC.

use log::*;
use loranode_proto::NvmReply;

use crate::error::NvmError;
use crate::modem::{Delay, Modem, ModemChannel};

pub const MAGIC_ADDRESS: u8 = 0;
pub const STATE_ADDRESS: u8 = 1;
pub const CHECKSUM_ADDRESS: u8 = 2;

pub const MAGIC: u8 = 92;
pub const STATE_PROVISIONED: u8 = 1;

/// Trait for byte-addressed non-volatile storage
pub trait NvmStore {
    fn read_byte(&mut self, address: u8) -> Result<u8, NvmError>;

    /// Write one byte. Not retried; the caller decides what a failure means.
    fn write_byte(&mut self, address: u8, value: u8) -> Result<(), NvmError>;
}

impl<C: ModemChannel, D: Delay> NvmStore for Modem<C, D> {
    fn read_byte(&mut self, address: u8) -> Result<u8, NvmError> {
        let reply = self.request(&loranode_proto::nvm_read_request(address))?;
        match loranode_proto::parse_nvm_read_reply(&reply) {
            NvmReply::Value(value) => {
                u8::try_from(value).map_err(|_| NvmError::OutOfRange { address, value })
            }
            NvmReply::Error => Err(NvmError::Rejected { address }),
            NvmReply::Empty => Err(NvmError::NoResponse { address }),
        }
    }

    fn write_byte(&mut self, address: u8, value: u8) -> Result<(), NvmError> {
        let reply = self.request(&loranode_proto::nvm_write_request(address, value))?;
        if loranode_proto::is_ack(&reply) {
            Ok(())
        } else {
            Err(NvmError::NotAcknowledged { address })
        }
    }
}

/// The three persisted bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NvmRecord {
    pub magic: u8,
    pub state: u8,
    pub checksum: u8,
}

impl NvmRecord {
    /// The record a provisioned node carries
    pub const fn provisioned() -> Self {
        Self {
            magic: MAGIC,
            state: STATE_PROVISIONED,
            checksum: MAGIC.wrapping_add(STATE_PROVISIONED),
        }
    }

    pub fn read_from<S: NvmStore + ?Sized>(store: &mut S) -> Result<Self, NvmError> {
        Ok(Self {
            magic: store.read_byte(MAGIC_ADDRESS)?,
            state: store.read_byte(STATE_ADDRESS)?,
            checksum: store.read_byte(CHECKSUM_ADDRESS)?,
        })
    }

    pub fn is_valid(&self) -> bool {
        self.magic == MAGIC
            && self.state == STATE_PROVISIONED
            && self.checksum == self.magic.wrapping_add(self.state)
    }
}

/// Boot-time integrity check
///
/// Fails closed: any read error counts as "not provisioned".
pub fn credentials_already_init<S: NvmStore + ?Sized>(store: &mut S) -> bool {
    match NvmRecord::read_from(store) {
        Ok(record) if record.is_valid() => true,
        Ok(record) => {
            info!(
                "NVM record not provisioned (magic={} state={} checksum={})",
                record.magic, record.state, record.checksum
            );
            false
        }
        Err(e) => {
            warn!("NVM record unreadable: {e}");
            false
        }
    }
}

/// Mark the node provisioned: state first, then checksum
///
/// A failed state write skips the checksum write. Nothing is rolled back: a
/// half-written record simply fails the integrity check on the next boot.
pub fn commit_provisioned<S: NvmStore + ?Sized>(store: &mut S) -> Result<(), NvmError> {
    let record = NvmRecord::provisioned();
    store.write_byte(STATE_ADDRESS, record.state)?;
    store.write_byte(CHECKSUM_ADDRESS, record.checksum)?;
    Ok(())
}
