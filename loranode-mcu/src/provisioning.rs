//! Operator-driven credential provisioning over the console
//!
//! Command texts and reply strings live in `loranode_proto::console`.
//! This module provides the line buffering, the command state machine and the
//! blocking driver that runs it at boot.

use std::fmt;

use log::*;
use loranode_proto::console::{self, replies, ConsoleCommand};

use crate::config::NodeConfig;
use crate::credentials::{CredentialKind, CredentialSet};
use crate::error::{ModemError, NvmError, ProvisioningError};
use crate::modem::{Delay, KeyLock};
use crate::storage::{self, NvmStore};

/// Trait for the operator console (usually the USB serial port)
pub trait Console {
    /// Error type for console operations
    type Error: fmt::Debug;

    /// Next received byte, `None` when nothing is pending (non-blocking)
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Write one line; the implementation appends the line terminator
    fn write_line(&mut self, line: &str) -> Result<(), Self::Error>;
}

pub enum LineEvent {
    None,
    /// A full line, normalised to end in a single `\n`
    Complete(String),
    /// The line outgrew the buffer; the rest of it will be dropped
    Overflow,
}

/// Accumulates console bytes into lines
pub struct LineBuffer {
    buf: Vec<u8>,
    max_len: usize,
    overflowed: bool,
}

impl LineBuffer {
    pub fn new(max_len: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_len,
            overflowed: false,
        }
    }

    pub fn push_byte(&mut self, byte: u8) -> LineEvent {
        if byte == b'\n' {
            if self.overflowed {
                self.overflowed = false;
                return LineEvent::None;
            }
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
            if self.buf.len() > self.max_len {
                self.buf.clear();
                return LineEvent::Overflow;
            }
            let mut line = String::from_utf8_lossy(&self.buf).into_owned();
            line.push('\n');
            self.buf.clear();
            return LineEvent::Complete(line);
        }

        if self.overflowed {
            return LineEvent::None;
        }

        // one spare byte for a '\r' ahead of the terminator
        if self.buf.len() <= self.max_len {
            self.buf.push(byte);
            return LineEvent::None;
        }

        self.buf.clear();
        self.overflowed = true;
        LineEvent::Overflow
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    Collecting,
    Complete,
}

/// Console feedback for one dispatched line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Help,
    Accepted(CredentialKind),
    Rejected(CredentialKind),
    Finished,
    Incomplete,
    Invalid,
}

impl Reply {
    pub fn lines(self) -> &'static [&'static str] {
        match self {
            Reply::Help => &replies::HELP,
            Reply::Accepted(CredentialKind::DevEui) => &[replies::DEV_EUI_OK],
            Reply::Accepted(CredentialKind::AppEui) => &[replies::APP_EUI_OK],
            Reply::Accepted(CredentialKind::AppKey) => &[replies::APP_KEY_OK],
            Reply::Rejected(CredentialKind::DevEui) => &[replies::DEV_EUI_REJECTED],
            Reply::Rejected(CredentialKind::AppEui) => &[replies::APP_EUI_REJECTED],
            Reply::Rejected(CredentialKind::AppKey) => &[replies::APP_KEY_REJECTED],
            Reply::Finished => &[replies::FINISHED],
            Reply::Incomplete => &[replies::INCOMPLETE],
            Reply::Invalid => &[replies::INVALID],
        }
    }
}

/// Provisioning command state machine
///
/// Holds the credential set exclusively until [`ProvisioningState::Complete`].
/// Once complete, further input is ignored.
pub struct Provisioner<'c> {
    credentials: &'c mut CredentialSet,
    lines: LineBuffer,
    state: ProvisioningState,
}

impl<'c> Provisioner<'c> {
    pub fn new(credentials: &'c mut CredentialSet, max_line_len: usize) -> Self {
        let state = if credentials.is_provisioning_complete() {
            ProvisioningState::Complete
        } else {
            ProvisioningState::Collecting
        };
        Self {
            credentials,
            lines: LineBuffer::new(max_line_len),
            state,
        }
    }

    pub fn state(&self) -> ProvisioningState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == ProvisioningState::Complete
    }

    /// Feed one console byte; returns the reply when it completed a line
    pub fn push_byte(&mut self, byte: u8) -> Option<Reply> {
        if self.is_complete() {
            return None;
        }
        match self.lines.push_byte(byte) {
            LineEvent::None => None,
            LineEvent::Overflow => {
                debug!("console line overflow");
                Some(Reply::Invalid)
            }
            LineEvent::Complete(line) => self.dispatch(&line),
        }
    }

    /// Execute one complete, `\n`-terminated command line
    pub fn dispatch(&mut self, line: &str) -> Option<Reply> {
        if self.is_complete() {
            return None;
        }

        let reply = match console::parse_command(line) {
            ConsoleCommand::Help => Reply::Help,
            ConsoleCommand::SetDevEui(arg) => self.set(CredentialKind::DevEui, arg),
            ConsoleCommand::SetAppEui(arg) => self.set(CredentialKind::AppEui, arg),
            ConsoleCommand::SetAppKey(arg) => self.set(CredentialKind::AppKey, arg),
            ConsoleCommand::Save => match self.credentials.finalize() {
                Ok(()) => {
                    self.state = ProvisioningState::Complete;
                    Reply::Finished
                }
                Err(_) => Reply::Incomplete,
            },
            ConsoleCommand::Invalid => Reply::Invalid,
        };
        Some(reply)
    }

    fn set(&mut self, kind: CredentialKind, text: &str) -> Reply {
        match self.credentials.try_set(kind, text) {
            Ok(()) => Reply::Accepted(kind),
            Err(_) => Reply::Rejected(kind),
        }
    }
}

/// What happened when provisioning was committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalization {
    pub record: Result<(), NvmError>,
    pub key_lock: Result<(), ModemError>,
}

impl Finalization {
    pub fn is_clean(&self) -> bool {
        self.record.is_ok() && self.key_lock.is_ok()
    }
}

/// Run provisioning to completion, then persist and lock
///
/// Blocks the node: the console is polled every `console_poll_ms`, all
/// pending bytes are drained and each complete line is dispatched in order.
/// After `AT+S` succeeds the record is committed (state, then checksum) and
/// the application key is locked. Neither step is retried; the lock is
/// attempted even when the commit failed.
///
/// A credential set that is already sealed is refused before anything is
/// written, so the record and key lock are only ever touched after `AT+S`.
pub fn run_provisioning<K, M, D>(
    console: &mut K,
    credentials: &mut CredentialSet,
    modem: &mut M,
    delay: &mut D,
    config: &NodeConfig,
) -> Result<Finalization, ProvisioningError>
where
    K: Console,
    M: NvmStore + KeyLock,
    D: Delay,
{
    if credentials.is_provisioning_complete() {
        warn!("provisioning requested for sealed credentials");
        return Err(ProvisioningError::AlreadyComplete);
    }

    write_line(console, replies::BANNER)?;

    let mut provisioner = Provisioner::new(credentials, config.max_line_len);
    while !provisioner.is_complete() {
        while let Some(byte) = console
            .read_byte()
            .map_err(|e| ProvisioningError::Console(format!("{e:?}")))?
        {
            if let Some(reply) = provisioner.push_byte(byte) {
                for line in reply.lines() {
                    write_line(console, line)?;
                }
            }
            if provisioner.is_complete() {
                break;
            }
        }
        if !provisioner.is_complete() {
            delay.delay_ms(config.console_poll_ms);
        }
    }
    info!("credentials configured");

    let record = storage::commit_provisioned(modem);
    match &record {
        Ok(()) => info!("provisioning record committed"),
        Err(e) => error!("failed to commit provisioning record: {e}"),
    }

    let key_lock = modem.lock_app_key();
    match &key_lock {
        Ok(()) => info!("application key locked"),
        Err(e) => error!("failed to lock application key: {e}"),
    }

    Ok(Finalization { record, key_lock })
}

fn write_line<K: Console>(console: &mut K, line: &str) -> Result<(), ProvisioningError> {
    console
        .write_line(line)
        .map_err(|e| ProvisioningError::Console(format!("{e:?}")))
}
