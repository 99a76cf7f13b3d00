//! Boot sequence and the supervising runtime step

use std::fmt;

use log::*;

use crate::config::NodeConfig;
use crate::credentials::CredentialSet;
use crate::error::{BootError, SessionError};
use crate::modem::{Delay, KeyLock};
use crate::provisioning::{run_provisioning, Console, Finalization};
use crate::radio::Radio;
use crate::session::{SendOutcome, Session};
use crate::storage::{credentials_already_init, NvmStore};

const HALT_SLEEP_MS: u32 = 1000;

/// Trait for the measurement peripheral; only its bring-up matters here
pub trait Sensor {
    type Error: fmt::Debug;

    fn begin(&mut self) -> Result<(), Self::Error>;
}

/// How the node got past boot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootPath {
    /// A valid record was found. The keys live in the modem; the in-memory
    /// credential set stays empty.
    AlreadyProvisioned,
    /// Provisioning ran during this boot
    Provisioned(Finalization),
}

/// Bring the node up to the point where the uplink session can start
///
/// Radio and sensor failures are fatal; the caller is expected to
/// [`halt`] on them.
pub fn boot<R, S, K, M, D>(
    radio: &mut R,
    sensor: &mut S,
    console: &mut K,
    modem: &mut M,
    credentials: &mut CredentialSet,
    delay: &mut D,
    config: &NodeConfig,
) -> Result<BootPath, BootError>
where
    R: Radio,
    S: Sensor,
    K: Console,
    M: NvmStore + KeyLock,
    D: Delay,
{
    radio
        .begin(config.band)
        .map_err(|e| BootError::RadioInit(format!("{e:?}")))?;
    info!("module started");

    sensor
        .begin()
        .map_err(|e| BootError::SensorInit(format!("{e:?}")))?;

    if credentials_already_init(modem) {
        info!("credentials already provisioned");
        return Ok(BootPath::AlreadyProvisioned);
    }

    info!("no valid provisioning record, waiting for operator");
    let finalization = run_provisioning(console, credentials, modem, delay, config)?;
    Ok(BootPath::Provisioned(finalization))
}

/// Fail-stop: park the node forever
pub fn halt<D: Delay>(delay: &mut D) -> ! {
    error!("halting");
    loop {
        delay.delay_ms(HALT_SLEEP_MS);
    }
}

/// What one supervisor step did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    Joined,
    JoinFailed(SessionError),
    Sent(SendOutcome),
    SendFailed(SessionError),
}

/// Runtime supervisor, the only writer of the uplink session
pub struct Node<'c, R, D> {
    session: Session<'c, R, D>,
}

impl<'c, R: Radio, D: Delay> Node<'c, R, D> {
    pub fn new(session: Session<'c, R, D>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session<'c, R, D> {
        &self.session
    }

    /// Join when disconnected, otherwise send `payload`
    ///
    /// A node that lost its link rejoins on the next tick; the pacing between
    /// ticks is the caller's.
    pub fn tick(&mut self, payload: &[u8]) -> Tick {
        if !self.session.is_connected() {
            return match self.session.join() {
                Ok(()) => Tick::Joined,
                Err(e) => Tick::JoinFailed(e),
            };
        }
        match self.session.send(payload) {
            Ok(outcome) => Tick::Sent(outcome),
            Err(e) => Tick::SendFailed(e),
        }
    }
}
