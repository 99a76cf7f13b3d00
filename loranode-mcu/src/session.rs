//! Uplink session over the LoRaWAN radio
//!
//! Joins with the provisioned credentials and counts consecutive failed
//! transmissions. Past the failure threshold the session drops to
//! disconnected and stays there until the supervisor joins again.

use log::*;

use crate::config::NodeConfig;
use crate::credentials::CredentialSet;
use crate::error::SessionError;
use crate::modem::Delay;
use crate::radio::{LinkStatus, Radio};

/// Result of a single [`Session::send`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    /// Transmission failed, the link is still considered up
    Failed { consecutive: u32 },
    /// Transmission failed and the threshold was crossed
    LinkLost { consecutive: u32 },
}

pub struct Session<'c, R, D> {
    radio: R,
    delay: D,
    credentials: &'c CredentialSet,
    config: NodeConfig,
    status: LinkStatus,
    consecutive_failures: u32,
}

impl<'c, R: Radio, D: Delay> Session<'c, R, D> {
    pub fn new(radio: R, delay: D, credentials: &'c CredentialSet, config: NodeConfig) -> Self {
        Self {
            radio,
            delay,
            credentials,
            config,
            status: LinkStatus::Disconnected,
            consecutive_failures: 0,
        }
    }

    pub fn status(&self) -> LinkStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == LinkStatus::Connected
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// OTAA join. No backoff here; the caller owns the retry policy.
    pub fn join(&mut self) -> Result<(), SessionError> {
        info!("trying to connect");
        let creds = self.credentials;
        let accepted = self
            .radio
            .join_otaa(creds.dev_eui(), creds.app_eui(), creds.app_key())
            .map_err(|e| SessionError::Radio(format!("{e:?}")))?;
        if !accepted {
            warn!("join rejected");
            return Err(SessionError::JoinRejected);
        }

        self.status = LinkStatus::Connected;
        if let Err(e) = self.radio.set_poll_interval(self.config.poll_interval_secs) {
            warn!("failed to set poll interval: {e:?}");
        }
        if let Err(e) = self.radio.set_data_rate(self.config.data_rate) {
            warn!("failed to set data rate: {e:?}");
        }
        self.delay.delay_ms(self.config.join_settle_ms);
        self.consecutive_failures = 0;
        info!("joined network");
        Ok(())
    }

    /// Send one confirmed uplink packet
    pub fn send(&mut self, payload: &[u8]) -> Result<SendOutcome, SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }

        match self.transmit(payload) {
            Ok(code) if code > 0 => {
                info!("transmission OK");
                self.consecutive_failures = 0;
                Ok(SendOutcome::Delivered)
            }
            result => {
                self.consecutive_failures += 1;
                match result {
                    Ok(code) => warn!(
                        "transmission error (code {code}, {} in a row)",
                        self.consecutive_failures
                    ),
                    Err(e) => warn!(
                        "transmission error ({e}, {} in a row)",
                        self.consecutive_failures
                    ),
                }

                let outcome = if self.consecutive_failures > self.config.failure_threshold {
                    error!(
                        "{} consecutive transmission errors, link lost",
                        self.consecutive_failures
                    );
                    self.status = LinkStatus::Disconnected;
                    SendOutcome::LinkLost {
                        consecutive: self.consecutive_failures,
                    }
                } else {
                    SendOutcome::Failed {
                        consecutive: self.consecutive_failures,
                    }
                };
                self.delay.delay_ms(self.config.failure_backoff_ms);
                Ok(outcome)
            }
        }
    }

    fn transmit(&mut self, payload: &[u8]) -> Result<i32, String> {
        self.radio.begin_packet().map_err(|e| format!("{e:?}"))?;
        self.radio.write(payload).map_err(|e| format!("{e:?}"))?;
        self.radio.end_packet(true).map_err(|e| format!("{e:?}"))
    }
}
