//! Error types for the node library
//!
//! Collaborator traits carry their own `Error: Debug` types; they are captured
//! as text here so the library errors stay concrete.

use crate::credentials::CredentialKind;

/// Rejected node configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("max_line_len must be within {min}..={max}, got {value}")]
    LineLength { value: usize, min: usize, max: usize },
}

/// Failure talking to the LoRa modem over its AT channel
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModemError {
    #[error("modem channel: {0}")]
    Channel(String),
    #[error("modem did not acknowledge {request:?}")]
    NotAcknowledged { request: String },
}

/// Failure reading or writing one byte of modem non-volatile memory
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NvmError {
    #[error(transparent)]
    Modem(#[from] ModemError),
    #[error("modem rejected NVM read at address {address}")]
    Rejected { address: u8 },
    #[error("no reply to NVM read at address {address}")]
    NoResponse { address: u8 },
    #[error("NVM address {address} returned out of range value {value}")]
    OutOfRange { address: u8, value: u32 },
    #[error("NVM write to address {address} not acknowledged")]
    NotAcknowledged { address: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("{} must be {} hex digits", .0.label(), .0.hex_len())]
    InvalidFormat(CredentialKind),
    #[error("all credentials must be configured")]
    Incomplete,
    #[error("credentials are sealed after provisioning")]
    Sealed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("uplink session is not connected")]
    NotConnected,
    #[error("network rejected the join request")]
    JoinRejected,
    #[error("radio: {0}")]
    Radio(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProvisioningError {
    #[error("console: {0}")]
    Console(String),
    #[error("credentials are already sealed, nothing to provision")]
    AlreadyComplete,
}

/// Boot failures. Radio and sensor init failures are fail-stop, see
/// [`crate::node::halt`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BootError {
    #[error("failed to start radio module: {0}")]
    RadioInit(String),
    #[error("failed to start sensor: {0}")]
    SensorInit(String),
    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),
}
