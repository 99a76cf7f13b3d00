//! LoRaWAN OTAA credentials as typed by the operator
//!
//! Values are kept as hex text, exactly as the modem's join command expects
//! them. A credential is either unset (empty) or holds text that passed
//! [`is_credential`]; nothing in between is ever stored.

use crate::error::CredentialError;

/// Which of the three OTAA secrets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// Device EUI
    DevEui,
    /// Application (join) EUI
    AppEui,
    /// Application root key
    AppKey,
}

impl CredentialKind {
    /// Number of hex digits the credential must have
    pub const fn hex_len(self) -> usize {
        match self {
            CredentialKind::DevEui | CredentialKind::AppEui => 16,
            CredentialKind::AppKey => 32,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CredentialKind::DevEui => "DevEUI",
            CredentialKind::AppEui => "AppEUI",
            CredentialKind::AppKey => "AppKey",
        }
    }
}

/// Format check shared by all credentials
///
/// `text` carries the line terminator the console appends, so it must be
/// exactly `size + 1` bytes long. The first `size` bytes must be hex digits
/// (either case); the byte after them is not inspected.
pub fn is_credential(text: &str, size: usize) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == size + 1 && bytes[..size].iter().all(u8::is_ascii_hexdigit)
}

pub fn is_dev_eui(text: &str) -> bool {
    is_credential(text, CredentialKind::DevEui.hex_len())
}

pub fn is_app_eui(text: &str) -> bool {
    is_credential(text, CredentialKind::AppEui.hex_len())
}

pub fn is_app_key(text: &str) -> bool {
    is_credential(text, CredentialKind::AppKey.hex_len())
}

/// The three OTAA secrets plus the provisioning-complete flag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    dev_eui: String,
    app_eui: String,
    app_key: String,
    provisioning_complete: bool,
}

impl CredentialSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store one credential
    ///
    /// On success the hex digits are stored without the terminator slot. On
    /// failure the set is left untouched.
    pub fn try_set(&mut self, kind: CredentialKind, text: &str) -> Result<(), CredentialError> {
        if self.provisioning_complete {
            return Err(CredentialError::Sealed);
        }
        let len = kind.hex_len();
        if !is_credential(text, len) {
            return Err(CredentialError::InvalidFormat(kind));
        }

        let value = text[..len].to_string();
        match kind {
            CredentialKind::DevEui => self.dev_eui = value,
            CredentialKind::AppEui => self.app_eui = value,
            CredentialKind::AppKey => self.app_key = value,
        }
        Ok(())
    }

    pub fn set_dev_eui(&mut self, text: &str) -> bool {
        self.try_set(CredentialKind::DevEui, text).is_ok()
    }

    pub fn set_app_eui(&mut self, text: &str) -> bool {
        self.try_set(CredentialKind::AppEui, text).is_ok()
    }

    pub fn set_app_key(&mut self, text: &str) -> bool {
        self.try_set(CredentialKind::AppKey, text).is_ok()
    }

    pub fn get(&self, kind: CredentialKind) -> &str {
        match kind {
            CredentialKind::DevEui => &self.dev_eui,
            CredentialKind::AppEui => &self.app_eui,
            CredentialKind::AppKey => &self.app_key,
        }
    }

    pub fn dev_eui(&self) -> &str {
        &self.dev_eui
    }

    pub fn app_eui(&self) -> &str {
        &self.app_eui
    }

    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    pub fn is_set(&self, kind: CredentialKind) -> bool {
        !self.get(kind).is_empty()
    }

    pub fn all_set(&self) -> bool {
        self.is_set(CredentialKind::DevEui)
            && self.is_set(CredentialKind::AppEui)
            && self.is_set(CredentialKind::AppKey)
    }

    pub fn is_provisioning_complete(&self) -> bool {
        self.provisioning_complete
    }

    /// Seal the set. Only possible once every credential is set; the flag
    /// never goes back to false.
    pub fn finalize(&mut self) -> Result<(), CredentialError> {
        if self.provisioning_complete {
            return Err(CredentialError::Sealed);
        }
        if !self.all_set() {
            return Err(CredentialError::Incomplete);
        }
        self.provisioning_complete = true;
        Ok(())
    }
}
