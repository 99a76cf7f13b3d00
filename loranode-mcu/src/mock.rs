//! In-memory collaborators for host tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::credentials::CredentialSet;
use crate::error::{ModemError, NvmError};
use crate::modem::{Delay, KeyLock, ModemChannel};
use crate::node::Sensor;
use crate::provisioning::Console;
use crate::radio::{Band, Radio};
use crate::storage::NvmStore;

/// Records every requested delay; clones share the record
#[derive(Debug, Clone, Default)]
pub struct RecordingDelay(Rc<RefCell<Vec<u32>>>);

impl RecordingDelay {
    pub fn calls(&self) -> Vec<u32> {
        self.0.borrow().clone()
    }
}

impl Delay for RecordingDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().push(ms);
    }
}

/// Modem channel answering from a fixed script, then silence
#[derive(Debug, Default)]
pub struct ScriptedChannel {
    pub replies: VecDeque<String>,
    pub sent: Vec<String>,
    pub broken: bool,
}

impl ScriptedChannel {
    pub fn with_replies(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl ModemChannel for ScriptedChannel {
    type Error = String;

    fn send_line(&mut self, line: &str) -> Result<(), String> {
        if self.broken {
            return Err("uart closed".to_string());
        }
        self.sent.push(line.to_string());
        Ok(())
    }

    fn read_available(&mut self) -> Result<String, String> {
        if self.broken {
            return Err("uart closed".to_string());
        }
        Ok(self.replies.pop_front().unwrap_or_default())
    }
}

/// Modem emulating `AT$NVM` and `AT$APKACCESS` over three bytes of memory
#[derive(Debug, Default)]
pub struct FakeModem {
    pub nvm: [u8; 3],
    pub requests: Vec<String>,
    pub key_locked: bool,
    pending: String,
}

impl FakeModem {
    pub fn with_nvm(nvm: [u8; 3]) -> Self {
        Self {
            nvm,
            ..Default::default()
        }
    }

    fn answer(&mut self, line: &str) -> String {
        if line == "AT$APKACCESS" {
            self.key_locked = true;
            return "+OK\r\n".to_string();
        }
        let Some(args) = line.strip_prefix("AT$NVM ") else {
            return "+ERR\r\n".to_string();
        };
        match args.split_once(',') {
            Some((addr, value)) => {
                let slot = addr.parse::<usize>().ok().filter(|a| *a < self.nvm.len());
                match (slot, value.parse::<u8>()) {
                    (Some(a), Ok(v)) => {
                        self.nvm[a] = v;
                        "+OK\r\n".to_string()
                    }
                    _ => "+ERR=-1\r\n".to_string(),
                }
            }
            None => match args.parse::<usize>().ok().and_then(|a| self.nvm.get(a)) {
                Some(v) => format!("+OK={v}\r\n"),
                None => "+ERR=-1\r\n".to_string(),
            },
        }
    }
}

impl ModemChannel for FakeModem {
    type Error = String;

    fn send_line(&mut self, line: &str) -> Result<(), String> {
        self.requests.push(line.to_string());
        self.pending = self.answer(line);
        Ok(())
    }

    fn read_available(&mut self) -> Result<String, String> {
        Ok(std::mem::take(&mut self.pending))
    }
}

/// Byte store with injectable failures; only successful writes are recorded
#[derive(Debug, Default)]
pub struct MemoryNvm {
    pub bytes: [u8; 3],
    pub fail_reads: bool,
    pub fail_write_at: Option<u8>,
    pub writes: Vec<(u8, u8)>,
    pub key_locked: bool,
}

impl MemoryNvm {
    pub fn with_bytes(bytes: [u8; 3]) -> Self {
        Self {
            bytes,
            ..Default::default()
        }
    }
}

impl NvmStore for MemoryNvm {
    fn read_byte(&mut self, address: u8) -> Result<u8, NvmError> {
        if self.fail_reads {
            return Err(NvmError::NoResponse { address });
        }
        self.bytes
            .get(address as usize)
            .copied()
            .ok_or(NvmError::Rejected { address })
    }

    fn write_byte(&mut self, address: u8, value: u8) -> Result<(), NvmError> {
        if self.fail_write_at == Some(address) {
            return Err(NvmError::NotAcknowledged { address });
        }
        let slot = self
            .bytes
            .get_mut(address as usize)
            .ok_or(NvmError::NotAcknowledged { address })?;
        *slot = value;
        self.writes.push((address, value));
        Ok(())
    }
}

impl KeyLock for MemoryNvm {
    fn lock_app_key(&mut self) -> Result<(), ModemError> {
        self.key_locked = true;
        Ok(())
    }
}

/// Console fed in chunks: each chunk arrives within one poll, then the
/// console reports nothing pending. Once every chunk was read it fails.
#[derive(Debug, Default)]
pub struct FakeConsole {
    chunks: VecDeque<Vec<u8>>,
    pos: usize,
    pub output: Vec<String>,
}

impl FakeConsole {
    pub fn new(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.as_bytes().to_vec()).collect(),
            ..Default::default()
        }
    }
}

impl Console for FakeConsole {
    type Error = String;

    fn read_byte(&mut self) -> Result<Option<u8>, String> {
        let Some(chunk) = self.chunks.front() else {
            return Err("console disconnected".to_string());
        };
        if let Some(byte) = chunk.get(self.pos) {
            self.pos += 1;
            return Ok(Some(*byte));
        }
        self.chunks.pop_front();
        self.pos = 0;
        Ok(None)
    }

    fn write_line(&mut self, line: &str) -> Result<(), String> {
        self.output.push(line.to_string());
        Ok(())
    }
}

/// Radio with scripted join and transmit results
#[derive(Debug)]
pub struct FakeRadio {
    pub begin_ok: bool,
    pub band: Option<Band>,
    /// Drained per join; `Ok(true)` once empty
    pub join_results: VecDeque<Result<bool, String>>,
    /// Drained per packet; `Ok(1)` once empty
    pub send_results: VecDeque<Result<i32, String>>,
    pub joined_with: Vec<(String, String, String)>,
    pub poll_interval: Option<u32>,
    pub data_rate: Option<u8>,
    pub packets: Vec<Vec<u8>>,
    pub confirmed: Vec<bool>,
}

impl Default for FakeRadio {
    fn default() -> Self {
        Self {
            begin_ok: true,
            band: None,
            join_results: VecDeque::new(),
            send_results: VecDeque::new(),
            joined_with: Vec::new(),
            poll_interval: None,
            data_rate: None,
            packets: Vec::new(),
            confirmed: Vec::new(),
        }
    }
}

impl Radio for FakeRadio {
    type Error = String;

    fn begin(&mut self, band: Band) -> Result<(), String> {
        if !self.begin_ok {
            return Err("module not responding".to_string());
        }
        self.band = Some(band);
        Ok(())
    }

    fn join_otaa(&mut self, dev_eui: &str, app_eui: &str, app_key: &str) -> Result<bool, String> {
        self.joined_with
            .push((dev_eui.to_string(), app_eui.to_string(), app_key.to_string()));
        self.join_results.pop_front().unwrap_or(Ok(true))
    }

    fn begin_packet(&mut self) -> Result<(), String> {
        self.packets.push(Vec::new());
        Ok(())
    }

    fn write(&mut self, payload: &[u8]) -> Result<usize, String> {
        match self.packets.last_mut() {
            Some(packet) => {
                packet.extend_from_slice(payload);
                Ok(payload.len())
            }
            None => Err("no packet open".to_string()),
        }
    }

    fn end_packet(&mut self, confirmed: bool) -> Result<i32, String> {
        self.confirmed.push(confirmed);
        self.send_results.pop_front().unwrap_or(Ok(1))
    }

    fn set_poll_interval(&mut self, seconds: u32) -> Result<(), String> {
        self.poll_interval = Some(seconds);
        Ok(())
    }

    fn set_data_rate(&mut self, index: u8) -> Result<(), String> {
        self.data_rate = Some(index);
        Ok(())
    }
}

#[derive(Debug)]
pub struct FakeSensor {
    pub ok: bool,
}

impl FakeSensor {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

impl Sensor for FakeSensor {
    type Error = &'static str;

    fn begin(&mut self) -> Result<(), &'static str> {
        if self.ok {
            Ok(())
        } else {
            Err("sensor not found")
        }
    }
}

/// A sealed set holding valid test credentials
pub fn provisioned_credentials() -> CredentialSet {
    let mut creds = CredentialSet::new();
    assert!(creds.set_dev_eui("0011223344556677\n"));
    assert!(creds.set_app_eui("70B3D57ED0000000\n"));
    assert!(creds.set_app_key("00112233445566778899AABBCCDDEEFF\n"));
    creds.finalize().unwrap();
    creds
}
