//! loranode wire formats - console commands and modem AT requests
//!
//! Two text channels meet on the node:
//! - the operator console, carrying provisioning commands (see [`console`])
//! - the LoRa modem UART, carrying `AT$` requests answered with free text
//!
//! Everything here is plain string formatting and classification; no I/O
//! happens outside the optional [`async_io`] module.

pub mod console;

/// Line terminator appended to every request written to the modem
pub const LINE_END: &str = "\r\n";

// Modem requests
pub const NVM_COMMAND: &str = "AT$NVM";
pub const KEY_LOCK_COMMAND: &str = "AT$APKACCESS";

// Modem reply markers
pub const REPLY_OK: &str = "+OK";
pub const REPLY_ERR: &str = "+ERR";

/// Request reading one byte of modem non-volatile memory
pub fn nvm_read_request(address: u8) -> String {
    format!("{NVM_COMMAND} {address}")
}

/// Request writing one byte of modem non-volatile memory
pub fn nvm_write_request(address: u8, value: u8) -> String {
    format!("{NVM_COMMAND} {address},{value}")
}

/// Request revoking read access to the application key
pub fn key_lock_request() -> String {
    KEY_LOCK_COMMAND.to_string()
}

/// True when a modem reply carries the success marker
pub fn is_ack(response: &str) -> bool {
    response.contains(REPLY_OK)
}

/// Classified reply to an `AT$NVM <address>` read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NvmReply {
    /// Parsed payload. Saturates at `u32::MAX`, callers range check.
    Value(u32),
    /// The modem answered with `+ERR`
    Error,
    /// Nothing arrived before the settle delay ran out
    Empty,
}

/// Classify the raw text read back after an NVM read request
///
/// The payload is the text after the first `=` (the whole reply when there is
/// none) up to the next `\n`. Leading decimal digits are the value; a payload
/// without digits reads as 0, the same as the modem firmware's own parser.
pub fn parse_nvm_read_reply(response: &str) -> NvmReply {
    if response.contains(REPLY_ERR) {
        return NvmReply::Error;
    }
    if response.trim().is_empty() {
        return NvmReply::Empty;
    }

    let payload = match response.find('=') {
        Some(idx) => &response[idx + 1..],
        None => response,
    };
    let payload = match payload.find('\n') {
        Some(end) => &payload[..end],
        None => payload,
    };

    NvmReply::Value(leading_decimal(payload.trim_start()))
}

fn leading_decimal(text: &str) -> u32 {
    let mut value = 0u32;
    for byte in text.bytes() {
        if !byte.is_ascii_digit() {
            break;
        }
        value = value
            .saturating_mul(10)
            .saturating_add((byte - b'0') as u32);
    }
    value
}

/// Async line operations for tokio
///
/// For boards that expose the console or modem as a tokio stream (USB serial
/// on a gateway host, or an interrupt-fed queue bridged into a task).
#[cfg(feature = "async")]
pub mod async_io {
    use std::io;
    use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

    /// Write one line followed by [`super::LINE_END`]
    pub async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> io::Result<()> {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(super::LINE_END.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Read one `\n` terminated line, keeping the terminator
    ///
    /// A `\r\n` terminator is normalised to `\n`. Returns `None` at end of
    /// stream; a trailing unterminated fragment is dropped. Lines longer than
    /// `max_len` bytes are an `InvalidData` error.
    pub async fn read_line<R: AsyncBufRead + Unpin>(
        reader: &mut R,
        max_len: usize,
    ) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        let n = reader.read_until(b'\n', &mut buf).await?;
        if n == 0 || buf.last() != Some(&b'\n') {
            return Ok(None);
        }

        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        if buf.len() > max_len {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "line too long"));
        }
        buf.push(b'\n');

        String::from_utf8(buf)
            .map(Some)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "line is not UTF-8"))
    }
}
