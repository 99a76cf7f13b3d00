//! Operator console protocol for credential provisioning
//!
//! The operator types one command per line. Lines handed to
//! [`parse_command`] carry exactly one `\n` terminator, and set-command
//! arguments keep it: credential validation counts the terminator.

// Commands
pub const HELP: &str = "AT?\n";
pub const SET_DEV_EUI: &str = "AT+D=";
pub const SET_APP_EUI: &str = "AT+A=";
pub const SET_APP_KEY: &str = "AT+K=";
pub const SAVE: &str = "AT+S\n";

/// Parsed console line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand<'a> {
    /// `AT?` - list commands
    Help,
    /// `AT+D=<devEUI>`, argument still terminated
    SetDevEui(&'a str),
    /// `AT+A=<appEUI>`, argument still terminated
    SetAppEui(&'a str),
    /// `AT+K=<appKey>`, argument still terminated
    SetAppKey(&'a str),
    /// `AT+S` - save and lock
    Save,
    /// Anything else
    Invalid,
}

pub fn parse_command(line: &str) -> ConsoleCommand<'_> {
    if line == HELP {
        return ConsoleCommand::Help;
    }
    if line == SAVE {
        return ConsoleCommand::Save;
    }
    if let Some(arg) = line.strip_prefix(SET_DEV_EUI) {
        return ConsoleCommand::SetDevEui(arg);
    }
    if let Some(arg) = line.strip_prefix(SET_APP_EUI) {
        return ConsoleCommand::SetAppEui(arg);
    }
    if let Some(arg) = line.strip_prefix(SET_APP_KEY) {
        return ConsoleCommand::SetAppKey(arg);
    }
    ConsoleCommand::Invalid
}

/// Reply texts, one console line each
pub mod replies {
    pub const BANNER: &str = "Ready to receive AT commands. Type AT? for assistance";

    pub const HELP: [&str; 6] = [
        "",
        "Commands available : ",
        "AT+D=<devEUI> : Configure the devEUI",
        "AT+A=<appEUI> : Configure the appEUI",
        "AT+K=<appKey> : Configure the appKey",
        "AT+S : Save and protect credentials",
    ];

    pub const DEV_EUI_OK: &str = "DevEUI OK";
    pub const DEV_EUI_REJECTED: &str = "DevEUI incorrect, please try again";
    pub const APP_EUI_OK: &str = "AppEUI OK";
    pub const APP_EUI_REJECTED: &str = "AppEUI incorrect, please try again";
    pub const APP_KEY_OK: &str = "AppKey OK";
    pub const APP_KEY_REJECTED: &str = "AppKey incorrect, please try again";

    pub const FINISHED: &str = "Configuration of the credentials finished";
    pub const INCOMPLETE: &str = "You have to configure all the credentials";
    pub const INVALID: &str = "Invalid command, type AT? for assistance";
}
