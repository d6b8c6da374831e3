//! Local delivery through a sendmail-compatible binary.

use std::{
    error::Error as StdError,
    ffi::OsString,
    fmt::{self, Display, Formatter},
    io::Write,
    process::{Command, Stdio},
};

use crate::{
    error::BoxError,
    message::ComposedMessage,
    transport::{Delivery, DeliveryEvents, Transport},
};

const DEFAULT_SENDMAIL: &str = "/usr/sbin/sendmail";

/// Pipes composed messages to the local sendmail command.
///
/// Recipients come from the envelope on the command line, Bcc included,
/// so this transport advertises envelope-Bcc support and the Bcc header
/// stays visible in messages composed for it.
#[derive(Debug, Clone)]
pub struct SendmailTransport {
    command: OsString,
}

impl SendmailTransport {
    /// Transport using the default `/usr/sbin/sendmail` command.
    pub fn new() -> Self {
        Self {
            command: DEFAULT_SENDMAIL.into(),
        }
    }

    /// Transport using the given sendmail-compatible command.
    pub fn new_with_command(command: impl Into<OsString>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn command(&self, message: &ComposedMessage) -> Command {
        let mut c = Command::new(&self.command);
        c.arg("-i")
            .arg("-f")
            .arg(message.envelope().from().unwrap_or("\"\""))
            .args(message.envelope().recipients())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        c
    }
}

impl Default for SendmailTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for SendmailTransport {
    fn name(&self) -> &'static str {
        "sendmail"
    }

    fn supports_envelope_bcc(&self) -> bool {
        true
    }

    fn send(
        &self,
        message: &ComposedMessage,
        _events: &dyn DeliveryEvents,
    ) -> Result<Delivery, BoxError> {
        let mut process = self.command(message).spawn().map_err(Error::Io)?;
        if let Some(stdin) = process.stdin.as_mut() {
            stdin.write_all(&message.formatted()).map_err(Error::Io)?;
        }
        let output = process.wait_with_output().map_err(Error::Io)?;

        if output.status.success() {
            tracing::debug!(sequence = message.sequence(), "sendmail accepted message");
            Ok(Delivery::Accepted)
        } else {
            Err(Error::Client(String::from_utf8_lossy(&output.stderr).into_owned()).into())
        }
    }
}

/// Sendmail delivery failures.
#[derive(Debug)]
pub enum Error {
    /// Running the command failed.
    Io(std::io::Error),
    /// The command exited with an error.
    Client(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Error::Io(err) => write!(f, "sendmail command failed: {err}"),
            Error::Client(stderr) => write!(f, "sendmail rejected the message: {stderr}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Client(_) => None,
        }
    }
}
