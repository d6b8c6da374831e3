//! Writes composed messages into a directory, one `.eml` (raw message)
//! and one `.json` (envelope) per send. Debugging aid and a poor man's
//! outbox.

use std::{
    error::Error as StdError,
    fmt::{self, Display, Formatter},
    fs,
    path::{Path, PathBuf},
};

use uuid::Uuid;

use crate::{
    error::BoxError,
    message::ComposedMessage,
    transport::{Delivery, DeliveryEvents, Transport},
};

/// Stores messages on disk instead of delivering them.
#[derive(Debug, Clone)]
pub struct FileTransport {
    path: PathBuf,
}

impl FileTransport {
    /// Transport writing into the given directory.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Transport for FileTransport {
    fn name(&self) -> &'static str {
        "file"
    }

    fn send(
        &self,
        message: &ComposedMessage,
        _events: &dyn DeliveryEvents,
    ) -> Result<Delivery, BoxError> {
        let id = Uuid::new_v4();

        let eml = self.path.join(format!("{id}.eml"));
        fs::write(&eml, message.formatted()).map_err(Error::Io)?;

        let envelope = serde_json::to_string(message.envelope()).map_err(Error::Envelope)?;
        fs::write(self.path.join(format!("{id}.json")), envelope).map_err(Error::Io)?;

        tracing::debug!(path = %eml.display(), "message written");
        Ok(Delivery::Accepted)
    }
}

/// File transport failures.
#[derive(Debug)]
pub enum Error {
    /// Writing to the target directory failed.
    Io(std::io::Error),
    /// The envelope could not be serialized.
    Envelope(serde_json::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Error::Io(err) => write!(f, "could not write message: {err}"),
            Error::Envelope(err) => write!(f, "could not serialize envelope: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Envelope(err) => Some(err),
        }
    }
}
