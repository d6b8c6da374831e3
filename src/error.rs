use std::{
    error::Error as StdError,
    fmt::{self, Display, Formatter},
};

/// Boxed error for opaque transport failures.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Error type for message dispatch.
///
/// Address and encoding problems never show up here: a malformed address
/// list resolves to an empty list and unknown content types fall back to
/// `application/octet-stream`, both by design of the composition rules.
#[derive(Debug)]
pub enum Error {
    /// The message has no transport assigned and no registered transport
    /// is configured.
    TransportNotConfigured,
    /// The transport failed to take responsibility for the message.
    Transport(BoxError),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Error::TransportNotConfigured => f.write_str("no transport is configured"),
            Error::Transport(err) => write!(f, "transport failed: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::TransportNotConfigured => None,
            Error::Transport(err) => Some(&**err),
        }
    }
}
