use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

/// Process-unique token generation for boundaries, Content-IDs and send
/// sequence numbers.
///
/// One `TokenSource` lives inside the [`Mailer`][crate::Mailer]; the
/// atomic counter keeps concurrent composition safe and every token
/// distinct even within the same millisecond.
#[derive(Debug, Default)]
pub(crate) struct TokenSource {
    counter: AtomicU64,
}

impl TokenSource {
    pub(crate) fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Sequence number for one send, used in diagnostics only.
    pub(crate) fn sequence(&self) -> u64 {
        self.next()
    }

    /// Fresh MIME boundary.
    ///
    /// `=_` cannot occur in quoted-printable output and `?` is outside the
    /// base64 alphabet, so the delimiter can never collide with encoded
    /// part content.
    pub(crate) fn boundary(&self) -> String {
        let suffix: String = std::iter::repeat_with(fastrand::alphanumeric)
            .take(8)
            .collect();
        format!(
            "----MAILFORGE-?=_{}-{}-{}",
            self.next(),
            unix_millis(),
            suffix
        )
    }

    /// Content-ID for attachments that did not bring their own.
    pub(crate) fn content_id(&self) -> String {
        format!("{}.{}@{}", self.next(), unix_millis(), local_hostname())
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[cfg(feature = "hostname")]
fn local_hostname() -> String {
    hostname::get()
        .map_err(|_| ())
        .and_then(|s| s.into_string().map_err(|_| ()))
        .unwrap_or_else(|_| "localhost".into())
}

#[cfg(not(feature = "hostname"))]
fn local_hostname() -> String {
    "localhost".into()
}
