//! Delivery transports.
//!
//! Composition hands a [`ComposedMessage`] to a [`Transport`]; everything
//! network- or process-shaped lives behind that trait. Messages without an
//! explicitly assigned transport go through the [`TransportRegistry`]: an
//! ordered list of `(name, predicate, transport)` entries where the first
//! entry whose predicate passes wins. The order is registration order, on
//! purpose — reordering it changes which transport takes the message.

#[cfg(feature = "file-transport")]
pub mod file;
#[cfg(feature = "sendmail-transport")]
pub mod sendmail;
pub mod stub;

use std::sync::Arc;

use crate::{error::BoxError, message::ComposedMessage};

/// Delivery outcome reported through the completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The transport confirmed responsibility for the message.
    Accepted,
    /// The receiving side took the message without confirming delivery;
    /// the caller may retry at a higher level. Not an error.
    Deferred,
}

/// Observer for address-level notices a transport may emit while sending.
///
/// All methods default to no-ops. These are advisory and never the sole
/// completion signal; the callback passed to
/// [`Mailer::send`][crate::Mailer::send] is.
pub trait DeliveryEvents: Send + Sync {
    /// The server redirected `old` to `new`.
    fn forward(&self, old: &str, new: &str) {
        let _ = (old, new);
    }

    /// The server queued delivery for `address`.
    fn defer(&self, address: &str) {
        let _ = address;
    }

    /// The server refused to deliver to `address`.
    fn retain(&self, address: &str) {
        let _ = address;
    }
}

/// Fan-out over every observer registered on a message.
pub(crate) struct Observers(pub(crate) Vec<Arc<dyn DeliveryEvents>>);

impl DeliveryEvents for Observers {
    fn forward(&self, old: &str, new: &str) {
        for observer in &self.0 {
            observer.forward(old, new);
        }
    }

    fn defer(&self, address: &str) {
        for observer in &self.0 {
            observer.defer(address);
        }
    }

    fn retain(&self, address: &str) {
        for observer in &self.0 {
            observer.retain(address);
        }
    }
}

/// A delivery mechanism for composed messages.
pub trait Transport: Send + Sync {
    /// Registry and diagnostics name.
    fn name(&self) -> &'static str;

    /// Whether this transport delivers to the envelope Bcc list itself,
    /// in which case the Bcc header stays visible in the composed message.
    /// Defaults to `false` so recipients are never disclosed by accident.
    fn supports_envelope_bcc(&self) -> bool {
        false
    }

    /// Hand over `message`. `events` receives advisory per-address
    /// notices; the returned value is the completion signal.
    fn send(
        &self,
        message: &ComposedMessage,
        events: &dyn DeliveryEvents,
    ) -> Result<Delivery, BoxError>;
}

/// Ordered transport registry; the first configured entry wins.
#[derive(Default)]
pub struct TransportRegistry {
    entries: Vec<Entry>,
}

struct Entry {
    predicate: Box<dyn Fn() -> bool + Send + Sync>,
    transport: Arc<dyn Transport>,
}

impl TransportRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a transport that is always ready.
    pub fn register(&mut self, transport: Arc<dyn Transport>) {
        self.register_when(|| true, transport);
    }

    /// Register a transport guarded by a configuration predicate. The
    /// predicate runs at selection time, once per send.
    pub fn register_when(
        &mut self,
        predicate: impl Fn() -> bool + Send + Sync + 'static,
        transport: Arc<dyn Transport>,
    ) {
        self.entries.push(Entry {
            predicate: Box::new(predicate),
            transport,
        });
    }

    /// First registered transport whose predicate passes.
    pub fn select(&self) -> Option<Arc<dyn Transport>> {
        self.entries
            .iter()
            .find(|entry| (entry.predicate)())
            .map(|entry| Arc::clone(&entry.transport))
    }

    /// True when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
