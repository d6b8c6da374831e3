//! The stub transport records every message it is handed and returns a
//! configured outcome. Useful for tests and for dry runs.

use std::sync::{Arc, Mutex};

use crate::{
    error::BoxError,
    message::ComposedMessage,
    transport::{Delivery, DeliveryEvents, Transport},
};

/// Outcome the stub reports for every send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubBehavior {
    /// Report [`Delivery::Accepted`].
    Accept,
    /// Report [`Delivery::Deferred`] and emit a `defer` event for every
    /// envelope recipient.
    Defer,
    /// Fail with an opaque error.
    Fail,
}

/// Records composed messages instead of delivering them.
///
/// Clones share the recorded message list, so tests can keep one handle
/// and register another.
#[derive(Debug, Clone)]
pub struct StubTransport {
    behavior: StubBehavior,
    envelope_bcc: bool,
    messages: Arc<Mutex<Vec<ComposedMessage>>>,
}

impl StubTransport {
    /// Stub with the given behavior.
    pub fn new(behavior: StubBehavior) -> Self {
        Self {
            behavior,
            envelope_bcc: false,
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Stub that accepts everything.
    pub fn new_positive() -> Self {
        Self::new(StubBehavior::Accept)
    }

    /// Advertise envelope-Bcc support, keeping the Bcc header visible in
    /// messages composed for this stub.
    pub fn with_envelope_bcc(mut self) -> Self {
        self.envelope_bcc = true;
        self
    }

    /// Messages seen so far.
    pub fn messages(&self) -> Vec<ComposedMessage> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

impl Transport for StubTransport {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn supports_envelope_bcc(&self) -> bool {
        self.envelope_bcc
    }

    fn send(
        &self,
        message: &ComposedMessage,
        events: &dyn DeliveryEvents,
    ) -> Result<Delivery, BoxError> {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.clone());
        }

        match self.behavior {
            StubBehavior::Accept => Ok(Delivery::Accepted),
            StubBehavior::Defer => {
                for recipient in message.envelope().recipients() {
                    events.defer(recipient);
                }
                Ok(Delivery::Deferred)
            }
            StubBehavior::Fail => Err("stub transport failure".into()),
        }
    }
}
