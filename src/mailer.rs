//! The mailer owns the transport registry and the token source, and
//! drives message composition and dispatch.

use std::{fmt, sync::Arc, thread, time::SystemTime};

use crate::{
    error::Error,
    message::{compose, ComposedMessage, Message, TokenSource, X_MAILER},
    transport::{Delivery, Observers, Transport, TransportRegistry},
};

/// Composes messages and hands them to the first configured transport.
///
/// One `Mailer` per application is the intended shape: it owns the token
/// source whose atomic counter keeps boundary tokens and sequence numbers
/// unique across threads, and the ordered transport registry consulted for
/// every message without an explicitly assigned transport.
pub struct Mailer {
    registry: TransportRegistry,
    tokens: TokenSource,
}

impl Mailer {
    /// Creates a mailer with an empty registry.
    pub fn new() -> Self {
        Self {
            registry: TransportRegistry::new(),
            tokens: TokenSource::new(),
        }
    }

    /// Register an always-ready transport. Order matters: the first
    /// registered transport whose predicate passes takes every message
    /// without an explicit transport.
    pub fn register(&mut self, transport: Arc<dyn Transport>) {
        self.registry.register(transport);
    }

    /// Register a transport guarded by a configuration predicate.
    pub fn register_when(
        &mut self,
        predicate: impl Fn() -> bool + Send + Sync + 'static,
        transport: Arc<dyn Transport>,
    ) {
        self.registry.register_when(predicate, transport);
    }

    /// Compose `message` without sending it.
    ///
    /// The transport is selected exactly like [`send`][Self::send] does,
    /// because Bcc header visibility depends on its capabilities.
    pub fn compose(&self, message: &Message) -> Result<ComposedMessage, Error> {
        let transport = self
            .select_transport(message)
            .ok_or(Error::TransportNotConfigured)?;
        Ok(self.compose_for(message, transport.supports_envelope_bcc()))
    }

    /// Compose `message` and dispatch it on a background thread.
    ///
    /// `callback` fires exactly once: `Ok(Delivery::Accepted)` on a
    /// confirmed handover, `Ok(Delivery::Deferred)` when the receiving
    /// side took the message without confirming delivery, `Err` for a
    /// missing transport or a transport failure. A missing transport is
    /// reported through the callback, never panicked.
    pub fn send<F>(&self, message: Message, callback: F)
    where
        F: FnOnce(Result<Delivery, Error>) + Send + 'static,
    {
        let Some(transport) = self.select_transport(&message) else {
            callback(Err(Error::TransportNotConfigured));
            return;
        };

        let composed = self.compose_for(&message, transport.supports_envelope_bcc());
        let debug = message.debug;
        let observers = Observers(message.observers().to_vec());

        thread::spawn(move || {
            let result = transport.send(&composed, &observers).map_err(Error::Transport);
            if debug {
                tracing::debug!(
                    transport = transport.name(),
                    sequence = composed.sequence(),
                    success = result.is_ok(),
                    "transport finished"
                );
            }
            callback(result);
        });
    }

    fn compose_for(&self, message: &Message, bcc_in_header: bool) -> ComposedMessage {
        let sequence = self.tokens.sequence();
        if message.debug {
            tracing::debug!(sequence, "{}", X_MAILER);
        }
        compose(message, &self.tokens, SystemTime::now(), bcc_in_header, sequence)
    }

    fn select_transport(&self, message: &Message) -> Option<Arc<dyn Transport>> {
        message
            .transport_override()
            .cloned()
            .or_else(|| self.registry.select())
    }
}

impl Default for Mailer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Mailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    use super::Mailer;
    use crate::{
        error::Error,
        message::Message,
        transport::stub::{StubBehavior, StubTransport},
        transport::Delivery,
    };

    fn send_and_wait(mailer: &Mailer, message: Message) -> Result<Delivery, Error> {
        let (tx, rx) = mpsc::channel();
        mailer.send(message, move |result| {
            let _ = tx.send(result);
        });
        rx.recv_timeout(Duration::from_secs(5)).expect("callback fired")
    }

    #[test]
    fn missing_transport_reports_through_callback() {
        let mailer = Mailer::new();
        let result = send_and_wait(&mailer, Message::new().to("a@x.com"));
        assert!(matches!(result, Err(Error::TransportNotConfigured)));
    }

    #[test]
    fn registered_transport_takes_the_message() {
        let stub = StubTransport::new_positive();
        let mut mailer = Mailer::new();
        mailer.register(Arc::new(stub.clone()));

        let result = send_and_wait(&mailer, Message::new().to("a@x.com").body("hi"));
        assert_eq!(result.expect("delivered"), Delivery::Accepted);

        let messages = stub.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].headers().starts_with("X-Mailer: Mailforge"));
        assert_eq!(messages[0].envelope().to(), ["a@x.com"]);
    }

    #[test]
    fn per_message_transport_wins_over_registry() {
        let registered = StubTransport::new_positive();
        let assigned = StubTransport::new_positive();
        let mut mailer = Mailer::new();
        mailer.register(Arc::new(registered.clone()));

        let message = Message::new()
            .to("a@x.com")
            .transport(Arc::new(assigned.clone()));
        send_and_wait(&mailer, message).expect("delivered");

        assert!(registered.messages().is_empty());
        assert_eq!(assigned.messages().len(), 1);
    }

    #[test]
    fn deferred_delivery_is_not_an_error() {
        let mut mailer = Mailer::new();
        mailer.register(Arc::new(StubTransport::new(StubBehavior::Defer)));

        let result = send_and_wait(&mailer, Message::new().to("a@x.com"));
        assert_eq!(result.expect("no error"), Delivery::Deferred);
    }

    #[test]
    fn transport_failure_surfaces_verbatim() {
        let mut mailer = Mailer::new();
        mailer.register(Arc::new(StubTransport::new(StubBehavior::Fail)));

        let result = send_and_wait(&mailer, Message::new().to("a@x.com"));
        match result {
            Err(Error::Transport(err)) => assert!(err.to_string().contains("stub")),
            other => panic!("expected a transport error, got {other:?}"),
        }
    }

    #[test]
    fn bcc_visibility_follows_transport_capability() {
        let discreet = StubTransport::new_positive();
        let envelope_aware = StubTransport::new_positive().with_envelope_bcc();
        let message = Message::new().to("a@x.com").bcc("hidden@x.com");

        let mut mailer = Mailer::new();
        mailer.register(Arc::new(discreet.clone()));
        let composed = mailer.compose(&message).expect("composed");
        assert!(!composed.headers().contains("Bcc:"));
        assert_eq!(composed.envelope().bcc(), ["hidden@x.com"]);

        let mut mailer = Mailer::new();
        mailer.register(Arc::new(envelope_aware.clone()));
        let composed = mailer.compose(&message).expect("composed");
        assert!(composed.headers().contains("Bcc: hidden@x.com"));
    }

    #[test]
    fn sequences_increase_per_send() {
        let stub = StubTransport::new_positive();
        let mut mailer = Mailer::new();
        mailer.register(Arc::new(stub.clone()));

        send_and_wait(&mailer, Message::new().to("a@x.com")).expect("delivered");
        send_and_wait(&mailer, Message::new().to("a@x.com")).expect("delivered");

        let messages = stub.messages();
        assert!(messages[1].sequence() > messages[0].sequence());
    }
}
