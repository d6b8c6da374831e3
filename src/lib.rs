//! # mailforge
//!
//! Compose RFC 2822 / MIME messages from structured input and hand them
//! to a pluggable delivery transport.
//!
//! The crate decides the multipart shape (plain, `multipart/alternative`,
//! `multipart/related`, `multipart/mixed`), generates folded and encoded
//! headers, serializes bodies and attachments with the right transfer
//! encodings and normalizes address lists. Transports stay small: a
//! sendmail and a file transport ship behind default features, anything
//! else plugs in through the [`Transport`] trait and the ordered
//! registry inside [`Mailer`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use mailforge::{transport::stub::StubTransport, Attachment, Mailer, Message};
//!
//! let mut mailer = Mailer::new();
//! mailer.register(Arc::new(StubTransport::new_positive()));
//!
//! let message = Message::new()
//!     .sender("\"Postmaster\" <postmaster@example.org>")
//!     .to("alice@example.com, Bob <bob@example.com>")
//!     .subject("Greetings")
//!     .body("Hello!")
//!     .html("<p>Hello!</p>")
//!     .attach(Attachment::new("notes.txt", "see attached"));
//!
//! mailer.send(message, |result| {
//!     println!("delivered: {result:?}");
//! });
//! ```
//!
//! Composition is synchronous; `send` hands the rendered message to the
//! transport on a background thread and reports the outcome through the
//! callback, exactly once. A deferred delivery (`Ok(Delivery::Deferred)`)
//! means the receiving side took the message without confirming it —
//! retry at a higher level if that matters to you.

#![forbid(unsafe_code)]

pub mod address;
mod encoding;
mod error;
mod mailer;
pub mod message;
pub mod mimetype;
pub mod plaintext;
pub mod transport;

pub use crate::{
    address::{Envelope, Mailbox},
    error::{BoxError, Error},
    mailer::Mailer,
    message::{Attachment, ComposedMessage, CustomHeader, Message, TransferEncoding},
    transport::{Delivery, DeliveryEvents, Transport, TransportRegistry},
};
