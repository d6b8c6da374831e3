//! Message construction and composition.
//!
//! A [`Message`] is a plain bundle of fields the caller can keep editing
//! until it is sent. Composition derives the multipart shape once per
//! send, renders the header block and the body and produces a
//! [`ComposedMessage`] carrying the wire artifact plus the envelope
//! recipient lists.
//!
//! ```rust
//! use mailforge::{Attachment, Message};
//!
//! let message = Message::new()
//!     .sender("\"Postmaster\" <postmaster@example.org>")
//!     .to("alice@example.com, Bob <bob@example.com>")
//!     .subject("Greetings")
//!     .body("Hello!")
//!     .html("<p>Hello!</p>")
//!     .attach(Attachment::new("notes.txt", "see attached"));
//! # let _ = message;
//! ```

mod body;
mod headers;
mod token;

pub(crate) use self::token::TokenSource;

use std::{fmt, sync::Arc, time::SystemTime};

use mime::Mime;

use crate::{
    address::Envelope,
    transport::{DeliveryEvents, Transport},
};

/// `X-Mailer` banner, also printed by debug mode.
pub(crate) const X_MAILER: &str = concat!(
    "Mailforge (",
    env!("CARGO_PKG_VERSION"),
    "; +https://github.com/mailforge/mailforge)"
);

/// Transfer encoding for text bodies.
///
/// Quoted-printable is the default and the only one that rewrites the
/// text; the others pass it through and only change the declared header.
/// Attachments are always base64 regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferEncoding {
    /// `7bit`
    SevenBit,
    /// `quoted-printable`
    #[default]
    QuotedPrintable,
    /// `8bit`
    EightBit,
    /// `binary`
    Binary,
}

impl TransferEncoding {
    fn as_str(self) -> &'static str {
        match self {
            TransferEncoding::SevenBit => "7bit",
            TransferEncoding::QuotedPrintable => "quoted-printable",
            TransferEncoding::EightBit => "8bit",
            TransferEncoding::Binary => "binary",
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransferEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7bit" => Ok(TransferEncoding::SevenBit),
            "quoted-printable" => Ok(TransferEncoding::QuotedPrintable),
            "8bit" => Ok(TransferEncoding::EightBit),
            "binary" => Ok(TransferEncoding::Binary),
            _ => Err(format!("unknown transfer encoding: {s}")),
        }
    }
}

/// A file carried by the message.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// File name shown to the recipient and used for type resolution.
    pub filename: String,
    /// Raw contents, always base64-encoded on the wire.
    pub contents: Vec<u8>,
    /// Content-ID the HTML body can reference through `cid:` URLs.
    /// Generated when absent.
    pub content_id: Option<String>,
    /// Content type override; resolved from the filename extension when
    /// `None`.
    pub content_type: Option<Mime>,
}

impl Attachment {
    /// New attachment from a filename and its contents.
    pub fn new(filename: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            contents: contents.into(),
            content_id: None,
            content_type: None,
        }
    }

    /// Set the Content-ID, marking the attachment as referenced inline.
    pub fn content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    /// Override the content type resolved from the filename.
    pub fn content_type(mut self, content_type: Mime) -> Self {
        self.content_type = Some(content_type);
        self
    }
}

/// A custom header supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomHeader {
    /// Header name; title-cased on output unless `preserve_case` is set.
    pub name: String,
    /// Header value, emitted verbatim.
    pub value: String,
    /// Keep the name exactly as supplied.
    pub preserve_case: bool,
}

/// The unit of composition.
///
/// All address fields take raw comma separated lists; normalization and
/// encoding happen at composition time, so fields can be edited freely
/// until the message is handed to [`Mailer::send`][crate::Mailer::send].
pub struct Message {
    /// Sender address (`From`, limited to one entry).
    pub sender: Option<String>,
    /// `To` recipients.
    pub to: Option<String>,
    /// `Cc` recipients.
    pub cc: Option<String>,
    /// `Bcc` recipients. Only visible in the headers when the transport
    /// honors envelope Bcc; always delivered through the envelope.
    pub bcc: Option<String>,
    /// `Reply-To` address (limited to one entry).
    pub reply_to: Option<String>,
    /// Subject; line breaks and other control characters become spaces.
    pub subject: Option<String>,
    /// Plain-text body. Derived from `html` when left blank.
    pub body: String,
    /// HTML body, making the message multipart.
    pub html: Option<String>,
    /// Attachments, in order.
    pub attachments: Vec<Attachment>,
    /// Custom headers, emitted after `X-Mailer` in insertion order.
    pub headers: Vec<CustomHeader>,
    /// Charset declared for the text parts.
    pub charset: String,
    /// Transfer encoding for the text parts.
    pub encoding: TransferEncoding,
    /// Content type override for the plain part.
    pub body_content_type: Option<String>,
    /// Transfer encoding override for the plain part.
    pub body_encoding: Option<TransferEncoding>,
    /// Emit composition and dispatch diagnostics through `tracing`.
    pub debug: bool,

    transport: Option<Arc<dyn Transport>>,
    observers: Vec<Arc<dyn DeliveryEvents>>,
}

impl Message {
    /// Creates an empty message with quoted-printable utf-8 defaults.
    pub fn new() -> Self {
        Self {
            sender: None,
            to: None,
            cc: None,
            bcc: None,
            reply_to: None,
            subject: None,
            body: String::new(),
            html: None,
            attachments: Vec::new(),
            headers: Vec::new(),
            charset: "utf-8".into(),
            encoding: TransferEncoding::default(),
            body_content_type: None,
            body_encoding: None,
            debug: false,
            transport: None,
            observers: Vec::new(),
        }
    }

    /// Set the sender address.
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Set the `To` list.
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Set the `Cc` list.
    pub fn cc(mut self, cc: impl Into<String>) -> Self {
        self.cc = Some(cc.into());
        self
    }

    /// Set the `Bcc` list.
    pub fn bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc = Some(bcc.into());
        self
    }

    /// Set the `Reply-To` address.
    pub fn reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Set the subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the plain-text body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the HTML body.
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Add an attachment.
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Add a custom header; the name is title-cased on output.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(CustomHeader {
            name: name.into(),
            value: value.into(),
            preserve_case: false,
        });
        self
    }

    /// Add a custom header whose name is emitted exactly as supplied.
    pub fn header_exact(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(CustomHeader {
            name: name.into(),
            value: value.into(),
            preserve_case: true,
        });
        self
    }

    /// Set the charset declared for text parts.
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Set the transfer encoding for text parts.
    pub fn encoding(mut self, encoding: TransferEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Assign a transport for this message, bypassing the registry.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Register an observer for the transport's address-level notices.
    pub fn observe(mut self, observer: Arc<dyn DeliveryEvents>) -> Self {
        self.observers.push(observer);
        self
    }

    pub(crate) fn transport_override(&self) -> Option<&Arc<dyn Transport>> {
        self.transport.as_ref()
    }

    pub(crate) fn observers(&self) -> &[Arc<dyn DeliveryEvents>] {
        &self.observers
    }

    pub(crate) fn effective_body_encoding(&self) -> TransferEncoding {
        self.body_encoding.unwrap_or(self.encoding)
    }

    pub(crate) fn body_content_type_value(&self) -> String {
        self.body_content_type
            .clone()
            .unwrap_or_else(|| format!("text/plain; charset={}", self.charset))
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("sender", &self.sender)
            .field("to", &self.to)
            .field("cc", &self.cc)
            .field("bcc", &self.bcc)
            .field("subject", &self.subject)
            .field("html", &self.html.is_some())
            .field("attachments", &self.attachments.len())
            .finish_non_exhaustive()
    }
}

/// Multipart shape derived from the message, computed once per send.
#[derive(Debug, Clone)]
pub(crate) struct Layout {
    pub(crate) multipart: bool,
    pub(crate) content_type: String,
    pub(crate) transfer_encoding: Option<TransferEncoding>,
    pub(crate) boundary: Option<String>,
    /// Boundary of the nested `multipart/alternative` sub-body, present
    /// exactly when some attachment has no Content-ID.
    pub(crate) inner_boundary: Option<String>,
}

impl Layout {
    pub(crate) fn of(message: &Message, tokens: &TokenSource) -> Self {
        let multipart = message.html.is_some() || !message.attachments.is_empty();
        if !multipart {
            return Self {
                multipart: false,
                content_type: message.body_content_type_value(),
                transfer_encoding: Some(message.effective_body_encoding()),
                boundary: None,
                inner_boundary: None,
            };
        }

        let mixed = message.attachments.iter().any(|a| a.content_id.is_none());
        let related = message.attachments.iter().any(|a| a.content_id.is_some());
        let kind = if message.attachments.is_empty() {
            "alternative"
        } else if related {
            // clients hide cid-referenced attachments this way
            "related"
        } else {
            "mixed"
        };

        let boundary = tokens.boundary();
        let inner_boundary = mixed.then(|| tokens.boundary());
        Self {
            multipart: true,
            content_type: format!("multipart/{kind}; boundary=\"{boundary}\""),
            transfer_encoding: None,
            boundary: Some(boundary),
            inner_boundary,
        }
    }
}

/// A fully rendered message plus its envelope, ready for a transport.
#[derive(Debug, Clone)]
pub struct ComposedMessage {
    headers: String,
    body: String,
    envelope: Envelope,
    sequence: u64,
}

impl ComposedMessage {
    /// The CRLF-joined header block, without the trailing blank line.
    pub fn headers(&self) -> &str {
        &self.headers
    }

    /// The body block.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Envelope recipient lists for protocol-level delivery.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Process-local sequence number, for diagnostic correlation only.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The wire artifact: header block, blank line, body.
    pub fn formatted(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.headers.len() + self.body.len() + 4);
        out.extend_from_slice(self.headers.as_bytes());
        out.extend_from_slice(b"\r\n\r\n");
        out.extend_from_slice(self.body.as_bytes());
        out
    }
}

pub(crate) fn compose(
    message: &Message,
    tokens: &TokenSource,
    date: SystemTime,
    bcc_in_header: bool,
    sequence: u64,
) -> ComposedMessage {
    let layout = Layout::of(message, tokens);
    let (headers, envelope) = headers::generate(message, &layout, date, bcc_in_header);
    let body = body::generate(message, &layout, tokens);
    ComposedMessage {
        headers,
        body,
        envelope,
        sequence,
    }
}
