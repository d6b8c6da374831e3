//! Header block generation.

use std::time::SystemTime;

use crate::{
    address::{self, Envelope},
    encoding,
    message::{Layout, Message, X_MAILER},
};

/// Generate the CRLF-joined header block (not terminated by a blank line)
/// and the envelope collected from the address fields.
///
/// `bcc_in_header` keeps the Bcc header visible; the envelope carries the
/// Bcc recipients either way.
pub(crate) fn generate(
    message: &Message,
    layout: &Layout,
    date: SystemTime,
    bcc_in_header: bool,
) -> (String, Envelope) {
    let mut lines = Vec::with_capacity(12 + message.headers.len());
    let mut envelope = Envelope::default();

    lines.push(format!("X-Mailer: {X_MAILER}"));

    for header in &message.headers {
        let name = if header.preserve_case {
            header.name.trim().to_owned()
        } else {
            encoding::title_case(header.name.trim(), false)
        };
        lines.push(format!("{}: {}", name, header.value));
    }

    lines.push(format!("Date: {}", httpdate::fmt_http_date(date)));

    let from = address::format_list(message.sender.as_deref().unwrap_or(""), 1);
    if !from.header.is_empty() {
        lines.push(format!("From: {}", from.header));
    }
    envelope.from = from.plain.into_iter().next();

    let to = address::format_list(message.to.as_deref().unwrap_or(""), 0);
    if !to.header.is_empty() {
        lines.push(format!("To: {}", to.header));
    }
    envelope.to = to.plain;

    let cc = address::format_list(message.cc.as_deref().unwrap_or(""), 0);
    if !cc.header.is_empty() {
        lines.push(format!("Cc: {}", cc.header));
    }
    envelope.cc = cc.plain;

    let bcc = address::format_list(message.bcc.as_deref().unwrap_or(""), 0);
    if bcc_in_header && !bcc.header.is_empty() {
        lines.push(format!("Bcc: {}", bcc.header));
    }
    envelope.bcc = bcc.plain;

    let reply_to = address::format_list(message.reply_to.as_deref().unwrap_or(""), 1);
    if !reply_to.header.is_empty() {
        lines.push(format!("Reply-To: {}", reply_to.header));
    }

    lines.push(format!(
        "Subject: {}",
        subject_value(message.subject.as_deref())
    ));
    lines.push("MIME-Version: 1.0".to_owned());
    lines.push(format!("Content-Type: {}", layout.content_type));
    if let Some(transfer) = layout.transfer_encoding {
        lines.push(format!("Content-Transfer-Encoding: {transfer}"));
    }

    let block = lines
        .iter()
        .map(|line| encoding::fold_header_line(line))
        .collect::<Vec<_>>()
        .join("\r\n");
    (block, envelope)
}

/// Subject with control characters flattened to spaces, RFC 2047 encoded
/// when it carries non-ASCII text. Absent subject renders empty.
fn subject_value(subject: Option<&str>) -> String {
    let sanitized: String = subject
        .unwrap_or("")
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    encoding::header_text(&sanitized)
}

#[cfg(test)]
mod test {
    use std::time::{Duration, SystemTime};

    use pretty_assertions::assert_eq;

    use super::generate;
    use crate::message::{Layout, Message, TokenSource};

    // Tue, 15 Nov 1994 08:12:31 GMT
    fn fixed_date() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(784_887_151)
    }

    fn generate_for(message: &Message, bcc_in_header: bool) -> (String, crate::address::Envelope) {
        let layout = Layout::of(message, &TokenSource::new());
        generate(message, &layout, fixed_date(), bcc_in_header)
    }

    #[test]
    fn full_plain_header_block() {
        let message = Message::new()
            .header("x-priority", "3")
            .sender("\"Postmaster\" <post@example.org>")
            .to("alice@example.com")
            .cc("Bob <bob@example.com>")
            .reply_to("replies@example.org")
            .subject("Greetings")
            .body("hi");

        let (block, envelope) = generate_for(&message, false);
        assert_eq!(
            block,
            format!(
                concat!(
                    "X-Mailer: Mailforge ({}; +https://github.com/mailforge/mailforge)\r\n",
                    "X-Priority: 3\r\n",
                    "Date: Tue, 15 Nov 1994 08:12:31 GMT\r\n",
                    "From: \"Postmaster\" <post@example.org>\r\n",
                    "To: alice@example.com\r\n",
                    "Cc: \"Bob\" <bob@example.com>\r\n",
                    "Reply-To: replies@example.org\r\n",
                    "Subject: Greetings\r\n",
                    "MIME-Version: 1.0\r\n",
                    "Content-Type: text/plain; charset=utf-8\r\n",
                    "Content-Transfer-Encoding: quoted-printable"
                ),
                env!("CARGO_PKG_VERSION")
            )
        );
        assert_eq!(envelope.from(), Some("post@example.org"));
        assert_eq!(envelope.to(), ["alice@example.com"]);
        assert_eq!(envelope.cc(), ["bob@example.com"]);
    }

    #[test]
    fn subject_never_carries_line_breaks() {
        let message = Message::new().subject("part one\r\npart two");
        let (block, _) = generate_for(&message, false);
        assert!(block.contains("Subject: part one  part two"));
    }

    #[test]
    fn subject_is_encoded_when_non_ascii() {
        let message = Message::new().subject("яңа ел белән!");
        let (block, _) = generate_for(&message, false);
        assert!(block.contains(&format!(
            "Subject: {}",
            crate::encoding::encoded_word("яңа ел белән!")
        )));
    }

    #[test]
    fn missing_subject_renders_empty() {
        let (block, _) = generate_for(&Message::new(), false);
        assert!(block.contains("Subject: \r\n"));
    }

    #[test]
    fn bcc_header_is_suppressed_but_envelope_keeps_it() {
        let message = Message::new().bcc("secret@example.com");

        let (hidden, envelope) = generate_for(&message, false);
        assert!(!hidden.contains("Bcc:"));
        assert_eq!(envelope.bcc(), ["secret@example.com"]);

        let (visible, _) = generate_for(&message, true);
        assert!(visible.contains("Bcc: secret@example.com"));
    }

    #[test]
    fn from_is_limited_to_one_address() {
        let message = Message::new().sender("a@x.com, b@x.com");
        let (block, envelope) = generate_for(&message, false);
        assert!(block.contains("From: a@x.com\r\n"));
        assert!(!block.contains("b@x.com"));
        assert_eq!(envelope.from(), Some("a@x.com"));
    }

    #[test]
    fn custom_header_name_can_preserve_case() {
        let message = Message::new().header_exact("X-SPAM-Score", "0.5");
        let (block, _) = generate_for(&message, false);
        assert!(block.contains("X-SPAM-Score: 0.5"));
    }

    #[test]
    fn long_address_lists_are_folded() {
        let to = (0..10)
            .map(|i| format!("recipient-number-{i}@some-long-domain.example.com"))
            .collect::<Vec<_>>()
            .join(", ");
        let (block, _) = generate_for(&Message::new().to(to), false);
        for line in block.split("\r\n") {
            assert!(line.len() <= 76, "line too long: {line:?}");
        }
    }

    #[test]
    fn multipart_messages_skip_transfer_encoding_header() {
        let message = Message::new().body("hi").html("<p>hi</p>");
        let (block, _) = generate_for(&message, false);
        assert!(!block.contains("Content-Transfer-Encoding"));
        assert!(block.contains("Content-Type: multipart/alternative;"));
        assert!(block.contains("boundary=\""));
    }
}
