//! Body serialization: part layout, boundaries and transfer encodings.

use crate::{
    encoding,
    message::{Layout, Message, TokenSource, TransferEncoding},
    mimetype, plaintext,
};

/// Render the body block that follows the blank line after the headers.
pub(crate) fn generate(message: &Message, layout: &Layout, tokens: &TokenSource) -> String {
    let Some(outer) = layout.boundary.as_deref() else {
        return simple_body(message);
    };

    let inner = layout.inner_boundary.as_deref();
    let text_boundary = inner.unwrap_or(outer);
    let plain = plain_text(message);

    let mut rows: Vec<String> = Vec::new();

    if let Some(inner) = inner {
        rows.push(format!("--{outer}"));
        rows.push(format!(
            "Content-Type: multipart/alternative; boundary=\"{inner}\""
        ));
        rows.push(String::new());
    }

    rows.push(format!("--{text_boundary}"));
    rows.push(format!("Content-Type: {}", message.body_content_type_value()));
    rows.push(format!(
        "Content-Transfer-Encoding: {}",
        message.effective_body_encoding()
    ));
    rows.push(String::new());
    rows.push(encode_text(plain.trim(), message.effective_body_encoding()));
    rows.push(String::new());

    if let Some(html) = &message.html {
        rows.push(format!("--{text_boundary}"));
        rows.push(format!("Content-Type: text/html; charset={}", message.charset));
        rows.push(format!("Content-Transfer-Encoding: {}", message.encoding));
        rows.push(String::new());
        rows.push(encode_text(html.trim(), message.encoding));
        rows.push(String::new());
    }

    if let Some(inner) = inner {
        rows.push(format!("--{inner}--"));
    }

    for attachment in &message.attachments {
        let filename = attachment_filename(&attachment.filename);
        let content_type = attachment
            .content_type
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| mimetype::from_filename(&attachment.filename).to_owned());
        let content_id = attachment
            .content_id
            .clone()
            .unwrap_or_else(|| tokens.content_id());

        rows.push(format!("--{outer}"));
        rows.push(format!("Content-Type: {content_type}; name=\"{filename}\""));
        rows.push(format!(
            "Content-Disposition: attachment; filename=\"{filename}\""
        ));
        rows.push(format!("Content-ID: <{content_id}>"));
        rows.push("Content-Transfer-Encoding: base64".to_owned());
        rows.push(String::new());
        rows.push(encoding::base64_body(&attachment.contents));
    }

    rows.push(format!("--{outer}--"));
    rows.join("\r\n")
}

fn simple_body(message: &Message) -> String {
    if message.body.is_empty() {
        return String::new();
    }
    encode_text(&message.body, message.effective_body_encoding())
}

/// The plain part text, derived from the HTML body when none was given.
fn plain_text(message: &Message) -> String {
    if message.body.trim().is_empty() {
        if let Some(html) = &message.html {
            return plaintext::html_to_text(html);
        }
    }
    message.body.clone()
}

fn encode_text(text: &str, transfer: TransferEncoding) -> String {
    if transfer == TransferEncoding::QuotedPrintable {
        encoding::quoted_printable_body(text)
    } else {
        text.to_owned()
    }
}

/// RFC 2047 for non-ASCII filenames, otherwise the name with any `"`
/// removed so it cannot break out of the quoted parameter.
fn attachment_filename(filename: &str) -> String {
    if encoding::is_ascii(filename) {
        filename.replace('"', "")
    } else {
        encoding::encoded_word(filename)
    }
}
