//! Thin wrappers over the codec crates used for header and body encoding.
//!
//! Nothing in here knows about message structure. These are the RFC
//! plumbing primitives the composition layer consumes: quoted-printable
//! and base64 body encodings, RFC 2047 encoded words and RFC 2822 header
//! folding.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// Width header lines are folded to and base64 bodies are wrapped at.
pub(crate) const MAX_LINE_LEN: usize = 76;

/// True when `s` can go into a header untouched.
pub(crate) fn is_ascii(s: &str) -> bool {
    s.bytes().all(|b| b <= 0x7f)
}

/// RFC 2047 "B" encoded word.
pub(crate) fn encoded_word(s: &str) -> String {
    format!("=?utf-8?b?{}?=", BASE64.encode(s))
}

/// Encoded word when `s` carries non-ASCII text, `s` untouched otherwise.
pub(crate) fn header_text(s: &str) -> String {
    if is_ascii(s) {
        s.to_owned()
    } else {
        encoded_word(s)
    }
}

/// Quoted-printable encode a text body.
///
/// Line endings are normalized to CRLF first, otherwise bare `\n` would
/// be escaped instead of kept as a line break. Includes the RFC 2045 §6.7
/// transparency pass: a leading `.` is doubled so no line can be taken
/// for the SMTP end-of-data mark.
pub(crate) fn quoted_printable_body(text: &str) -> String {
    let text = crlf_line_endings(text);
    let encoded = quoted_printable::encode(text.as_bytes());
    let encoded = String::from_utf8(encoded).expect("quoted-printable output is ASCII");

    let mut out = String::with_capacity(encoded.len());
    for (i, line) in encoded.split("\r\n").enumerate() {
        if i > 0 {
            out.push_str("\r\n");
        }
        if line.starts_with('.') {
            out.push('.');
        }
        out.push_str(line);
    }
    out
}

fn crlf_line_endings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_cr = false;
    for c in text.chars() {
        if c == '\n' && !prev_cr {
            out.push('\r');
        }
        out.push(c);
        prev_cr = c == '\r';
    }
    out
}

/// Base64 for attachment and binary content, hard-wrapped at 76 columns.
pub(crate) fn base64_body(data: &[u8]) -> String {
    let mut out = String::with_capacity(email_encoding::body::base64::encoded_len(data.len()));
    email_encoding::body::base64::encode(data, &mut out).expect("encode body as base64");
    out
}

/// RFC 2822 folding: wrap a `Name: value` line at whitespace so no line
/// exceeds [`MAX_LINE_LEN`], continuation lines indented by one space.
/// A single word longer than the limit stays intact on its own line.
pub(crate) fn fold_header_line(line: &str) -> String {
    if line.len() <= MAX_LINE_LEN {
        return line.to_owned();
    }

    let mut out = String::with_capacity(line.len() + 8);
    let mut len = 0;
    for word in line.split(' ') {
        if len == 0 {
            out.push_str(word);
            len = word.len();
        } else if len + 1 + word.len() <= MAX_LINE_LEN {
            out.push(' ');
            out.push_str(word);
            len += 1 + word.len();
        } else {
            out.push_str("\r\n ");
            out.push_str(word);
            len = 1 + word.len();
        }
    }
    out
}

/// RFC 2822 header-name capitalization: the first letter and every letter
/// after `-` or a space goes uppercase. With `keep_upper` the remaining
/// letters are left as supplied, otherwise they are lowercased.
///
/// `"x-name-value"` becomes `"X-Name-Value"`.
pub(crate) fn title_case(s: &str, keep_upper: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev = None;
    for c in s.chars() {
        let boundary = matches!(prev, None | Some('-') | Some(' '));
        let c = if keep_upper { c } else { c.to_ascii_lowercase() };
        if boundary {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}
