//! Address-list parsing and normalization.
//!
//! The grammar here is deliberately looser than RFC 2822. The input is a
//! comma separated list where each entry is `"Display Name" <addr>`,
//! `Display Name <addr>`, `<addr>` or a bare address. Display names and
//! addresses may carry non-ASCII text, which becomes an RFC 2047 encoded
//! word when the list is rendered into a header. An input that fails to
//! parse yields an empty list instead of an error.

use chumsky::prelude::*;

use crate::encoding;

/// A single parsed `(display name, address)` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    /// Display name, if the entry had one.
    pub name: Option<String>,
    /// The bare address.
    pub address: String,
}

/// Plain envelope addresses collected while the headers are generated.
///
/// These are what a transport actually delivers to; the display headers
/// carry the encoded form. The Bcc list is always present here even when
/// the Bcc header was suppressed from the message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Envelope {
    pub(crate) from: Option<String>,
    pub(crate) to: Vec<String>,
    pub(crate) cc: Vec<String>,
    pub(crate) bcc: Vec<String>,
}

impl Envelope {
    /// The envelope sender address.
    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    /// The To recipients.
    pub fn to(&self) -> &[String] {
        &self.to
    }

    /// The Cc recipients.
    pub fn cc(&self) -> &[String] {
        &self.cc
    }

    /// The Bcc recipients.
    pub fn bcc(&self) -> &[String] {
        &self.bcc
    }

    /// All recipients, in To, Cc, Bcc order.
    pub fn recipients(&self) -> impl Iterator<Item = &str> + '_ {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(String::as_str)
    }

    /// True when there is at least one recipient.
    pub fn has_recipients(&self) -> bool {
        !(self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty())
    }
}

// quoted display name, backslash escapes allowed
fn quoted_name() -> impl Parser<char, String, Error = Simple<char>> {
    choice((
        just('\\').ignore_then(any()),
        filter(|c: &char| *c != '"' && *c != '\\'),
    ))
    .repeated()
    .delimited_by(just('"').ignored(), just('"').ignored())
    .map(String::from_iter)
}

fn angle_address() -> impl Parser<char, String, Error = Simple<char>> {
    filter(|c: &char| *c != '>')
        .repeated()
        .delimited_by(just('<').ignored(), just('>').ignored())
        .map(String::from_iter)
}

// free text up to a delimiter; doubles as the bare-address form
fn loose_text() -> impl Parser<char, String, Error = Simple<char>> {
    filter(|c: &char| !matches!(*c, ',' | '<' | '>' | '"'))
        .repeated()
        .map(String::from_iter)
}

fn mailbox() -> impl Parser<char, Mailbox, Error = Simple<char>> {
    let named = quoted_name()
        .padded()
        .then(angle_address())
        .map(|(name, address)| Mailbox {
            name: clean_name(&name),
            address,
        });
    let loose = loose_text()
        .then(angle_address())
        .map(|(name, address)| Mailbox {
            name: clean_name(&name),
            address,
        });
    let bare = loose_text().map(|address| Mailbox {
        name: None,
        address,
    });
    choice((named, loose, bare))
}

fn address_list() -> impl Parser<char, Vec<Mailbox>, Error = Simple<char>> {
    mailbox()
        .padded()
        .separated_by(just(','))
        .then_ignore(end())
}

fn clean_name(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_owned())
    }
}

/// Parse a comma separated address list.
///
/// Entries whose address is empty after trimming are dropped; a list that
/// does not parse at all comes back empty.
pub fn parse_list(input: &str) -> Vec<Mailbox> {
    let parsed = match address_list().parse(input) {
        Ok(parsed) => parsed,
        Err(_) => {
            tracing::debug!(input, "unparseable address list, treating as empty");
            return Vec::new();
        }
    };

    parsed
        .into_iter()
        .filter_map(|entry| {
            let address = entry.address.trim();
            if address.is_empty() {
                return None;
            }
            Some(Mailbox {
                name: entry.name,
                address: address.to_owned(),
            })
        })
        .collect()
}

/// Display header value plus the plain addresses retained, in list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedList {
    /// Ready-to-emit header value, entries joined with `, `.
    pub header: String,
    /// The bare addresses, for envelope use.
    pub plain: Vec<String>,
}

/// Render `input` as a display header value.
///
/// When `limit` is non-zero at most that many entries are kept, and the
/// truncation applies to the plain-address list as well. Display names get
/// their first letters capitalized and are quoted; any non-ASCII name or
/// address becomes an RFC 2047 encoded word.
pub fn format_list(input: &str, limit: usize) -> FormattedList {
    let mut entries = parse_list(input);
    if limit > 0 && entries.len() > limit {
        entries.truncate(limit);
    }

    let mut plain = Vec::with_capacity(entries.len());
    let mut parts = Vec::with_capacity(entries.len());
    for entry in entries {
        plain.push(entry.address.clone());

        let address = encoding::header_text(&entry.address);
        match entry.name {
            Some(name) => {
                let name = encoding::title_case(name.trim(), true);
                let name = encoding::header_text(&name);
                parts.push(format!("\"{name}\" <{address}>"));
            }
            None => parts.push(address),
        }
    }

    FormattedList {
        header: parts.join(", "),
        plain,
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn mbox(name: Option<&str>, address: &str) -> Mailbox {
        Mailbox {
            name: name.map(Into::into),
            address: address.into(),
        }
    }

    #[test]
    fn parse_bare_address() {
        assert_eq!(parse_list("kayo@example.com"), [mbox(None, "kayo@example.com")]);
    }

    #[test]
    fn parse_mixed_forms() {
        assert_eq!(
            parse_list("Joe <j@x.com>, \"Last, First\" <l@y.com>, bare@z.com"),
            [
                mbox(Some("Joe"), "j@x.com"),
                mbox(Some("Last, First"), "l@y.com"),
                mbox(None, "bare@z.com"),
            ]
        );
    }

    #[test]
    fn parse_angle_only() {
        assert_eq!(parse_list(" <only@angle.com> "), [mbox(None, "only@angle.com")]);
    }

    #[test]
    fn empty_addresses_are_dropped() {
        assert_eq!(parse_list("Joe <>, b@x.com, "), [mbox(None, "b@x.com")]);
    }

    #[test]
    fn unbalanced_quote_means_no_addresses() {
        assert!(parse_list("\"unterminated <a@b.com>").is_empty());
    }

    #[test]
    fn format_joins_with_comma() {
        let formatted = format_list("joe smith <j@x.com>, b@y.com", 0);
        assert_eq!(formatted.header, "\"Joe Smith\" <j@x.com>, b@y.com");
        assert_eq!(formatted.plain, ["j@x.com", "b@y.com"]);
    }

    #[test]
    fn format_limit_truncates_display_and_plain() {
        let formatted = format_list("a@x.com, b@x.com, c@x.com", 1);
        assert_eq!(formatted.header, "a@x.com");
        assert_eq!(formatted.plain, ["a@x.com"]);
    }

    #[test]
    fn format_encodes_non_ascii_name() {
        let formatted = format_list("Jõgeva <j@x.ee>", 0);
        assert_eq!(
            formatted.header,
            format!("\"{}\" <j@x.ee>", crate::encoding::encoded_word("Jõgeva"))
        );
        assert_eq!(formatted.plain, ["j@x.ee"]);
    }

    #[test]
    fn format_encodes_non_ascii_address() {
        let formatted = format_list("info@jõgeva.ee", 0);
        assert_eq!(
            formatted.header,
            crate::encoding::encoded_word("info@jõgeva.ee")
        );
        // the envelope keeps the raw form
        assert_eq!(formatted.plain, ["info@jõgeva.ee"]);
    }

    #[test]
    fn format_reparse_keeps_the_plain_set() {
        let formatted = format_list("Joe <j@x.com>, \"Last, First\" <l@y.com>, bare@z.com", 0);
        let reparsed = format_list(&formatted.header, 0);
        assert_eq!(reparsed.plain, formatted.plain);
    }

    #[test]
    fn envelope_recipients_order() {
        let envelope = Envelope {
            from: Some("s@x.com".into()),
            to: vec!["a@x.com".into()],
            cc: vec!["b@x.com".into()],
            bcc: vec!["c@x.com".into()],
        };
        let all: Vec<&str> = envelope.recipients().collect();
        assert_eq!(all, ["a@x.com", "b@x.com", "c@x.com"]);
        assert!(envelope.has_recipients());
    }
}
