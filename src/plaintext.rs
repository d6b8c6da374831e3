//! Best-effort conversion of an HTML body into readable plain text.
//!
//! Used as the fallback plain part of multipart messages when the caller
//! only supplied HTML. This is not a renderer: unknown and unmatched tags
//! are stripped and the remaining text normalized.

// Survives whitespace normalization, restored to the real indent at the end.
const INDENT: &str = "\u{1}\u{1}";

/// Convert `html` to plain text.
///
/// Block-closing tags become line breaks, headings gain a `-` underline,
/// list items a `* ` bullet and `<pre>` content a two-space indent with its
/// line breaks preserved. The result carries single spaces, no whitespace
/// around line breaks and at most one blank line in a row. Malformed
/// markup never fails; it just loses its transform and gets stripped.
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 2);
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        push_text(&mut out, &rest[..lt]);
        rest = &rest[lt..];
        let Some(gt) = rest.find('>') else {
            // unterminated tag, drop the tail
            rest = "";
            break;
        };
        let after = &rest[gt + 1..];
        let name = tag_name(&rest[1..gt]);
        rest = after;

        match name.as_str() {
            "br" | "/p" | "/tr" | "/table" | "/div" => out.push('\n'),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let close = format!("</{name}");
                if let Some((inner, tail)) = split_at_tag(after, &[&close]) {
                    push_heading(&mut out, inner);
                    rest = tail;
                }
            }
            "li" => {
                if let Some((inner, tail)) =
                    split_at_tag(after, &["<li", "</li", "<ol", "</ol", "<ul", "</ul"])
                {
                    push_bullet(&mut out, inner);
                    rest = tail;
                }
            }
            "pre" => {
                if let Some((inner, tail)) = split_at_tag(after, &["</pre"]) {
                    push_preformatted(&mut out, inner);
                    rest = tail;
                }
            }
            _ => out.push(' '),
        }
    }
    push_text(&mut out, rest);

    normalize(&out)
}

/// Split `hay` at the earliest of `markers` (case-insensitive), returning
/// the text before it and the text after the marker's closing `>`.
fn split_at_tag<'a>(hay: &'a str, markers: &[&str]) -> Option<(&'a str, &'a str)> {
    let lower = hay.to_ascii_lowercase();
    let mut earliest = None;
    for marker in markers {
        if let Some(i) = lower.find(marker) {
            earliest = Some(earliest.map_or(i, |e: usize| e.min(i)));
        }
    }
    let i = earliest?;
    let tail = match hay[i..].find('>') {
        Some(j) => &hay[i + j + 1..],
        None => "",
    };
    Some((&hay[..i], tail))
}

fn tag_name(tag: &str) -> String {
    let tag = tag.trim_start();
    let end = tag
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_alphanumeric() || (i == 0 && c == '/')))
        .map_or(tag.len(), |(i, _)| i);
    tag[..end].to_ascii_lowercase()
}

fn push_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '\r' => {}
            '\n' | '\t' => out.push(' '),
            // stray brackets are stripped like tags
            '>' | '<' => out.push(' '),
            c => out.push(c),
        }
    }
}

fn ensure_line_start(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn push_heading(out: &mut String, inner: &str) {
    let text = flatten(inner);
    if text.is_empty() {
        return;
    }
    ensure_line_start(out);
    out.push_str(&text);
    out.push('\n');
    out.extend(std::iter::repeat('-').take(text.chars().count()));
    out.push_str("\n\n");
}

fn push_bullet(out: &mut String, inner: &str) {
    let text = flatten(inner);
    if text.is_empty() {
        return;
    }
    ensure_line_start(out);
    out.push_str("* ");
    out.push_str(&text);
    out.push('\n');
}

fn push_preformatted(out: &mut String, inner: &str) {
    let text = strip_tags(inner);
    if text.trim().is_empty() {
        return;
    }
    ensure_line_start(out);
    out.push('\n');
    for line in text.lines() {
        out.push_str(INDENT);
        out.push_str(line.trim());
        out.push('\n');
    }
    out.push('\n');
}

/// Tags out, whitespace collapsed, trimmed. Used for inline content of
/// headings and list items.
fn flatten(html: &str) -> String {
    let stripped = strip_tags(html);
    let parts: Vec<&str> = stripped.split_whitespace().collect();
    parts.join(" ")
}

/// Replace tags and stray brackets with spaces, keeping line structure.
fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(lt) = rest.find('<') {
        text.push_str(&rest[..lt]);
        text.push(' ');
        match rest[lt..].find('>') {
            Some(j) => rest = &rest[lt + j + 1..],
            None => {
                rest = "";
                break;
            }
        }
    }
    text.push_str(rest);
    text.replace(['<', '>'], " ")
}

/// Single spaces, no whitespace around line breaks, at most one blank line
/// in a row, fully trimmed.
fn normalize(s: &str) -> String {
    let mut collapsed = String::with_capacity(s.len());
    let mut prev_space = false;
    for c in s.chars() {
        if c == ' ' {
            if !prev_space {
                collapsed.push(' ');
            }
            prev_space = true;
        } else {
            collapsed.push(c);
            prev_space = false;
        }
    }

    let mut out = String::with_capacity(collapsed.len());
    let mut pending_blank = false;
    let mut started = false;
    for line in collapsed.split('\n') {
        let line = line.trim_matches([' ', '\t']);
        if line.is_empty() {
            pending_blank = true;
            continue;
        }
        if started {
            out.push('\n');
            if pending_blank {
                out.push('\n');
            }
        }
        pending_blank = false;
        started = true;
        out.push_str(line);
    }

    out.replace('\u{1}', " ")
}
