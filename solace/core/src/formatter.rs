//! Message Formatter
//!
//! Pure transform from raw message text to markup that is safe to insert
//! into a document. Reply text originates from a remote service and user
//! text is arbitrary, so everything is HTML-escaped first; the only markup
//! the output ever contains is produced by the three substitutions below:
//!
//! - URL-shaped substrings become hyperlinks that open in a new browsing
//!   context without referrer/opener leakage
//! - phone-number-shaped substrings become `tel:` dial links
//! - newlines become `<br>`
//!
//! The transform is additive-wrapping only. It never interprets markup
//! already present in the input.

use once_cell::sync::Lazy;
use regex::Regex;

/// URL-shaped substrings: `http`/`https` scheme followed by non-whitespace.
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("valid URL regex"));

/// Phone-shaped substrings: optional `+` and country code, then 1-3 groups
/// of 3-4 digits separated by space, hyphen, or dot.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[-.\s]?)?\d{3,4}(?:[-.\s]?\d{3,4}){0,2}").expect("valid phone regex")
});

/// Transform raw message text into safe renderable markup.
///
/// Deterministic and side-effect free. URL spans are carved out first so the
/// phone pass never rewrites digits inside an emitted `href`.
#[must_use]
pub fn format(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;
    for m in URL_RE.find_iter(text) {
        render_plain(&mut out, &text[last..m.start()]);
        render_url(&mut out, m.as_str());
        last = m.end();
    }
    render_plain(&mut out, &text[last..]);
    out
}

/// Wrap a URL in a new-tab anchor with no opener/referrer leakage.
fn render_url(out: &mut String, url: &str) {
    let escaped = escape(url);
    out.push_str("<a href=\"");
    out.push_str(&escaped);
    out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
    out.push_str(&escaped);
    out.push_str("</a>");
}

/// Render a non-URL segment: escape it, wrap phone numbers, convert newlines.
fn render_plain(out: &mut String, segment: &str) {
    let mut last = 0;
    for m in PHONE_RE.find_iter(segment) {
        push_text(out, &segment[last..m.start()]);
        let escaped = escape(m.as_str());
        out.push_str("<a href=\"tel:");
        out.push_str(&escaped);
        out.push_str("\">");
        out.push_str(&escaped);
        out.push_str("</a>");
        last = m.end();
    }
    push_text(out, &segment[last..]);
}

/// Escape text and convert literal newlines to `<br>`.
fn push_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("<br>"),
            _ => out.push(ch),
        }
    }
}

/// Escape text without newline conversion (for anchor bodies and hrefs).
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
