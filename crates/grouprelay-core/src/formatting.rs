//! Telegram-HTML rendering of relay envelopes.

use crate::messaging::types::MediaKind;

/// Telegram's limit on a message text, counted after entity parsing in UTF-16 units.
pub const MAX_TEXT_LEN: usize = 4096;
/// Same limit for media captions.
pub const MAX_CAPTION_LEN: usize = 1024;

fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Cut `body` so that `used` units of header plus the body fit in `limit`. A cut body ends
/// with `…`.
fn fit(body: &str, used: usize, limit: usize) -> String {
    if used + utf16_len(body) <= limit {
        return body.to_string();
    }
    let budget = limit.saturating_sub(used + 1);
    let mut taken = 0;
    let mut out = String::new();
    for c in body.chars() {
        taken += c.len_utf16();
        if taken > budget {
            break;
        }
        out.push(c);
    }
    out.push('…');
    out
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn author_suffix(author: Option<&str>) -> String {
    match author {
        Some(a) => format!(" from {}", escape_html(a)),
        None => String::new(),
    }
}

fn author_plain(author: Option<&str>) -> String {
    author.map(|a| format!(" from {a}")).unwrap_or_default()
}

/// Text relays always carry a header line; the author appears only in attributed mode.
///
/// Over-long bodies are truncated so the whole envelope stays within [`MAX_TEXT_LEN`].
pub fn text_envelope(body: &str, author: Option<&str>) -> String {
    let header = format!("📩 New message{}:\n\n", author_plain(author));
    let body = fit(body, utf16_len(&header), MAX_TEXT_LEN);
    format!(
        "📩 <b>New message{}:</b>\n\n{}",
        author_suffix(author),
        escape_html(&body)
    )
}

/// Caption for a media item re-sent in attributed mode.
pub fn media_caption(kind: MediaKind, caption: Option<&str>, author: Option<&str>) -> String {
    let (emoji, label) = match kind {
        MediaKind::Photo => ("📸", "Photo"),
        MediaKind::Video => ("🎥", "Video"),
        MediaKind::Document => ("📄", "Document"),
    };
    let header = format!("{emoji} {label}{}\n\n", author_plain(author));
    let caption = fit(caption.unwrap_or(""), utf16_len(&header), MAX_CAPTION_LEN);
    format!(
        "{emoji} <b>{label}{}</b>\n\n{}",
        author_suffix(author),
        escape_html(&caption)
    )
}
