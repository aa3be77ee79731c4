//! URLs and e-mail addresses inside link-eligible strings.
//!
//! Only the two plain quote states ([`LexState::is_linkable`]) are searched:
//! a quote whose text starts path-like or with `@` is more likely a path or
//! an array than prose.
//!
//! [`LexState::is_linkable`]: plx_lexer_core::LexState::is_linkable

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum LinkKind {
    Url,
    Email,
}

/// A link found in quoted text, as a byte range of the searched text.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Link {
    pub start: usize,
    pub len: usize,
    pub kind: LinkKind,
}

const SCHEMES: [&str; 3] = ["http://", "https://", "ftp://"];

/// The first link in `text` that starts before `within`.
///
/// An e-mail address counts when its `@` is at or before `within`, so a
/// text run that stops at the `@` still finds the address it ends with.
pub(crate) fn find_link(text: &str, within: usize) -> Option<Link> {
    let url = find_url(text, within);
    let email = find_email(text, within);
    match (url, email) {
        (Some(url), Some(email)) => Some(if email.start < url.start { email } else { url }),
        (url, email) => url.or(email),
    }
}

fn find_url(text: &str, within: usize) -> Option<Link> {
    let bytes = text.as_bytes();
    SCHEMES
        .iter()
        .filter_map(|scheme| {
            let mut from = 0;
            while let Some(found) = text[from..].find(scheme) {
                let start = from + found;
                if start >= within {
                    return None;
                }
                let boundary = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
                let len = scheme.len() + url_body_len(&text[start + scheme.len()..]);
                if boundary && len > scheme.len() {
                    return Some(Link {
                        start,
                        len,
                        kind: LinkKind::Url,
                    });
                }
                from = start + scheme.len();
            }
            None
        })
        .min_by_key(|link| link.start)
}

/// Length of the address after the scheme, less trailing punctuation.
fn url_body_len(text: &str) -> usize {
    let body = text
        .bytes()
        .take_while(|&b| b.is_ascii_alphanumeric() || b"-._~:/?#[]!&()*+,;=%".contains(&b))
        .count();
    text[..body].trim_end_matches(['.', ',', ';', ':', '!', '?', ')']).len()
}

fn find_email(text: &str, within: usize) -> Option<Link> {
    let bytes = text.as_bytes();
    let end = within.saturating_add(1).min(text.len());
    bytes[..end]
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == b'@')
        .find_map(|(at, _)| {
            let local = bytes[..at]
                .iter()
                .rev()
                .take_while(|&&b| b.is_ascii_alphanumeric() || b"._%+-".contains(&b))
                .count();
            let domain = domain_len(&text[at + 1..]);
            (local > 0 && domain > 0).then(|| Link {
                start: at - local,
                len: local + 1 + domain,
                kind: LinkKind::Email,
            })
        })
}

/// Length of a dotted host name of at least two labels, or 0.
fn domain_len(text: &str) -> usize {
    let mut len = 0;
    let mut labels = 0;
    for label in text.split('.') {
        let label_len = label
            .bytes()
            .take_while(|&b| b.is_ascii_alphanumeric() || b == b'-')
            .count();
        if label_len == 0 {
            break;
        }
        len += if labels == 0 { label_len } else { 1 + label_len };
        labels += 1;
        if label_len < label.len() {
            break;
        }
    }
    if labels >= 2 {
        len
    } else {
        0
    }
}
