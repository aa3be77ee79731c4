//! Output sinks for cross-reference markup.
//!
//! The scanner translates engine output into [`MarkupSink`] calls. Two
//! sinks ship with the crate: [`EventLog`] records a flat event list (the
//! form `plx events` prints and most tests assert against), and
//! [`HtmlWriter`] renders highlighted, symbol-linked HTML.

use plx_lexer_core::SpanStyle;
use serde::Serialize;

/// Receiver of cross-reference markup, in source order.
pub trait MarkupSink {
    fn text(&mut self, text: &str);

    /// A symbol reference beginning at byte `start` of the source.
    fn symbol(&mut self, name: &str, start: usize);

    fn keyword(&mut self, text: &str);

    /// A web or FTP address inside a link-eligible string.
    fn url(&mut self, url: &str);

    /// An e-mail address inside a link-eligible string.
    fn email(&mut self, address: &str);

    fn open_span(&mut self, style: SpanStyle);

    fn close_span(&mut self);

    /// A line break in the source.
    fn new_line(&mut self);
}

/// One recorded markup call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum XrefEvent {
    Text { text: String },
    Symbol { name: String, start: usize },
    Keyword { text: String },
    Url { text: String },
    Email { text: String },
    OpenSpan { class: &'static str },
    CloseSpan,
    NewLine,
}

impl XrefEvent {
    pub fn text(text: impl Into<String>) -> Self {
        XrefEvent::Text { text: text.into() }
    }

    pub fn symbol(name: impl Into<String>, start: usize) -> Self {
        XrefEvent::Symbol {
            name: name.into(),
            start,
        }
    }

    pub fn keyword(text: impl Into<String>) -> Self {
        XrefEvent::Keyword { text: text.into() }
    }

    pub fn url(text: impl Into<String>) -> Self {
        XrefEvent::Url { text: text.into() }
    }

    pub fn email(text: impl Into<String>) -> Self {
        XrefEvent::Email { text: text.into() }
    }

    pub fn open_span(style: SpanStyle) -> Self {
        XrefEvent::OpenSpan {
            class: style.css_class(),
        }
    }
}

/// Sink that records every call as an [`XrefEvent`].
///
/// Empty text is dropped and adjacent text is coalesced, so the log does
/// not depend on how the scanner happened to slice a run of literal text.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<XrefEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[XrefEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<XrefEvent> {
        self.events
    }

    /// All text, symbols, keywords and links concatenated, with line breaks.
    ///
    /// For any scan this reproduces the source up to `\r` placement.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for event in &self.events {
            match event {
                XrefEvent::Text { text }
                | XrefEvent::Keyword { text }
                | XrefEvent::Url { text }
                | XrefEvent::Email { text } => out.push_str(text),
                XrefEvent::Symbol { name, .. } => out.push_str(name),
                XrefEvent::NewLine => out.push('\n'),
                XrefEvent::OpenSpan { .. } | XrefEvent::CloseSpan => {}
            }
        }
        out
    }
}

impl MarkupSink for EventLog {
    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(XrefEvent::Text { text: last }) = self.events.last_mut() {
            last.push_str(text);
        } else {
            self.events.push(XrefEvent::text(text));
        }
    }

    fn symbol(&mut self, name: &str, start: usize) {
        self.events.push(XrefEvent::symbol(name, start));
    }

    fn keyword(&mut self, text: &str) {
        self.events.push(XrefEvent::keyword(text));
    }

    fn url(&mut self, url: &str) {
        self.events.push(XrefEvent::Url {
            text: url.to_string(),
        });
    }

    fn email(&mut self, address: &str) {
        self.events.push(XrefEvent::Email {
            text: address.to_string(),
        });
    }

    fn open_span(&mut self, style: SpanStyle) {
        self.events.push(XrefEvent::open_span(style));
    }

    fn close_span(&mut self) {
        self.events.push(XrefEvent::CloseSpan);
    }

    fn new_line(&mut self) {
        self.events.push(XrefEvent::NewLine);
    }
}

/// Sink that renders HTML.
///
/// Symbols become `<a href="#name">` links, keywords are bold, and spans
/// become `<span class="..">` using [`SpanStyle::css_class`]. URLs link to
/// themselves and e-mail addresses to `mailto:`.
#[derive(Clone, Debug, Default)]
pub struct HtmlWriter {
    out: String,
}

impl HtmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn anchor(&mut self, href_prefix: &str, href: &str, text: &str) {
        self.out.push_str("<a href=\"");
        self.out.push_str(href_prefix);
        self.escaped(href);
        self.out.push_str("\">");
        self.escaped(text);
        self.out.push_str("</a>");
    }

    fn escaped(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '&' => self.out.push_str("&amp;"),
                '<' => self.out.push_str("&lt;"),
                '>' => self.out.push_str("&gt;"),
                '"' => self.out.push_str("&quot;"),
                other => self.out.push(other),
            }
        }
    }
}

impl MarkupSink for HtmlWriter {
    fn text(&mut self, text: &str) {
        self.escaped(text);
    }

    fn symbol(&mut self, name: &str, _start: usize) {
        self.anchor("#", name, name);
    }

    fn keyword(&mut self, text: &str) {
        self.out.push_str("<b>");
        self.escaped(text);
        self.out.push_str("</b>");
    }

    fn url(&mut self, url: &str) {
        self.anchor("", url, url);
    }

    fn email(&mut self, address: &str) {
        self.anchor("mailto:", address, address);
    }

    fn open_span(&mut self, style: SpanStyle) {
        self.out.push_str("<span class=\"");
        self.out.push_str(style.css_class());
        self.out.push_str("\">");
    }

    fn close_span(&mut self) {
        self.out.push_str("</span>");
    }

    fn new_line(&mut self) {
        self.out.push('\n');
    }
}
