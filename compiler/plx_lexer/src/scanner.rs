//! The driving scanner.
//!
//! [`Scanner`] walks the source one production at a time, choosing the
//! logos token enum for the current lexical state, and hands quote-related
//! productions to the [`QuoteEngine`]. [`ScanHost`] is the engine's view of
//! the scanner: it owns the state stack and the pending pushback, tracks
//! line counts, and forwards markup to the [`MarkupSink`].
//!
//! # Pushback
//!
//! Every step records the byte offset where its capture starts. When a
//! handler asks for `n` bytes back, the next step begins `n` bytes before
//! the end of the capture, under whatever state is current by then.

use plx_lexer_core::{LexState, QuoteEngine, QuoteHost, SpanStyle};
use smallvec::SmallVec;
use tracing::debug;

use crate::keywords::{expects_operand, is_keyword, is_regex_lede};
use crate::links::{find_link, Link, LinkKind};
use crate::raw_token::{next_token, NormalToken, QuoteToken};
use crate::sink::MarkupSink;
use crate::ScanSummary;

/// What the previous significant token in ordinary code was, for telling
/// division from a regex.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
enum Prev {
    /// An operand: `/` after it divides.
    Value,
    /// An operator or the start of input: `/` after it starts a regex.
    #[default]
    Operator,
    /// `->`: the next word is a method name, never a quote operator.
    Arrow,
}

/// [`QuoteHost`] implementation over a [`MarkupSink`].
pub(crate) struct ScanHost<'a, S: MarkupSink + ?Sized> {
    sink: &'a mut S,
    stack: SmallVec<[LexState; 8]>,
    /// Source offset of the current capture.
    match_start: usize,
    pushback: usize,
    open_span: Option<SpanStyle>,
    line_has_code: bool,
    lines: u32,
    lines_of_code: u32,
    skipped_symbols: u32,
    /// A quote just ended; trailing letters may be modifiers.
    modifiers_pending: bool,
}

impl<'a, S: MarkupSink + ?Sized> ScanHost<'a, S> {
    fn new(sink: &'a mut S) -> Self {
        ScanHost {
            sink,
            stack: SmallVec::new(),
            match_start: 0,
            pushback: 0,
            open_span: None,
            line_has_code: false,
            lines: 0,
            lines_of_code: 0,
            skipped_symbols: 0,
            modifiers_pending: false,
        }
    }

    fn begin_capture(&mut self, start: usize) {
        self.match_start = start;
        self.pushback = 0;
    }

    fn emit_link(&mut self, kind: LinkKind, text: &str) {
        match kind {
            LinkKind::Url => self.sink.url(text),
            LinkKind::Email => self.sink.email(text),
        }
    }

    fn end_line(&mut self) {
        self.lines += 1;
        if self.line_has_code {
            self.lines_of_code += 1;
        }
        self.line_has_code = false;
    }
}

impl<S: MarkupSink + ?Sized> QuoteHost for ScanHost<'_, S> {
    fn emit_text(&mut self, text: &str) {
        self.sink.text(text);
    }

    fn emit_symbol(&mut self, text: &str, offset: usize, ignore_keywords: bool) {
        if !ignore_keywords && is_keyword(text) {
            self.sink.keyword(text);
        } else {
            self.sink.symbol(text, self.match_start + offset);
        }
    }

    fn skip_symbol(&mut self) {
        self.skipped_symbols += 1;
    }

    fn emit_keyword(&mut self, text: &str) {
        self.sink.keyword(text);
    }

    fn open_span(&mut self, style: SpanStyle) {
        if self.open_span.is_some() {
            self.sink.close_span();
        }
        self.sink.open_span(style);
        self.open_span = Some(style);
    }

    fn close_span(&mut self) {
        if self.open_span.take().is_some() {
            self.sink.close_span();
        }
    }

    fn push_state(&mut self, state: LexState) {
        self.stack.push(state);
    }

    fn begin_state(&mut self, state: LexState) {
        match self.stack.last_mut() {
            Some(top) => *top = state,
            None => self.stack.push(state),
        }
    }

    fn pop_state(&mut self) {
        if self.stack.pop().is_none() {
            debug!(offset = self.match_start, "state pop with empty stack");
        }
    }

    fn current_state(&self) -> LexState {
        self.stack.last().copied().unwrap_or_default()
    }

    fn pushback(&mut self, n: usize) {
        self.pushback = n;
    }

    fn start_new_line(&mut self) {
        self.end_line();
        self.sink.new_line();
    }

    fn count_line_of_code(&mut self) {
        self.line_has_code = true;
    }

    fn abort_quote(&mut self) {
        self.close_span();
        self.pop_state();
        self.modifiers_pending = true;
    }
}

/// One pass over one source text.
pub(crate) struct Scanner<'a, S: MarkupSink + ?Sized> {
    src: &'a str,
    pos: usize,
    engine: &'a mut QuoteEngine,
    host: ScanHost<'a, S>,
    prev: Prev,
    /// Inside `__END__`/`__DATA__`: POD for the rest of the file.
    data_section: bool,
    /// Offset of the last heredoc terminator line, so an empty terminator
    /// line ends one heredoc, not every queued heredoc with an empty
    /// terminator.
    terminator_at: Option<usize>,
}

impl<'a, S: MarkupSink + ?Sized> Scanner<'a, S> {
    pub(crate) fn new(src: &'a str, engine: &'a mut QuoteEngine, sink: &'a mut S) -> Self {
        Scanner {
            src,
            pos: 0,
            engine,
            host: ScanHost::new(sink),
            prev: Prev::default(),
            data_section: false,
            terminator_at: None,
        }
    }

    pub(crate) fn run(mut self) -> ScanSummary {
        while self.pos < self.src.len() {
            let at_line_start = self.pos == 0 || self.src.as_bytes()[self.pos - 1] == b'\n';
            match self.host.current_state() {
                LexState::Normal => self.step_normal(at_line_start),
                LexState::Comment => self.step_comment(),
                LexState::Pod => self.step_pod(),
                state if state.is_heredoc() => self.step_heredoc(state, at_line_start),
                state => self.step_quoted(state),
            }
        }
        self.finish()
    }

    fn finish(mut self) -> ScanSummary {
        if self.engine.is_quote_active() {
            debug!(
                operator = self.engine.operator_name().unwrap_or_default(),
                "unterminated quote at end of input"
            );
        }
        if let Some(spec) = self.engine.pending_heredoc() {
            debug!(
                terminator = spec.terminator(),
                pending = self.engine.pending_heredoc_count(),
                "unterminated heredoc at end of input"
            );
        }
        self.host.close_span();
        if !self.src.is_empty() && !self.src.ends_with('\n') {
            self.host.end_line();
        }
        ScanSummary {
            lines: self.host.lines,
            lines_of_code: self.host.lines_of_code,
            skipped_symbols: self.host.skipped_symbols,
            final_state: self.host.current_state(),
        }
    }

    /// Move past the current capture, less any pushback.
    fn advance(&mut self, len: usize) {
        let pushback = std::mem::take(&mut self.host.pushback).min(len);
        let mut step = len - pushback;
        if step == 0 {
            // A handler returned its whole capture without changing how it
            // will be lexed; take one character to guarantee progress.
            step = self.src[self.pos..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            debug!(offset = self.pos, "full pushback; forcing progress");
        }
        self.pos += step;
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    // Ordinary code

    fn step_normal(&mut self, at_line_start: bool) {
        let rest = self.rest();
        self.host.begin_capture(self.pos);

        if at_line_start && self.enter_pod(rest) {
            return;
        }

        if std::mem::take(&mut self.host.modifiers_pending) && self.engine.are_modifiers_ok() {
            let len = rest.bytes().take_while(u8::is_ascii_alphabetic).count();
            if len > 0 {
                self.host.emit_text(&rest[..len]);
                self.prev = Prev::Value;
                self.pos += len;
                return;
            }
        }

        let (token, mut len) = next_token::<NormalToken>(rest);
        let capture = &rest[..len];
        if !matches!(
            token,
            Some(NormalToken::Whitespace | NormalToken::Newline | NormalToken::Hash)
        ) {
            self.engine.check_line_of_code(&mut self.host);
        }

        match token {
            Some(NormalToken::Whitespace) | None => self.host.emit_text(capture),
            Some(NormalToken::Newline) => {
                self.host.start_new_line();
                self.engine.maybe_start_here(&mut self.host);
            }
            Some(NormalToken::Hash) => {
                self.host.push_state(LexState::Comment);
                self.host.open_span(SpanStyle::Comment);
                self.host.emit_text(capture);
            }
            Some(NormalToken::Ident) => len = self.word(rest, len),
            Some(NormalToken::Number) => {
                self.host.open_span(SpanStyle::Number);
                self.host.emit_text(capture);
                self.host.close_span();
                self.prev = Prev::Value;
            }
            Some(NormalToken::QuoteOp) => self.quote_op(capture),
            Some(NormalToken::DoubleQuote) => {
                self.engine.qop(&mut self.host, capture, 0, false);
            }
            Some(NormalToken::SingleQuote) => {
                self.engine.qop(&mut self.host, capture, 0, true);
            }
            Some(NormalToken::SigilId) => {
                self.engine.sigil_id(&mut self.host, capture);
                self.prev = Prev::Value;
            }
            Some(NormalToken::BracedSigilId) => {
                self.engine.braced_sigil_id(&mut self.host, capture);
                self.prev = Prev::Value;
            }
            Some(NormalToken::SpecialId) => {
                self.engine.special_id(&mut self.host, capture);
                self.prev = Prev::Value;
            }
            Some(NormalToken::Heredoc) => {
                self.engine.hop(&mut self.host, capture);
                self.prev = Prev::Value;
            }
            Some(NormalToken::Slash) => {
                if self.prev == Prev::Value {
                    self.host.emit_text(capture);
                    self.prev = Prev::Operator;
                } else {
                    self.engine.hqop_punc(&mut self.host, "/");
                    self.host.pushback(capture.len() - 1);
                }
            }
            Some(NormalToken::Arrow) => {
                self.host.emit_text(capture);
                self.prev = Prev::Arrow;
            }
            Some(NormalToken::Close) => {
                self.host.emit_text(capture);
                self.prev = Prev::Value;
            }
            Some(NormalToken::Punct) => {
                let regex = if REGEX_PUNCT.contains(capture) {
                    slash_after(rest, len)
                } else {
                    None
                };
                match regex {
                    Some(total) => {
                        self.engine.hqop_punc(&mut self.host, &rest[..total]);
                        len = total;
                    }
                    None => {
                        self.host.emit_text(capture);
                        self.prev = Prev::Operator;
                    }
                }
            }
            Some(NormalToken::Bind) => {
                self.host.emit_text(capture);
                self.prev = Prev::Operator;
            }
        }
        self.advance(len);
    }

    /// An identifier. A quote operator name followed by whitespace and a
    /// delimiter opens a quote (`tr /a/b/`); a regex lede word followed by
    /// `/` opens a heuristic regex (`split /,/`). Returns the bytes used.
    fn word(&mut self, rest: &'a str, len: usize) -> usize {
        let word = &rest[..len];
        let after_arrow = self.prev == Prev::Arrow;
        let quote_name = QUOTE_OPERATORS.contains(&word);
        if !after_arrow {
            if quote_name {
                if let Some(total) = spaced_delimiter(rest, len) {
                    self.quote_op(&rest[..total]);
                    return total;
                }
            } else if is_regex_lede(word) {
                if let Some(total) = slash_after(rest, len) {
                    self.engine.hqop_symbol(&mut self.host, &rest[..total]);
                    return total;
                }
            }
        }

        // A quote name that opened nothing is a bareword, as in `(s => 1)`.
        self.host.emit_symbol(word, 0, after_arrow || quote_name);
        self.prev = if !after_arrow && expects_operand(word) {
            Prev::Operator
        } else {
            Prev::Value
        };
        len
    }

    /// A quote-like operator production, unless context makes its name a
    /// plain word: a method after `->`, a fat-comma key, or a `-s` file
    /// test.
    fn quote_op(&mut self, capture: &str) {
        let name_len = capture.bytes().take_while(u8::is_ascii_lowercase).count();
        let name = &capture[..name_len];
        let delim = capture[name_len..].trim_start().chars().next();
        let after = &self.src[self.pos + capture.len()..];

        let fat_comma = delim == Some('=') && after.starts_with('>');
        let file_test = name == "s" && self.src[..self.pos].ends_with('-');
        if self.prev == Prev::Arrow || fat_comma || file_test {
            self.host.emit_symbol(name, 0, true);
            self.host.pushback(capture.len() - name_len);
            self.prev = Prev::Value;
            return;
        }

        let no_interp = matches!(name, "q" | "qw" | "tr" | "y") || delim == Some('\'');
        self.engine.qop(&mut self.host, capture, name_len, no_interp);
    }

    // Quotes and heredoc bodies

    fn step_quoted(&mut self, state: LexState) {
        let interpolates = state.interpolates();
        let rest = self.rest();
        self.host.begin_capture(self.pos);
        let (token, mut len) = next_token::<QuoteToken>(rest);

        if token == Some(QuoteToken::Newline) {
            self.host.start_new_line();
            self.advance(len);
            return;
        }
        if state.is_linkable() && token == Some(QuoteToken::Text) {
            if let Some(link) = self.link_ahead(rest, len) {
                if link.start == 0 {
                    self.engine.check_line_of_code(&mut self.host);
                    self.host.emit_link(link.kind, &rest[..link.len]);
                    self.advance(link.len);
                    return;
                }
                len = link.start;
            }
        }
        let capture = &rest[..len];
        if !capture.trim().is_empty() {
            self.engine.check_line_of_code(&mut self.host);
        }
        match token {
            Some(QuoteToken::SigilId) if interpolates => {
                self.engine.sigil_id(&mut self.host, capture);
            }
            Some(QuoteToken::BracedSigilId) if interpolates => {
                self.engine.braced_sigil_id(&mut self.host, capture);
            }
            Some(QuoteToken::SpecialId) if interpolates => {
                self.engine.special_id(&mut self.host, capture);
            }
            _ => self.take_quoted_text(capture),
        }
        if !self.host.current_state().is_quote() && !self.host.current_state().is_heredoc() {
            self.prev = Prev::Value;
        }
        self.advance(len);
    }

    /// The first link starting within the next `within` bytes, cut short at
    /// the end of the line and at the quote's next delimiter.
    fn link_ahead(&mut self, rest: &str, within: usize) -> Option<Link> {
        let line = &rest[..rest.find('\n').unwrap_or(rest.len())];
        let limit = self
            .engine
            .collateral_capture_pattern()
            .and_then(|pattern| pattern.find(line))
            .unwrap_or(line.len());
        find_link(&line[..limit], within)
    }

    /// Write literal quote text up to the next collateral delimiter. A
    /// delimiter at the very start goes to the engine; anything after the
    /// written part is pushed back.
    fn take_quoted_text(&mut self, capture: &str) {
        let found = self
            .engine
            .collateral_capture_pattern()
            .and_then(|pattern| pattern.find(capture));
        match found {
            None => self.host.emit_text(capture),
            Some(0) => {
                let delim_len = capture.chars().next().map_or(0, char::len_utf8);
                let delim = &capture[..delim_len];
                self.host.emit_text(delim);
                if self.engine.maybe_end_quote(delim) {
                    self.host.close_span();
                    self.host.pop_state();
                    self.host.modifiers_pending = true;
                }
                self.host.pushback(capture.len() - delim_len);
            }
            Some(at) => {
                self.host.emit_text(&capture[..at]);
                self.host.pushback(capture.len() - at);
            }
        }
    }

    fn step_heredoc(&mut self, state: LexState, at_line_start: bool) {
        if at_line_start && self.terminator_at != Some(self.pos) {
            let rest = self.rest();
            let line = rest.split('\n').next().unwrap_or_default();
            let line = line.strip_suffix('\r').unwrap_or(line);
            let is_terminator = self.engine.pending_heredoc().is_some_and(|spec| {
                let candidate = if spec.is_indented() {
                    line.trim_start()
                } else {
                    line
                };
                candidate == spec.terminator()
            });
            if is_terminator {
                self.host.begin_capture(self.pos);
                self.engine.check_line_of_code(&mut self.host);
                self.engine.maybe_end_here(&mut self.host, line);
                self.terminator_at = Some(self.pos);
                self.pos += line.len();
                return;
            }
        }
        self.step_quoted(state);
    }

    // Comments and documentation

    fn step_comment(&mut self) {
        let rest = self.rest();
        let len = rest.find('\n').unwrap_or(rest.len());
        self.host.emit_text(&rest[..len]);
        self.host.close_span();
        self.host.pop_state();
        self.pos += len;
    }

    /// At column 0 in ordinary code: start POD on `=word`, or the data
    /// section on `__END__`/`__DATA__`.
    fn enter_pod(&mut self, rest: &str) -> bool {
        let bytes = rest.as_bytes();
        if bytes.first() == Some(&b'=') && bytes.get(1).is_some_and(u8::is_ascii_alphabetic) {
            self.host.push_state(LexState::Pod);
            self.host.open_span(SpanStyle::Pod);
            return true;
        }
        for marker in ["__END__", "__DATA__"] {
            if rest.strip_prefix(marker).is_some_and(|after| {
                after.is_empty() || after.starts_with('\n') || after.starts_with("\r\n")
            }) {
                self.engine.check_line_of_code(&mut self.host);
                self.host.emit_keyword(marker);
                self.host.push_state(LexState::Pod);
                self.host.open_span(SpanStyle::Pod);
                self.data_section = true;
                self.pos += marker.len();
                return true;
            }
        }
        false
    }

    fn step_pod(&mut self) {
        let rest = self.rest();
        if rest.starts_with('\n') {
            self.host.start_new_line();
            self.pos += 1;
            return;
        }
        let len = rest.find('\n').unwrap_or(rest.len());
        let line = &rest[..len];
        self.host.emit_text(line);
        self.pos += len;
        if !self.data_section && is_cut(line) {
            self.host.close_span();
            self.host.pop_state();
        }
    }
}

/// `=cut` as a whole directive word.
fn is_cut(line: &str) -> bool {
    line.strip_prefix("=cut")
        .is_some_and(|after| !after.starts_with(|c: char| c.is_ascii_alphanumeric()))
}

const QUOTE_OPERATORS: [&str; 8] = ["q", "qq", "qw", "qr", "m", "s", "tr", "y"];

/// Punctuation after which a `/` opens a regex.
const REGEX_PUNCT: &str = "(,=!{;&|?:";

/// Length through a `/` that follows `rest[..len]` after optional
/// horizontal whitespace.
fn slash_after(rest: &str, len: usize) -> Option<usize> {
    let after = &rest[len..];
    let spaced = after.trim_start_matches([' ', '\t', '\x0c']);
    spaced
        .starts_with('/')
        .then(|| len + (after.len() - spaced.len()) + 1)
}

/// Length through the delimiter of a quote operator written with whitespace
/// before its delimiter. After whitespace, `#` starts a comment, `=`, `,`
/// and `;` make the name a bareword, and a sigil starts a variable.
fn spaced_delimiter(rest: &str, name_len: usize) -> Option<usize> {
    let after = &rest[name_len..];
    let spaced = after.trim_start_matches([' ', '\t']);
    let space = after.len() - spaced.len();
    let delim = spaced.chars().next()?;
    let refused =
        delim.is_ascii_alphanumeric() || delim.is_whitespace() || "_)]}#=,;$@%".contains(delim);
    (space > 0 && !refused).then(|| name_len + space + delim.len_utf8())
}
