//! The quote-like operator and heredoc state machine.
//!
//! # Quote Tracking
//!
//! Opening a quote-like operator (`qop`) records its closing delimiter,
//! the matching opener when the delimiter pair nests, and how many
//! delimiter-bounded sections the operator has. Each candidate character
//! the scanner sees inside the quote goes through `maybe_end_quote`:
//!
//! ```text
//! q[a[b]c]      end=']' nest='['  sections=1
//!   [  → depth 2
//!   ]  → depth 1
//!   ]  → depth 0, sections 0 → ended
//!
//! tr/abc/xyz/   end='/'           sections=2
//!   /  → section boundary, depth reset to 1
//!   /  → sections 0 → ended
//! ```
//!
//! # Heredocs
//!
//! `hop` queues one [`HeredocSpec`] per declaration. Bodies follow the
//! declaring line in declaration order, so the queue drains front-first:
//! `maybe_start_here` enters the oldest body at end of line, and
//! `maybe_end_here` moves to the next queued body (or back out) when a
//! terminator line is seen.

use std::collections::VecDeque;

use tracing::trace;

use crate::collateral::CollateralPattern;
use crate::heredoc::HeredocSpec;
use crate::host::QuoteHost;
use crate::state::{LexState, SpanStyle};

/// Quote and heredoc state for one file being scanned.
///
/// One engine belongs to one scan at a time. Call [`reset`](Self::reset)
/// before reusing an engine for another file.
#[derive(Clone, Debug, Default)]
pub struct QuoteEngine {
    /// Name of the last quote-like operator (`"m"`, `"tr"`, or `""` for a
    /// bare quote). Unlike the delimiters it survives the end of the quote,
    /// because it decides whether trailing modifiers are expected.
    operator_name: Option<String>,
    /// Closing delimiter of the current section; `None` when no quote is open.
    end_delim: Option<char>,
    /// Opening delimiter when the pair nests (`[`, `<`, `(`, `{`).
    nest_delim: Option<char>,
    /// End delimiters still needed before the current section closes.
    remaining_end_count: u32,
    /// Sections left in the operator: 1 for `m//`, 2 for `s///`.
    remaining_sections: u32,
    /// Between the sections of a nesting two-section operator (`s{a}{b}`).
    awaiting_second_section: bool,
    collateral: Option<CollateralPattern>,
    pending_heredocs: VecDeque<HeredocSpec>,
}

impl QuoteEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return to the initial state, keeping allocations.
    pub fn reset(&mut self) {
        self.operator_name = None;
        self.end_delim = None;
        self.nest_delim = None;
        self.remaining_end_count = 0;
        self.remaining_sections = 0;
        self.awaiting_second_section = false;
        self.collateral = None;
        self.pending_heredocs.clear();
    }

    // Accessors

    pub fn operator_name(&self) -> Option<&str> {
        self.operator_name.as_deref()
    }

    pub fn end_delim(&self) -> Option<char> {
        self.end_delim
    }

    pub fn nest_delim(&self) -> Option<char> {
        self.nest_delim
    }

    pub fn remaining_sections(&self) -> u32 {
        self.remaining_sections
    }

    pub fn is_quote_active(&self) -> bool {
        self.end_delim.is_some()
    }

    /// The oldest heredoc whose body has not ended.
    pub fn pending_heredoc(&self) -> Option<&HeredocSpec> {
        self.pending_heredocs.front()
    }

    pub fn pending_heredoc_count(&self) -> usize {
        self.pending_heredocs.len()
    }

    /// Whether modifier letters (`/gi`) may follow the last quote.
    pub fn are_modifiers_ok(&self) -> bool {
        matches!(
            self.operator_name.as_deref(),
            Some("m" | "qr" | "s" | "tr" | "y")
        )
    }

    // Quote-like operators

    /// Start a quote-like operator from a capture such as `qq{`, ` tr/`, or
    /// a bare `"`, and write it to `host`.
    ///
    /// `name_len` is the byte length of the operator name within the
    /// capture (0 for bare quotes). When it is positive, leading non-word
    /// characters are a boundary fragment and are written as plain text.
    pub fn qop<H: QuoteHost + ?Sized>(
        &mut self,
        host: &mut H,
        capture: &str,
        name_len: usize,
        no_interp: bool,
    ) {
        self.start_quote(host, capture, name_len, no_interp, true);
    }

    /// Start a heuristic `/regex/` whose capture is punctuation, optional
    /// whitespace, then `/`. The punctuation is written as text.
    pub fn hqop_punc<H: QuoteHost + ?Sized>(&mut self, host: &mut H, capture: &str) {
        let (lede, intervening) = split_regex_lede(capture);
        self.start_quote(host, "m/", 1, false, false);
        host.emit_text(lede);
        take_whitespace(host, intervening);
        host.open_span(SpanStyle::String);
        host.emit_text("/");
    }

    /// Start a heuristic `/regex/` whose capture is a word such as `split`,
    /// optional whitespace, then `/`. The word is offered as a symbol.
    pub fn hqop_symbol<H: QuoteHost + ?Sized>(&mut self, host: &mut H, capture: &str) {
        let (lede, intervening) = split_regex_lede(capture);
        self.start_quote(host, "m/", 1, false, false);
        host.emit_symbol(lede, 0, false);
        take_whitespace(host, intervening);
        host.open_span(SpanStyle::String);
        host.emit_text("/");
    }

    fn start_quote<H: QuoteHost + ?Sized>(
        &mut self,
        host: &mut H,
        capture: &str,
        name_len: usize,
        no_interp: bool,
        write: bool,
    ) {
        let (boundary, post_boundary) = if name_len > 0 {
            let post = capture.trim_start_matches(|c: char| !is_word_char(c));
            (&capture[..capture.len() - post.len()], post)
        } else {
            ("", capture)
        };
        let name = &post_boundary[..name_len];

        self.operator_name = Some(name.to_string());
        self.remaining_sections = match name {
            "tr" | "s" | "y" => 2,
            _ => 1,
        };
        self.remaining_end_count = 1;
        self.awaiting_second_section = false;
        self.collateral = None;

        let post_op = &post_boundary[name_len..];
        let opening = post_op.trim_start();
        let Some(opener) = opening.chars().next() else {
            panic!("quote-like operator capture has no opening delimiter: {capture:?}");
        };
        self.set_delimiters(opener);

        let linkable = !(starts_with_path_char(opening) || opening.starts_with('@'));
        let state = LexState::quote(!no_interp, linkable);
        trace!(
            operator = name,
            end = ?self.end_delim,
            nest = ?self.nest_delim,
            sections = self.remaining_sections,
            ?state,
            "quote opened"
        );
        host.push_state(state);

        if write {
            host.emit_text(boundary);
            if name.is_empty() {
                host.skip_symbol();
            } else {
                host.emit_symbol(name, boundary.len(), false);
            }
            host.open_span(SpanStyle::String);
            host.emit_text(post_op);
        }
    }

    fn set_delimiters(&mut self, opener: char) {
        let (nest, end) = match opener {
            '[' => (Some('['), ']'),
            '<' => (Some('<'), '>'),
            '(' => (Some('('), ')'),
            '{' => (Some('{'), '}'),
            other => (None, other),
        };
        self.nest_delim = nest;
        self.end_delim = Some(end);
    }

    /// Decide whether the first character of `capture` ends the active
    /// quote, updating nesting depth and section counts as a side effect.
    ///
    /// Returns `true` only when the whole operator has ended.
    pub fn maybe_end_quote(&mut self, capture: &str) -> bool {
        let Some(c) = capture.chars().next() else {
            return false;
        };
        if Some(c) == self.end_delim {
            self.remaining_end_count = self.remaining_end_count.saturating_sub(1);
            if self.remaining_end_count == 0 {
                self.remaining_sections = self.remaining_sections.saturating_sub(1);
                if self.remaining_sections == 0 {
                    trace!(end = ?self.end_delim, "quote ended");
                    self.end_delim = None;
                    self.nest_delim = None;
                    self.collateral = None;
                    return true;
                } else if self.nest_delim.is_some() {
                    self.awaiting_second_section = true;
                } else {
                    self.remaining_end_count = 1;
                }
                trace!(sections = self.remaining_sections, "quote section ended");
            }
        } else if self.nest_delim.is_some() && Some(c) == self.nest_delim {
            if self.awaiting_second_section {
                self.awaiting_second_section = false;
                self.remaining_end_count = 1;
            } else {
                self.remaining_end_count += 1;
            }
        }
        false
    }

    /// Pattern locating the next end or nest delimiter in literal text, or
    /// `None` when no quote is active. Built on first use per quote.
    pub fn collateral_capture_pattern(&mut self) -> Option<&CollateralPattern> {
        let end = self.end_delim?;
        let nest = self.nest_delim;
        Some(
            self.collateral
                .get_or_insert_with(|| CollateralPattern::new(end, nest)),
        )
    }

    // Heredocs

    /// Write a heredoc declaration such as `<<~"END"` and queue its body.
    ///
    /// A capture with no recognizable terminator is written but queues
    /// nothing: `<<` is also the left-shift operator.
    pub fn hop<H: QuoteHost + ?Sized>(&mut self, host: &mut H, capture: &str) {
        assert!(
            capture.starts_with("<<"),
            "heredoc capture must start with `<<`: {capture:?}"
        );
        host.emit_text(capture);
        if let Some(spec) = HeredocSpec::parse(capture) {
            trace!(
                terminator = spec.terminator(),
                state = ?spec.state(),
                pending = self.pending_heredocs.len() + 1,
                "heredoc declared"
            );
            self.pending_heredocs.push_back(spec);
        }
    }

    /// Enter the body of the oldest pending heredoc, if any.
    ///
    /// Called when the declaring line has been fully scanned.
    pub fn maybe_start_here<H: QuoteHost + ?Sized>(&mut self, host: &mut H) -> bool {
        let Some(spec) = self.pending_heredocs.front() else {
            return false;
        };
        host.push_state(spec.state());
        host.open_span(SpanStyle::String);
        true
    }

    /// Write a body line, first ending the current heredoc if the line is
    /// its terminator.
    ///
    /// Leading whitespace of `capture` is ignored for the comparison; the
    /// stored terminator is compared as-is. Returns `true` when the last
    /// pending heredoc has ended and the state has been popped.
    pub fn maybe_end_here<H: QuoteHost + ?Sized>(&mut self, host: &mut H, capture: &str) -> bool {
        let trimmed = capture.trim_start();
        let mut closed = false;
        if self
            .pending_heredocs
            .front()
            .is_some_and(|spec| spec.terminator() == trimmed)
        {
            host.close_span();
            closed = true;
            self.pending_heredocs.pop_front();
            trace!(
                terminator = trimmed,
                pending = self.pending_heredocs.len(),
                "heredoc ended"
            );
        }

        host.emit_text(capture);

        if let Some(next) = self.pending_heredocs.front() {
            host.begin_state(next.state());
            if closed {
                host.open_span(SpanStyle::String);
            }
            false
        } else {
            host.pop_state();
            true
        }
    }

    // Interpolation boundaries

    /// Write a sigil identifier such as `$name` or `@ list`.
    ///
    /// If the sigil itself is the active end delimiter, or the identifier
    /// contains it, the quote takes precedence: everything through that
    /// character is written as quote text and the rest is pushed back.
    pub fn sigil_id<H: QuoteHost + ?Sized>(&mut self, host: &mut H, capture: &str) {
        let Some(first) = capture.chars().next() else {
            return;
        };
        let sigil = &capture[..first.len_utf8()];

        if Some(first) == self.end_delim {
            host.skip_symbol();
            host.emit_text(sigil);
            if self.maybe_end_quote(sigil) {
                host.abort_quote();
            }
            host.pushback(capture.len() - sigil.len());
            return;
        }

        let post_sigil = &capture[sigil.len()..];
        let id = post_sigil.trim_start();
        let space = &post_sigil[..post_sigil.len() - id.len()];
        let id_offset = sigil.len() + space.len();

        let collision = self
            .end_delim
            .and_then(|end| id.find(end).map(|at| (at, end.len_utf8())));
        match collision {
            None => {
                host.emit_text(sigil);
                host.emit_text(space);
                host.emit_symbol(id, id_offset, true);
            }
            Some((at, end_len)) => {
                // e.g. `qr z$abziz;`: only `$ab` belongs to the quote.
                let word = &id[..at];
                let end = &id[at..at + end_len];
                let rest = &id[at + end_len..];
                host.emit_text(sigil);
                host.emit_text(space);
                if word.is_empty() {
                    host.skip_symbol();
                } else {
                    host.emit_symbol(word, id_offset, true);
                }
                host.emit_text(end);
                if self.maybe_end_quote(end) {
                    host.abort_quote();
                }
                host.pushback(rest.len());
            }
        }
    }

    /// Write a braced sigil identifier such as `${ name }`.
    pub fn braced_sigil_id<H: QuoteHost + ?Sized>(&mut self, host: &mut H, capture: &str) {
        // $      {      identifier      }
        // sigil|s0|lpunc|s1|---id---|s2|rpunc
        let Some(first) = capture.chars().next() else {
            return;
        };
        let sigil = &capture[..first.len_utf8()];
        let Some(interior) = capture[sigil.len()..].strip_suffix('}') else {
            host.emit_text(capture);
            return;
        };
        let rpunc = "}";

        let after_s0 = interior.trim_start();
        let s0 = &interior[..interior.len() - after_s0.len()];
        let lpunc_len = after_s0.chars().next().map_or(0, char::len_utf8);
        let lpunc = &after_s0[..lpunc_len];
        let after_lpunc = &after_s0[lpunc_len..];
        let after_s1 = after_lpunc.trim_start();
        let s1 = &after_lpunc[..after_lpunc.len() - after_s1.len()];
        let id_len = after_s1
            .find(char::is_whitespace)
            .unwrap_or(after_s1.len());
        let id = &after_s1[..id_len];
        let s2 = &after_s1[id_len..];

        host.emit_text(sigil);
        host.emit_text(s0);
        host.emit_text(lpunc);
        host.emit_text(s1);
        host.emit_symbol(id, sigil.len() + s0.len() + lpunc.len() + s1.len(), true);
        host.emit_text(s2);
        host.emit_text(rpunc);
    }

    /// Write a special variable such as `$_` or `$/` as a keyword, unless
    /// it contains the active end delimiter, in which case it is written
    /// character by character until the quote ends.
    pub fn special_id<H: QuoteHost + ?Sized>(&mut self, host: &mut H, capture: &str) {
        let collides = self.end_delim.is_some_and(|end| capture.contains(end));
        if !collides {
            host.emit_keyword(capture);
            return;
        }
        for (at, c) in capture.char_indices() {
            let piece = &capture[at..at + c.len_utf8()];
            host.emit_text(piece);
            if self.maybe_end_quote(piece) {
                host.abort_quote();
                host.pushback(capture.len() - at - piece.len());
                break;
            }
        }
    }

    // Line counting

    /// Count the current line as code unless inside a comment or POD.
    pub fn check_line_of_code<H: QuoteHost + ?Sized>(&self, host: &mut H) {
        if host.current_state().counts_lines_of_code() {
            host.count_line_of_code();
        }
    }
}

/// `[A-Za-z0-9_]`.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `text` starts with a character that may begin a file path.
fn starts_with_path_char(text: &str) -> bool {
    text.chars()
        .next()
        .is_some_and(|c| is_word_char(c) || matches!(c, '-' | '.' | '/'))
}

/// Split a heuristic regex capture into the lede and the whitespace
/// between it and the trailing `/`.
fn split_regex_lede(capture: &str) -> (&str, &str) {
    let preceding = capture.strip_suffix('/').unwrap_or(capture);
    let lede = preceding.trim_end();
    (lede, &preceding[lede.len()..])
}

/// Write whitespace, turning each LF into a new line and keeping only what
/// follows the last one.
fn take_whitespace<H: QuoteHost + ?Sized>(host: &mut H, whitespace: &str) {
    match whitespace.rfind('\n') {
        None => host.emit_text(whitespace),
        Some(last) => {
            for _ in whitespace.matches('\n') {
                host.start_new_line();
            }
            host.emit_text(&whitespace[last + 1..]);
        }
    }
}

#[cfg(test)]
mod tests;
