//! The capabilities the quote engine needs from its embedding scanner.

use crate::state::{LexState, SpanStyle};

/// Output sink and lexical-state control supplied by the driving scanner.
///
/// Every [`QuoteEngine`](crate::QuoteEngine) operation that produces output
/// or changes lexical state takes a `&mut impl QuoteHost`. Offsets and
/// pushback counts are in bytes, relative to the start of the capture the
/// engine was handed.
pub trait QuoteHost {
    /// Write literal text.
    fn emit_text(&mut self, text: &str);

    /// Write text as a potential symbol reference starting `offset` bytes
    /// into the current capture.
    ///
    /// When `ignore_keywords` is false the host may style a keyword as a
    /// keyword instead of a symbol.
    fn emit_symbol(&mut self, text: &str, offset: usize, ignore_keywords: bool);

    /// Note that a symbol slot was left empty.
    fn skip_symbol(&mut self);

    /// Write text styled as a language keyword.
    fn emit_keyword(&mut self, text: &str);

    /// Begin a highlighted region, ending any region already open.
    fn open_span(&mut self, style: SpanStyle);

    /// End the open highlighted region, if any.
    fn close_span(&mut self);

    fn push_state(&mut self, state: LexState);

    /// Replace the current state without growing the stack.
    fn begin_state(&mut self, state: LexState);

    fn pop_state(&mut self);

    fn current_state(&self) -> LexState;

    /// Return the last `n` bytes of the current capture for re-scanning
    /// under whatever state is current afterwards.
    fn pushback(&mut self, n: usize);

    /// Signal a line break inside a multi-line capture.
    fn start_new_line(&mut self);

    /// Mark the current line as containing code.
    fn count_line_of_code(&mut self);

    /// A quote ended before its capture did.
    ///
    /// Everything up to and including the causal character has been
    /// written; the engine follows up with [`pushback`](Self::pushback) for
    /// the rest.
    fn abort_quote(&mut self);
}
