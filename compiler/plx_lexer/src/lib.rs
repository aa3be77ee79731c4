//! Perl cross-reference scanner.
//!
//! Turns Perl source into a stream of markup calls (text, symbol links,
//! keywords, highlighted spans) on a [`MarkupSink`]. The quoting and heredoc
//! decisions are made by [`plx_lexer_core::QuoteEngine`]; this crate supplies
//! the token productions for each lexical state and the bookkeeping the
//! engine relies on (state stack, pushback, line counts).
//!
//! ```text
//! source ──▶ Scanner ──(captures)──▶ QuoteEngine
//!               │  ▲                      │
//!               │  └──(push/pop/pushback)─┘
//!               ▼
//!           MarkupSink (EventLog | HtmlWriter)
//! ```

mod keywords;
mod links;
mod raw_token;
mod scanner;
mod sink;

pub use keywords::is_keyword;
pub use plx_lexer_core::{LexState, SpanStyle};
pub use sink::{EventLog, HtmlWriter, MarkupSink, XrefEvent};

use plx_lexer_core::QuoteEngine;
use serde::Serialize;
use tracing::trace;

use crate::scanner::Scanner;

/// Counts gathered during one scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Source lines, counting a final line without a terminator.
    pub lines: u32,
    /// Lines with anything other than whitespace, comments or POD.
    pub lines_of_code: u32,
    /// Symbol slots the engine left empty.
    pub skipped_symbols: u32,
    /// Lexical state at end of input; `Normal` unless something was left
    /// unterminated.
    #[serde(skip)]
    pub final_state: LexState,
}

/// Reusable Perl cross-reference scanner.
///
/// Owns one [`QuoteEngine`]; each [`scan`](Self::scan) starts from a reset
/// engine, so one lexer can serve many files in turn.
#[derive(Debug, Default)]
pub struct XrefLexer {
    engine: QuoteEngine,
}

impl XrefLexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quote and heredoc state left by the last scan.
    pub fn engine(&self) -> &QuoteEngine {
        &self.engine
    }

    /// Scan `source`, writing markup to `sink`.
    pub fn scan<S: MarkupSink + ?Sized>(&mut self, source: &str, sink: &mut S) -> ScanSummary {
        self.engine.reset();
        let summary = Scanner::new(source, &mut self.engine, sink).run();
        trace!(
            lines = summary.lines,
            lines_of_code = summary.lines_of_code,
            "scan complete"
        );
        summary
    }
}

/// Render `source` as cross-referenced HTML.
pub fn xref_html(source: &str) -> String {
    let mut html = HtmlWriter::new();
    XrefLexer::new().scan(source, &mut html);
    html.finish()
}

/// Scan `source` into a flat event list.
pub fn xref_events(source: &str) -> Vec<XrefEvent> {
    let mut log = EventLog::new();
    XrefLexer::new().scan(source, &mut log);
    log.into_events()
}
