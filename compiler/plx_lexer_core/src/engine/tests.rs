use super::*;
use pretty_assertions::assert_eq;

/// Everything a host can be told, in call order.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Call {
    Text(String),
    Symbol(String, usize, bool),
    SkipSymbol,
    Keyword(String),
    OpenSpan(SpanStyle),
    CloseSpan,
    Push(LexState),
    Begin(LexState),
    Pop,
    Pushback(usize),
    NewLine,
    LineOfCode,
    AbortQuote,
}

use Call::*;

fn text(s: &str) -> Call {
    Text(s.to_string())
}

fn symbol(s: &str, offset: usize, ignore_keywords: bool) -> Call {
    Symbol(s.to_string(), offset, ignore_keywords)
}

/// Host that records calls and keeps a real state stack.
#[derive(Default)]
struct RecordingHost {
    calls: Vec<Call>,
    stack: Vec<LexState>,
}

impl RecordingHost {
    fn state(&self) -> LexState {
        self.stack.last().copied().unwrap_or_default()
    }

    fn take(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }
}

impl QuoteHost for RecordingHost {
    fn emit_text(&mut self, text: &str) {
        self.calls.push(Text(text.to_string()));
    }

    fn emit_symbol(&mut self, text: &str, offset: usize, ignore_keywords: bool) {
        self.calls
            .push(Symbol(text.to_string(), offset, ignore_keywords));
    }

    fn skip_symbol(&mut self) {
        self.calls.push(SkipSymbol);
    }

    fn emit_keyword(&mut self, text: &str) {
        self.calls.push(Keyword(text.to_string()));
    }

    fn open_span(&mut self, style: SpanStyle) {
        self.calls.push(OpenSpan(style));
    }

    fn close_span(&mut self) {
        self.calls.push(CloseSpan);
    }

    fn push_state(&mut self, state: LexState) {
        self.stack.push(state);
        self.calls.push(Push(state));
    }

    fn begin_state(&mut self, state: LexState) {
        match self.stack.last_mut() {
            Some(top) => *top = state,
            None => self.stack.push(state),
        }
        self.calls.push(Begin(state));
    }

    fn pop_state(&mut self) {
        self.stack.pop();
        self.calls.push(Pop);
    }

    fn current_state(&self) -> LexState {
        self.state()
    }

    fn pushback(&mut self, n: usize) {
        self.calls.push(Pushback(n));
    }

    fn start_new_line(&mut self) {
        self.calls.push(NewLine);
    }

    fn count_line_of_code(&mut self) {
        self.calls.push(LineOfCode);
    }

    fn abort_quote(&mut self) {
        self.stack.pop();
        self.calls.push(AbortQuote);
    }
}

fn opened(capture: &str, name_len: usize, no_interp: bool) -> (QuoteEngine, RecordingHost) {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    engine.qop(&mut host, capture, name_len, no_interp);
    host.take();
    (engine, host)
}

// === qop ===

#[test]
fn qop_emits_boundary_name_span_and_opener() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    engine.qop(&mut host, " qq{", 2, false);
    assert_eq!(
        host.calls,
        vec![
            Push(LexState::QuoteInterp),
            text(" "),
            symbol("qq", 1, false),
            OpenSpan(SpanStyle::String),
            text("{"),
        ]
    );
    assert_eq!(engine.operator_name(), Some("qq"));
    assert_eq!(engine.end_delim(), Some('}'));
    assert_eq!(engine.nest_delim(), Some('{'));
    assert_eq!(engine.remaining_sections(), 1);
}

#[test]
fn qop_bare_quote_skips_symbol() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    engine.qop(&mut host, "'", 0, true);
    assert_eq!(
        host.calls,
        vec![
            Push(LexState::QuoteRaw),
            text(""),
            SkipSymbol,
            OpenSpan(SpanStyle::String),
            text("'"),
        ]
    );
    assert_eq!(engine.operator_name(), Some(""));
    assert_eq!(engine.end_delim(), Some('\''));
    assert_eq!(engine.nest_delim(), None);
}

#[test]
fn qop_whitespace_before_delimiter() {
    let (engine, host) = opened("tr  {", 2, true);
    assert_eq!(engine.end_delim(), Some('}'));
    assert_eq!(engine.remaining_sections(), 2);
    assert_eq!(host.state(), LexState::QuoteRaw);
}

#[test]
fn qop_delimiter_pairs() {
    for (opener, end) in [('[', ']'), ('<', '>'), ('(', ')'), ('{', '}')] {
        let (engine, _) = opened(&format!("q{opener}"), 1, true);
        assert_eq!(engine.end_delim(), Some(end));
        assert_eq!(engine.nest_delim(), Some(opener));
    }
    let (engine, _) = opened("q|", 1, true);
    assert_eq!(engine.end_delim(), Some('|'));
    assert_eq!(engine.nest_delim(), None);
}

#[test]
fn qop_section_counts() {
    for (capture, name_len, sections) in [
        ("s/", 1, 2),
        ("y/", 1, 2),
        ("tr/", 2, 2),
        ("m/", 1, 1),
        ("qr/", 2, 1),
        ("qw(", 2, 1),
    ] {
        let (engine, _) = opened(capture, name_len, false);
        assert_eq!(engine.remaining_sections(), sections, "{capture}");
    }
}

#[test]
fn qop_link_eligibility() {
    // The opener itself counts: `/` looks like a path.
    let (_, host) = opened("m/", 1, false);
    assert_eq!(host.state(), LexState::QuoteInterpNoLink);
    let (_, host) = opened("qq[", 2, false);
    assert_eq!(host.state(), LexState::QuoteInterp);
    let (_, host) = opened("q@", 1, true);
    assert_eq!(host.state(), LexState::QuoteRawNoLink);
    let (_, host) = opened("q.", 1, true);
    assert_eq!(host.state(), LexState::QuoteRawNoLink);
    let (_, host) = opened("q!", 1, true);
    assert_eq!(host.state(), LexState::QuoteRaw);
}

#[test]
#[should_panic(expected = "no opening delimiter")]
fn qop_without_delimiter_panics() {
    let mut engine = QuoteEngine::new();
    engine.qop(&mut RecordingHost::default(), "qq", 2, false);
}

// === maybe_end_quote ===

#[test]
fn nesting_depth() {
    let (mut engine, _) = opened("q[", 1, true);
    assert!(!engine.maybe_end_quote("["));
    assert!(!engine.maybe_end_quote("]"));
    assert!(engine.is_quote_active());
    assert!(engine.maybe_end_quote("]"));
    assert!(!engine.is_quote_active());
}

#[test]
fn two_section_symmetric() {
    let (mut engine, _) = opened("tr/", 2, true);
    assert!(!engine.maybe_end_quote("/"));
    assert_eq!(engine.remaining_sections(), 1);
    assert!(engine.maybe_end_quote("/"));
    assert_eq!(engine.remaining_sections(), 0);
}

#[test]
fn two_section_nesting_waits_for_second_opener() {
    let (mut engine, _) = opened("s{", 1, false);
    assert!(!engine.maybe_end_quote("}"));
    // `s{a}{b}`: the second `{` restarts the count instead of deepening it.
    assert!(!engine.maybe_end_quote("{"));
    assert!(!engine.maybe_end_quote("{"));
    assert!(!engine.maybe_end_quote("}"));
    assert!(engine.maybe_end_quote("}"));
}

#[test]
fn other_characters_do_not_end() {
    let (mut engine, _) = opened("m/", 1, false);
    assert!(!engine.maybe_end_quote("a"));
    assert!(!engine.maybe_end_quote(""));
    assert!(engine.maybe_end_quote("/abc"));
}

#[test]
fn operator_name_survives_close() {
    let (mut engine, _) = opened("m/", 1, false);
    assert!(engine.maybe_end_quote("/"));
    assert!(engine.are_modifiers_ok());
    assert_eq!(engine.operator_name(), Some("m"));
}

// === Modifiers ===

#[test]
fn modifier_eligibility() {
    for (capture, name_len, ok) in [
        ("m/", 1, true),
        ("qr{", 2, true),
        ("s/", 1, true),
        ("tr/", 2, true),
        ("y/", 1, true),
        ("/", 0, false),
        ("q/", 1, false),
        ("qq/", 2, false),
        ("qw/", 2, false),
    ] {
        let (engine, _) = opened(capture, name_len, false);
        assert_eq!(engine.are_modifiers_ok(), ok, "{capture}");
    }
    assert!(!QuoteEngine::new().are_modifiers_ok());
}

// === Collateral pattern cache ===

#[test]
fn collateral_pattern_follows_delimiters() {
    let mut engine = QuoteEngine::new();
    assert_eq!(engine.collateral_capture_pattern(), None);

    let mut host = RecordingHost::default();
    engine.qop(&mut host, "q<", 1, true);
    assert_eq!(
        engine.collateral_capture_pattern(),
        Some(&CollateralPattern::new('>', Some('<')))
    );

    assert!(engine.maybe_end_quote(">"));
    assert_eq!(engine.collateral_capture_pattern(), None);

    engine.qop(&mut host, "m!", 1, false);
    assert_eq!(
        engine.collateral_capture_pattern(),
        Some(&CollateralPattern::new('!', None))
    );
}

// === Heuristic regex starts ===

#[test]
fn hqop_punc_emits_lede_as_text() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    engine.hqop_punc(&mut host, "( /");
    assert_eq!(
        host.calls,
        vec![
            Push(LexState::QuoteInterpNoLink),
            text("("),
            text(" "),
            OpenSpan(SpanStyle::String),
            text("/"),
        ]
    );
    assert_eq!(engine.end_delim(), Some('/'));
    assert_eq!(engine.operator_name(), Some("m"));
}

#[test]
fn hqop_symbol_emits_lede_as_symbol() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    engine.hqop_symbol(&mut host, "split/");
    assert_eq!(
        host.calls,
        vec![
            Push(LexState::QuoteInterpNoLink),
            symbol("split", 0, false),
            text(""),
            OpenSpan(SpanStyle::String),
            text("/"),
        ]
    );
}

#[test]
fn hqop_whitespace_with_newlines() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    engine.hqop_punc(&mut host, "=\n  \n\t/");
    assert_eq!(
        host.calls,
        vec![
            Push(LexState::QuoteInterpNoLink),
            text("="),
            NewLine,
            NewLine,
            text("\t"),
            OpenSpan(SpanStyle::String),
            text("/"),
        ]
    );
}

// === Heredocs ===

#[test]
fn hop_queues_and_emits() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    engine.hop(&mut host, "<<~END");
    engine.hop(&mut host, "<<END");
    assert_eq!(host.calls, vec![text("<<~END"), text("<<END")]);
    assert_eq!(engine.pending_heredoc_count(), 2);
    assert_eq!(
        engine.pending_heredoc(),
        Some(&HeredocSpec::new("END", LexState::HeredocInterpIndented))
    );
}

#[test]
fn indentation_flag_selects_state() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    engine.hop(&mut host, "<<~END");
    assert!(engine.pending_heredoc().is_some_and(HeredocSpec::is_indented));
    engine.reset();
    engine.hop(&mut host, "<<END");
    assert!(!engine.pending_heredoc().is_some_and(HeredocSpec::is_indented));
}

#[test]
fn hop_left_shift_registers_nothing() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    engine.hop(&mut host, "<< $n");
    engine.hop(&mut host, "<<");
    assert_eq!(host.calls, vec![text("<< $n"), text("<<")]);
    assert_eq!(engine.pending_heredoc_count(), 0);
    assert!(!engine.maybe_start_here(&mut host));
}

#[test]
#[should_panic(expected = "must start with `<<`")]
fn hop_without_marker_panics() {
    let mut engine = QuoteEngine::new();
    engine.hop(&mut RecordingHost::default(), "EOF");
}

#[test]
fn maybe_start_here_without_pending_does_nothing() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    assert!(!engine.maybe_start_here(&mut host));
    assert_eq!(host.calls, vec![]);
}

#[test]
fn stacked_heredocs_resolve_in_order() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    engine.hop(&mut host, "<<A");
    engine.hop(&mut host, "<<'B'");
    host.take();

    assert!(engine.maybe_start_here(&mut host));
    assert_eq!(host.state(), LexState::HeredocInterp);

    assert!(!engine.maybe_end_here(&mut host, "A"));
    assert_eq!(host.state(), LexState::HeredocRaw);
    assert_eq!(host.stack.len(), 1);

    assert!(engine.maybe_end_here(&mut host, "B"));
    assert_eq!(host.state(), LexState::Normal);
    assert!(host.stack.is_empty());
    assert_eq!(
        host.take(),
        vec![
            Push(LexState::HeredocInterp),
            OpenSpan(SpanStyle::String),
            CloseSpan,
            text("A"),
            Begin(LexState::HeredocRaw),
            OpenSpan(SpanStyle::String),
            CloseSpan,
            text("B"),
            Pop,
        ]
    );
}

#[test]
fn body_line_keeps_current_heredoc() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    engine.hop(&mut host, "<<EOF");
    engine.maybe_start_here(&mut host);
    host.take();

    assert!(!engine.maybe_end_here(&mut host, "hello"));
    // No close, so no reopen.
    assert_eq!(
        host.take(),
        vec![text("hello"), Begin(LexState::HeredocInterp)]
    );
    assert_eq!(engine.pending_heredoc_count(), 1);
}

#[test]
fn terminator_comparison_trims_leading_whitespace_only() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    engine.hop(&mut host, "<<EOF");
    engine.maybe_start_here(&mut host);

    assert!(!engine.maybe_end_here(&mut host, "EOF  "));
    assert_eq!(engine.pending_heredoc_count(), 1);
    assert!(engine.maybe_end_here(&mut host, "   EOF"));
    assert_eq!(engine.pending_heredoc_count(), 0);
}

#[test]
fn maybe_end_here_with_nothing_pending_pops() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    host.push_state(LexState::HeredocRaw);
    host.take();
    assert!(engine.maybe_end_here(&mut host, "stray"));
    assert_eq!(host.take(), vec![text("stray"), Pop]);
}

// === Interpolation boundaries ===

#[test]
fn sigil_id_plain() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    engine.sigil_id(&mut host, "$ name");
    assert_eq!(
        host.calls,
        vec![text("$"), text(" "), symbol("name", 2, true)]
    );
}

#[test]
fn sigil_id_sigil_is_end_delimiter() {
    let (mut engine, mut host) = opened("m$", 1, false);
    engine.sigil_id(&mut host, "$abc");
    assert_eq!(
        host.calls,
        vec![SkipSymbol, text("$"), AbortQuote, Pushback(3)]
    );
    assert!(!engine.is_quote_active());
}

#[test]
fn sigil_id_end_delimiter_inside_identifier() {
    let (mut engine, mut host) = opened("qr z", 2, false);
    engine.sigil_id(&mut host, "$abziz");
    assert_eq!(
        host.calls,
        vec![
            text("$"),
            text(""),
            symbol("ab", 1, true),
            text("z"),
            AbortQuote,
            Pushback(2),
        ]
    );
    assert!(!engine.is_quote_active());
}

#[test]
fn sigil_id_end_delimiter_first_in_identifier() {
    let (mut engine, mut host) = opened("tr i", 2, true);
    engine.sigil_id(&mut host, "$ixy");
    // First section ends, second begins; nothing aborts.
    assert_eq!(
        host.calls,
        vec![text("$"), text(""), SkipSymbol, text("i"), Pushback(2)]
    );
    assert!(engine.is_quote_active());
    assert_eq!(engine.remaining_sections(), 1);
}

#[test]
fn braced_sigil_id_offsets() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    engine.braced_sigil_id(&mut host, "@ { list  }");
    assert_eq!(
        host.calls,
        vec![
            text("@"),
            text(" "),
            text("{"),
            text(" "),
            symbol("list", 4, true),
            text("  "),
            text("}"),
        ]
    );
}

#[test]
fn braced_sigil_id_tight() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    engine.braced_sigil_id(&mut host, "${x}");
    assert_eq!(
        host.calls,
        vec![
            text("$"),
            text(""),
            text("{"),
            text(""),
            symbol("x", 2, true),
            text(""),
            text("}"),
        ]
    );
}

#[test]
fn special_id_is_keyword() {
    let (mut engine, mut host) = opened("qq{", 2, false);
    engine.special_id(&mut host, "$_");
    assert_eq!(host.calls, vec![Keyword("$_".to_string())]);
}

#[test]
fn special_id_containing_end_delimiter_aborts() {
    let (mut engine, mut host) = opened("m/", 1, false);
    engine.special_id(&mut host, "$/");
    assert_eq!(
        host.calls,
        vec![text("$"), text("/"), AbortQuote, Pushback(0)]
    );
    assert!(!engine.is_quote_active());
}

#[test]
fn special_id_end_delimiter_not_final_character() {
    let (mut engine, mut host) = opened("q(", 1, false);
    engine.special_id(&mut host, "$)x");
    assert_eq!(
        host.calls,
        vec![text("$"), text(")"), AbortQuote, Pushback(1)]
    );
}

// === Line counting ===

#[test]
fn line_of_code_skipped_in_comment_and_pod() {
    let engine = QuoteEngine::new();
    for (state, counts) in [
        (LexState::Normal, true),
        (LexState::QuoteInterp, true),
        (LexState::HeredocRaw, true),
        (LexState::Comment, false),
        (LexState::Pod, false),
    ] {
        let mut host = RecordingHost::default();
        host.stack.push(state);
        engine.check_line_of_code(&mut host);
        assert_eq!(host.calls.contains(&LineOfCode), counts, "{state:?}");
    }
}

// === Lifecycle ===

#[test]
fn reset_clears_everything() {
    let (mut engine, mut host) = opened("s{", 1, false);
    engine.hop(&mut host, "<<EOF");
    engine.reset();
    assert!(!engine.is_quote_active());
    assert_eq!(engine.operator_name(), None);
    assert_eq!(engine.nest_delim(), None);
    assert_eq!(engine.remaining_sections(), 0);
    assert_eq!(engine.pending_heredoc_count(), 0);
    assert!(!engine.are_modifiers_ok());
    assert_eq!(engine.collateral_capture_pattern(), None);
}

// === Full statements ===

#[test]
fn match_operator_stream() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    engine.qop(&mut host, "m/", 1, false);
    host.emit_text("abc");
    host.emit_text("/");
    assert!(engine.maybe_end_quote("/"));
    host.close_span();
    assert_eq!(
        host.calls,
        vec![
            Push(LexState::QuoteInterpNoLink),
            text(""),
            symbol("m", 0, false),
            OpenSpan(SpanStyle::String),
            text("/"),
            text("abc"),
            text("/"),
            CloseSpan,
        ]
    );
}

#[test]
fn transliteration_sections() {
    let (mut engine, _) = opened("tr/", 2, true);
    assert_eq!(engine.remaining_sections(), 2);
    assert!(!engine.maybe_end_quote("/"));
    assert_eq!(engine.remaining_sections(), 1);
    assert!(engine.is_quote_active());
    assert!(engine.maybe_end_quote("/"));
    assert!(!engine.is_quote_active());
}

#[test]
fn heredoc_body() {
    let mut engine = QuoteEngine::new();
    let mut host = RecordingHost::default();
    engine.hop(&mut host, "<<EOF");
    assert_eq!(
        engine.pending_heredoc(),
        Some(&HeredocSpec::new("EOF", LexState::HeredocInterp))
    );
    assert!(engine.maybe_start_here(&mut host));
    assert_eq!(host.state(), LexState::HeredocInterp);
    assert!(!engine.maybe_end_here(&mut host, "hello"));
    assert!(engine.maybe_end_here(&mut host, "EOF"));
    assert_eq!(host.state(), LexState::Normal);
}

// === Property tests ===

#[allow(
    clippy::disallowed_types,
    reason = "proptest macros internally use Arc"
)]
mod proptest_quotes {
    use super::opened;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn symmetric_delimiter_ends_single_section(
            c in any::<char>().prop_filter(
                "non-nesting, non-whitespace",
                |c| !matches!(c, '[' | '<' | '(' | '{') && !c.is_whitespace(),
            )
        ) {
            let (mut engine, _) = opened(&format!("m{c}"), 1, false);
            prop_assert!(engine.maybe_end_quote(&c.to_string()));
            prop_assert!(!engine.is_quote_active());
            prop_assert_eq!(engine.nest_delim(), None);
        }

        #[test]
        fn nested_brackets_need_matching_closes(depth in 1usize..12) {
            let (mut engine, _) = opened("q[", 1, true);
            for _ in 0..depth {
                prop_assert!(!engine.maybe_end_quote("["));
            }
            for _ in 0..depth {
                prop_assert!(!engine.maybe_end_quote("]"));
            }
            prop_assert!(engine.maybe_end_quote("]"));
        }
    }
}
