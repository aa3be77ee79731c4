//! Lexical states and highlight span styles.
//!
//! The engine only ever names states through [`LexState`]; how a scanner
//! realizes each state (which productions are active) is its own business.

/// A lexical state of the driving scanner.
///
/// Quote states come in four variants: interpolating or raw, crossed with
/// whether the quoted text is eligible for string links. Heredoc states
/// cross interpolating or raw with indented (`<<~`) or not.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LexState {
    /// Ordinary Perl code.
    #[default]
    Normal,
    /// Interpolating quote (`qq`, `m`, `"`), link-eligible.
    QuoteInterp,
    /// Interpolating quote whose text starts path-like or with `@`.
    QuoteInterpNoLink,
    /// Raw quote (`q`, `'`, `tr`), link-eligible.
    QuoteRaw,
    /// Raw quote whose text starts path-like or with `@`.
    QuoteRawNoLink,
    /// `<<EOF` / `<<"EOF"` body.
    HeredocInterp,
    /// `<<~EOF` / `<<~"EOF"` body.
    HeredocInterpIndented,
    /// `<<'EOF'` / `<<\EOF` body.
    HeredocRaw,
    /// `<<~'EOF'` / `<<~\EOF` body.
    HeredocRawIndented,
    /// `#` comment through end of line.
    Comment,
    /// Plain Old Documentation block, or the `__END__`/`__DATA__` section.
    Pod,
}

impl LexState {
    /// Select one of the four quote states.
    pub const fn quote(interpolate: bool, linkable: bool) -> Self {
        match (interpolate, linkable) {
            (true, true) => LexState::QuoteInterp,
            (true, false) => LexState::QuoteInterpNoLink,
            (false, true) => LexState::QuoteRaw,
            (false, false) => LexState::QuoteRawNoLink,
        }
    }

    /// Select one of the four heredoc states.
    pub const fn heredoc(interpolate: bool, indented: bool) -> Self {
        match (interpolate, indented) {
            (true, false) => LexState::HeredocInterp,
            (true, true) => LexState::HeredocInterpIndented,
            (false, false) => LexState::HeredocRaw,
            (false, true) => LexState::HeredocRawIndented,
        }
    }

    pub const fn is_quote(self) -> bool {
        matches!(
            self,
            LexState::QuoteInterp
                | LexState::QuoteInterpNoLink
                | LexState::QuoteRaw
                | LexState::QuoteRawNoLink
        )
    }

    pub const fn is_heredoc(self) -> bool {
        matches!(
            self,
            LexState::HeredocInterp
                | LexState::HeredocInterpIndented
                | LexState::HeredocRaw
                | LexState::HeredocRawIndented
        )
    }

    /// Whether sigil identifiers inside this state are variable references.
    pub const fn interpolates(self) -> bool {
        matches!(
            self,
            LexState::QuoteInterp
                | LexState::QuoteInterpNoLink
                | LexState::HeredocInterp
                | LexState::HeredocInterpIndented
        )
    }

    /// Whether text in this quote state may be offered as a string link.
    pub const fn is_linkable(self) -> bool {
        matches!(self, LexState::QuoteInterp | LexState::QuoteRaw)
    }

    /// Whether the heredoc terminator may be preceded by whitespace.
    pub const fn is_indented(self) -> bool {
        matches!(
            self,
            LexState::HeredocInterpIndented | LexState::HeredocRawIndented
        )
    }

    /// Comment and POD lines never count as lines of code.
    pub const fn counts_lines_of_code(self) -> bool {
        !matches!(self, LexState::Comment | LexState::Pod)
    }
}

/// Style of a highlighted region.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpanStyle {
    String,
    Comment,
    Pod,
    Number,
}

impl SpanStyle {
    /// Short CSS class name used by markup writers.
    pub const fn css_class(self) -> &'static str {
        match self {
            SpanStyle::String => "s",
            SpanStyle::Comment => "c",
            SpanStyle::Pod => "p",
            SpanStyle::Number => "n",
        }
    }
}
