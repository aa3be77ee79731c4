//! Raw Token Definitions
//!
//! One logos enum per family of lexical states. The scanner re-enters
//! logos at every step with the enum for the current state, so a state
//! change or pushback takes effect on the very next token.
//!
//! Productions that need context logos cannot express (column 0, the
//! previous significant token, whether a quote is open, whether a `/`
//! follows after some whitespace) are refined by the scanner after
//! matching. Keeping every production free of optional trailing context
//! matters: logos does not fall back to a shorter accepting match when a
//! longer candidate fails part way, so [`next_token`] has to recover those
//! cases by re-lexing.

use logos::Logos;

/// Tokens of ordinary Perl code.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NormalToken {
    #[regex(r"[ \t\f\r]+")]
    Whitespace,

    #[token("\n")]
    Newline,

    #[token("#")]
    Hash,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*")]
    Ident,

    #[regex(r"0[xXbB][0-9a-fA-F_]+")]
    #[regex(r"[0-9][0-9_]*(\.[0-9][0-9_]*)?([eE][+-]?[0-9]+)?")]
    Number,

    /// `qq{`, `s#`: operator name directly followed by its opening
    /// delimiter. The spaced form (`tr /a/b/`) is an `Ident` that the
    /// scanner extends.
    #[regex(r"(q|qq|qw|qr|m|s|tr|y)[^A-Za-z0-9_ \t\f\r\n)\]}]")]
    QuoteOp,

    #[token("\"")]
    #[token("`")]
    DoubleQuote,

    #[token("'")]
    SingleQuote,

    #[regex(r"\$[ \t]*[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*")]
    #[regex(r"[@%][A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*")]
    SigilId,

    #[regex(r"[$@%]\{[ \t]*[A-Za-z_][A-Za-z0-9_]*[ \t]*\}")]
    BracedSigilId,

    #[regex(r#"\$([0-9]+|[&`'+!/\\,;.0<>\[\]^_:?()|"-]|\^[A-Z]|#)"#, priority = 10)]
    SpecialId,

    #[regex(r"<<~?\\?[A-Za-z_][A-Za-z0-9_]*")]
    #[regex(r#"<<~?[ \t]*("[^"\n]*"|'[^'\n]*'|`[^`\n]*`)"#)]
    Heredoc,

    #[token("/")]
    #[token("//")]
    #[token("/=")]
    Slash,

    #[token("->")]
    Arrow,

    #[token("=~")]
    #[token("!~")]
    Bind,

    #[token(")")]
    #[token("]")]
    #[token("}")]
    Close,

    /// Any other single character. Below the default priority so the
    /// one-character tokens above win.
    #[regex(r"[^ \t\f\r\nA-Za-z0-9_)\]}]", priority = 1)]
    Punct,
}

/// Tokens inside quotes and heredoc bodies.
///
/// Sigil productions only mean interpolation in interpolating states; the
/// scanner treats them as literal text elsewhere.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuoteToken {
    /// Literal text, backslash escapes kept as pairs so an escaped
    /// delimiter or sigil stays inside the run.
    #[regex(r"([^\\$@\n]|\\[^\n])+")]
    Text,

    #[token("\n")]
    Newline,

    #[regex(r"\$[ \t]*[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*")]
    #[regex(r"@[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*")]
    SigilId,

    #[regex(r"[$@]\{[ \t]*[A-Za-z_][A-Za-z0-9_]*[ \t]*\}")]
    BracedSigilId,

    #[regex(r#"\$([0-9]+|[&`'+!/\\,;.0<>\[\]^_:?()|"-]|\^[A-Z]|#)"#, priority = 10)]
    SpecialId,

    #[token("$")]
    #[token("@")]
    Sigil,

    #[token("\\")]
    Backslash,
}

/// The longest token at the start of `rest` and its byte length.
///
/// When logos reports an error span, the longest prefix of that span that
/// lexes as one complete token is taken instead. A character no
/// production accepts comes back as `None` with its own length.
pub(crate) fn next_token<'s, T>(rest: &'s str) -> (Option<T>, usize)
where
    T: Logos<'s, Source = str, Error = ()>,
    T::Extras: Default,
{
    let mut lexer = T::lexer(rest);
    let consumed = match lexer.next() {
        Some(Ok(token)) => return (Some(token), lexer.span().end),
        Some(Err(())) => lexer.span().end.min(rest.len()),
        None => return (None, rest.len()),
    };

    let mut end = consumed;
    while end > 1 {
        end -= 1;
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            break;
        }
        let mut prefix = T::lexer(&rest[..end]);
        if let Some(Ok(token)) = prefix.next() {
            return (Some(token), prefix.span().end);
        }
    }
    (None, rest.chars().next().map_or(0, char::len_utf8))
}
