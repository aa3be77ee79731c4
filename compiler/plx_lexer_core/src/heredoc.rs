//! Heredoc declarations.
//!
//! A declaration is `<<`, an optional `~` (indented body), optional
//! whitespace, then the terminator in one of four spellings:
//!
//! | Spelling        | Interpolates | Terminator            |
//! |-----------------|--------------|-----------------------|
//! | `<<'END'`       | no           | up to closing `'`     |
//! | `<<"END"`       | yes          | up to closing `"`     |
//! | `` <<`END` ``   | yes          | up to closing `` ` `` |
//! | `<<\END`        | no           | bare identifier       |
//! | `<<END`         | yes          | bare identifier       |

use crate::state::LexState;

/// A heredoc whose body has not been seen yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeredocSpec {
    terminator: String,
    state: LexState,
}

impl HeredocSpec {
    pub fn new(terminator: impl Into<String>, state: LexState) -> Self {
        HeredocSpec {
            terminator: terminator.into(),
            state,
        }
    }

    /// Parse a declaration capture such as `<<~"END"`.
    ///
    /// Returns `None` when no terminator can be extracted, which is how a
    /// left shift that merely resembles a heredoc opener is told apart.
    pub fn parse(capture: &str) -> Option<HeredocSpec> {
        let mut rest = capture.strip_prefix("<<")?;
        let indented = match rest.strip_prefix('~') {
            Some(after) => {
                rest = after;
                true
            }
            None => false,
        };
        rest = rest.trim_start();

        let quote = rest.chars().next()?;
        let (interpolate, terminator) = match quote {
            '\'' | '"' | '`' => {
                let body = &rest[1..];
                // An unclosed quote takes the rest of the capture.
                let terminator = body.find(quote).map_or(body, |end| &body[..end]);
                (quote != '\'', terminator)
            }
            '\\' => (false, bare_terminator(&rest[1..])?),
            _ => (true, bare_terminator(rest)?),
        };

        Some(HeredocSpec::new(
            terminator,
            LexState::heredoc(interpolate, indented),
        ))
    }

    /// The text that ends the body.
    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    /// The state the body is scanned under.
    pub fn state(&self) -> LexState {
        self.state
    }

    pub fn is_indented(&self) -> bool {
        self.state.is_indented()
    }

    pub fn interpolates(&self) -> bool {
        self.state.interpolates()
    }
}

/// Leading `[A-Za-z0-9_]+`, or `None` if there is none.
fn bare_terminator(text: &str) -> Option<&str> {
    let len = text
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    (len > 0).then(|| &text[..len])
}
