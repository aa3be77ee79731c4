//! Collateral capture: locating the next character that may end or deepen
//! the active quote inside a run of literal text.
//!
//! A candidate counts only when it is not escaped. The escape test looks
//! back over at most three pairs of backslashes: a candidate preceded by a
//! run of 0, 2, 4, or 6 backslashes matches; 1, 3, 5, 7, or any run longer
//! than 7 does not.

/// Longest even backslash run that still leaves a candidate unescaped.
const MAX_ESCAPE_PAIRS: usize = 3;

/// Matcher for the end delimiter (and nest delimiter, if any) of a quote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollateralPattern {
    end: char,
    nest: Option<char>,
}

impl CollateralPattern {
    pub fn new(end: char, nest: Option<char>) -> Self {
        CollateralPattern { end, nest }
    }

    pub fn end(&self) -> char {
        self.end
    }

    pub fn nest(&self) -> Option<char> {
        self.nest
    }

    /// Byte offset of the first unescaped end or nest delimiter.
    pub fn find(&self, haystack: &str) -> Option<usize> {
        let bytes = haystack.as_bytes();
        match self.ascii_needles() {
            Some((end, Some(nest))) => {
                memchr::memchr2_iter(end, nest, bytes).find(|&i| !is_escaped(bytes, i))
            }
            Some((end, None)) => {
                memchr::memchr_iter(end, bytes).find(|&i| !is_escaped(bytes, i))
            }
            None => haystack
                .char_indices()
                .find(|&(i, c)| self.is_delimiter(c) && !is_escaped(bytes, i))
                .map(|(i, _)| i),
        }
    }

    /// Whether `c` is one of this pattern's delimiters.
    pub fn is_delimiter(&self, c: char) -> bool {
        c == self.end || self.nest == Some(c)
    }

    /// Both delimiters as bytes, when they are ASCII.
    fn ascii_needles(&self) -> Option<(u8, Option<u8>)> {
        let end = ascii_byte(self.end)?;
        match self.nest {
            Some(nest) => Some((end, Some(ascii_byte(nest)?))),
            None => Some((end, None)),
        }
    }
}

fn ascii_byte(c: char) -> Option<u8> {
    if c.is_ascii() {
        u8::try_from(c).ok()
    } else {
        None
    }
}

/// Whether the byte at `pos` is escaped by the backslashes before it.
fn is_escaped(bytes: &[u8], pos: usize) -> bool {
    let run = bytes[..pos]
        .iter()
        .rev()
        .take(2 * MAX_ESCAPE_PAIRS + 1)
        .take_while(|&&b| b == b'\\')
        .count();
    run % 2 == 1 || run > 2 * MAX_ESCAPE_PAIRS
}
