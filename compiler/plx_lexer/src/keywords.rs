//! Perl keyword table.
//!
//! Identifiers offered for cross-referencing are styled as keywords instead
//! of symbol links when they name a Perl builtin or control word. The
//! lookup uses the identifier's length as a first-pass filter, then
//! matches against the keywords of that length.

/// Whether `text` is a Perl keyword or builtin function name.
#[inline]
pub fn is_keyword(text: &str) -> bool {
    let bytes = text.as_bytes();
    let len = bytes.len();

    // Guard: all keywords are 1-11 chars and start with ASCII alpha or `_`
    if !(1..=11).contains(&len) {
        return false;
    }
    let first = bytes[0];
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return false;
    }

    match len {
        1 => matches!(text, "m" | "q" | "s" | "y"),
        2 => matches!(
            text,
            "do"
                | "eq"
                | "ge"
                | "gt"
                | "if"
                | "lc"
                | "le"
                | "lt"
                | "my"
                | "ne"
                | "no"
                | "or"
                | "qq"
                | "qr"
                | "qw"
                | "qx"
                | "tr"
                | "uc"
        ),
        3 => matches!(
            text,
            "abs"
                | "and"
                | "chr"
                | "cmp"
                | "cos"
                | "die"
                | "exp"
                | "for"
                | "hex"
                | "int"
                | "log"
                | "map"
                | "not"
                | "oct"
                | "ord"
                | "our"
                | "pop"
                | "pos"
                | "ref"
                | "sin"
                | "sub"
                | "tie"
                | "use"
                | "vec"
                | "xor"
        ),
        4 => matches!(
            text,
            "bind"
                | "chop"
                | "dump"
                | "each"
                | "else"
                | "eval"
                | "exec"
                | "exit"
                | "fork"
                | "glob"
                | "goto"
                | "grep"
                | "join"
                | "keys"
                | "kill"
                | "last"
                | "link"
                | "lock"
                | "next"
                | "open"
                | "pack"
                | "push"
                | "read"
                | "redo"
                | "seek"
                | "send"
                | "sort"
                | "sqrt"
                | "stat"
                | "tell"
                | "time"
                | "wait"
                | "warn"
                | "when"
        ),
        5 => matches!(
            text,
            "alarm"
                | "bless"
                | "chdir"
                | "chmod"
                | "chomp"
                | "chown"
                | "close"
                | "crypt"
                | "elsif"
                | "fcntl"
                | "flock"
                | "index"
                | "ioctl"
                | "local"
                | "lstat"
                | "mkdir"
                | "print"
                | "rmdir"
                | "shift"
                | "sleep"
                | "split"
                | "srand"
                | "study"
                | "undef"
                | "untie"
                | "until"
                | "utime"
                | "while"
                | "write"
        ),
        6 => matches!(
            text,
            "caller"
                | "chroot"
                | "delete"
                | "exists"
                | "format"
                | "length"
                | "printf"
                | "rename"
                | "return"
                | "rindex"
                | "select"
                | "splice"
                | "substr"
                | "system"
                | "unless"
                | "unlink"
                | "unpack"
                | "values"
        ),
        7 => matches!(
            text,
            "binmode"
                | "defined"
                | "foreach"
                | "opendir"
                | "package"
                | "readdir"
                | "require"
                | "reverse"
                | "sprintf"
                | "unshift"
                | "waitpid"
        ),
        8 => matches!(
            text,
            "__FILE__" | "__LINE__" | "closedir" | "continue" | "readline" | "truncate"
        ),
        9 => matches!(text, "localtime" | "wantarray"),
        11 => matches!(text, "__PACKAGE__"),
        _ => false,
    }
}

/// Words that may directly precede a heuristic `/regex/`, offered to the
/// quote engine as the regex lede.
pub(crate) fn is_regex_lede(word: &str) -> bool {
    matches!(
        word,
        "split" | "grep" | "and" | "or" | "not" | "if" | "unless" | "while" | "until"
            | "return" | "when"
    )
}

/// Whether a term, not an infix operator, follows `word`, so that a `/`
/// after it opens a regex rather than dividing.
///
/// Builtins that yield a value without arguments (`time`, `wantarray`,
/// `shift`) are left out: `time / 60` divides.
pub(crate) fn expects_operand(word: &str) -> bool {
    is_regex_lede(word)
        || matches!(
            word,
            "x" | "lt"
                | "gt"
                | "le"
                | "ge"
                | "eq"
                | "ne"
                | "cmp"
                | "xor"
                | "elsif"
                | "for"
                | "foreach"
                | "map"
                | "sort"
                | "join"
                | "push"
                | "unshift"
                | "print"
                | "printf"
                | "say"
                | "die"
                | "warn"
        )
}
