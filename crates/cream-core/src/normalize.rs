//! Content normalization policies.
//!
//! Two views may hold the same document in different surface forms (CRLF vs LF, trailing
//! spaces a renderer drops, a trailing newline an editor appends). Comparing raw bytes would
//! make the controller relay those differences back and forth forever, so every view declares a
//! [`Normalization`] and equality is always evaluated through it.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Equality policy applied to a view's content.
///
/// Policies are cumulative: each variant applies everything the previous one does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Normalization {
    /// Byte equality.
    Exact,
    /// Fold CRLF (`"\r\n"`) and lone CR to LF.
    #[default]
    LineEndings,
    /// Also strip trailing whitespace on every line and trailing blank lines.
    TrimTrailing,
    /// Also strip leading and trailing whitespace of the whole text.
    Trimmed,
}

impl Normalization {
    /// Normalize `text` under this policy.
    pub fn apply<'a>(self, text: &'a str) -> Cow<'a, str> {
        match self {
            Normalization::Exact => Cow::Borrowed(text),
            Normalization::LineEndings => fold_line_endings(text),
            Normalization::TrimTrailing => Cow::Owned(trim_trailing(&fold_line_endings(text))),
            Normalization::Trimmed => {
                let folded = trim_trailing(&fold_line_endings(text));
                Cow::Owned(folded.trim().to_string())
            }
        }
    }

    /// Whether `a` and `b` are equal under this policy.
    pub fn equivalent(self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        self.apply(a) == self.apply(b)
    }
}

fn fold_line_endings(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

fn trim_trailing(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split('\n') {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    let kept = out.trim_end_matches('\n').len();
    out.truncate(kept);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_is_byte_equality() {
        assert!(Normalization::Exact.equivalent("a\n", "a\n"));
        assert!(!Normalization::Exact.equivalent("a\r\n", "a\n"));
    }

    #[test]
    fn line_endings_fold_crlf_and_cr() {
        let n = Normalization::LineEndings;
        assert!(n.equivalent("a\r\nb\rc", "a\nb\nc"));
        assert!(!n.equivalent("a \n", "a\n"));
    }

    #[test]
    fn trim_trailing_ignores_line_tails_and_final_newlines() {
        let n = Normalization::TrimTrailing;
        assert_eq!(n.apply("# Hi  \r\n\nbody\t\n\n\n"), "# Hi\n\nbody");
        assert!(n.equivalent("Hello", "Hello\n"));
        assert!(!n.equivalent("  Hello", "Hello"));
    }

    #[test]
    fn trimmed_ignores_leading_whitespace() {
        assert!(Normalization::Trimmed.equivalent("\n\n  Hello \n", "Hello"));
        assert_eq!(Normalization::Trimmed.apply("   "), "");
    }
}
