//! Escaping of leaf text for embedding in LaTeX.
//!
//! Escaping is idempotent: a sequence that is already escaped (`\&`, `{[`,
//! `]}`, `\textbackslash{}` …) is copied through untouched, so cleaning
//! cleaned text is a no-op. Any other backslash is escaped, so page text
//! can never introduce a LaTeX command.

use std::sync::LazyLock;

use regex::Regex;

/// Escape rules for one output position.
struct Rules {
    /// Characters that take a leading backslash.
    reserved: &'static [char],
    /// Replacement for a backslash that does not start an escape.
    backslash: &'static str,
    /// Wrap `[` and `]` in braces.
    wrap_brackets: bool,
}

/// Running text.
const TEXT: Rules = Rules {
    reserved: &['&', '%', '$', '#', '_'],
    backslash: r"\textbackslash{}",
    wrap_brackets: true,
};

/// `\href` targets. A backslash is percent-encoded, which is also what a
/// browser sends for it.
const URL: Rules = Rules {
    reserved: &['%', '#'],
    backslash: r"\%5C",
    wrap_brackets: false,
};

/// Trim, collapse whitespace and escape a text run.
pub fn clean_text(raw: &str) -> String {
    escape_text(&collapse_whitespace(raw.trim()))
}

/// Escape a text run without trimming it.
///
/// Brackets are wrapped in braces (`[` → `{[`, `]` → `]}`) so they survive
/// optional-argument parsing after commands such as `\item`.
pub fn escape_text(text: &str) -> String {
    escape(text, &TEXT)
}

/// Escape a URL for use as an `\href` target.
pub fn escape_url(url: &str) -> String {
    escape(url, &URL)
}

/// Replace every run of whitespace with a single space.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    WS_RE.replace_all(text, " ").into_owned()
}

fn escape(text: &str, rules: &Rules) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut prev: Option<char> = None;
    let mut pos = 0;

    while let Some(c) = text[pos..].chars().next() {
        let rest = &text[pos + c.len_utf8()..];
        let mut consumed = c.len_utf8();

        match c {
            '\\' if text[pos..].starts_with(rules.backslash) => {
                out.push_str(rules.backslash);
                consumed = rules.backslash.len();
            }
            '\\' => match rest.chars().next() {
                // Already escaped: copy the pair through.
                Some(next) if rules.reserved.contains(&next) => {
                    out.push('\\');
                    out.push(next);
                    consumed += next.len_utf8();
                }
                _ => out.push_str(rules.backslash),
            },
            c if rules.reserved.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            '[' if rules.wrap_brackets && prev != Some('{') => out.push_str("{["),
            ']' if rules.wrap_brackets && !rest.starts_with('}') => out.push_str("]}"),
            c => out.push(c),
        }

        pos += consumed;
        prev = text[..pos].chars().next_back();
    }

    out
}
