//! Delimiter recognition for math spans in prose text
//!
//! Builds the regexes that locate inline/block math spans under a
//! configurable delimiter scheme and extracts `(outer span, inner latex)`
//! matches. The dollar patterns carry a currency guard: content that
//! starts with a digit must not contain whitespace, so `$10 ($5)` and
//! `One scoop is $2 and two are $3` never read as math while `$1.5$` and
//! `$\$120$` do. Escaped delimiters (`\$`, and escaped pairs inside
//! bracket spans) never terminate a span.

use lazy_static::lazy_static;
use regex::Regex;

use crate::utils::error::{EvalError, EvalResult};

lazy_static! {
    /// `$...$` on a single line; content has no unescaped `$`
    static ref DOLLAR_INLINE: Regex = Regex::new(
        r"\$((?:\\\$|\\[^$\n]|[^0-9$\s\\])(?:\\\$|[^$\n])*?|[0-9](?:\\\$|[^$\s])*?)\$"
    )
    .unwrap();
    /// `$$...$$`, newlines allowed inside
    static ref DOLLAR_BLOCK: Regex = Regex::new(
        r"\$\$((?:\\\$|\\[^$]|[^0-9$\s\\])(?:\\\$|[^$])*?|[0-9](?:\\\$|[^$\s])*?)\$\$"
    )
    .unwrap();
    /// `\(...\)`; escaped pairs are consumed atomically so an escaped
    /// close cannot end the span
    static ref BRACKET_INLINE: Regex = Regex::new(r"(?s)\\\(((?:\\.|[^\\])*?)\\\)").unwrap();
    /// `\[...\]`
    static ref BRACKET_BLOCK: Regex = Regex::new(r"(?s)\\\[((?:\\.|[^\\])*?)\\\]").unwrap();
}

/// Which of the two span flavors a pattern recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Inline,
    Block,
}

/// Caller-supplied delimiter overrides. The math content is expected to be
/// capture group 1 of the supplied regexes; a missing regex falls back to
/// the dollar pattern of the same kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomDelimiters {
    pub inline_regex: Option<String>,
    pub block_regex: Option<String>,
    pub inline_start: Option<String>,
    pub inline_end: Option<String>,
    pub block_start: Option<String>,
    pub block_end: Option<String>,
}

/// Configured convention for recognizing math spans
#[derive(Debug, Clone, PartialEq)]
pub enum DelimiterScheme {
    /// `$x_1$` and `$$\sum_i i$$`
    Dollar,
    /// `\(x_1\)` and `\[\sum_i i\]`
    Bracket,
    /// Raw inline/block regexes supplied by the caller
    Custom(CustomDelimiters),
}

impl Default for DelimiterScheme {
    fn default() -> Self {
        DelimiterScheme::Dollar
    }
}

/// One recognized math span: byte offsets of the outer span (delimiters
/// included) and the inner latex source.
#[derive(Debug, Clone, PartialEq)]
pub struct MathSpan {
    pub start: usize,
    pub end: usize,
    pub latex: String,
}

impl MathSpan {
    /// Length of the outer span in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Build the matcher for one span kind under the given scheme.
pub fn build_pattern(kind: PatternKind, scheme: &DelimiterScheme) -> EvalResult<Regex> {
    match (scheme, kind) {
        (DelimiterScheme::Dollar, PatternKind::Inline) => Ok(DOLLAR_INLINE.clone()),
        (DelimiterScheme::Dollar, PatternKind::Block) => Ok(DOLLAR_BLOCK.clone()),
        (DelimiterScheme::Bracket, PatternKind::Inline) => Ok(BRACKET_INLINE.clone()),
        (DelimiterScheme::Bracket, PatternKind::Block) => Ok(BRACKET_BLOCK.clone()),
        (DelimiterScheme::Custom(custom), kind) => {
            let source = match kind {
                PatternKind::Inline => custom.inline_regex.as_deref(),
                PatternKind::Block => custom.block_regex.as_deref(),
            };
            match source {
                None => build_pattern(kind, &DelimiterScheme::Dollar),
                Some(source) => {
                    let re = Regex::new(source).map_err(|e| EvalError::pattern(e.to_string()))?;
                    if re.captures_len() < 2 {
                        return Err(EvalError::pattern(
                            "custom pattern must capture the math content as group 1",
                        ));
                    }
                    Ok(re)
                }
            }
        }
    }
}

/// The textual delimiters for re-serializing a span under this scheme.
pub fn delimiter_pair(kind: PatternKind, scheme: &DelimiterScheme) -> (String, String) {
    match (scheme, kind) {
        (DelimiterScheme::Dollar, PatternKind::Inline) => ("$".into(), "$".into()),
        (DelimiterScheme::Dollar, PatternKind::Block) => ("$$".into(), "$$".into()),
        (DelimiterScheme::Bracket, PatternKind::Inline) => ("\\(".into(), "\\)".into()),
        (DelimiterScheme::Bracket, PatternKind::Block) => ("\\[".into(), "\\]".into()),
        (DelimiterScheme::Custom(custom), PatternKind::Inline) => (
            custom.inline_start.clone().unwrap_or_else(|| "$".into()),
            custom.inline_end.clone().unwrap_or_else(|| "$".into()),
        ),
        (DelimiterScheme::Custom(custom), PatternKind::Block) => (
            custom.block_start.clone().unwrap_or_else(|| "$$".into()),
            custom.block_end.clone().unwrap_or_else(|| "$$".into()),
        ),
    }
}

/// All non-overlapping spans, left to right (paste handling).
pub fn find_spans(text: &str, pattern: &Regex) -> Vec<MathSpan> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| {
            let outer = caps.get(0)?;
            let inner = caps.get(1)?;
            Some(MathSpan {
                start: outer.start(),
                end: outer.end(),
                latex: inner.as_str().to_string(),
            })
        })
        .collect()
}

/// First span only (typing-time conversion).
pub fn find_first(text: &str, pattern: &Regex) -> Option<MathSpan> {
    find_spans(text, pattern).into_iter().next()
}
