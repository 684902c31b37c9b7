//! Reference leaf predicate matching text against a pattern.
//!
//! A [`TextMatcher`] is written as a `condition` element whose body is the
//! pattern and whose attributes carry the match options:
//!
//! ```text
//! condition(method = "wildcard", ignoreCase = "true") { "*.pdf" }
//! ```

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::document::TagWriter;
use crate::types::{BoxError, LeafCodec, LeafReader, LeafWriter, Predicate};

const METHOD: &str = "method";
const IGNORE_CASE: &str = "ignoreCase";
const IGNORE_DIACRITIC: &str = "ignoreDiacritic";
const PARTIAL: &str = "partial";
const TRIM: &str = "trim";
const MATCH_EMPTY: &str = "matchEmpty";

const ATTRIBUTES: [&str; 6] = [METHOD, IGNORE_CASE, IGNORE_DIACRITIC, PARTIAL, TRIM, MATCH_EMPTY];

#[derive(Debug, Error, PartialEq)]
pub enum TextMatcherError {
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("unknown match method '{0}'; expected basic, csv, wildcard or regex")]
    UnknownMethod(String),
}

/// How a pattern is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMethod {
    /// The pattern is matched literally.
    #[default]
    Basic,
    /// Comma-separated literal alternatives.
    Csv,
    /// `*` matches any run of characters, `?` any single character.
    Wildcard,
    /// The pattern is a regular expression.
    Regex,
}

impl MatchMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MatchMethod::Basic => "basic",
            MatchMethod::Csv => "csv",
            MatchMethod::Wildcard => "wildcard",
            MatchMethod::Regex => "regex",
        }
    }

    fn expression(self, pattern: &str) -> String {
        match self {
            MatchMethod::Basic => regex::escape(pattern),
            MatchMethod::Csv => pattern
                .split(',')
                .map(|part| regex::escape(part.trim()))
                .collect::<Vec<_>>()
                .join("|"),
            MatchMethod::Wildcard => {
                let mut expr = String::with_capacity(pattern.len() * 2);
                let mut literal = String::new();
                for c in pattern.chars() {
                    if c == '*' || c == '?' {
                        expr.push_str(&regex::escape(&literal));
                        literal.clear();
                        expr.push_str(if c == '*' { ".*" } else { "." });
                    } else {
                        literal.push(c);
                    }
                }
                expr.push_str(&regex::escape(&literal));
                expr
            }
            MatchMethod::Regex => pattern.to_owned(),
        }
    }
}

impl FromStr for MatchMethod {
    type Err = TextMatcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(MatchMethod::Basic),
            "csv" => Ok(MatchMethod::Csv),
            "wildcard" => Ok(MatchMethod::Wildcard),
            "regex" => Ok(MatchMethod::Regex),
            _ => Err(TextMatcherError::UnknownMethod(s.to_owned())),
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options of a [`TextMatcher`], compiled with [`compile`](Self::compile).
///
/// ```
/// use condflow::text::{MatchMethod, TextMatcher};
///
/// let matcher = TextMatcher::builder(MatchMethod::Wildcard)
///     .pattern("*.PDF")
///     .ignore_case(true)
///     .compile()
///     .unwrap();
///
/// assert!(matcher.matches("report.pdf"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[must_use]
pub struct MatchOptions {
    method: MatchMethod,
    pattern: Option<String>,
    ignore_case: bool,
    ignore_diacritic: bool,
    partial: bool,
    trim: bool,
    match_empty: bool,
}

impl MatchOptions {
    pub fn method(mut self, method: MatchMethod) -> Self {
        self.method = method;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Compare pattern and text with accents and other combining marks removed.
    pub fn ignore_diacritic(mut self, ignore_diacritic: bool) -> Self {
        self.ignore_diacritic = ignore_diacritic;
        self
    }

    /// Match anywhere in the text instead of the whole text.
    pub fn partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    /// Trim surrounding whitespace from the text before matching.
    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Whether empty text (after trimming) matches.
    pub fn match_empty(mut self, match_empty: bool) -> Self {
        self.match_empty = match_empty;
        self
    }

    /// # Errors
    ///
    /// Returns [`TextMatcherError::InvalidPattern`] if the pattern does not
    /// compile to a regular expression.
    pub fn compile(self) -> Result<TextMatcher, TextMatcherError> {
        let regex = match &self.pattern {
            None => None,
            Some(pattern) => {
                let expr = if self.ignore_diacritic {
                    self.method.expression(&strip_diacritics(pattern))
                } else {
                    self.method.expression(pattern)
                };
                let expr = if self.partial {
                    expr
                } else {
                    format!("^(?:{expr})$")
                };
                Some(
                    RegexBuilder::new(&expr)
                        .case_insensitive(self.ignore_case)
                        .dot_matches_new_line(true)
                        .build()?,
                )
            }
        };
        Ok(TextMatcher {
            options: self,
            regex,
        })
    }
}

/// Leaf predicate testing a string against a pattern.
///
/// Without a pattern every text matches. Empty text (after optional
/// trimming) matches only when `match_empty` is set.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    options: MatchOptions,
    regex: Option<Regex>,
}

impl TextMatcher {
    /// Start building a matcher using `method`.
    pub fn builder(method: MatchMethod) -> MatchOptions {
        MatchOptions::default().method(method)
    }

    /// Matcher without a pattern; matches everything.
    #[must_use]
    pub fn any() -> Self {
        Self {
            options: MatchOptions::default(),
            regex: None,
        }
    }

    /// # Errors
    ///
    /// Never fails for literal patterns; kept fallible for symmetry.
    pub fn basic(pattern: &str) -> Result<Self, TextMatcherError> {
        Self::builder(MatchMethod::Basic).pattern(pattern).compile()
    }

    /// # Errors
    ///
    /// See [`MatchOptions::compile`].
    pub fn csv(pattern: &str) -> Result<Self, TextMatcherError> {
        Self::builder(MatchMethod::Csv).pattern(pattern).compile()
    }

    /// # Errors
    ///
    /// See [`MatchOptions::compile`].
    pub fn wildcard(pattern: &str) -> Result<Self, TextMatcherError> {
        Self::builder(MatchMethod::Wildcard).pattern(pattern).compile()
    }

    /// # Errors
    ///
    /// Returns [`TextMatcherError::InvalidPattern`] for a malformed expression.
    pub fn regex(pattern: &str) -> Result<Self, TextMatcherError> {
        Self::builder(MatchMethod::Regex).pattern(pattern).compile()
    }

    #[must_use]
    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    #[must_use]
    pub fn method(&self) -> MatchMethod {
        self.options.method
    }

    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.options.pattern.as_deref()
    }

    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        let Some(regex) = &self.regex else {
            return true;
        };
        let text = if self.options.trim { text.trim() } else { text };
        if text.is_empty() {
            return self.options.match_empty;
        }
        if self.options.ignore_diacritic {
            regex.is_match(&strip_diacritics(text))
        } else {
            regex.is_match(text)
        }
    }
}

/// Canonical decomposition with combining marks dropped: `"café"` becomes `"cafe"`.
fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|&c| !is_combining_mark(c)).collect()
}

impl PartialEq for TextMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.options == other.options
    }
}

impl Eq for TextMatcher {}

impl Predicate<str> for TextMatcher {
    type Error = Infallible;

    fn test(&self, context: &str) -> Result<bool, Infallible> {
        Ok(self.matches(context))
    }
}

impl Predicate<String> for TextMatcher {
    type Error = Infallible;

    fn test(&self, context: &String) -> Result<bool, Infallible> {
        Ok(self.matches(context))
    }
}

impl LeafCodec for TextMatcher {
    fn read_leaf(leaf: &mut LeafReader<'_>) -> Result<Self, BoxError> {
        leaf.only_attributes(&ATTRIBUTES)?;
        let method = match leaf.attribute(METHOD) {
            Some(name) => name.parse()?,
            None => MatchMethod::Basic,
        };
        let mut options = Self::builder(method)
            .ignore_case(leaf.bool_attribute(IGNORE_CASE, false)?)
            .ignore_diacritic(leaf.bool_attribute(IGNORE_DIACRITIC, false)?)
            .partial(leaf.bool_attribute(PARTIAL, false)?)
            .trim(leaf.bool_attribute(TRIM, false)?)
            .match_empty(leaf.bool_attribute(MATCH_EMPTY, false)?);
        if let Some(pattern) = leaf.text()? {
            options = options.pattern(pattern);
        }
        Ok(options.compile()?)
    }

    fn write_leaf(&self, leaf: &mut LeafWriter) -> Result<(), BoxError> {
        let options = &self.options;
        if options.method != MatchMethod::Basic {
            leaf.attribute(METHOD, options.method.as_str());
        }
        for (name, set) in [
            (IGNORE_CASE, options.ignore_case),
            (IGNORE_DIACRITIC, options.ignore_diacritic),
            (PARTIAL, options.partial),
            (TRIM, options.trim),
            (MATCH_EMPTY, options.match_empty),
        ] {
            if set {
                leaf.attribute(name, "true");
            }
        }
        if let Some(pattern) = &options.pattern {
            leaf.text(pattern)?;
        }
        Ok(())
    }
}

impl fmt::Display for TextMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.options.pattern {
            Some(pattern) => write!(f, "{}({pattern:?})", self.options.method),
            None => f.write_str("*"),
        }
    }
}
