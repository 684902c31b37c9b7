use std::collections::VecDeque;
use std::fmt;

use super::cursor::{TagCursor, TagWriter};
use super::error::DocumentError;

/// A `name = "value"` pair attached to an opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One event of a tag-structured document.
///
/// Every `Open` is balanced by exactly one `Close`; anything between them is
/// the element's body (text and child elements, in document order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Open {
        name: String,
        attributes: Vec<Attribute>,
    },
    Text(String),
    Close,
}

impl Token {
    #[must_use]
    pub fn open(name: impl Into<String>) -> Self {
        Token::Open {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// `true` for text tokens made only of whitespace.
    #[must_use]
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Token::Text(t) if t.trim().is_empty())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Open { name, .. } => write!(f, "<{name}>"),
            Token::Text(text) => write!(f, "text {text:?}"),
            Token::Close => write!(f, "closing tag"),
        }
    }
}

/// In-memory token sequence. Acts as a [`TagCursor`] (consuming from the
/// front) and as a [`TagWriter`] (appending to the back).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: VecDeque<Token>,
}

impl TokenStream {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Remaining tokens, front first.
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens.into()
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push_back(token);
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into(),
        }
    }
}

impl FromIterator<Token> for TokenStream {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl TagCursor for TokenStream {
    fn next_token(&mut self) -> Result<Option<Token>, DocumentError> {
        Ok(self.tokens.pop_front())
    }

    fn peek_token(&mut self) -> Result<Option<&Token>, DocumentError> {
        Ok(self.tokens.front())
    }
}

impl TagWriter for TokenStream {
    fn open(&mut self, name: &str, attributes: &[Attribute]) -> Result<(), DocumentError> {
        self.tokens.push_back(Token::Open {
            name: name.to_owned(),
            attributes: attributes.to_vec(),
        });
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), DocumentError> {
        self.tokens.push_back(Token::Text(text.to_owned()));
        Ok(())
    }

    fn close(&mut self) -> Result<(), DocumentError> {
        self.tokens.push_back(Token::Close);
        Ok(())
    }
}
