use super::error::DocumentError;
use super::token::{Attribute, Token};

/// Positional, forward-only cursor over a tag-structured document.
///
/// Implementors only supply [`next_token`](TagCursor::next_token) and
/// [`peek_token`](TagCursor::peek_token); the remaining methods are helpers
/// built on top of them. A cursor is owned by a single parse call at a time.
pub trait TagCursor {
    /// Consume and return the next token, or `None` at the end of the document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the underlying source is malformed.
    fn next_token(&mut self) -> Result<Option<Token>, DocumentError>;

    /// Return the next token without consuming it.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the underlying source is malformed.
    fn peek_token(&mut self) -> Result<Option<&Token>, DocumentError>;

    /// Skip whitespace-only text tokens.
    ///
    /// # Errors
    ///
    /// Propagates cursor errors.
    fn skip_blank_text(&mut self) -> Result<(), DocumentError> {
        while self.peek_token()?.is_some_and(Token::is_blank_text) {
            self.next_token()?;
        }
        Ok(())
    }

    /// Consume consecutive text tokens and return them concatenated.
    /// Returns an empty string when the next token is not text.
    ///
    /// # Errors
    ///
    /// Propagates cursor errors.
    fn read_text(&mut self) -> Result<String, DocumentError> {
        let mut text = String::new();
        while matches!(self.peek_token()?, Some(Token::Text(_))) {
            if let Some(Token::Text(chunk)) = self.next_token()? {
                text.push_str(&chunk);
            }
        }
        Ok(text)
    }

    /// Consume the closing boundary of `tag`, ignoring blank text before it.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnexpectedToken`] if anything else is found and
    /// [`DocumentError::UnexpectedEnd`] if the document ends first.
    fn expect_close(&mut self, tag: &str) -> Result<(), DocumentError> {
        self.skip_blank_text()?;
        match self.next_token()? {
            Some(Token::Close) => Ok(()),
            Some(other) => Err(DocumentError::UnexpectedToken {
                expected: format!("</{tag}>"),
                found: other.to_string(),
            }),
            None => Err(DocumentError::UnexpectedEnd {
                expected: format!("</{tag}>"),
            }),
        }
    }
}

/// Sink for a tag-structured document, the mirror image of [`TagCursor`].
pub trait TagWriter {
    /// Emit an opening boundary.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the sink rejects the token.
    fn open(&mut self, name: &str, attributes: &[Attribute]) -> Result<(), DocumentError>;

    /// Emit a text chunk inside the current element.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the sink rejects the token.
    fn text(&mut self, text: &str) -> Result<(), DocumentError>;

    /// Emit the closing boundary of the innermost open element.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Unbalanced`] if no element is open, for sinks
    /// that track nesting.
    fn close(&mut self) -> Result<(), DocumentError>;

    /// Replay a token onto this writer.
    ///
    /// # Errors
    ///
    /// Propagates writer errors.
    fn token(&mut self, token: &Token) -> Result<(), DocumentError> {
        match token {
            Token::Open { name, attributes } => self.open(name, attributes),
            Token::Text(text) => self.text(text),
            Token::Close => self.close(),
        }
    }
}
