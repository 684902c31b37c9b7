use std::fmt::Write as _;

use super::cursor::TagWriter;
use super::error::DocumentError;
use super::token::Attribute;

const INDENT: &str = "    ";

/// Renders tags into the text document format accepted by
/// [`parse`](super::parse).
///
/// Elements without a body are written bare (`allOf`), elements with text or
/// children get a braced body. Output is indented four spaces per level.
#[derive(Debug, Default)]
pub struct TextWriter {
    out: String,
    /// One entry per open element: whether its body brace was written.
    open: Vec<bool>,
}

impl TextWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the rendered document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Unbalanced`] if elements are still open.
    pub fn finish(self) -> Result<String, DocumentError> {
        if self.open.is_empty() {
            Ok(self.out)
        } else {
            Err(DocumentError::Unbalanced)
        }
    }

    fn begin_body(&mut self) {
        if let Some(has_body) = self.open.last_mut() {
            if !*has_body {
                self.out.push_str(" {\n");
                *has_body = true;
            }
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.open.len() {
            self.out.push_str(INDENT);
        }
    }
}

pub(crate) fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

impl TagWriter for TextWriter {
    fn open(&mut self, name: &str, attributes: &[Attribute]) -> Result<(), DocumentError> {
        self.begin_body();
        self.indent();
        self.out.push_str(name);
        if !attributes.is_empty() {
            self.out.push('(');
            for (i, attr) in attributes.iter().enumerate() {
                if i > 0 {
                    self.out.push_str(", ");
                }
                // Writing into a String cannot fail.
                let _ = write!(self.out, "{} = {}", attr.name, quote(&attr.value));
            }
            self.out.push(')');
        }
        self.open.push(false);
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), DocumentError> {
        if self.open.is_empty() {
            return Err(DocumentError::Unbalanced);
        }
        self.begin_body();
        self.indent();
        self.out.push_str(&quote(text));
        self.out.push('\n');
        Ok(())
    }

    fn close(&mut self) -> Result<(), DocumentError> {
        let has_body = self.open.pop().ok_or(DocumentError::Unbalanced)?;
        if has_body {
            self.indent();
            self.out.push_str("}\n");
        } else {
            self.out.push('\n');
        }
        Ok(())
    }
}
