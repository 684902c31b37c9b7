use crate::document::{Attribute, DocumentError, TagCursor, TagWriter, Token, TokenStream};

use super::registry::CONDITION;

/// Boxed error returned by leaf constructors and leaf writers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A leaf test over a context of type `T`.
///
/// The engine calls [`test`](Predicate::test) with a shared reference and
/// never mutates the predicate. Errors are returned to the caller of
/// [`Condition::evaluate`](crate::Condition::evaluate) unchanged; use
/// [`std::convert::Infallible`] for predicates that cannot fail.
pub trait Predicate<T: ?Sized> {
    type Error;

    /// # Errors
    ///
    /// Returns `Self::Error` if the predicate cannot be decided for `context`.
    fn test(&self, context: &T) -> Result<bool, Self::Error>;
}

/// Reading and writing of a leaf predicate's serialized form.
///
/// A leaf is written as one element: [`tag`](LeafCodec::tag) is its name,
/// the attributes and body come from [`write_leaf`](LeafCodec::write_leaf).
/// [`read_leaf`](LeafCodec::read_leaf) must accept whatever `write_leaf`
/// produces.
pub trait LeafCodec: Sized {
    /// Tag name this leaf is written under.
    fn tag(&self) -> &str {
        CONDITION
    }

    /// Build a predicate from an element whose opening tag was just consumed.
    /// The body (text and child elements) must be consumed; the closing tag
    /// must not.
    ///
    /// # Errors
    ///
    /// Any error is reported as a leaf construction failure for the element.
    fn read_leaf(leaf: &mut LeafReader<'_>) -> Result<Self, BoxError>;

    /// Write attributes and body of this predicate.
    ///
    /// # Errors
    ///
    /// Any error is reported as a leaf write failure.
    fn write_leaf(&self, leaf: &mut LeafWriter) -> Result<(), BoxError>;
}

/// View of a leaf element handed to leaf constructors.
pub struct LeafReader<'a> {
    tag: &'a str,
    attributes: &'a [Attribute],
    cursor: &'a mut dyn TagCursor,
}

impl<'a> LeafReader<'a> {
    pub fn new(tag: &'a str, attributes: &'a [Attribute], cursor: &'a mut dyn TagCursor) -> Self {
        Self {
            tag,
            attributes,
            cursor,
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        self.tag
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        self.attributes
    }

    /// Value of the first attribute named `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// # Errors
    ///
    /// Returns [`DocumentError::MissingAttribute`] if the attribute is absent.
    pub fn required_attribute(&self, name: &str) -> Result<&str, DocumentError> {
        self.attribute(name)
            .ok_or_else(|| DocumentError::MissingAttribute {
                tag: self.tag.to_owned(),
                attribute: name.to_owned(),
            })
    }

    /// Check that every attribute on the element is one of `known`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnknownAttribute`] for the first other name.
    pub fn only_attributes(&self, known: &[&str]) -> Result<(), DocumentError> {
        match self
            .attributes
            .iter()
            .find(|a| !known.contains(&a.name.as_str()))
        {
            Some(unknown) => Err(DocumentError::UnknownAttribute {
                tag: self.tag.to_owned(),
                attribute: unknown.name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Boolean attribute: `"true"` or `"false"`, `default` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidAttribute`] for any other value.
    pub fn bool_attribute(&self, name: &str, default: bool) -> Result<bool, DocumentError> {
        match self.attribute(name) {
            None => Ok(default),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(DocumentError::InvalidAttribute {
                tag: self.tag.to_owned(),
                attribute: name.to_owned(),
                value: other.to_owned(),
            }),
        }
    }

    /// Text content at the current position, `None` if the body holds no text.
    ///
    /// # Errors
    ///
    /// Propagates cursor errors.
    pub fn text(&mut self) -> Result<Option<String>, DocumentError> {
        if matches!(self.cursor.peek_token()?, Some(Token::Text(_))) {
            self.cursor.read_text().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Direct access to the cursor for leaves with nested elements.
    pub fn cursor(&mut self) -> &mut dyn TagCursor {
        &mut *self.cursor
    }
}

/// Collects a leaf's attributes and body while it is being written.
#[derive(Debug, Default)]
pub struct LeafWriter {
    attributes: Vec<Attribute>,
    body: TokenStream,
    depth: usize,
}

impl LeafWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute to the leaf's opening tag.
    pub fn attribute(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Split into opening-tag attributes and body tokens.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Unbalanced`] if the body left elements open.
    pub fn into_parts(self) -> Result<(Vec<Attribute>, TokenStream), DocumentError> {
        if self.depth == 0 {
            Ok((self.attributes, self.body))
        } else {
            Err(DocumentError::Unbalanced)
        }
    }
}

impl TagWriter for LeafWriter {
    fn open(&mut self, name: &str, attributes: &[Attribute]) -> Result<(), DocumentError> {
        self.depth += 1;
        self.body.open(name, attributes)
    }

    fn text(&mut self, text: &str) -> Result<(), DocumentError> {
        self.body.text(text)
    }

    fn close(&mut self) -> Result<(), DocumentError> {
        if self.depth == 0 {
            return Err(DocumentError::Unbalanced);
        }
        self.depth -= 1;
        self.body.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> Vec<Attribute> {
        vec![
            Attribute::new("field", "title"),
            Attribute::new("partial", "true"),
            Attribute::new("trim", "yes"),
        ]
    }

    #[test]
    fn attribute_lookup() {
        let attrs = attrs();
        let mut cursor = TokenStream::new();
        let leaf = LeafReader::new("condition", &attrs, &mut cursor);
        assert_eq!(leaf.tag(), "condition");
        assert_eq!(leaf.attribute("field"), Some("title"));
        assert_eq!(leaf.attribute("missing"), None);
        assert_eq!(leaf.required_attribute("field").unwrap(), "title");
        assert_eq!(
            leaf.required_attribute("missing").unwrap_err(),
            DocumentError::MissingAttribute {
                tag: "condition".into(),
                attribute: "missing".into(),
            }
        );
    }

    #[test]
    fn bool_attributes() {
        let attrs = attrs();
        let mut cursor = TokenStream::new();
        let leaf = LeafReader::new("condition", &attrs, &mut cursor);
        assert!(leaf.bool_attribute("partial", false).unwrap());
        assert!(leaf.bool_attribute("absent", true).unwrap());
        assert!(matches!(
            leaf.bool_attribute("trim", false),
            Err(DocumentError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn only_known_attributes() {
        let attrs = attrs();
        let mut cursor = TokenStream::new();
        let leaf = LeafReader::new("condition", &attrs, &mut cursor);
        assert!(leaf.only_attributes(&["field", "partial", "trim"]).is_ok());
        assert_eq!(
            leaf.only_attributes(&["field", "partial"]).unwrap_err(),
            DocumentError::UnknownAttribute {
                tag: "condition".into(),
                attribute: "trim".into(),
            }
        );
    }

    #[test]
    fn text_reads_only_leading_text() {
        let mut cursor: TokenStream = vec![Token::Text("abc".into()), Token::Close].into();
        let mut leaf = LeafReader::new("condition", &[], &mut cursor);
        assert_eq!(leaf.text().unwrap(), Some("abc".to_owned()));
        assert_eq!(leaf.text().unwrap(), None);
        assert_eq!(cursor.len(), 1);
    }

    #[test]
    fn writer_collects_parts() {
        let mut leaf = LeafWriter::new();
        leaf.attribute("method", "regex");
        leaf.open("field", &[]).unwrap();
        leaf.text("title").unwrap();
        leaf.close().unwrap();
        let (attributes, body) = leaf.into_parts().unwrap();
        assert_eq!(attributes, vec![Attribute::new("method", "regex")]);
        assert_eq!(body.len(), 3);
    }

    #[test]
    fn writer_rejects_unbalanced_body() {
        let mut leaf = LeafWriter::new();
        assert_eq!(leaf.close(), Err(DocumentError::Unbalanced));
        leaf.open("field", &[]).unwrap();
        assert_eq!(leaf.into_parts().unwrap_err(), DocumentError::Unbalanced);
    }
}
