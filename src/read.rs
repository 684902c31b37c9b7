use tracing::{debug, trace};

use crate::document::{Attribute, DocumentError, TagCursor, Token};
use crate::types::{Condition, LeafReader, ReadError, Statement, StatementRegistry};

/// Nesting limit applied by [`read_condition`] and [`ConditionReader::new`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Recursive-descent reader turning a tag cursor into a [`Condition`] tree.
///
/// Every tag is resolved through the [`StatementRegistry`]; a composite only
/// accepts the children the registry permits for it. Reading stops at the
/// first error and never returns a partial tree.
///
/// # Example
///
/// ```
/// use condflow::{document, ConditionReader, StatementRegistry, text::TextMatcher};
///
/// let registry = StatementRegistry::<TextMatcher>::new();
/// let mut stream = document::parse(r#"anyOf { condition { "a" } condition { "b" } }"#).unwrap();
/// let condition = ConditionReader::new(&registry)
///     .max_depth(8)
///     .read(&mut stream)
///     .unwrap();
///
/// assert!(condition.evaluate("b").unwrap());
/// ```
#[derive(Debug)]
pub struct ConditionReader<'r, P> {
    registry: &'r StatementRegistry<P>,
    max_depth: usize,
}

/// Tags permitted under the element being read.
enum Permitted<'a> {
    Registry(&'a [String]),
    Explicit(&'a [&'a str]),
}

impl Permitted<'_> {
    fn contains(&self, tag: &str) -> bool {
        match self {
            Permitted::Registry(tags) => tags.iter().any(|t| t == tag),
            Permitted::Explicit(tags) => tags.contains(&tag),
        }
    }

    fn to_vec(&self) -> Vec<String> {
        match self {
            Permitted::Registry(tags) => tags.to_vec(),
            Permitted::Explicit(tags) => tags.iter().map(|t| (*t).to_owned()).collect(),
        }
    }
}

impl<'r, P> ConditionReader<'r, P> {
    #[must_use]
    pub fn new(registry: &'r StatementRegistry<P>) -> Self {
        Self {
            registry,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Maximum nesting depth; the root element is depth 1.
    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &'r StatementRegistry<P> {
        self.registry
    }

    /// Read one condition subtree starting at the cursor's next element.
    /// Tokens after that element are left unread.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] for unknown or misplaced tags, leaf construction
    /// failures, excessive nesting, and malformed token streams.
    pub fn read(&self, cursor: &mut dyn TagCursor) -> Result<Condition<P>, ReadError> {
        self.read_root(cursor).inspect_err(|e| {
            debug!(error = %e, "condition rejected");
        })
    }

    /// Read the children of an element whose opening tag was already
    /// consumed, up to and including its closing tag, permitting only
    /// `allowed` as direct children.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn read_within(
        &self,
        cursor: &mut dyn TagCursor,
        parent: &str,
        allowed: &[&str],
    ) -> Result<Vec<Condition<P>>, ReadError> {
        self.read_children(cursor, parent, &Permitted::Explicit(allowed), 1)
            .inspect_err(|e| {
                debug!(parent, error = %e, "condition rejected");
            })
    }

    fn read_root(&self, cursor: &mut dyn TagCursor) -> Result<Condition<P>, ReadError> {
        cursor.skip_blank_text()?;
        match cursor.next_token()? {
            Some(Token::Open { name, attributes }) => {
                self.read_element(cursor, &name, &attributes, 1)
            }
            Some(other) => Err(DocumentError::UnexpectedToken {
                expected: "opening tag of a condition".to_owned(),
                found: other.to_string(),
            }
            .into()),
            None => Err(DocumentError::UnexpectedEnd {
                expected: "opening tag of a condition".to_owned(),
            }
            .into()),
        }
    }

    fn read_element(
        &self,
        cursor: &mut dyn TagCursor,
        name: &str,
        attributes: &[Attribute],
        depth: usize,
    ) -> Result<Condition<P>, ReadError> {
        if depth > self.max_depth {
            return Err(ReadError::TooDeep {
                limit: self.max_depth,
            });
        }

        match self.registry.handler_for(name)? {
            Statement::Junction(junction) => {
                trace!(tag = name, depth, "open");
                let permitted = Permitted::Registry(self.registry.allowed_children(name));
                let children = self.read_children(cursor, name, &permitted, depth)?;
                trace!(tag = name, depth, children = children.len(), "close");
                Ok(junction.build(children))
            }
            Statement::Leaf(factory) => {
                let mut leaf = LeafReader::new(name, attributes, &mut *cursor);
                let predicate = factory(&mut leaf).map_err(|source| ReadError::Leaf {
                    tag: name.to_owned(),
                    source,
                })?;
                cursor.expect_close(name)?;
                trace!(tag = name, depth, "leaf");
                Ok(Condition::Leaf(predicate))
            }
        }
    }

    fn read_children(
        &self,
        cursor: &mut dyn TagCursor,
        parent: &str,
        permitted: &Permitted<'_>,
        depth: usize,
    ) -> Result<Vec<Condition<P>>, ReadError> {
        let mut children = Vec::new();
        loop {
            match cursor.next_token()? {
                Some(Token::Close) => return Ok(children),
                Some(Token::Open { name, attributes }) => {
                    self.registry.handler_for(&name)?;
                    if !permitted.contains(&name) {
                        return Err(ReadError::Structural {
                            tag: name,
                            parent: parent.to_owned(),
                            allowed: permitted.to_vec(),
                        });
                    }
                    children.push(self.read_element(cursor, &name, &attributes, depth + 1)?);
                }
                Some(Token::Text(text)) if text.trim().is_empty() => {}
                Some(other) => {
                    return Err(DocumentError::UnexpectedToken {
                        expected: format!("child element or </{parent}>"),
                        found: other.to_string(),
                    }
                    .into())
                }
                None => {
                    return Err(DocumentError::UnexpectedEnd {
                        expected: format!("</{parent}>"),
                    }
                    .into())
                }
            }
        }
    }
}

/// Read one condition subtree with the default reader settings.
///
/// # Errors
///
/// See [`ConditionReader::read`].
pub fn read_condition<P>(
    cursor: &mut dyn TagCursor,
    registry: &StatementRegistry<P>,
) -> Result<Condition<P>, ReadError> {
    ConditionReader::new(registry).read(cursor)
}
