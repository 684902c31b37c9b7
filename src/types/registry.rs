use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use super::condition::Junction;
use super::error::ReadError;
use super::leaf::{BoxError, LeafCodec, LeafReader};

/// Tag of the built-in leaf statement.
pub const CONDITION: &str = "condition";
/// Tag of the built-in AND statement.
pub const ALL_OF: &str = "allOf";
/// Tag of the built-in OR statement.
pub const ANY_OF: &str = "anyOf";

/// The built-in statements, always permitted inside `allOf` and `anyOf`.
pub const BUILT_IN: [&str; 3] = [CONDITION, ALL_OF, ANY_OF];

/// Constructor for a leaf statement.
pub type LeafFactory<P> = Arc<dyn Fn(&mut LeafReader<'_>) -> Result<P, BoxError> + Send + Sync>;

/// What a registered tag produces when read.
pub enum Statement<P> {
    Junction(Junction),
    Leaf(LeafFactory<P>),
}

impl<P> Clone for Statement<P> {
    fn clone(&self) -> Self {
        match self {
            Statement::Junction(j) => Statement::Junction(*j),
            Statement::Leaf(f) => Statement::Leaf(Arc::clone(f)),
        }
    }
}

impl<P> fmt::Debug for Statement<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Junction(j) => f.debug_tuple("Junction").field(j).finish(),
            Statement::Leaf(_) => f.write_str("Leaf(..)"),
        }
    }
}

/// Tag-name lookup table driving the condition reader.
///
/// Maps each tag to its [`Statement`] and each composite tag to the tags
/// permitted as its direct children. Tag names are case-sensitive. Built once,
/// then shared read-only across any number of reads.
///
/// # Example
///
/// ```
/// use condflow::{Junction, StatementRegistry, text::TextMatcher};
///
/// let registry = StatementRegistry::<TextMatcher>::new()
///     .with_composite("and", Junction::All)
///     .allow("anyOf", "and");
///
/// assert!(registry.is_allowed_child("anyOf", "and"));
/// assert!(!registry.is_allowed_child("allOf", "and"));
/// ```
pub struct StatementRegistry<P> {
    statements: HashMap<String, Statement<P>>,
    allowed: HashMap<String, Vec<String>>,
}

impl<P: LeafCodec + 'static> StatementRegistry<P> {
    /// Registry with `condition` (read through [`LeafCodec::read_leaf`]),
    /// `allOf` and `anyOf`.
    #[must_use]
    pub fn new() -> Self {
        Self::bare().with_leaf(CONDITION, P::read_leaf)
    }
}

impl<P: LeafCodec + 'static> Default for StatementRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> StatementRegistry<P> {
    /// Registry with `allOf` and `anyOf` only. The `condition` tag is already
    /// permitted inside both but has no handler until one is registered with
    /// [`with_leaf`](Self::with_leaf).
    #[must_use]
    pub fn bare() -> Self {
        let mut registry = Self {
            statements: HashMap::new(),
            allowed: HashMap::new(),
        };
        registry.insert_composite(ALL_OF, Junction::All);
        registry.insert_composite(ANY_OF, Junction::Any);
        registry
    }

    /// Register a leaf statement. The tag is not permitted anywhere until
    /// [`allow`](Self::allow) is called, except `condition`, which is built in.
    ///
    /// Registering `condition` replaces its constructor. `allOf` and `anyOf`
    /// cannot be redefined; such calls are ignored.
    #[must_use]
    pub fn with_leaf<F>(mut self, tag: &str, factory: F) -> Self
    where
        F: Fn(&mut LeafReader<'_>) -> Result<P, BoxError> + Send + Sync + 'static,
    {
        if tag == ALL_OF || tag == ANY_OF {
            warn!(tag, "built-in composite cannot be registered as a leaf");
            return self;
        }
        self.statements
            .insert(tag.to_owned(), Statement::Leaf(Arc::new(factory)));
        self
    }

    /// Register a composite statement evaluated like `allOf` or `anyOf`.
    /// Its permitted children start as the built-in statements. Built-in tags
    /// cannot be redefined; such calls are ignored.
    #[must_use]
    pub fn with_composite(mut self, tag: &str, junction: Junction) -> Self {
        if BUILT_IN.contains(&tag) {
            warn!(tag, "built-in statement cannot be redefined as a composite");
            return self;
        }
        self.insert_composite(tag, junction);
        self
    }

    /// Permit `child` as a direct child of `parent`.
    #[must_use]
    pub fn allow(mut self, parent: &str, child: &str) -> Self {
        let children = self.allowed.entry(parent.to_owned()).or_default();
        if !children.iter().any(|c| c == child) {
            children.push(child.to_owned());
        }
        self
    }

    /// Look up the statement registered for `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::UnknownStatement`] if `tag` is not registered.
    pub fn handler_for(&self, tag: &str) -> Result<&Statement<P>, ReadError> {
        self.statements
            .get(tag)
            .ok_or_else(|| ReadError::UnknownStatement {
                tag: tag.to_owned(),
            })
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.statements.contains_key(tag)
    }

    #[must_use]
    pub fn is_allowed_child(&self, parent: &str, tag: &str) -> bool {
        self.allowed_children(parent).iter().any(|c| c == tag)
    }

    /// Tags permitted as direct children of `parent`, in registration order.
    #[must_use]
    pub fn allowed_children(&self, parent: &str) -> &[String] {
        self.allowed.get(parent).map_or(&[], Vec::as_slice)
    }

    fn insert_composite(&mut self, tag: &str, junction: Junction) {
        self.statements
            .insert(tag.to_owned(), Statement::Junction(junction));
        let children = self.allowed.entry(tag.to_owned()).or_default();
        for built_in in BUILT_IN {
            if !children.iter().any(|c| c == built_in) {
                children.push(built_in.to_owned());
            }
        }
    }
}

impl<P> fmt::Debug for StatementRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.statements.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("StatementRegistry")
            .field("statements", &tags)
            .field("allowed", &self.allowed)
            .finish()
    }
}
