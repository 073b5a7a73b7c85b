use crate::expression::token::OperatorToken;

use indexmap::IndexMap;
use std::hash;

/// Map for selecting nested attributes in projection expressions.
///
/// ```rust
/// use dynamodb_entity::expression::projection::SelectionMap;
/// use indexmap::IndexMap;
///
/// let selection = SelectionMap::Node(IndexMap::from([(
///     "address".to_string(),
///     SelectionMap::Leaves(vec!["city".to_string(), "zip".to_string()]),
/// )]));
/// assert_eq!(selection.into_paths(), ["address.city", "address.zip"]);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SelectionMap {
    /// Leaf selection - a flat list of attribute names to select.
    Leaves(Vec<String>),
    /// Node selection - nested selection for hierarchical attribute paths.
    Node(IndexMap<String, SelectionMap>),
}

impl hash::Hash for SelectionMap {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        match self {
            Self::Leaves(leaves) => leaves.hash(state),
            Self::Node(map) => map.iter().for_each(|(key, value)| {
                key.hash(state);
                value.hash(state);
            }),
        }
    }
}

impl SelectionMap {
    /// Flatten into dotted paths, depth first.
    pub fn into_paths(self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths("", &mut paths);
        paths
    }

    fn collect_paths(self, parent: &str, paths: &mut Vec<String>) {
        let join = |key: &str| {
            if parent.is_empty() {
                key.to_string()
            } else {
                format!("{parent}.{key}")
            }
        };
        match self {
            Self::Leaves(leaves) => paths.extend(leaves.iter().map(|leaf| join(leaf))),
            Self::Node(map) => {
                for (key, value) in map {
                    value.collect_paths(&join(&key), paths);
                }
            }
        }
    }
}

/// Attributes to return, rendered as a comma-separated `ProjectionExpression`.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Projection {
    paths: Vec<String>,
}

impl Projection {
    /// Empty projection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `path`; a path selected twice is rendered once.
    pub fn attribute(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
        self
    }

    /// Whether no attribute was selected.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl From<SelectionMap> for Projection {
    fn from(selection: SelectionMap) -> Self {
        selection
            .into_paths()
            .into_iter()
            .fold(Self::new(), Self::attribute)
    }
}

impl<S: Into<String>> FromIterator<S> for Projection {
    fn from_iter<I: IntoIterator<Item = S>>(paths: I) -> Self {
        paths.into_iter().fold(Self::new(), Self::attribute)
    }
}

impl IntoIterator for Projection {
    type Item = OperatorToken;
    type IntoIter = std::vec::IntoIter<OperatorToken>;

    fn into_iter(self) -> Self::IntoIter {
        let mut tokens = Vec::with_capacity(self.paths.len() * 2);
        for path in self.paths {
            if !tokens.is_empty() {
                tokens.push(OperatorToken::Literal(", "));
            }
            tokens.push(OperatorToken::Name(path));
        }
        tokens.into_iter()
    }
}
