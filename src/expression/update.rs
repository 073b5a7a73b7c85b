use crate::expression::{operator, token::OperatorToken};

use serde_json::Value;

/// SET operation for updating attributes.
///
/// ```rust
/// use dynamodb_entity::expression::update::SetInput;
///
/// let assign = SetInput::Assign("value".into());
/// let increment = SetInput::Increment(10.into());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum SetInput {
    /// Assign a new value to the attribute (replaces existing value).
    Assign(Value),
    /// Increment a numeric attribute by the specified value.
    Increment(Value),
    /// Decrement a numeric attribute by the specified value.
    Decrement(Value),
    /// Append values to the end of a list attribute.
    ListAppend(Value),
    /// Prepend values to the beginning of a list attribute.
    ListPrepend(Value),
    /// Assign a value only if the attribute doesn't exist.
    IfNotExists(Value),
}

impl SetInput {
    fn into_tokens(self, path: &str) -> Vec<OperatorToken> {
        match self {
            Self::Assign(value) => operator::set(path, value),
            Self::Increment(value) => operator::increment(path, value),
            Self::Decrement(value) => operator::decrement(path, value),
            Self::ListAppend(value) => operator::list_append(path, value),
            Self::ListPrepend(value) => operator::list_prepend(path, value),
            Self::IfNotExists(value) => operator::set_if_not_exists(path, value),
        }
    }
}

/// Update expression built one mutation at a time.
///
/// Mutations are grouped into `SET`, `ADD`, `DELETE` and `REMOVE` clauses, rendered in that
/// order; the items of a clause keep the order they were added in.
///
/// ```rust
/// use dynamodb_entity::expression::{compiler::ExpressionCompiler, update::Update};
///
/// let update = Update::new().increment("total", 5).remove("draft");
/// let mut compiler = ExpressionCompiler::default();
/// assert_eq!(
///     compiler.render(update).unwrap(),
///     "SET total = total + :total REMOVE draft"
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Update {
    set: Vec<Vec<OperatorToken>>,
    add: Vec<Vec<OperatorToken>>,
    delete: Vec<Vec<OperatorToken>>,
    remove: Vec<Vec<OperatorToken>>,
}

impl Update {
    /// Empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a `SET` action to `path`.
    pub fn apply(mut self, path: &str, action: SetInput) -> Self {
        self.set.push(action.into_tokens(path));
        self
    }

    /// `SET path = value`
    pub fn set(self, path: &str, value: impl Into<Value>) -> Self {
        self.apply(path, SetInput::Assign(value.into()))
    }

    /// `SET path = if_not_exists(path, value)`
    pub fn set_if_not_exists(self, path: &str, value: impl Into<Value>) -> Self {
        self.apply(path, SetInput::IfNotExists(value.into()))
    }

    /// `SET path = list_append(path, values)`
    pub fn list_append(self, path: &str, values: impl Into<Value>) -> Self {
        self.apply(path, SetInput::ListAppend(values.into()))
    }

    /// `SET path = list_append(values, path)`
    pub fn list_prepend(self, path: &str, values: impl Into<Value>) -> Self {
        self.apply(path, SetInput::ListPrepend(values.into()))
    }

    /// `SET path = path + by`
    pub fn increment(self, path: &str, by: impl Into<Value>) -> Self {
        self.apply(path, SetInput::Increment(by.into()))
    }

    /// `SET path = path - by`
    pub fn decrement(self, path: &str, by: impl Into<Value>) -> Self {
        self.apply(path, SetInput::Decrement(by.into()))
    }

    /// `ADD path value`, adding to a number or set.
    pub fn add(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.add.push(operator::add_or_delete(path, value.into()));
        self
    }

    /// `DELETE path value`, removing elements from a set.
    pub fn delete(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.delete.push(operator::add_or_delete(path, value.into()));
        self
    }

    /// `REMOVE path`
    pub fn remove(mut self, path: &str) -> Self {
        self.remove.push(operator::remove(path));
        self
    }

    /// Whether no mutation was added.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.add.is_empty() && self.delete.is_empty() && self.remove.is_empty()
    }
}

impl IntoIterator for Update {
    type Item = OperatorToken;
    type IntoIter = std::vec::IntoIter<OperatorToken>;

    fn into_iter(self) -> Self::IntoIter {
        let clauses = [
            operator::clause("SET ", self.set),
            operator::clause("ADD ", self.add),
            operator::clause("DELETE ", self.delete),
            operator::clause("REMOVE ", self.remove),
        ];
        let mut tokens = Vec::new();
        for clause in clauses.into_iter().filter(|clause| !clause.is_empty()) {
            if !tokens.is_empty() {
                tokens.push(OperatorToken::Literal(" "));
            }
            tokens.extend(clause);
        }
        tokens.into_iter()
    }
}
