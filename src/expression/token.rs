use serde_json::Value;

/// How much of an attribute's metadata is applied to a literal before it is stored.
///
/// Decoration only ever applies when the path names a top-level registered attribute.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ValueMode {
    /// Prefix and suffix for strings, date and set coercion.
    #[default]
    Decorated,
    /// Prefix only, for prefix matches against decorated strings.
    Prefixed,
    /// Marshaled as is.
    Plain,
}

/// One element of an expression before rendering.
///
/// ```rust
/// use dynamodb_entity::expression::token::OperatorToken;
///
/// let tokens = vec![
///     OperatorToken::name("status"),
///     OperatorToken::Literal(" = "),
///     OperatorToken::value("status", "open"),
/// ];
/// assert_eq!(tokens.len(), 3);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum OperatorToken {
    /// Fixed expression text.
    Literal(&'static str),
    /// Attribute path, rendered with reserved words substituted.
    Name(String),
    /// Literal value, rendered as a placeholder bound to `path`.
    Value {
        /// Path the value is compared with or assigned to.
        path: String,
        /// The literal.
        value: Value,
        /// Decoration applied before marshaling.
        mode: ValueMode,
    },
    /// Non-empty list of decorated values bound to `path`, rendered comma-separated.
    Values {
        /// Path the values are compared with.
        path: String,
        /// The literals.
        values: Vec<Value>,
    },
}

impl OperatorToken {
    /// Name reference to `path`.
    pub fn name(path: impl Into<String>) -> Self {
        Self::Name(path.into())
    }

    /// Decorated value bound to `path`.
    pub fn value(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::value_with_mode(path, value, ValueMode::Decorated)
    }

    /// Value bound to `path` with an explicit decoration mode.
    pub fn value_with_mode(path: impl Into<String>, value: impl Into<Value>, mode: ValueMode) -> Self {
        Self::Value {
            path: path.into(),
            value: value.into(),
            mode,
        }
    }
}
