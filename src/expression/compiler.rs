use crate::{
    codec::ValueCodec,
    error::{Error, Result},
    expression::{
        path::{self, PathSegment},
        reserved,
        token::{OperatorToken, ValueMode},
    },
    metadata::registry::AttributeMap,
};

use aws_sdk_dynamodb::types;
use serde_json::Value;
use std::collections;

/// Highest numeric suffix tried before a placeholder is considered exhausted.
pub const MAX_PLACEHOLDER_SUFFIX: usize = 1000;

/// A rendered expression together with its substitution maps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expression {
    /// Expression text with placeholders in place of reserved names and literals.
    pub expression: String,
    /// Name placeholders (`#word`) to real attribute names.
    pub expression_attribute_names: collections::HashMap<String, String>,
    /// Value placeholders (`:path`) to wire values.
    pub expression_attribute_values: collections::HashMap<String, types::AttributeValue>,
}

impl Expression {
    /// Move the maps into a request's optional maps and return the expression text.
    ///
    /// Empty maps leave the targets untouched.
    pub fn merge_into(
        self,
        names: &mut Option<collections::HashMap<String, String>>,
        values: &mut Option<collections::HashMap<String, types::AttributeValue>>,
    ) -> String {
        if !self.expression_attribute_names.is_empty() {
            names
                .get_or_insert_with(collections::HashMap::new)
                .extend(self.expression_attribute_names);
        }
        if !self.expression_attribute_values.is_empty() {
            values
                .get_or_insert_with(collections::HashMap::new)
                .extend(self.expression_attribute_values);
        }
        self.expression
    }
}

/// Renders token sequences into expression text.
///
/// One compiler is meant to serve every expression of a single request: names and values
/// accumulate across calls to [`ExpressionCompiler::render`], so a key condition, a filter and
/// a projection sharing one request never bind the same placeholder twice.
///
/// ```rust
/// use dynamodb_entity::expression::{compiler::ExpressionCompiler, operator};
/// use serde_json::json;
///
/// let mut compiler = ExpressionCompiler::default();
/// let expression = compiler.render(operator::not_contains("size", json!("x"))).unwrap();
/// assert_eq!(expression, "NOT contains(#size, :size)");
/// ```
#[derive(Clone, Debug, Default)]
pub struct ExpressionCompiler {
    codec: ValueCodec,
    attributes: AttributeMap,
    names: collections::HashMap<String, String>,
    values: collections::HashMap<String, types::AttributeValue>,
}

impl ExpressionCompiler {
    /// Compiler marshaling values with `codec` and no attribute metadata.
    pub fn new(codec: ValueCodec) -> Self {
        Self {
            codec,
            ..Self::default()
        }
    }

    /// Decorate values bound to top-level paths using `attributes`.
    pub fn with_attributes(mut self, attributes: AttributeMap) -> Self {
        self.attributes = attributes;
        self
    }

    /// Seed the substitution maps from a previous compilation.
    pub fn with_state(
        mut self,
        names: collections::HashMap<String, String>,
        values: collections::HashMap<String, types::AttributeValue>,
    ) -> Self {
        self.names = names;
        self.values = values;
        self
    }

    /// Name placeholders bound so far.
    pub fn names(&self) -> &collections::HashMap<String, String> {
        &self.names
    }

    /// Value placeholders bound so far.
    pub fn values(&self) -> &collections::HashMap<String, types::AttributeValue> {
        &self.values
    }

    /// Render `tokens`, adding their placeholders to the accumulated maps.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    pub fn render(&mut self, tokens: impl IntoIterator<Item = OperatorToken>) -> Result<String> {
        let mut expression = String::new();
        for token in tokens {
            match token {
                OperatorToken::Literal(literal) => expression.push_str(literal),
                OperatorToken::Name(path) => expression.push_str(&self.render_name(&path)?),
                OperatorToken::Value { path, value, mode } => {
                    expression.push_str(&self.render_value(&path, value, mode)?)
                }
                OperatorToken::Values { path, values } => {
                    if values.is_empty() {
                        return Err(Error::invalid_parameter(
                            &path,
                            "an IN operand list needs at least one value",
                        ));
                    }
                    for (position, value) in values.into_iter().enumerate() {
                        if position > 0 {
                            expression.push_str(", ");
                        }
                        expression.push_str(&self.render_value(&path, value, ValueMode::Decorated)?);
                    }
                }
            }
        }
        Ok(expression)
    }

    /// Render `tokens` in a fresh pass and return them with the maps accumulated so far.
    pub fn compile(
        &mut self,
        tokens: impl IntoIterator<Item = OperatorToken>,
    ) -> Result<Expression> {
        let expression = self.render(tokens)?;
        Ok(Expression {
            expression,
            expression_attribute_names: self.names.clone(),
            expression_attribute_values: self.values.clone(),
        })
    }

    /// Hand back the accumulated maps, `None` when a map is empty.
    #[allow(clippy::type_complexity)]
    pub fn finish(
        self,
    ) -> (
        Option<collections::HashMap<String, String>>,
        Option<collections::HashMap<String, types::AttributeValue>>,
    ) {
        let names = (!self.names.is_empty()).then_some(self.names);
        let values = (!self.values.is_empty()).then_some(self.values);
        (names, values)
    }

    fn render_name(&mut self, path: &str) -> Result<String> {
        let segments = path::parse(path)?;
        let mut rendered = String::with_capacity(path.len());
        for (position, segment) in segments.iter().enumerate() {
            if position > 0 {
                rendered.push('.');
            }
            if needs_placeholder(segment.name) {
                rendered.push_str(&self.name_placeholder(path, segment.name)?);
            } else {
                rendered.push_str(segment.name);
            }
            for index in &segment.indexes {
                rendered.push_str(&format!("[{index}]"));
            }
        }
        Ok(rendered)
    }

    fn name_placeholder(&mut self, path: &str, name: &str) -> Result<String> {
        let base = format!("#{}", sanitize(name));
        for suffix in 0..=MAX_PLACEHOLDER_SUFFIX {
            let placeholder = suffixed(&base, suffix);
            match self.names.get(&placeholder) {
                Some(bound) if bound == name => return Ok(placeholder),
                Some(_) => continue,
                None => {
                    self.names.insert(placeholder.clone(), name.to_string());
                    return Ok(placeholder);
                }
            }
        }
        Err(Error::PlaceholderExhausted {
            path: path.to_string(),
        })
    }

    fn render_value(&mut self, path: &str, value: Value, mode: ValueMode) -> Result<String> {
        let segments = path::parse(path)?;
        let wire = self.encode(&segments, value, mode)?;
        let base = path::value_placeholder(&segments);
        for suffix in 0..=MAX_PLACEHOLDER_SUFFIX {
            let placeholder = suffixed(&base, suffix);
            match self.values.get(&placeholder) {
                Some(bound) if *bound == wire => return Ok(placeholder),
                Some(_) => continue,
                None => {
                    self.values.insert(placeholder.clone(), wire);
                    return Ok(placeholder);
                }
            }
        }
        Err(Error::PlaceholderExhausted {
            path: path.to_string(),
        })
    }

    fn encode(
        &self,
        segments: &[PathSegment<'_>],
        value: Value,
        mode: ValueMode,
    ) -> Result<types::AttributeValue> {
        let metadata = match segments {
            [segment] if segment.indexes.is_empty() => self.attributes.get(segment.name),
            _ => None,
        };
        let Some(metadata) = metadata else {
            return self.codec.marshal(value);
        };
        match (mode, value) {
            (ValueMode::Decorated, value) => self.codec.operand_to_wire(metadata, value),
            (ValueMode::Prefixed, Value::String(value)) => {
                match metadata.prefix.as_deref().filter(|prefix| !prefix.is_empty()) {
                    Some(prefix) => Ok(types::AttributeValue::S(format!(
                        "{prefix}{}{value}",
                        self.codec.separator()
                    ))),
                    None => Ok(types::AttributeValue::S(value)),
                }
            }
            (_, value) => self.codec.marshal(value),
        }
    }
}

fn suffixed(base: &str, suffix: usize) -> String {
    if suffix == 0 {
        base.to_string()
    } else {
        format!("{base}__{suffix}")
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() || character == '_' {
                character
            } else {
                '_'
            }
        })
        .collect()
}

/// Reserved words, and names the expression grammar cannot spell unescaped.
fn needs_placeholder(name: &str) -> bool {
    let mut characters = name.chars();
    let identifier = characters
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic())
        && characters.all(|character| character.is_ascii_alphanumeric() || character == '_');
    !identifier || reserved::is_reserved(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        expression::operator::{self, ComparisonOperator},
        metadata::attribute::{AttributeKind, AttributeMetadata},
    };

    use rstest::rstest;
    use serde_json::json;

    fn order_attributes() -> AttributeMap {
        [
            AttributeMetadata::partition_key("id", AttributeKind::String).with_prefix("ORDER"),
            AttributeMetadata::attribute("total", AttributeKind::Number),
            AttributeMetadata::date("createdAt", AttributeKind::Number),
            AttributeMetadata::attribute("tags", AttributeKind::Set),
        ]
        .into_iter()
        .map(|metadata| (metadata.property_name.clone(), metadata))
        .collect()
    }

    #[test]
    fn test_increment_of_plain_name() {
        let mut compiler = ExpressionCompiler::default().with_attributes(order_attributes());
        let tokens = operator::clause("SET ", vec![operator::increment("total", json!(5))]);
        let expression = compiler.compile(tokens).unwrap();
        assert_eq!(expression.expression, "SET total = total + :total");
        assert!(expression.expression_attribute_names.is_empty());
        assert_eq!(
            expression.expression_attribute_values,
            collections::HashMap::from([(
                ":total".to_string(),
                types::AttributeValue::N("5".to_string())
            )])
        );
    }

    #[test]
    fn test_negated_contains_on_reserved_name() {
        let mut compiler = ExpressionCompiler::default();
        let expression = compiler
            .compile(operator::not_contains("size", json!("x")))
            .unwrap();
        assert_eq!(expression.expression, "NOT contains(#size, :size)");
        assert_eq!(
            expression.expression_attribute_names,
            collections::HashMap::from([("#size".to_string(), "size".to_string())])
        );
        assert_eq!(
            expression.expression_attribute_values,
            collections::HashMap::from([(
                ":size".to_string(),
                types::AttributeValue::S("x".to_string())
            )])
        );
    }

    #[rstest]
    #[case::reserved_upper("SIZE", "#SIZE")]
    #[case::reserved_lower("name", "#name")]
    #[case::plain("total", "total")]
    #[case::nested("products[0].name", "products[0].#name")]
    #[case::nested_plain("address.city", "address.city")]
    #[case::dash("first-name", "#first_name")]
    #[case::leading_digit("1st", "#1st")]
    fn test_render_name(#[case] path: &str, #[case] expected: &str) {
        let mut compiler = ExpressionCompiler::default();
        assert_eq!(compiler.render(operator::remove(path)).unwrap(), expected);
        let escaped = expected != path;
        assert_eq!(!compiler.names().is_empty(), escaped);
    }

    #[test]
    fn test_distinct_values_get_distinct_placeholders() {
        let mut compiler = ExpressionCompiler::default();
        let mut tokens = operator::compare("total", ComparisonOperator::Gt, json!(1));
        tokens.push(OperatorToken::Literal(" AND "));
        tokens.extend(operator::compare("total", ComparisonOperator::Lt, json!(9)));
        tokens.push(OperatorToken::Literal(" AND "));
        tokens.extend(operator::compare("total", ComparisonOperator::Ne, json!(1)));
        let expression = compiler.compile(tokens).unwrap();
        assert_eq!(
            expression.expression,
            "total > :total AND total < :total__1 AND total <> :total"
        );
        assert_eq!(expression.expression_attribute_values.len(), 2);
        assert_eq!(
            expression.expression_attribute_values[":total__1"],
            types::AttributeValue::N("9".to_string())
        );
    }

    #[test]
    fn test_state_shared_across_renders() {
        let mut compiler = ExpressionCompiler::default().with_attributes(order_attributes());
        let key = compiler
            .render(operator::compare("id", ComparisonOperator::Eq, json!("o1")))
            .unwrap();
        let condition = compiler
            .render(operator::compare("id", ComparisonOperator::Eq, json!("o2")))
            .unwrap();
        assert_eq!(key, "id = :id");
        assert_eq!(condition, "id = :id__1");
        let (names, values) = compiler.finish();
        assert_eq!(names, None);
        let values = values.unwrap();
        assert_eq!(values[":id"], types::AttributeValue::S("ORDER#o1".to_string()));
        assert_eq!(values[":id__1"], types::AttributeValue::S("ORDER#o2".to_string()));
    }

    #[test]
    fn test_seeded_name_conflict_gets_suffix() {
        let mut compiler = ExpressionCompiler::default().with_state(
            collections::HashMap::from([("#name".to_string(), "other".to_string())]),
            collections::HashMap::new(),
        );
        assert_eq!(compiler.render(operator::exists("name")).unwrap(), "attribute_exists(#name__1)");
        assert_eq!(compiler.names()["#name__1"], "name");
    }

    #[rstest]
    #[case::decorated(ValueMode::Decorated, json!("o1"), "ORDER#o1")]
    #[case::prefixed(ValueMode::Prefixed, json!("o"), "ORDER#o")]
    #[case::prefixed_empty(ValueMode::Prefixed, json!(""), "ORDER#")]
    #[case::plain(ValueMode::Plain, json!("o1"), "o1")]
    fn test_value_modes(#[case] mode: ValueMode, #[case] value: Value, #[case] expected: &str) {
        let mut compiler = ExpressionCompiler::default().with_attributes(order_attributes());
        compiler
            .render([OperatorToken::value_with_mode("id", value, mode)])
            .unwrap();
        assert_eq!(
            compiler.values()[":id"],
            types::AttributeValue::S(expected.to_string())
        );
    }

    #[test]
    fn test_nested_paths_are_not_decorated() {
        let mut compiler = ExpressionCompiler::default().with_attributes(order_attributes());
        let expression = compiler
            .render(operator::set("id.part", json!("o1")))
            .unwrap();
        assert_eq!(expression, "id.part = :id_part");
        assert_eq!(
            compiler.values()[":id_part"],
            types::AttributeValue::S("o1".to_string())
        );
    }

    #[test]
    fn test_date_and_set_operands() {
        let mut compiler = ExpressionCompiler::default().with_attributes(order_attributes());
        compiler
            .render(operator::set("createdAt", json!("2001-09-09T01:46:40.000Z")))
            .unwrap();
        compiler
            .render(operator::add_or_delete("tags", json!(["a", "b"])))
            .unwrap();
        assert_eq!(
            compiler.values()[":createdAt"],
            types::AttributeValue::N("1000000000000".to_string())
        );
        assert_eq!(
            compiler.values()[":tags"],
            types::AttributeValue::Ss(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[rstest]
    #[case::empty_path(operator::exists(""))]
    #[case::unclosed_index(operator::exists("a[0"))]
    #[case::value_path(vec![OperatorToken::value("a..b", 1)])]
    #[case::empty_in_list(operator::is_in("a", Vec::new()))]
    #[case::empty_not_in_list(operator::not_in("a", Vec::new()))]
    fn test_invalid_path(#[case] tokens: Vec<OperatorToken>) {
        let error = ExpressionCompiler::default().render(tokens).unwrap_err();
        assert!(matches!(error, Error::InvalidParameter { .. }), "{error}");
    }

    #[test]
    fn test_placeholder_exhausted() {
        let tokens = (0..=MAX_PLACEHOLDER_SUFFIX + 1)
            .flat_map(|value| operator::set("total", json!(value)))
            .collect::<Vec<_>>();
        let error = ExpressionCompiler::default().render(tokens).unwrap_err();
        assert!(matches!(error, Error::PlaceholderExhausted { path } if path == "total"));
    }

    #[test]
    fn test_merge_into_skips_empty_maps() {
        let mut names = None;
        let mut values = None;
        let expression = ExpressionCompiler::default()
            .compile(operator::remove("total"))
            .unwrap();
        assert_eq!(expression.merge_into(&mut names, &mut values), "total");
        assert_eq!(names, None);
        assert_eq!(values, None);
    }
}
