//! Attribute paths: dot-separated names, each optionally followed by list indexes (`a.b[0][1]`).

use crate::error::{Error, Result};

const FORBIDDEN: &[char] = &['#', ':', ',', '(', ')', '=', '<', '>', ']'];

/// One dot-separated element of a path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct PathSegment<'a> {
    pub(crate) name: &'a str,
    pub(crate) indexes: Vec<usize>,
}

pub(crate) fn parse(path: &str) -> Result<Vec<PathSegment<'_>>> {
    if path.is_empty() {
        return Err(Error::invalid_parameter(path, "path must not be empty"));
    }
    path.split('.').map(|segment| parse_segment(path, segment)).collect()
}

fn parse_segment<'a>(path: &str, segment: &'a str) -> Result<PathSegment<'a>> {
    let (name, mut rest) = match segment.find('[') {
        Some(position) => segment.split_at(position),
        None => (segment, ""),
    };
    if name.is_empty() {
        return Err(Error::invalid_parameter(path, "path segments must start with a name"));
    }
    if let Some(character) = name
        .chars()
        .find(|character| character.is_whitespace() || FORBIDDEN.contains(character))
    {
        return Err(Error::invalid_parameter(
            path,
            format!("`{character}` is not allowed in attribute names"),
        ));
    }
    let mut indexes = Vec::new();
    while !rest.is_empty() {
        let index = rest
            .strip_prefix('[')
            .and_then(|rest| rest.split_once(']'))
            .and_then(|(index, tail)| {
                let index = index.parse::<usize>().ok()?;
                Some((index, tail))
            });
        let Some((index, tail)) = index else {
            return Err(Error::invalid_parameter(
                path,
                format!("malformed list index in `{segment}`"),
            ));
        };
        indexes.push(index);
        rest = tail;
    }
    Ok(PathSegment { name, indexes })
}

/// Base of the value placeholder bound to `segments`: `a.b[0]` becomes `:a_b_index0`.
pub(crate) fn value_placeholder(segments: &[PathSegment<'_>]) -> String {
    let mut placeholder = String::from(":");
    for (position, segment) in segments.iter().enumerate() {
        if position > 0 {
            placeholder.push('_');
        }
        placeholder.extend(segment.name.chars().map(|character| {
            if character.is_ascii_alphanumeric() || character == '_' {
                character
            } else {
                '_'
            }
        }));
        for index in &segment.indexes {
            placeholder.push_str(&format!("_index{index}"));
        }
    }
    placeholder
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::plain("a", ":a")]
    #[case::nested("a.b", ":a_b")]
    #[case::index("a[0]", ":a_index0")]
    #[case::nested_indexes("a[1][2].b", ":a_index1_index2_b")]
    #[case::dash("first-name", ":first_name")]
    fn test_value_placeholder(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(value_placeholder(&parse(path).unwrap()), expected);
    }

    #[test]
    fn test_parse_indexes() {
        assert_eq!(
            parse("items[0][12].name").unwrap(),
            vec![
                PathSegment {
                    name: "items",
                    indexes: vec![0, 12],
                },
                PathSegment {
                    name: "name",
                    indexes: vec![],
                },
            ]
        );
    }

    #[rstest]
    #[case::empty("")]
    #[case::empty_segment("a..b")]
    #[case::leading_index("[0]")]
    #[case::unclosed_index("a[0")]
    #[case::not_a_number("a[x]")]
    #[case::trailing_text("a[0]b")]
    #[case::whitespace("a b")]
    #[case::placeholder_character("#a")]
    fn test_parse_rejects(#[case] path: &str) {
        let error = parse(path).unwrap_err();
        assert!(matches!(error, Error::InvalidParameter { .. }), "{error}");
    }
}
