//! Conversion of single attribute values between their intermediate JSON form and the wire.
//!
//! Entities are serialized to [`serde_json::Value`] first; this module then applies what the
//! attribute metadata says about the value: prefix and suffix decoration of strings, date
//! representation, native sets and binaries. Everything else goes through `serde_dynamo`.

use crate::{
    config::MapperConfig,
    error::{Error, Result},
    metadata::attribute::{AttributeKind, AttributeMetadata, AttributeRole},
};

use aws_sdk_dynamodb::{primitives::Blob, types::AttributeValue};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_dynamo::{from_attribute_value, to_attribute_value};
use serde_json::{Number, Value};

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn wire_type(value: &AttributeValue) -> &'static str {
    match value {
        AttributeValue::B(_) => "B",
        AttributeValue::Bool(_) => "BOOL",
        AttributeValue::Bs(_) => "BS",
        AttributeValue::L(_) => "L",
        AttributeValue::M(_) => "M",
        AttributeValue::N(_) => "N",
        AttributeValue::Ns(_) => "NS",
        AttributeValue::Null(_) => "NULL",
        AttributeValue::S(_) => "S",
        AttributeValue::Ss(_) => "SS",
        _ => "unknown",
    }
}

fn non_empty(segment: Option<&str>) -> Option<&str> {
    segment.filter(|segment| !segment.is_empty())
}

/// Integers are kept exact within the `i64` and `u64` ranges. Anything else, including
/// integers past `u64::MAX`, becomes the nearest `f64`.
fn number_from_wire(attribute: &str, number: &str) -> Result<Value> {
    if let Ok(number) = number.parse::<i64>() {
        return Ok(Value::from(number));
    }
    if let Ok(number) = number.parse::<u64>() {
        return Ok(Value::from(number));
    }
    number
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| Error::invalid_type(attribute, format!("`{number}` is not a number")))
}

fn bytes_from_value(attribute: &str, value: &Value) -> Result<Vec<u8>> {
    let Value::Array(items) = value else {
        return Err(Error::invalid_type(
            attribute,
            format!("expected an array of bytes, found {}", json_type(value)),
        ));
    };
    items
        .iter()
        .map(|item| {
            item.as_u64()
                .and_then(|byte| u8::try_from(byte).ok())
                .ok_or_else(|| Error::invalid_type(attribute, format!("`{item}` is not a byte")))
        })
        .collect()
}

fn bytes_to_value(bytes: &[u8]) -> Value {
    Value::Array(bytes.iter().map(|byte| Value::from(*byte)).collect())
}

/// Encoder and decoder of single attribute values.
///
/// ```rust
/// use dynamodb_entity::{
///     codec::ValueCodec,
///     metadata::attribute::{AttributeKind, AttributeMetadata},
/// };
///
/// let codec = ValueCodec::default();
/// let metadata = AttributeMetadata::sort_key("sk", AttributeKind::String).with_prefix("ORDER");
/// let wire = codec.apply_prefix_suffix(&metadata, "42".into());
/// assert_eq!(wire, "ORDER#42");
/// assert_eq!(codec.strip_prefix_suffix(&metadata, wire), "42");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ValueCodec {
    separator: char,
}

impl Default for ValueCodec {
    fn default() -> Self {
        Self::from(&MapperConfig::default())
    }
}

impl From<&MapperConfig> for ValueCodec {
    fn from(config: &MapperConfig) -> Self {
        Self::new(config.separator)
    }
}

impl ValueCodec {
    /// Codec joining decorated values with `separator`.
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    /// Character between prefix, value and suffix.
    pub fn separator(&self) -> char {
        self.separator
    }

    pub(crate) fn join(&self, prefix: Option<&str>, value: &str, suffix: Option<&str>) -> String {
        let segments = [non_empty(prefix), Some(value), non_empty(suffix)];
        let separator = self.separator.to_string();
        segments
            .into_iter()
            .flatten()
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join(separator.as_str())
    }

    /// Decorate a string value with the attribute's prefix and suffix.
    ///
    /// Values of other JSON types and attributes of other kinds are returned unchanged.
    pub fn apply_prefix_suffix(&self, metadata: &AttributeMetadata, value: Value) -> Value {
        match value {
            Value::String(value) if metadata.kind == AttributeKind::String => Value::String(
                self.join(metadata.prefix.as_deref(), &value, metadata.suffix.as_deref()),
            ),
            value => value,
        }
    }

    /// Remove the decoration added by [`ValueCodec::apply_prefix_suffix`].
    ///
    /// A leading prefix and a trailing suffix are only removed on a separator boundary.
    /// Values which themselves contain the separator are not guaranteed to round-trip.
    pub fn strip_prefix_suffix(&self, metadata: &AttributeMetadata, value: Value) -> Value {
        let Value::String(value) = value else {
            return value;
        };
        if metadata.kind != AttributeKind::String {
            return Value::String(value);
        }
        let mut rest = value.as_str();
        if let Some(prefix) = non_empty(metadata.prefix.as_deref()) {
            if rest == prefix {
                rest = "";
            } else if let Some(stripped) = rest
                .strip_prefix(prefix)
                .and_then(|stripped| stripped.strip_prefix(self.separator))
            {
                rest = stripped;
            }
        }
        if let Some(suffix) = non_empty(metadata.suffix.as_deref()) {
            if rest == suffix {
                rest = "";
            } else if let Some(stripped) = rest
                .strip_suffix(suffix)
                .and_then(|stripped| stripped.strip_suffix(self.separator))
            {
                rest = stripped;
            }
        }
        Value::String(rest.to_string())
    }

    /// Encode a date as an ISO-8601 string or as epoch milliseconds, following the declared kind.
    pub fn date_to_wire(
        &self,
        metadata: &AttributeMetadata,
        date: DateTime<Utc>,
    ) -> Result<AttributeValue> {
        match metadata.kind {
            AttributeKind::String => Ok(AttributeValue::S(
                date.to_rfc3339_opts(SecondsFormat::Millis, true),
            )),
            AttributeKind::Number => Ok(AttributeValue::N(date.timestamp_millis().to_string())),
            kind => Err(Error::invalid_type(
                &metadata.property_name,
                format!("dates must be stored as String or Number, not {kind}"),
            )),
        }
    }

    /// Decode a date from either wire representation.
    pub fn date_from_wire(
        &self,
        metadata: &AttributeMetadata,
        value: &AttributeValue,
    ) -> Result<DateTime<Utc>> {
        let name = &metadata.property_name;
        if !metadata.kind.is_key_type() {
            return Err(Error::invalid_type(
                name,
                format!("dates must be stored as String or Number, not {}", metadata.kind),
            ));
        }
        match value {
            AttributeValue::S(date) => parse_date(name, date),
            AttributeValue::N(millis) => {
                let millis = millis
                    .parse::<i64>()
                    .map_err(|error| Error::invalid_type(name, error.to_string()))?;
                date_from_millis(name, millis)
            }
            other => Err(Error::invalid_type(
                name,
                format!("expected a date stored as S or N, found {}", wire_type(other)),
            )),
        }
    }

    /// Read a date from its intermediate form: an RFC 3339 string or epoch milliseconds.
    pub(crate) fn date_from_value(
        &self,
        metadata: &AttributeMetadata,
        value: &Value,
    ) -> Result<DateTime<Utc>> {
        let name = &metadata.property_name;
        match value {
            Value::String(date) => parse_date(name, date),
            Value::Number(millis) => {
                let millis = millis.as_i64().ok_or_else(|| {
                    Error::invalid_type(name, format!("`{millis}` is not a millisecond timestamp"))
                })?;
                date_from_millis(name, millis)
            }
            other => Err(Error::invalid_type(
                name,
                format!("expected a date, found {}", json_type(other)),
            )),
        }
    }

    /// Encode one attribute value following its metadata.
    ///
    /// Returns `None` for values that are stored as an absent attribute: `null` and empty sets.
    pub fn to_wire(
        &self,
        metadata: &AttributeMetadata,
        value: Value,
    ) -> Result<Option<AttributeValue>> {
        let name = &metadata.property_name;
        if value.is_null() {
            return Ok(None);
        }
        if metadata.role == AttributeRole::Date {
            let date = self.date_from_value(metadata, &value)?;
            return self.date_to_wire(metadata, date).map(Some);
        }
        let mismatch = |value: &Value| {
            Error::invalid_type(
                name,
                format!("declared {}, found {}", metadata.kind, json_type(value)),
            )
        };
        let value = match (metadata.kind, value) {
            (AttributeKind::String, value @ Value::String(_)) => {
                match self.apply_prefix_suffix(metadata, value) {
                    Value::String(value) => AttributeValue::S(value),
                    other => return Err(mismatch(&other)),
                }
            }
            (AttributeKind::Number, Value::Number(number)) => AttributeValue::N(number.to_string()),
            (AttributeKind::Boolean, Value::Bool(value)) => AttributeValue::Bool(value),
            (AttributeKind::Binary, value @ Value::Array(_)) => {
                AttributeValue::B(Blob::new(bytes_from_value(name, &value)?))
            }
            (AttributeKind::Set, Value::Array(items)) => return self.set_to_wire(name, items),
            (AttributeKind::Array, value @ Value::Array(_))
            | (AttributeKind::Map | AttributeKind::Object, value @ Value::Object(_)) => {
                self.marshal(value)?
            }
            (_, value) => return Err(mismatch(&value)),
        };
        Ok(Some(value))
    }

    /// Decode one attribute value following its metadata.
    ///
    /// Numbers decode to exact integers when they fit `i64` or `u64` and to `f64` otherwise,
    /// so integers wider than 64 bits lose precision.
    pub fn from_wire(&self, metadata: &AttributeMetadata, value: AttributeValue) -> Result<Value> {
        let name = &metadata.property_name;
        if metadata.role == AttributeRole::Date {
            let date = self.date_from_wire(metadata, &value)?;
            return Ok(Value::String(
                date.to_rfc3339_opts(SecondsFormat::Millis, true),
            ));
        }
        let value = match (metadata.kind, value) {
            (_, AttributeValue::Null(_)) => Value::Null,
            (AttributeKind::String, AttributeValue::S(value)) => {
                self.strip_prefix_suffix(metadata, Value::String(value))
            }
            (AttributeKind::Number, AttributeValue::N(number)) => number_from_wire(name, &number)?,
            (AttributeKind::Boolean, AttributeValue::Bool(value)) => Value::Bool(value),
            (AttributeKind::Binary, AttributeValue::B(blob)) => bytes_to_value(blob.as_ref()),
            (AttributeKind::Set, AttributeValue::Ss(items)) => {
                Value::Array(items.into_iter().map(Value::String).collect())
            }
            (AttributeKind::Set, AttributeValue::Ns(items)) => Value::Array(
                items
                    .iter()
                    .map(|number| number_from_wire(name, number))
                    .collect::<Result<_>>()?,
            ),
            (AttributeKind::Set, AttributeValue::Bs(items)) => Value::Array(
                items
                    .iter()
                    .map(|blob| bytes_to_value(blob.as_ref()))
                    .collect(),
            ),
            (AttributeKind::Array, value @ AttributeValue::L(_))
            | (AttributeKind::Map | AttributeKind::Object, value @ AttributeValue::M(_)) => {
                self.unmarshal(value)?
            }
            (kind, value) => {
                return Err(Error::invalid_type(
                    name,
                    format!("declared {kind}, found {} on the wire", wire_type(&value)),
                ));
            }
        };
        Ok(value)
    }

    fn set_to_wire(&self, attribute: &str, items: Vec<Value>) -> Result<Option<AttributeValue>> {
        let Some(first) = items.first() else {
            return Ok(None);
        };
        let heterogeneous = || {
            Error::invalid_type(attribute, "set members must all be strings, numbers or binaries")
        };
        let value = match first {
            Value::String(_) => AttributeValue::Ss(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(item) => Ok(item),
                        _ => Err(heterogeneous()),
                    })
                    .collect::<Result<_>>()?,
            ),
            Value::Number(_) => AttributeValue::Ns(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Number(item) => Ok(item.to_string()),
                        _ => Err(heterogeneous()),
                    })
                    .collect::<Result<_>>()?,
            ),
            Value::Array(_) => AttributeValue::Bs(
                items
                    .iter()
                    .map(|item| bytes_from_value(attribute, item).map(Blob::new))
                    .collect::<Result<_>>()?,
            ),
            _ => return Err(heterogeneous()),
        };
        Ok(Some(value))
    }

    /// Encode a value with no attribute metadata attached.
    pub fn marshal(&self, value: Value) -> Result<AttributeValue> {
        let value: AttributeValue = to_attribute_value(value)?;
        Ok(value)
    }

    /// Decode a value with no attribute metadata attached.
    pub fn unmarshal(&self, value: AttributeValue) -> Result<Value> {
        let value: Value = from_attribute_value(value)?;
        Ok(value)
    }

    /// Encode an operand of an expression. Sets and dates follow the attribute metadata;
    /// anything else is marshaled as is.
    pub(crate) fn operand_to_wire(
        &self,
        metadata: &AttributeMetadata,
        value: Value,
    ) -> Result<AttributeValue> {
        if value.is_null() {
            return self.marshal(value);
        }
        if metadata.role == AttributeRole::Date {
            let date = self.date_from_value(metadata, &value)?;
            return self.date_to_wire(metadata, date);
        }
        let name = &metadata.property_name;
        match (metadata.kind, value) {
            (AttributeKind::Set, Value::Array(items)) => self
                .set_to_wire(name, items)?
                .ok_or_else(|| Error::invalid_type(name, "sets must not be empty")),
            (AttributeKind::Binary, value @ Value::Array(_)) => Ok(AttributeValue::B(Blob::new(
                bytes_from_value(name, &value)?,
            ))),
            (AttributeKind::String, value @ Value::String(_)) => {
                match self.apply_prefix_suffix(metadata, value) {
                    Value::String(value) => Ok(AttributeValue::S(value)),
                    other => self.marshal(other),
                }
            }
            (_, value) => self.marshal(value),
        }
    }
}

fn parse_date(attribute: &str, date: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|error| Error::invalid_type(attribute, format!("`{date}` is not a date: {error}")))
}

fn date_from_millis(attribute: &str, millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| Error::invalid_type(attribute, format!("`{millis}` is out of range")))
}
