mod error;

use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use chrono::prelude::*;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::{collections::BTreeMap, fmt};

pub use error::ConversionFailure;

pub type QueryValueResult<T> = std::result::Result<T, ConversionFailure>;
pub type QueryListValue = Vec<QueryValue>;

/// Values of the key fields identifying one row, ordered by key name.
pub type KeyMap = BTreeMap<String, QueryValue>;

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, PartialOrd, Ord)]
#[serde(untagged)]
pub enum QueryValue {
    String(String),
    Boolean(bool),
    Int(i64),
    List(QueryListValue),
    Json(String),

    /// A collections of key-value pairs constituting an object.
    #[serde(serialize_with = "serialize_object")]
    Object(Vec<(String, QueryValue)>),

    #[serde(serialize_with = "serialize_null")]
    Null,

    #[serde(serialize_with = "serialize_date")]
    DateTime(DateTime<FixedOffset>),

    #[serde(serialize_with = "serialize_decimal")]
    Float(BigDecimal),
}

/// Stringify a date to the following format
/// 1999-05-01T00:00:00.000Z
pub fn stringify_datetime(datetime: &DateTime<FixedOffset>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an RFC 3339 date and time string such as 1996-12-19T16:39:57-08:00.
pub fn parse_datetime(datetime: &str) -> chrono::ParseResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(datetime)
}

impl TryFrom<serde_json::Value> for QueryValue {
    type Error = ConversionFailure;

    fn try_from(v: serde_json::Value) -> QueryValueResult<Self> {
        match v {
            serde_json::Value::String(s) => Ok(QueryValue::String(s)),
            serde_json::Value::Array(v) => {
                let vals: QueryValueResult<Vec<QueryValue>> = v.into_iter().map(QueryValue::try_from).collect();
                Ok(QueryValue::List(vals?))
            }
            serde_json::Value::Null => Ok(QueryValue::Null),
            serde_json::Value::Bool(b) => Ok(QueryValue::Boolean(b)),
            serde_json::Value::Number(num) => match num.as_i64() {
                Some(i) => Ok(QueryValue::Int(i)),
                None => num
                    .as_f64()
                    .and_then(BigDecimal::from_f64)
                    .map(|dec| QueryValue::Float(dec.normalized()))
                    .ok_or_else(|| ConversionFailure::new("JSON number", "QueryValue::Float")),
            },
            serde_json::Value::Object(obj) => {
                let pairs: QueryValueResult<Vec<(String, QueryValue)>> = obj
                    .into_iter()
                    .map(|(k, v)| QueryValue::try_from(v).map(|v| (k, v)))
                    .collect();

                Ok(QueryValue::Object(pairs?))
            }
        }
    }
}

impl From<QueryValue> for serde_json::Value {
    fn from(value: QueryValue) -> Self {
        match value {
            QueryValue::String(s) => serde_json::Value::String(s),
            QueryValue::Boolean(b) => serde_json::Value::Bool(b),
            QueryValue::Int(i) => serde_json::Value::from(i),
            QueryValue::List(l) => serde_json::Value::Array(l.into_iter().map(Into::into).collect()),
            QueryValue::Json(s) => serde_json::from_str(&s).unwrap_or(serde_json::Value::String(s)),
            QueryValue::Object(pairs) => {
                serde_json::Value::Object(pairs.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
            QueryValue::Null => serde_json::Value::Null,
            QueryValue::DateTime(dt) => serde_json::Value::String(stringify_datetime(&dt)),
            QueryValue::Float(dec) => dec
                .to_f64()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(dec.to_string())),
        }
    }
}

fn serialize_date<S>(date: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    stringify_datetime(date).serialize(serializer)
}

fn serialize_null<S>(serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    Option::<u8>::None.serialize(serializer)
}

fn serialize_decimal<S>(decimal: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match decimal.to_f64() {
        Some(f) => f.serialize(serializer),
        None => decimal.to_string().serialize(serializer),
    }
}

fn serialize_object<S>(obj: &Vec<(String, QueryValue)>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(obj.len()))?;

    for (k, v) in obj {
        map.serialize_entry(k, v)?;
    }

    map.end()
}

impl QueryValue {
    pub fn is_null(&self) -> bool {
        matches!(self, QueryValue::Null)
    }

    pub fn into_object(self) -> Option<Vec<(String, QueryValue)>> {
        match self {
            QueryValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Looks up a key of an object value.
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        match self {
            QueryValue::Object(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn new_datetime(datetime: &str) -> QueryValueResult<QueryValue> {
        parse_datetime(datetime)
            .map(QueryValue::DateTime)
            .map_err(|_| ConversionFailure::new("RFC 3339 string", "QueryValue::DateTime"))
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueryValue::String(x) => x.fmt(f),
            QueryValue::Float(x) => x.fmt(f),
            QueryValue::Boolean(x) => x.fmt(f),
            QueryValue::DateTime(x) => stringify_datetime(x).fmt(f),
            QueryValue::Int(x) => x.fmt(f),
            QueryValue::Null => "null".fmt(f),
            QueryValue::Json(x) => x.fmt(f),
            QueryValue::List(x) => {
                let joined = x.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
                write!(f, "[{joined}]")
            }
            QueryValue::Object(pairs) => {
                let joined = pairs
                    .iter()
                    .map(|(key, value)| format!(r#""{key}": {value}"#))
                    .collect::<Vec<_>>()
                    .join(", ");

                write!(f, "{{ {joined} }}")
            }
        }
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::from(s.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::String(s)
    }
}

impl From<bool> for QueryValue {
    fn from(b: bool) -> Self {
        QueryValue::Boolean(b)
    }
}

impl From<i32> for QueryValue {
    fn from(i: i32) -> Self {
        QueryValue::Int(i64::from(i))
    }
}

impl From<i64> for QueryValue {
    fn from(i: i64) -> Self {
        QueryValue::Int(i)
    }
}

impl From<BigDecimal> for QueryValue {
    fn from(d: BigDecimal) -> Self {
        QueryValue::Float(d)
    }
}

impl From<QueryListValue> for QueryValue {
    fn from(s: QueryListValue) -> Self {
        QueryValue::List(s)
    }
}

impl<T> From<Option<T>> for QueryValue
where
    T: Into<QueryValue>,
{
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(QueryValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn json_numbers_keep_integers_apart_from_decimals() {
        let value = QueryValue::try_from(json!([1, 2.5, null])).unwrap();

        assert_eq!(
            value,
            QueryValue::List(vec![
                QueryValue::Int(1),
                QueryValue::Float(BigDecimal::from_str("2.5").unwrap()),
                QueryValue::Null,
            ])
        );
    }

    #[test]
    fn json_objects_keep_key_order() {
        let value = QueryValue::try_from(json!({ "name": "Heineken", "abv": 5 })).unwrap();

        assert_eq!(value.get("name"), Some(&QueryValue::from("Heineken")));
        assert_eq!(
            value.into_object().unwrap().into_iter().map(|(k, _)| k).collect::<Vec<_>>(),
            vec!["name".to_string(), "abv".to_string()]
        );
    }

    #[test]
    fn objects_serialize_as_maps() {
        let value = QueryValue::Object(vec![
            ("name".into(), "Grolsch".into()),
            ("brewery".into(), QueryValue::Null),
        ]);

        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"name":"Grolsch","brewery":null}"#
        );
    }

    #[test]
    fn datetimes_render_with_millis() {
        let value = QueryValue::new_datetime("1999-05-01T00:00:00Z").unwrap();

        assert_eq!(value.to_string(), "1999-05-01T00:00:00.000Z");
    }
}
