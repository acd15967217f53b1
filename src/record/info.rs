use std::fmt;

/// A single decoded INFO element.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            // `{:?}` always keeps a `.` or an exponent, so floats stay floats when re-read.
            Value::Float(v) => write!(f, "{:?}", v),
            Value::String(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// A decoded INFO entry.
///
/// Missing elements (`.` or empty in the file) are `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoValue {
    /// Presence of a flag. `Flag(false)` is written as nothing at all.
    Flag(bool),
    /// Fields declared with `Number=1`.
    Single(Option<Value>),
    List(Vec<Option<Value>>),
}

impl InfoValue {
    /// Builds a list value with no missing elements.
    pub fn list<V: Into<Value>, I: IntoIterator<Item = V>>(values: I) -> Self {
        InfoValue::List(values.into_iter().map(|v| Some(v.into())).collect())
    }

    pub fn single<V: Into<Value>>(value: V) -> Self {
        InfoValue::Single(Some(value.into()))
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            InfoValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_single(&self) -> Option<&Value> {
        match self {
            InfoValue::Single(v) => v.as_ref(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Option<Value>]> {
        match self {
            InfoValue::List(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for InfoValue {
    fn from(b: bool) -> Self {
        InfoValue::Flag(b)
    }
}
