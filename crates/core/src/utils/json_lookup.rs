//! Optional-chain navigation over `serde_json::Value`.
//!
//! Every step yields either the value found or an explicit [`Lookup::Missing`];
//! JSON `null` is treated as missing so callers never have to distinguish an
//! absent key from an explicit null.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Found(&'a Value),
    Missing,
}

impl<'a> Lookup<'a> {
    pub fn new(value: &'a Value) -> Self {
        if value.is_null() {
            Lookup::Missing
        } else {
            Lookup::Found(value)
        }
    }

    /// Descend into an object member.
    pub fn get(self, key: &str) -> Lookup<'a> {
        match self {
            Lookup::Found(value) => value.get(key).map(Lookup::new).unwrap_or(Lookup::Missing),
            Lookup::Missing => Lookup::Missing,
        }
    }

    /// Descend through a sequence of object members.
    pub fn path<I, S>(self, segments: I) -> Lookup<'a>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        segments
            .into_iter()
            .fold(self, |current, segment| current.get(segment.as_ref()))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Lookup::Missing)
    }

    pub fn value(self) -> Option<&'a Value> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Missing => None,
        }
    }

    /// The value found, or JSON `null` when missing.
    pub fn to_value(self) -> Value {
        self.value().cloned().unwrap_or(Value::Null)
    }

    pub fn as_str(self) -> Option<&'a str> {
        self.value().and_then(Value::as_str)
    }

    pub fn as_bool(self) -> Option<bool> {
        self.value().and_then(Value::as_bool)
    }

    pub fn as_array(self) -> Option<&'a Vec<Value>> {
        self.value().and_then(Value::as_array)
    }

    /// Numbers and numeric strings (the API returns some decimals as strings).
    pub fn as_f64(self) -> Option<f64> {
        match self.value()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }
}
