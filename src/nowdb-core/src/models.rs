use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Operation is one of the fixed remote actions, addressed by URL path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    SelectAll,
    SelectId,
    SelectWhere,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Insert,
        Operation::SelectAll,
        Operation::SelectId,
        Operation::SelectWhere,
    ];

    /// Path segment appended to the operation base URL
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::SelectAll => "select_all",
            Operation::SelectId => "select_id",
            Operation::SelectWhere => "select_where",
        }
    }

    /// Whether a non-JSON body may be handed back as text.
    ///
    /// Insert callers read the created record's id out of the result, so a
    /// text body there is always an error.
    pub fn allows_text_fallback(&self) -> bool {
        !matches!(self, Operation::Insert)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// DecodePolicy governs what happens when a response body is not JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Fall back to the raw text body where the operation permits it
    #[default]
    Lenient,
    /// Every body must be JSON
    Strict,
}

impl DecodePolicy {
    pub fn allows_text_fallback(&self, operation: Operation) -> bool {
        *self == DecodePolicy::Lenient && operation.allows_text_fallback()
    }
}

/// A single form value. Serialized untagged so it form-encodes as a bare scalar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Integer(n) => write!(f, "{}", n),
            ParamValue::Unsigned(n) => write!(f, "{}", n),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Integer(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(value.into())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Unsigned(value)
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        ParamValue::Unsigned(value as u64)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// Params is the string-keyed form payload of one request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add the paging/ordering options to a criteria map
    pub fn with_options(mut self, options: SelectOptions) -> Self {
        self.extend(options.into_params());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    /// Build a new map from `self` with `overrides` laid on top. Keys present
    /// in both take the override's value. Neither input is modified.
    pub fn merged_over(&self, overrides: &Params) -> Params {
        let mut merged = self.clone();
        merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        params.extend(iter);
        params
    }
}

impl<K, V> Extend<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for Params {
    type Item = (String, ParamValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// SelectOptions are the paging/ordering keys understood by the select operations.
/// The client passes them through without interpreting them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectOptions {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub order: Option<String>,
    pub mixin: Option<String>,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn mixin(mut self, mixin: impl Into<String>) -> Self {
        self.mixin = Some(mixin.into());
        self
    }

    pub fn into_params(self) -> Params {
        let mut params = Params::new();
        if let Some(limit) = self.limit {
            params.insert("limit", limit);
        }
        if let Some(offset) = self.offset {
            params.insert("offset", offset);
        }
        if let Some(order) = self.order {
            params.insert("order", order);
        }
        if let Some(mixin) = self.mixin {
            params.insert("mixin", mixin);
        }
        params
    }
}

impl From<SelectOptions> for Params {
    fn from(options: SelectOptions) -> Self {
        options.into_params()
    }
}

/// Response is the decoded body of a successful call.
/// The shape is defined by the service; nothing is renamed or filtered.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Json(serde_json::Value),
    /// Raw body kept because it was not JSON and the policy allowed it
    Text(String),
}

impl Response {
    /// Decode a response body under `policy` for `operation`
    pub fn from_body(
        body: String,
        policy: DecodePolicy,
        operation: Operation,
    ) -> serde_json::Result<Self> {
        match serde_json::from_str(&body) {
            Ok(value) => Ok(Response::Json(value)),
            Err(_) if policy.allows_text_fallback(operation) => Ok(Response::Text(body)),
            Err(e) => Err(e),
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Response::Json(value) => Some(value),
            Response::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Response::Text(text) => Some(text),
            Response::Json(_) => None,
        }
    }

    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            Response::Json(value) => Some(value),
            Response::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Response::Text(_))
    }

    /// Records when the body is a JSON array
    pub fn records(&self) -> Option<&Vec<serde_json::Value>> {
        self.as_json().and_then(|v| v.as_array())
    }

    /// The `id` of the first record, e.g. the document an insert created
    pub fn first_id(&self) -> Option<&str> {
        self.records()?.first()?.get("id")?.as_str()
    }

    /// Deserialize the body into a caller-defined type
    pub fn parse<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        match self {
            Response::Json(value) => T::deserialize(value),
            Response::Text(text) => serde_json::from_str(text),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Json(value) => write!(f, "{}", value),
            Response::Text(text) => f.write_str(text),
        }
    }
}
