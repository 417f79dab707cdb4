//! Canonical property trees.
//!
//! Every dynamic block in a manifest (global `properties`, job `properties`,
//! `cloud_properties`, resource pool `env`) arrives as loosely typed YAML: keys
//! may be any YAML value and leaves may be any scalar. [`Property::build`] walks
//! such a value once and produces a [`Property`] tree with string keys only,
//! keeping the source key order, so consumers never have to look at raw YAML.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fmt;
use thiserror::Error;

/// String-keyed mapping that preserves insertion order.
pub type PropertyMap = IndexMap<String, Property>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropertyError {
    #[error("unsupported key type '{kind}' in mapping at '{path}'")]
    UnsupportedKeyType { path: String, kind: String },
    #[error("unsupported value type '{kind}' at '{path}'")]
    UnsupportedValueType { path: String, kind: String },
    #[error("key '{key}' at '{path}' collides with an earlier key after normalization")]
    KeyCollision { path: String, key: String },
    #[error("expected a mapping, found '{kind}'")]
    ExpectedMapping { kind: String },
}

/// A normalized property value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Property {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    String(String),
    List(Vec<Property>),
    Map(PropertyMap),
}

impl Property {
    /// Normalize an arbitrary YAML value into a property tree.
    ///
    /// Mapping keys must be strings or integers; integers are converted to their
    /// decimal text, and two keys that end up with the same text are rejected
    /// rather than merged. Tagged values are not supported anywhere in the tree.
    ///
    /// A null input stands for "no properties" and yields an empty map. Nulls
    /// nested inside the tree stay [`Property::Null`].
    pub fn build(value: &Value) -> Result<Self, PropertyError> {
        match value {
            Value::Null => Ok(Property::Map(PropertyMap::new())),
            other => build_value(other, &mut PropertyPath::default()),
        }
    }

    /// Inverse of [`Property::build`]: the plain YAML value this tree stands for.
    pub fn to_yaml(&self) -> Value {
        match self {
            Property::Null => Value::Null,
            Property::Bool(b) => Value::Bool(*b),
            Property::Int(i) => Value::Number((*i).into()),
            Property::UInt(u) => Value::Number((*u).into()),
            Property::Float(f) => Value::Number((*f).into()),
            Property::String(s) => Value::String(s.clone()),
            Property::List(items) => Value::Sequence(items.iter().map(Property::to_yaml).collect()),
            Property::Map(map) => Value::Mapping(map_to_yaml(map)),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Property::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Property::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Property::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Property::Int(i) => Some(*i),
            Property::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Property::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Property]> {
        match self {
            Property::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&PropertyMap> {
        match self {
            Property::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Follow a dotted path (`"nested.retries"`) through nested mappings.
    pub fn lookup(&self, dotted: &str) -> Option<&Property> {
        dotted
            .split('.')
            .try_fold(self, |current, key| current.as_map()?.get(key))
    }
}

/// Normalize a property block that must be a mapping.
///
/// An absent or null block yields an empty map: "no properties" is a valid state.
pub fn build_map(value: &Value) -> Result<PropertyMap, PropertyError> {
    match value {
        Value::Null => Ok(PropertyMap::new()),
        Value::Mapping(mapping) => build_mapping(mapping, &mut PropertyPath::default()),
        other => Err(PropertyError::ExpectedMapping {
            kind: value_kind(other),
        }),
    }
}

/// Dotted lookup starting from a map rather than a [`Property`].
pub fn lookup<'a>(map: &'a PropertyMap, dotted: &str) -> Option<&'a Property> {
    let (head, rest) = match dotted.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (dotted, None),
    };
    let value = map.get(head)?;
    match rest {
        Some(rest) => value.lookup(rest),
        None => Some(value),
    }
}

/// Deep-merge `overlay` onto `base`. Nested maps merge key by key; any other
/// overlay value replaces the base value. Keys new in `overlay` are appended.
pub fn merge(base: &PropertyMap, overlay: &PropertyMap) -> PropertyMap {
    let mut merged = base.clone();
    for (key, value) in overlay {
        let combined = match (merged.get(key), value) {
            (Some(Property::Map(existing)), Property::Map(incoming)) => {
                Property::Map(merge(existing, incoming))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), combined);
    }
    merged
}

pub fn map_to_yaml(map: &PropertyMap) -> Mapping {
    map.iter()
        .map(|(key, value)| (Value::String(key.clone()), value.to_yaml()))
        .collect()
}

fn build_value(value: &Value, path: &mut PropertyPath) -> Result<Property, PropertyError> {
    match value {
        Value::Null => Ok(Property::Null),
        Value::Bool(b) => Ok(Property::Bool(*b)),
        Value::Number(n) => Ok(number_property(n)),
        Value::String(s) => Ok(Property::String(s.clone())),
        Value::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                path.push(Segment::Index(index));
                out.push(build_value(item, path)?);
                path.pop();
            }
            Ok(Property::List(out))
        }
        Value::Mapping(mapping) => build_mapping(mapping, path).map(Property::Map),
        Value::Tagged(_) => Err(PropertyError::UnsupportedValueType {
            path: path.to_string(),
            kind: value_kind(value),
        }),
    }
}

fn build_mapping(mapping: &Mapping, path: &mut PropertyPath) -> Result<PropertyMap, PropertyError> {
    let mut out = PropertyMap::with_capacity(mapping.len());
    for (key, value) in mapping {
        let Some(name) = key_text(key) else {
            return Err(PropertyError::UnsupportedKeyType {
                path: path.to_string(),
                kind: value_kind(key),
            });
        };
        if out.contains_key(&name) {
            return Err(PropertyError::KeyCollision {
                path: path.to_string(),
                key: name,
            });
        }
        path.push(Segment::Key(name.clone()));
        let built = build_value(value, path)?;
        path.pop();
        out.insert(name, built);
    }
    Ok(out)
}

fn key_text(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}

fn number_property(n: &serde_yaml::Number) -> Property {
    if let Some(i) = n.as_i64() {
        Property::Int(i)
    } else if let Some(u) = n.as_u64() {
        Property::UInt(u)
    } else {
        Property::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Runtime type name of a YAML value, for error messages.
pub(crate) fn value_kind(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(_) => "bool".to_owned(),
        Value::Number(n) if n.is_f64() => "float".to_owned(),
        Value::Number(_) => "integer".to_owned(),
        Value::String(_) => "string".to_owned(),
        Value::Sequence(_) => "sequence".to_owned(),
        Value::Mapping(_) => "mapping".to_owned(),
        Value::Tagged(tagged) => format!("tagged {}", tagged.tag),
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Location inside a property block, rendered as `nested.list[2].key`.
#[derive(Debug, Default)]
struct PropertyPath(Vec<Segment>);

impl PropertyPath {
    fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }

    fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => f.write_str(key)?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl From<&str> for Property {
    fn from(s: &str) -> Self {
        Property::String(s.to_owned())
    }
}

impl From<String> for Property {
    fn from(s: String) -> Self {
        Property::String(s)
    }
}

impl From<i64> for Property {
    fn from(i: i64) -> Self {
        Property::Int(i)
    }
}

impl From<bool> for Property {
    fn from(b: bool) -> Self {
        Property::Bool(b)
    }
}

impl From<f64> for Property {
    fn from(f: f64) -> Self {
        Property::Float(f)
    }
}

impl From<Vec<Property>> for Property {
    fn from(items: Vec<Property>) -> Self {
        Property::List(items)
    }
}

impl From<PropertyMap> for Property {
    fn from(map: PropertyMap) -> Self {
        Property::Map(map)
    }
}
