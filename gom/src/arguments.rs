use std::hash::Hash;
use std::hash::Hasher;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::error::ArgumentsError;
use crate::json_ext::ByteString;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::json_ext::canonicalize_object;

/// The argument set of one field fetch, as validated and coerced by the host.
///
/// Two argument sets are equal when their values are deeply equal; the order in which keys were
/// inserted is irrelevant, at any depth. Fetches of a batched field are grouped on this equality.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Arguments(Object);

impl Arguments {
    pub fn new(object: Object) -> Self {
        Self(canonicalize_object(object))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over arguments, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&ByteString, &Value)> {
        self.0.iter()
    }

    pub fn as_object(&self) -> &Object {
        &self.0
    }

    pub fn into_inner(self) -> Object {
        self.0
    }
}

impl PartialEq for Arguments {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Arguments {}

impl Hash for Arguments {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.0.len());
        // keys are sorted on construction
        for (name, value) in self.0.iter() {
            name.as_str().hash(state);
            value.hash(state);
        }
    }
}

impl From<Object> for Arguments {
    fn from(object: Object) -> Self {
        Self::new(object)
    }
}

impl TryFrom<Value> for Arguments {
    type Error = ArgumentsError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(object) => Ok(Self::new(object)),
            Value::Null => Ok(Self::default()),
            other => Err(ArgumentsError::NotAnObject {
                found: serde_json::to_string(&other).unwrap_or_default(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for Arguments {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Object::deserialize(deserializer).map(Self::new)
    }
}
