//! JSON representation shared with the host execution engine.

pub use serde_json_bytes::ByteString;
pub use serde_json_bytes::Value;
#[doc(hidden)]
pub use serde_json_bytes::json;

/// A JSON object.
pub type Object = serde_json_bytes::Map<ByteString, Value>;

/// Build [`Arguments`](crate::Arguments) from a JSON object literal.
///
/// ```ignore
/// let arguments = arguments!({ "first": 10, "order": { "by": "title" } });
/// ```
#[macro_export]
macro_rules! arguments {
    () => {
        $crate::Arguments::default()
    };
    ($($json:tt)+) => {
        $crate::Arguments::try_from($crate::json_ext::json!($($json)+))
            .expect("arguments! expects a JSON object literal")
    };
}

/// Rebuild a value so that the keys of every object it contains are sorted.
///
/// Two values equal up to key order canonicalize to identical values, so they also hash the same.
pub(crate) fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(object) => Value::Object(canonicalize_object(object)),
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

pub(crate) fn canonicalize_object(object: Object) -> Object {
    let mut entries: Vec<(ByteString, Value)> = object
        .into_iter()
        .map(|(key, value)| (key, canonicalize(value)))
        .collect();
    entries.sort_by(|(left, _), (right, _)| left.as_str().cmp(right.as_str()));
    entries.into_iter().collect()
}
