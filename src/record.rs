use serde_json::{Map, Value};
use uuid::Uuid;

pub use schema::Fields;

/// A record as held by the store.
pub type Record = schema::Record<Uuid>;

/// An untrusted request body: any JSON object, possibly partial,
/// possibly carrying unknown keys.
pub type Input = Map<String, Value>;

/// Turns an arbitrary JSON body into an [`Input`]. Anything that is not
/// an object carries no fields.
pub fn input_from_value(value: Value) -> Input {
    match value {
        Value::Object(map) => map,
        _ => Input::new(),
    }
}

/// Returns the value of `field` in `input` if it is present and truthy,
/// converted to the text that gets stored.
///
/// Non-empty strings, non-zero numbers and `true` are truthy. `null`,
/// `false`, `0`, the empty string and nested arrays or objects are not.
pub fn truthy_text(input: &Input, field: &str) -> Option<String> {
    match input.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().map_or(false, |f| f != 0.0 && f.is_finite()) => {
            Some(n.to_string())
        }
        Value::Bool(true) => Some("true".to_owned()),
        _ => None,
    }
}
