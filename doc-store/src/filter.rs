use serde_json::{Map, Value};

const OPERATORS: [(&str, &str); 8] = [
    ("gt", "$gt"),
    ("gte", "$gte"),
    ("lt", "$lt"),
    ("lte", "$lte"),
    ("ne", "$ne"),
    ("eq", "$eq"),
    ("in", "$in"),
    ("nin", "$nin"),
];

fn native_operator(key: &str) -> Option<&'static str> {
    OPERATORS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, native)| *native)
}

/// Translate a caller-facing filter predicate into the store's native
/// operator vocabulary.
///
/// This is a pure structural transform: maps and arrays keep their shape and
/// are walked recursively, scalars pass through, and the named comparison
/// operators are replaced with their `$`-prefixed native forms. A map with
/// exactly one key `eq` unwraps to the bare value, since the store treats
/// `{field: value}` and `{field: {$eq: value}}` identically.
pub fn translate_operators(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            if map.len() == 1
                && let Some(inner) = map.get("eq")
            {
                return translate_operators(inner);
            }

            let mut result = Map::with_capacity(map.len());
            for (key, inner) in map {
                let translated_key = native_operator(key).unwrap_or(key.as_str());
                result.insert(translated_key.to_string(), translate_operators(inner));
            }
            Value::Object(result)
        }
        Value::Array(items) => Value::Array(items.iter().map(translate_operators).collect()),
        scalar => scalar.clone(),
    }
}
