use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` the same as a missing field.
pub fn null_as_default<'de, D, Value>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
    Value: Default + Deserialize<'de>,
{
    Option::<Value>::deserialize(deserializer).map(Option::unwrap_or_default)
}
