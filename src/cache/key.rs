//! Cache key fingerprints and invalidation patterns.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Build a deterministic cache key for an operation and its parameters.
///
/// Parameters are serialized to JSON, object fields are sorted and `null`
/// values (omitted optionals) are dropped, so `{limit, status: None}` and
/// `{limit}` produce the same key. Keys look like `ticket/{"id":42}`, or just
/// the operation name when no parameter is set.
pub fn cache_key<P>(operation: &str, params: &P) -> Result<String, serde_json::Error>
where
  P: Serialize + ?Sized,
{
  let value = serde_json::to_value(params)?;

  let key = match canonicalize(value) {
    None => operation.to_string(),
    Some(Value::Object(map)) if map.is_empty() => operation.to_string(),
    Some(canonical) => format!("{}/{}", operation, canonical),
  };

  Ok(key)
}

fn canonicalize(value: Value) -> Option<Value> {
  match value {
    Value::Null => None,
    Value::Object(map) => {
      let sorted: BTreeMap<String, Value> = map
        .into_iter()
        .filter_map(|(k, v)| canonicalize(v).map(|v| (k, v)))
        .collect();
      Some(Value::Object(sorted.into_iter().collect::<Map<_, _>>()))
    }
    Value::Array(items) => Some(Value::Array(
      items
        .into_iter()
        .map(|v| canonicalize(v).unwrap_or(Value::Null))
        .collect(),
    )),
    other => Some(other),
  }
}

/// Check a key against an invalidation pattern.
///
/// The pattern is a prefix of the key. A `*` inside it matches any run of
/// characters, so `ticket` matches both `tickets/...` and `ticket/...`, and
/// `ticket*"id":42` matches any ticket key carrying that id.
pub fn matches_pattern(key: &str, pattern: &str) -> bool {
  let mut segments = pattern.split('*');

  let first = segments.next().unwrap_or_default();
  let Some(mut rest) = key.strip_prefix(first) else {
    return false;
  };

  for segment in segments {
    match rest.find(segment) {
      Some(pos) => rest = &rest[pos + segment.len()..],
      None => return false,
    }
  }

  true
}
