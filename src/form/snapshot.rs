//! Field name -> value mapping persisted between reloads

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Values of every named field at one point in time.
///
/// Always rebuilt from the live form, so it never carries keys from an
/// older form layout. Stored as a flat JSON object.
///
/// Reading is lenient per entry: numbers and booleans become their text,
/// other non-string values are dropped. Anything but an object is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormSnapshot(BTreeMap<String, String>);

impl<'de> Deserialize<'de> for FormSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(name, value)| field_text(value).map(|text| (name, text)))
            .collect())
    }
}

fn field_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl FormSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_flat_object() {
        let snapshot: FormSnapshot = [("nome", "Ada"), ("pais", "br")].into_iter().collect();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"nome":"Ada","pais":"br"}"#);
        let back: FormSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(serde_json::from_str::<FormSnapshot>("null").is_err());
        assert!(serde_json::from_str::<FormSnapshot>("[1,2]").is_err());
        assert!(serde_json::from_str::<FormSnapshot>("\"nome\"").is_err());
    }

    #[test]
    fn test_mixed_values_keep_readable_entries() {
        let snapshot: FormSnapshot = serde_json::from_str(
            r#"{"nome":"Ada","idade":36,"legacy_opt_in":true,"extra":null,"tags":["a"]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.get("nome"), Some("Ada"));
        assert_eq!(snapshot.get("idade"), Some("36"));
        assert_eq!(snapshot.get("legacy_opt_in"), Some("true"));
        assert_eq!(snapshot.get("extra"), None);
        assert_eq!(snapshot.get("tags"), None);
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn test_last_duplicate_wins() {
        let snapshot: FormSnapshot = [("a", "1"), ("a", "2")].into_iter().collect();
        assert_eq!(snapshot.get("a"), Some("2"));
        assert_eq!(snapshot.len(), 1);
    }
}
