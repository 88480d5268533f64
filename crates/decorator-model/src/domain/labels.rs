use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::KeyValueTag;

/// Ordered label map (`key -> value`) based on [`BTreeMap`].
///
/// Used for desired label sets; ordering keeps iteration and logs deterministic.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labels(pub BTreeMap<String, String>);

impl Labels {
    /// Create an empty set of labels.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns `true` if no labels are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Insert or overwrite a label.
    ///
    /// Returns `self` for chaining.
    pub fn insert<K, V>(&mut self, key: K, val: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.insert(key.into(), val.into());
        self
    }

    /// Insert a parsed tag, overwriting any previous value for the same key.
    pub fn insert_tag(&mut self, tag: KeyValueTag) -> &mut Self {
        let (key, value) = tag.into_parts();
        self.0.insert(key, value);
        self
    }

    /// Get the value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate through all labels as `(&str, &str)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for Labels {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Labels
where
    K: Into<String>,
    V: Into<String>,
{
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
    fn insert_overwrites_existing_key() {
        let mut labels = Labels::new();
        labels.insert("a", "1").insert("a", "2");

        assert_eq!(labels.len(), 1);
        assert_eq!(labels.get("a"), Some("2"));
    }

    #[test]
    fn insert_tag_uses_prefixed_key() {
        let mut labels = Labels::new();
        labels.insert_tag(KeyValueTag::new("tags.example.com/team", ""));

        assert!(labels.contains_key("tags.example.com/team"));
        assert_eq!(labels.get("tags.example.com/team"), Some(""));
    }

    #[test]
    fn iteration_is_sorted_by_key() {
        let labels: Labels = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        let keys: Vec<_> = labels.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn serializes_as_plain_object() {
        let labels: Labels = [("a", "1")].into_iter().collect();
        let json = serde_json::to_string(&labels).unwrap();
        assert_eq!(json, r#"{"a":"1"}"#);
    }
}
