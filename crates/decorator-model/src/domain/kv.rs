use serde::{Deserialize, Serialize};

/// Label key/value pair derived from a single instance tag.
///
/// The key already carries the tags label prefix. The value may be empty for key-only tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueTag {
    key: String,
    value: String,
}

impl KeyValueTag {
    /// Create a new tag pair.
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Get the fully-qualified label key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the label value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns `true` for tags that carried no value (`"team"`, `"foo="`).
    pub fn is_key_only(&self) -> bool {
        self.value.is_empty()
    }

    /// Split into owned `(key, value)`.
    pub fn into_parts(self) -> (String, String) {
        (self.key, self.value)
    }
}

impl From<(&str, &str)> for KeyValueTag {
    fn from((key, value): (&str, &str)) -> Self {
        Self::new(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::KeyValueTag;

    #[test]
    fn new_sets_key_and_value() {
        let tag = KeyValueTag::new("tags.example.com/env", "prod");
        assert_eq!(tag.key(), "tags.example.com/env");
        assert_eq!(tag.value(), "prod");
        assert!(!tag.is_key_only());
    }

    #[test]
    fn empty_value_is_key_only() {
        let tag: KeyValueTag = ("tags.example.com/team", "").into();
        assert!(tag.is_key_only());
    }

    #[test]
    fn into_parts_moves_both_fields() {
        let (k, v) = KeyValueTag::new("k", "v").into_parts();
        assert_eq!(k, "k");
        assert_eq!(v, "v");
    }
}
