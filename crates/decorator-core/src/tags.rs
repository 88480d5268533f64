//! Instance tag parsing.
//!
//! A raw tag is split on the first `:` or `=` into a label key and value.
//! Tags that start with a separator have no key and are dropped, and so are
//! tags whose key is not a valid label name.
use tracing::debug;

use decorator_model::{KeyValueTag, Labels, TAG_SEPARATORS, is_valid_label_name};

/// Parse one raw tag into a prefixed label pair.
///
/// `key_prefix` is prepended verbatim to the key part, so it normally ends with `/`
/// (e.g. `"tags.decorator.example.com/"`).
///
/// - `"bar"` -> `(prefix + "bar", "")`
/// - `"a=b=c"` -> `(prefix + "a", "b=c")`
/// - `":foo"`, `"=bar"`, `"==="` -> `None`
pub fn parse_tag(raw: &str, key_prefix: &str) -> Option<KeyValueTag> {
    match raw.find(TAG_SEPARATORS) {
        Some(0) => None,
        Some(idx) => {
            // Separators are ASCII, so `idx + 1` is a char boundary.
            let (key, rest) = (&raw[..idx], &raw[idx + 1..]);
            Some(KeyValueTag::new(format!("{key_prefix}{key}"), rest))
        }
        None => Some(KeyValueTag::new(format!("{key_prefix}{raw}"), "")),
    }
}

/// Normalize a list of raw tags into a label map.
///
/// Tags are sorted before parsing, so the result does not depend on the order
/// the source reported them in, and when two tags produce the same key the
/// lexicographically later one wins. Tags rejected by [`parse_tag`] and tags
/// whose key part is not a valid label name (empty, spaces, too long) are
/// skipped, since the API server would refuse the whole node update.
pub fn normalize_tags<S: AsRef<str>>(raw_tags: &[S], key_prefix: &str) -> Labels {
    let mut sorted: Vec<&str> = raw_tags.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();

    let mut out = Labels::new();
    for raw in sorted {
        match parse_tag(raw, key_prefix) {
            Some(tag) if has_valid_name(&tag, key_prefix) => {
                out.insert_tag(tag);
            }
            Some(_) => debug!(tag = raw, "dropping tag with an invalid label name"),
            None => debug!(tag = raw, "dropping tag without a key"),
        }
    }
    out
}

fn has_valid_name(tag: &KeyValueTag, key_prefix: &str) -> bool {
    tag.key()
        .strip_prefix(key_prefix)
        .is_some_and(is_valid_label_name)
}
