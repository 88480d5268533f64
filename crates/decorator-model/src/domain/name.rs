use std::sync::LazyLock;

use regex::Regex;

/// Longest allowed name part of a label key.
pub const MAX_LABEL_NAME_LEN: usize = 63;

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]$")
        .expect("label name pattern must compile")
});

/// Returns `true` if `name` is usable as the part of a label key after `/`.
///
/// # Examples
/// ```
/// use decorator_model::is_valid_label_name;
///
/// assert!(is_valid_label_name("team_a.v2"));
/// assert!(!is_valid_label_name(""));
/// assert!(!is_valid_label_name("has space"));
/// ```
pub fn is_valid_label_name(name: &str) -> bool {
    name.len() <= MAX_LABEL_NAME_LEN && NAME_PATTERN.is_match(name)
}
