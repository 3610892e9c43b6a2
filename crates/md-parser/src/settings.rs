//! Nested plugin settings and deep merging.
//!
//! Settings are JSON-like maps. Parser defaults, global configuration, caller
//! overrides and per-extension entries are layered with [`merge_deep`].

use serde_json::Value;

/// Nested key-value settings of a parser or extension.
///
/// Keys keep insertion order.
pub type Settings = serde_json::Map<String, Value>;

/// Merge `overrides` into `base`, recursing into nested maps.
///
/// Nested maps combine key by key; any other value in `overrides` (scalars
/// and arrays alike) replaces the value in `base`.
///
/// ```
/// use md_parser::merge_deep;
/// use serde_json::json;
///
/// let mut base = json!({"a": {"c": 2}}).as_object().cloned().unwrap();
/// let overrides = json!({"a": {"b": 1}}).as_object().cloned().unwrap();
/// merge_deep(&mut base, overrides);
/// assert_eq!(serde_json::Value::Object(base), json!({"a": {"c": 2, "b": 1}}));
/// ```
pub fn merge_deep(base: &mut Settings, overrides: Settings) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_deep(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Non-mutating variant of [`merge_deep`].
#[must_use]
pub fn merged(base: &Settings, overrides: &Settings) -> Settings {
    let mut result = base.clone();
    merge_deep(&mut result, overrides.clone());
    result
}

/// Nested map stored under `key`, if any.
pub(crate) fn section<'a>(settings: &'a Settings, key: &str) -> Option<&'a Settings> {
    settings.get(key).and_then(Value::as_object)
}
