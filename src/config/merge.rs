//! Deep merge for configuration documents.
//!
//! Right-biased: the overlay wins key by key. Mappings on both sides merge
//! recursively; every other combination is replaced entirely, so sequences
//! never merge element-wise and a scalar can replace a whole sub-tree.

use super::document::ConfigDocument;
use serde_json::{Map, Value};

/// The accumulated result of merging zero or more documents in order.
pub type MergedConfig = Map<String, Value>;

/// Deep merge two values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers, booleans and nulls replace the base value
///
/// # Example
/// ```
/// use serde_json::json;
/// use yaml_layers::config::deep_merge;
///
/// let base = json!({
///     "db": { "host": "h1", "port": 1 },
///     "tags": ["a", "b"]
/// });
/// let overlay = json!({
///     "db": { "port": 2 },
///     "tags": ["c"]
/// });
/// let result = deep_merge(base, overlay);
/// assert_eq!(result, json!({ "db": { "host": "h1", "port": 2 }, "tags": ["c"] }));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            merge_into(&mut base_map, overlay_map);
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Merge `overlay` onto `target` in place.
pub fn merge_into(target: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, overlay_value) in overlay {
        match target.get_mut(&key) {
            Some(slot) => {
                let base_value = slot.take();
                *slot = deep_merge(base_value, overlay_value);
            }
            None => {
                target.insert(key, overlay_value);
            }
        }
    }
}

/// Merge documents in order, later documents taking precedence.
pub fn merge_all(documents: impl IntoIterator<Item = ConfigDocument>) -> MergedConfig {
    documents
        .into_iter()
        .fold(MergedConfig::new(), |mut merged, document| {
            merge_into(&mut merged, document);
            merged
        })
}
