//! JSON merge helpers for layered configuration.

use serde_json::Value;

/// Merge overlay values into the base, recursively overriding objects.
///
/// Arrays and scalars are replaced wholesale.
pub(super) fn merge_json_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_json_values(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::merge_json_values;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn nested_objects_merge_and_arrays_replace() {
        let mut base = json!({
            "storage": { "key": "@base", "path": "/data" },
            "intervals": { "hours": [1, 2, 3] }
        });
        let overlay = json!({
            "storage": { "key": "@overlay" },
            "intervals": { "hours": [24] }
        });
        merge_json_values(&mut base, &overlay);
        assert_eq!(
            base,
            json!({
                "storage": { "key": "@overlay", "path": "/data" },
                "intervals": { "hours": [24] }
            })
        );
    }
}
