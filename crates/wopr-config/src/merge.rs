//! Deep merge of TOML value trees.
//!
//! Operates on raw [`toml::Value`] trees rather than deserialized structs
//! so "absent vs default" is handled correctly — a missing key in an
//! overlay table never clobbers the base layer's value.

/// Recursively deep-merge `overlay` into `base`.
///
/// Tables merge recursively per-field; scalars and arrays from the
/// overlay replace the base value outright.
pub fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}
