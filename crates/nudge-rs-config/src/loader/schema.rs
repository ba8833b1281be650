//! Schema validation helpers for Nudge JSON5 configuration.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    let allowed = ["$schema", "storage", "notifications", "intervals", "ui"];
    ensure_allowed_keys(map, &allowed, layer, "")?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("storage") {
        validate_storage(value, layer, "storage")?;
    }
    if let Some(value) = map.get("notifications") {
        validate_notifications(value, layer, "notifications")?;
    }
    if let Some(value) = map.get("intervals") {
        validate_intervals(value, layer, "intervals")?;
    }
    if let Some(value) = map.get("ui") {
        validate_ui(value, layer, "ui")?;
    }

    Ok(())
}

/// Validate the "storage" block.
fn validate_storage(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["path", "key"], layer, path)?;

    if let Some(value) = map.get("path") {
        expect_string(value, layer, &join_path(path, "path"))?;
    }
    if let Some(value) = map.get("key") {
        expect_string(value, layer, &join_path(path, "key"))?;
    }
    Ok(())
}

/// Validate the "notifications" block.
fn validate_notifications(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["channel", "presentation", "sound"], layer, path)?;

    if let Some(value) = map.get("channel") {
        validate_channel(value, layer, &join_path(path, "channel"))?;
    }
    if let Some(value) = map.get("presentation") {
        validate_presentation(value, layer, &join_path(path, "presentation"))?;
    }
    if let Some(value) = map.get("sound") {
        expect_string(value, layer, &join_path(path, "sound"))?;
    }
    Ok(())
}

/// Validate the notification channel block.
fn validate_channel(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &["id", "name", "description", "importance"],
        layer,
        path,
    )?;

    for key in ["id", "name", "description"] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("importance") {
        validate_priority(value, layer, &join_path(path, "importance"))?;
    }
    Ok(())
}

/// Validate the foreground presentation block.
fn validate_presentation(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &["show_alert", "play_sound", "set_badge", "priority"],
        layer,
        path,
    )?;

    for key in ["show_alert", "play_sound", "set_badge"] {
        if let Some(value) = map.get(key) {
            expect_bool(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("priority") {
        validate_priority(value, layer, &join_path(path, "priority"))?;
    }
    Ok(())
}

/// Validate notification priority values.
fn validate_priority(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let Some(priority) = value.as_str() else {
        return Err(invalid_field(layer, path, "expected string"));
    };
    if matches!(priority, "min" | "low" | "default" | "high" | "max") {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "invalid priority"))
    }
}

/// Validate the "intervals" block.
fn validate_intervals(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["hours", "include_testing"], layer, path)?;

    if let Some(value) = map.get("hours") {
        let hours_path = join_path(path, "hours");
        let arr = expect_array(value, layer, &hours_path)?;
        for (idx, entry) in arr.iter().enumerate() {
            expect_u64(entry, layer, &format!("{hours_path}[{idx}]"))?;
        }
    }
    if let Some(value) = map.get("include_testing") {
        expect_bool(value, layer, &join_path(path, "include_testing"))?;
    }
    Ok(())
}

/// Validate the "ui" block.
fn validate_ui(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["tick_ms"], layer, path)?;

    if let Some(value) = map.get("tick_ms") {
        expect_u64(value, layer, &join_path(path, "tick_ms"))?;
    }
    Ok(())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

/// Expect a JSON array or return a typed error.
fn expect_array<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Vec<Value>, ConfigError> {
    match value {
        Value::Array(arr) => Ok(arr),
        _ => Err(invalid_field(layer, path, "expected array")),
    }
}

/// Expect a JSON string or return a typed error.
fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.as_str().is_some() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

/// Expect a JSON boolean or return a typed error.
fn expect_bool(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if matches!(value, Value::Bool(_)) {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected bool"))
    }
}

/// Expect a non-negative JSON integer or return a typed error.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

/// Join nested paths for better error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
