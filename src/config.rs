use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ndi_source_name: String,
    pub hue_min: i64,
    pub hue_max: i64,
    pub saturation_min: i64,
    pub saturation_max: i64,
    pub value_min: i64,
    pub value_max: i64,
    pub mouse_sensitivity: f64,
    pub vendor_id: u32,
    pub product_id: u32,
}

/// Value used for every field the backend leaves out.
pub const DEFAULTS: AppConfig = AppConfig {
    ndi_source_name: String::new(),
    hue_min: 0,
    hue_max: 180,
    saturation_min: 0,
    saturation_max: 255,
    value_min: 0,
    value_max: 255,
    mouse_sensitivity: 1.0,
    vendor_id: 0,
    product_id: 0,
};

impl Default for AppConfig {
    fn default() -> Self {
        DEFAULTS
    }
}

impl AppConfig {
    /// Builds a config from a decoded response body.
    ///
    /// Keys that are absent, `null`, or of the wrong JSON type take their
    /// value from [`DEFAULTS`]. Returns `None` when the body is not an object.
    pub fn from_json(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let defaults = AppConfig::default();

        Some(AppConfig {
            ndi_source_name: text_or(map, "ndi_source_name", defaults.ndi_source_name),
            hue_min: int_or(map, "hue_min", defaults.hue_min),
            hue_max: int_or(map, "hue_max", defaults.hue_max),
            saturation_min: int_or(map, "saturation_min", defaults.saturation_min),
            saturation_max: int_or(map, "saturation_max", defaults.saturation_max),
            value_min: int_or(map, "value_min", defaults.value_min),
            value_max: int_or(map, "value_max", defaults.value_max),
            mouse_sensitivity: float_or(map, "mouse_sensitivity", defaults.mouse_sensitivity),
            vendor_id: id_or(map, "vendor_id", defaults.vendor_id),
            product_id: id_or(map, "product_id", defaults.product_id),
        })
    }
}

fn text_or(map: &Map<String, Value>, key: &str, default: String) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => default,
    }
}

// Floats are truncated toward zero.
fn int_or(map: &Map<String, Value>, key: &str, default: i64) -> i64 {
    match map.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(default),
        _ => default,
    }
}

fn float_or(map: &Map<String, Value>, key: &str, default: f64) -> f64 {
    match map.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        _ => default,
    }
}

fn id_or(map: &Map<String, Value>, key: &str, default: u32) -> u32 {
    match map.get(key) {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(default),
        _ => default,
    }
}

/// Formats a USB id the way the form shows it: `0x` plus four upper-case digits.
pub fn int_to_hex(value: u32) -> String {
    if value == 0 {
        return "0x0000".to_string();
    }
    format!("0x{:04X}", value)
}

/// Parses a USB id typed into the form. Never fails: anything unreadable is 0.
pub fn hex_to_int(text: &str) -> u32 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }

    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);

    // Stop at the first non-hex character
    let end = digits
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(digits.len());

    u32::from_str_radix(&digits[..end], 16).unwrap_or(0)
}
