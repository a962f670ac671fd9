use std::collections::HashMap;

pub const NDI_SOURCE: &str = "ndi-source";
pub const HUE_MIN: &str = "hue-min";
pub const HUE_MAX: &str = "hue-max";
pub const SAT_MIN: &str = "sat-min";
pub const SAT_MAX: &str = "sat-max";
pub const VAL_MIN: &str = "val-min";
pub const VAL_MAX: &str = "val-max";
pub const SENSITIVITY: &str = "sensitivity";
pub const VENDOR_ID: &str = "vendor-id";
pub const PRODUCT_ID: &str = "product-id";

pub const LOAD_TRIGGER: &str = "load-config";
pub const SAVE_TRIGGER: &str = "save-config";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputKind {
    Text,
    Range { min: f64, max: f64, step: f64 },
}

#[derive(Debug, Clone)]
pub struct Input {
    pub id: &'static str,
    pub caption: &'static str,
    pub kind: InputKind,
    pub value: String,
}

impl Input {
    fn text(id: &'static str, caption: &'static str, value: &str) -> Self {
        Input {
            id,
            caption,
            kind: InputKind::Text,
            value: value.to_string(),
        }
    }

    fn range(id: &'static str, caption: &'static str, min: f64, max: f64, step: f64, value: &str) -> Self {
        Input {
            id,
            caption,
            kind: InputKind::Range { min, max, step },
            value: value.to_string(),
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self.kind, InputKind::Range { .. })
    }

    /// Value after moving a range input by `delta` steps, clamped to its
    /// bounds. `None` for text inputs.
    pub fn stepped(&self, delta: i32) -> Option<String> {
        let InputKind::Range { min, max, step } = self.kind else {
            return None;
        };

        let current = self.value.trim().parse::<f64>().unwrap_or(min).clamp(min, max);
        let moved = (current + f64::from(delta) * step).clamp(min, max);
        let snapped = (((moved - min) / step).round() * step + min).clamp(min, max);
        Some(format_number(snapped, step))
    }

    /// Position of a range input within its bounds, 0.0..=1.0.
    pub fn ratio(&self) -> Option<f64> {
        let InputKind::Range { min, max, .. } = self.kind else {
            return None;
        };
        let current = self.value.trim().parse::<f64>().ok()?;
        if max <= min {
            return Some(0.0);
        }
        Some(((current - min) / (max - min)).clamp(0.0, 1.0))
    }
}

// Prints with the step's precision and no trailing zeros: 1.0 -> "1", 1.50 -> "1.5"
fn format_number(value: f64, step: f64) -> String {
    let step_text = step.to_string();
    let decimals = step_text.split('.').nth(1).map_or(0, str::len);
    let text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Presentation category of the status area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

impl StatusKind {
    pub fn class(self) -> &'static str {
        match self {
            StatusKind::Info => "status-info",
            StatusKind::Success => "status-success",
            StatusKind::Error => "status-error",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusArea {
    pub text: String,
    /// Style marker, empty when cleared.
    pub class: String,
}

impl StatusArea {
    pub fn kind(&self) -> Option<StatusKind> {
        [StatusKind::Info, StatusKind::Success, StatusKind::Error]
            .into_iter()
            .find(|k| k.class() == self.class)
    }
}

#[derive(Debug, Clone)]
pub struct Form {
    inputs: Vec<Input>,
    labels: HashMap<String, String>,
    triggers: Vec<&'static str>,
    status: StatusArea,
}

impl Form {
    pub fn new(inputs: Vec<Input>, triggers: Vec<&'static str>) -> Self {
        let labels = inputs
            .iter()
            .filter(|i| i.is_range())
            .map(|i| (label_id(i.id), String::new()))
            .collect();

        Form {
            inputs,
            labels,
            triggers,
            status: StatusArea::default(),
        }
    }

    /// The filter settings page: NDI source, HSV thresholds, mouse
    /// sensitivity and the USB ids of the output device.
    pub fn standard() -> Self {
        Form::new(
            vec![
                Input::text(NDI_SOURCE, "NDI source", ""),
                Input::range(HUE_MIN, "Hue min", 0.0, 180.0, 1.0, "0"),
                Input::range(HUE_MAX, "Hue max", 0.0, 180.0, 1.0, "180"),
                Input::range(SAT_MIN, "Saturation min", 0.0, 255.0, 1.0, "0"),
                Input::range(SAT_MAX, "Saturation max", 0.0, 255.0, 1.0, "255"),
                Input::range(VAL_MIN, "Value min", 0.0, 255.0, 1.0, "0"),
                Input::range(VAL_MAX, "Value max", 0.0, 255.0, 1.0, "255"),
                Input::range(SENSITIVITY, "Mouse sensitivity", 0.1, 5.0, 0.1, "1"),
                Input::text(VENDOR_ID, "Vendor ID", "0x0000"),
                Input::text(PRODUCT_ID, "Product ID", "0x0000"),
            ],
            vec![LOAD_TRIGGER, SAVE_TRIGGER],
        )
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn input(&self, id: &str) -> Option<&Input> {
        self.inputs.iter().find(|i| i.id == id)
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.input(id).map(|i| i.value.as_str())
    }

    /// Returns false when no input has this id.
    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> bool {
        match self.inputs.iter_mut().find(|i| i.id == id) {
            Some(input) => {
                input.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn sliders(&self) -> impl Iterator<Item = &Input> {
        self.inputs.iter().filter(|i| i.is_range())
    }

    /// Text of the label paired with input `id`.
    pub fn label(&self, id: &str) -> Option<&str> {
        self.labels.get(&label_id(id)).map(String::as_str)
    }

    pub fn set_label(&mut self, id: &str, text: impl Into<String>) -> bool {
        match self.labels.get_mut(&label_id(id)) {
            Some(label) => {
                *label = text.into();
                true
            }
            None => false,
        }
    }

    pub fn triggers(&self) -> &[&'static str] {
        &self.triggers
    }

    pub fn status(&self) -> &StatusArea {
        &self.status
    }

    pub fn show_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status.text = text.into();
        self.status.class = kind.class().to_string();
    }

    pub fn clear_status(&mut self) {
        self.status = StatusArea::default();
    }

    /// Leading decimal integer of the input's text, so `"12.7"` reads as 12.
    pub fn int_value(&self, id: &str) -> Option<i64> {
        let text = self.value(id)?.trim();
        let sign_len = usize::from(text.starts_with(['-', '+']));
        let end = text[sign_len..]
            .find(|c: char| !c.is_ascii_digit())
            .map_or(text.len(), |i| i + sign_len);
        text[..end].parse().ok()
    }

    /// Leading decimal number of the input's text, so `"1.5x"` reads as 1.5.
    pub fn float_value(&self, id: &str) -> Option<f64> {
        let text = self.value(id)?.trim();
        let bytes = text.as_bytes();
        let digits_from = |mut i: usize| {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            i
        };

        let mut end = digits_from(usize::from(text.starts_with(['-', '+'])));
        if bytes.get(end) == Some(&b'.') {
            end = digits_from(end + 1);
        }
        // Exponent only counts when digits follow it
        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exp = end + 1;
            if matches!(bytes.get(exp), Some(b'-' | b'+')) {
                exp += 1;
            }
            let exp_end = digits_from(exp);
            if exp_end > exp {
                end = exp_end;
            }
        }

        text[..end].parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

fn label_id(id: &str) -> String {
    format!("{}-value", id)
}
