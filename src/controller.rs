use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{ApiError, ConfigClient};
use crate::config::{hex_to_int, int_to_hex, AppConfig};
use crate::form::{self, Form, StatusKind};

/// Something the user did to the form.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// A trigger such as `load-config` was activated.
    Click(String),
    /// An input's value changed.
    Input { target: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Handler {
    Load,
    Save,
    MirrorSlider,
}

/// Result of background work, applied on the form's thread.
#[derive(Debug)]
pub enum Completion {
    Loaded(Result<AppConfig, ApiError>),
    Saved(Result<(), ApiError>),
    ClearStatus,
}

pub struct ConfigController {
    form: Form,
    client: ConfigClient,
    handlers: HashMap<String, Handler>,
    clear_after: Duration,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl ConfigController {
    /// Attaches handlers and starts the initial load.
    ///
    /// Must be called inside a tokio runtime context.
    pub fn new(form: Form, client: ConfigClient, clear_after: Duration) -> Self {
        let mut controller = Self::detached(form, client, clear_after);
        controller.attach_handlers();
        controller.load_configuration();
        controller
    }

    fn detached(form: Form, client: ConfigClient, clear_after: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        ConfigController {
            form,
            client,
            handlers: HashMap::new(),
            clear_after,
            tx,
            rx,
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn attach_handlers(&mut self) {
        for trigger in self.form.triggers() {
            match *trigger {
                form::LOAD_TRIGGER => {
                    self.handlers.insert(trigger.to_string(), Handler::Load);
                }
                form::SAVE_TRIGGER => {
                    self.handlers.insert(trigger.to_string(), Handler::Save);
                }
                other => debug!(trigger = other, "no handler for trigger"),
            }
        }

        let sliders: Vec<&'static str> = self.form.sliders().map(|s| s.id).collect();
        for id in &sliders {
            self.handlers.insert(id.to_string(), Handler::MirrorSlider);
        }
        for id in sliders {
            self.update_slider_display(id);
        }
    }

    /// Routes a UI event to the handler bound to its target.
    pub fn dispatch(&mut self, event: UiEvent) {
        match event {
            UiEvent::Click(target) => match self.handlers.get(&target).copied() {
                Some(Handler::Load) => self.load_configuration(),
                Some(Handler::Save) => self.save_configuration(),
                _ => debug!(element = %target, "click with no handler"),
            },
            UiEvent::Input { target, value } => {
                if !self.form.set_value(&target, value) {
                    debug!(element = %target, "input event for unknown element");
                    return;
                }
                if self.handlers.get(&target) == Some(&Handler::MirrorSlider) {
                    self.update_slider_display(&target);
                }
            }
        }
    }

    fn update_slider_display(&mut self, id: &str) {
        if let Some(value) = self.form.value(id).map(str::to_string) {
            self.form.set_label(id, value);
        }
    }

    fn refresh_slider_displays(&mut self) {
        let sliders: Vec<&'static str> = self.form.sliders().map(|s| s.id).collect();
        for id in sliders {
            self.update_slider_display(id);
        }
    }

    pub fn load_configuration(&mut self) {
        self.set_status("Loading configuration...", StatusKind::Info);

        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.fetch().await;
            // Receiver gone means the UI has shut down
            let _ = tx.send(Completion::Loaded(result));
        });
    }

    pub fn save_configuration(&mut self) {
        self.set_status("Saving configuration...", StatusKind::Info);

        let config = self.read_form();
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.store(&config).await;
            let _ = tx.send(Completion::Saved(result));
        });
    }

    pub fn set_status(&mut self, message: impl Into<String>, kind: StatusKind) {
        self.form.show_status(message, kind);

        if kind == StatusKind::Success {
            // Earlier clears are not cancelled; each one fires on schedule.
            let delay = tokio::time::sleep(self.clear_after);
            let tx = self.tx.clone();
            tokio::spawn(async move {
                delay.await;
                let _ = tx.send(Completion::ClearStatus);
            });
        }
    }

    /// Applies every completion that has already arrived.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.rx.try_recv() {
            self.apply(completion);
            applied += 1;
        }
        applied
    }

    /// Waits for the next completion and applies it.
    #[cfg(test)]
    pub async fn pump(&mut self) {
        // The controller holds a sender, so the channel never closes
        if let Some(completion) = self.rx.recv().await {
            self.apply(completion);
        }
    }

    fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Loaded(Ok(config)) => {
                self.populate_form(&config);
                info!("configuration loaded from {}", self.client.endpoint());
                self.set_status("Configuration loaded successfully!", StatusKind::Success);
            }
            Completion::Loaded(Err(e)) => {
                error!("Error loading config: {}", e);
                self.set_status(format!("Error loading configuration: {}", e), StatusKind::Error);
            }
            Completion::Saved(Ok(())) => {
                info!("configuration saved to {}", self.client.endpoint());
                self.set_status("Configuration saved successfully!", StatusKind::Success);
            }
            Completion::Saved(Err(e)) => {
                error!("Error saving config: {}", e);
                self.set_status(format!("Error saving configuration: {}", e), StatusKind::Error);
            }
            Completion::ClearStatus => self.form.clear_status(),
        }
    }

    fn populate_form(&mut self, config: &AppConfig) {
        let fields = &mut self.form;
        fields.set_value(form::NDI_SOURCE, config.ndi_source_name.as_str());
        fields.set_value(form::HUE_MIN, config.hue_min.to_string());
        fields.set_value(form::HUE_MAX, config.hue_max.to_string());
        fields.set_value(form::SAT_MIN, config.saturation_min.to_string());
        fields.set_value(form::SAT_MAX, config.saturation_max.to_string());
        fields.set_value(form::VAL_MIN, config.value_min.to_string());
        fields.set_value(form::VAL_MAX, config.value_max.to_string());
        fields.set_value(form::SENSITIVITY, config.mouse_sensitivity.to_string());
        fields.set_value(form::VENDOR_ID, int_to_hex(config.vendor_id));
        fields.set_value(form::PRODUCT_ID, int_to_hex(config.product_id));

        self.refresh_slider_displays();
    }

    fn read_form(&self) -> AppConfig {
        let defaults = AppConfig::default();

        AppConfig {
            ndi_source_name: self.form.value(form::NDI_SOURCE).unwrap_or_default().to_string(),
            hue_min: self.int_field(form::HUE_MIN, defaults.hue_min),
            hue_max: self.int_field(form::HUE_MAX, defaults.hue_max),
            saturation_min: self.int_field(form::SAT_MIN, defaults.saturation_min),
            saturation_max: self.int_field(form::SAT_MAX, defaults.saturation_max),
            value_min: self.int_field(form::VAL_MIN, defaults.value_min),
            value_max: self.int_field(form::VAL_MAX, defaults.value_max),
            mouse_sensitivity: match self.form.float_value(form::SENSITIVITY) {
                Some(v) => v,
                None => {
                    warn!(field = form::SENSITIVITY, "not a number, sending default");
                    defaults.mouse_sensitivity
                }
            },
            vendor_id: hex_to_int(self.form.value(form::VENDOR_ID).unwrap_or_default()),
            product_id: hex_to_int(self.form.value(form::PRODUCT_ID).unwrap_or_default()),
        }
    }

    fn int_field(&self, id: &str, default: i64) -> i64 {
        self.form.int_value(id).unwrap_or_else(|| {
            warn!(field = id, "not an integer, sending default");
            default
        })
    }
}
