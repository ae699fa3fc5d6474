use std::rc::Rc;

use crate::settings::{SettingsStore, KEY_COLOR_SCHEME, KEY_GTK_THEME};
use crate::theme::ThemeMode;

pub struct InterfaceApplier {
    interface: Rc<dyn SettingsStore>,
}

impl InterfaceApplier {
    pub fn new(interface: Rc<dyn SettingsStore>) -> Self {
        Self { interface }
    }

    /// Apply `mode` to the GTK theme and color scheme.
    ///
    /// `color-scheme` is written to the opposite value and back, so apps
    /// reload their colors even when the scheme itself did not change. Each
    /// write failure is logged and does not stop the others.
    pub fn apply_interface_mode(&self, mode: ThemeMode) {
        let gtk_theme = mode.gtk_theme();
        if self.interface.string(KEY_GTK_THEME) != gtk_theme {
            self.write(KEY_GTK_THEME, gtk_theme);
        }

        self.write(KEY_COLOR_SCHEME, mode.opposite().color_scheme());
        self.write(KEY_COLOR_SCHEME, mode.color_scheme());
    }

    fn write(&self, key: &str, value: &str) {
        match self.interface.set_string(key, value) {
            Ok(()) => tracing::debug!("{} = {}", key, value),
            Err(e) => tracing::warn!("{}", e),
        }
    }
}
