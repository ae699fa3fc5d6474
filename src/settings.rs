use gio::prelude::*;

use crate::error::{Error, Result};

/// Schema holding the service's own configuration.
pub const APP_SCHEMA: &str = "io.github.matugen.AutoThemer";
pub const BACKGROUND_SCHEMA: &str = "org.gnome.desktop.background";
pub const INTERFACE_SCHEMA: &str = "org.gnome.desktop.interface";

// io.github.matugen.AutoThemer
pub const KEY_MATUGEN_PATH: &str = "matugen-path";
pub const KEY_MATUGEN_CONFIG: &str = "matugen-config";
pub const KEY_COLOR_MODE: &str = "color-mode";
pub const KEY_MATUGEN_FLAVOR: &str = "matugen-flavor";

// org.gnome.desktop.background
pub const KEY_PICTURE_URI: &str = "picture-uri";
pub const KEY_PICTURE_URI_DARK: &str = "picture-uri-dark";

// org.gnome.desktop.interface
pub const KEY_GTK_THEME: &str = "gtk-theme";
pub const KEY_COLOR_SCHEME: &str = "color-scheme";

/// String-valued key/value store. Every stage reads and writes settings
/// through it; implemented for `gio::Settings` and faked in tests.
pub trait SettingsStore {
    fn string(&self, key: &str) -> String;
    fn set_string(&self, key: &str, value: &str) -> Result<()>;
}

impl SettingsStore for gio::Settings {
    fn string(&self, key: &str) -> String {
        SettingsExt::string(self, key).to_string()
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        SettingsExt::set_string(self, key, value).map_err(|source| Error::SettingsWrite {
            key: key.to_string(),
            source,
        })
    }
}

/// Open a schema, failing with [`Error::SchemaMissing`] instead of the abort
/// `gio::Settings::new` performs on unknown schemas.
pub fn open(schema_id: &str) -> Result<gio::Settings> {
    let schema = gio::SettingsSchemaSource::default()
        .and_then(|source| source.lookup(schema_id, true))
        .ok_or_else(|| Error::SchemaMissing(schema_id.to_string()))?;

    Ok(gio::Settings::new_full(
        &schema,
        None::<&gio::SettingsBackend>,
        None,
    ))
}
