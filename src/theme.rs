use std::fmt;

/// Which color scheme variant to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Dark,
    Light,
}

impl ThemeMode {
    /// Parse the persisted `color-mode` value. Anything but "light" is dark.
    pub fn from_setting(value: &str) -> Self {
        if value == "light" {
            ThemeMode::Light
        } else {
            ThemeMode::Dark
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    /// Value for `org.gnome.desktop.interface color-scheme`.
    pub fn color_scheme(self) -> &'static str {
        match self {
            ThemeMode::Dark => "prefer-dark",
            ThemeMode::Light => "prefer-light",
        }
    }

    /// GTK3 theme name matching this mode.
    pub fn gtk_theme(self) -> &'static str {
        match self {
            ThemeMode::Light => "adw-gtk3",
            ThemeMode::Dark => "adw-gtk3-dark",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefix matugen expects on `--type` values.
const SCHEME_PREFIX: &str = "scheme-";

/// Palette generation variants understood by matugen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeFlavor {
    TonalSpot,
    Vibrant,
    Expressive,
    FruitSalad,
    Content,
    Monochrome,
    Neutral,
    Rainbow,
    Fidelity,
}

impl SchemeFlavor {
    /// All flavors, in menu order.
    pub const ALL: [SchemeFlavor; 9] = [
        SchemeFlavor::TonalSpot,
        SchemeFlavor::Vibrant,
        SchemeFlavor::Expressive,
        SchemeFlavor::FruitSalad,
        SchemeFlavor::Content,
        SchemeFlavor::Monochrome,
        SchemeFlavor::Neutral,
        SchemeFlavor::Rainbow,
        SchemeFlavor::Fidelity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SchemeFlavor::TonalSpot => "tonal-spot",
            SchemeFlavor::Vibrant => "vibrant",
            SchemeFlavor::Expressive => "expressive",
            SchemeFlavor::FruitSalad => "fruit-salad",
            SchemeFlavor::Content => "content",
            SchemeFlavor::Monochrome => "monochrome",
            SchemeFlavor::Neutral => "neutral",
            SchemeFlavor::Rainbow => "rainbow",
            SchemeFlavor::Fidelity => "fidelity",
        }
    }

    /// Parse a persisted flavor in any accepted spelling
    /// ("tonal_spot", "scheme-tonal-spot", ...).
    pub fn parse(value: &str) -> Option<Self> {
        let bare = bare_flavor(value)?;
        Self::ALL.into_iter().find(|f| f.as_str() == bare)
    }
}

impl fmt::Display for SchemeFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip the scheme prefix and turn underscores into hyphens.
fn bare_flavor(value: &str) -> Option<String> {
    let value = value.trim().replace('_', "-");
    let value = value.strip_prefix(SCHEME_PREFIX).unwrap_or(&value);
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

/// Normalize a flavor setting to the `scheme-*` form passed to `matugen -t`.
///
/// Values outside [`SchemeFlavor::ALL`] are passed through so custom matugen
/// schemes keep working. Returns `None` for an empty setting.
pub fn normalize_flavor(value: &str) -> Option<String> {
    bare_flavor(value).map(|bare| format!("{SCHEME_PREFIX}{bare}"))
}

/// Flavor name shown to the user. Empty settings display as the matugen
/// default.
pub fn display_flavor(value: &str) -> String {
    bare_flavor(value).unwrap_or_else(|| SchemeFlavor::TonalSpot.as_str().to_string())
}
