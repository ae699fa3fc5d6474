use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::OnceLock;

use gio::prelude::*;
use regex::Regex;

use crate::convert;
use crate::settings::{SettingsStore, KEY_PICTURE_URI, KEY_PICTURE_URI_DARK};
use crate::theme::ThemeMode;

/// `picture-uri` value GNOME uses for "no wallpaper".
const NO_WALLPAPER: &str = "none";

/// A wallpaper file ready for the rest of the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallpaperDescriptor {
    pub path: PathBuf,
    /// matugen cannot read the file directly; see [`convert`].
    pub needs_conversion: bool,
}

/// Reads `org.gnome.desktop.background` and turns the configured URI into a
/// local image path.
pub struct WallpaperResolver {
    background: Rc<dyn SettingsStore>,
}

impl WallpaperResolver {
    pub fn new(background: Rc<dyn SettingsStore>) -> Self {
        Self { background }
    }

    /// Resolve the wallpaper for `mode` along with its format flag.
    pub fn resolve(&self, mode: ThemeMode) -> Option<WallpaperDescriptor> {
        self.get_wallpaper_path(mode).map(|path| WallpaperDescriptor {
            needs_conversion: convert::needs_conversion(&path),
            path,
        })
    }

    /// Local path of the wallpaper shown in `mode`.
    ///
    /// Dark mode prefers `picture-uri-dark` and falls back to `picture-uri`.
    /// Returns `None` when no wallpaper is set or it is not a local file.
    pub fn get_wallpaper_path(&self, mode: ThemeMode) -> Option<PathBuf> {
        let mut uri = match mode {
            ThemeMode::Dark => self.background.string(KEY_PICTURE_URI_DARK),
            ThemeMode::Light => String::new(),
        };
        if uri.is_empty() {
            uri = self.background.string(KEY_PICTURE_URI);
        }
        if uri.is_empty() || uri == NO_WALLPAPER {
            return None;
        }

        let Some(path) = gio::File::for_uri(&uri).path() else {
            tracing::warn!("wallpaper {} is not a local file", uri);
            return None;
        };
        if !path.exists() {
            tracing::warn!("wallpaper {} does not exist", path.display());
            return None;
        }

        if is_descriptor(&path) {
            return Some(extract_image_from_descriptor(&path));
        }
        Some(path)
    }
}

fn is_descriptor(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("xml"))
        .unwrap_or(false)
}

/// Pick the first image named by a dynamic wallpaper descriptor.
///
/// The first `<filename>` or `<file>` element wins; relative names are
/// resolved against the descriptor's directory. Any failure yields the
/// descriptor path itself.
pub fn extract_image_from_descriptor(xml_path: &Path) -> PathBuf {
    static IMAGE_ELEMENT: OnceLock<Regex> = OnceLock::new();
    let re = IMAGE_ELEMENT.get_or_init(|| {
        Regex::new(r"<(?:filename|file)>(.*?)</(?:filename|file)>")
            .expect("descriptor pattern is valid")
    });

    let bytes = match std::fs::read(xml_path) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!("failed to read {}: {}", xml_path.display(), e);
            return xml_path.to_path_buf();
        }
    };
    let text = String::from_utf8_lossy(&bytes);

    let Some(name) = re
        .captures(&text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|name| !name.is_empty())
    else {
        tracing::warn!("no image element in {}", xml_path.display());
        return xml_path.to_path_buf();
    };

    let mut image = PathBuf::from(name);
    if image.is_relative() {
        if let Some(dir) = xml_path.parent() {
            image = dir.join(image);
        }
    }

    if image.exists() {
        image
    } else {
        tracing::warn!(
            "{} names missing image {}",
            xml_path.display(),
            image.display()
        );
        xml_path.to_path_buf()
    }
}
