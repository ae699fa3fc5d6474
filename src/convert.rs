use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::process::{ProcessRunner, ProgramPath};
use crate::requirements::JXL_DECODER;

/// Fixed conversion target. Only one workflow runs at a time, so a single
/// slot is enough.
const TEMP_WALLPAPER: &str = "matugen-temp-wallpaper.png";

/// Image formats that need a decode step before matugen sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Native,
    JpegXl,
}

impl SourceFormat {
    /// Infer format from a path's extension, ignoring case.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("jxl") => SourceFormat::JpegXl,
            _ => SourceFormat::Native,
        }
    }
}

pub fn needs_conversion(path: &Path) -> bool {
    SourceFormat::from_path(path) != SourceFormat::Native
}

/// Path of the converted wallpaper under the system temp dir.
pub fn temp_wallpaper_path() -> PathBuf {
    glib::tmp_dir().join(TEMP_WALLPAPER)
}

pub struct ImageAdapter {
    programs: Rc<dyn ProgramPath>,
    runner: Rc<dyn ProcessRunner>,
    destination: PathBuf,
}

impl ImageAdapter {
    pub fn new(programs: Rc<dyn ProgramPath>, runner: Rc<dyn ProcessRunner>) -> Self {
        Self {
            programs,
            runner,
            destination: temp_wallpaper_path(),
        }
    }

    /// Return a path matugen can read: `source` itself, or a PNG decoded
    /// into the temp slot.
    pub async fn ensure_compatible_image(&self, source: &Path) -> Result<PathBuf> {
        match SourceFormat::from_path(source) {
            SourceFormat::Native => Ok(source.to_path_buf()),
            SourceFormat::JpegXl => self.decode_jxl(source).await,
        }
    }

    async fn decode_jxl(&self, source: &Path) -> Result<PathBuf> {
        let decoder = self
            .programs
            .find_program(JXL_DECODER)
            .ok_or(Error::MissingTool { tool: JXL_DECODER })?;

        let argv = [
            decoder.to_string_lossy().into_owned(),
            source.to_string_lossy().into_owned(),
            self.destination.to_string_lossy().into_owned(),
        ];
        self.runner.run(&argv).await?;

        tracing::info!(
            "decoded {} to {}",
            source.display(),
            self.destination.display()
        );
        Ok(self.destination.clone())
    }
}
