use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::process::{ProcessRunner, ProgramPath};
use crate::settings::{SettingsStore, KEY_MATUGEN_PATH};
use crate::version::{compare_versions, extract_version};

/// Oldest matugen release whose command line we speak.
pub const MIN_MATUGEN_VERSION: &str = "3.0.0";

/// Executable name searched on `$PATH`.
pub const MATUGEN_BINARY: &str = "matugen";

/// Decoder used for JPEG XL wallpapers.
pub const JXL_DECODER: &str = "djxl";

/// Stylesheet compiler used by the matugen templates.
pub const SASS_COMPILER: &str = "sassc";

const AUXILIARY_TOOLS: [&str; 2] = [JXL_DECODER, SASS_COMPILER];

pub struct DependencyChecker {
    config: Rc<dyn SettingsStore>,
    programs: Rc<dyn ProgramPath>,
    runner: Rc<dyn ProcessRunner>,
}

impl DependencyChecker {
    pub fn new(
        config: Rc<dyn SettingsStore>,
        programs: Rc<dyn ProgramPath>,
        runner: Rc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            config,
            programs,
            runner,
        }
    }

    /// Resolve the matugen binary, check its version and the helper tools.
    ///
    /// All three checks always run in this order; the first failure is
    /// returned. On success the usable binary path is returned.
    pub async fn check_requirements(&self) -> Result<PathBuf> {
        let binary = self.resolve_binary()?;
        self.check_version(&binary).await?;
        self.check_auxiliary_tools()?;
        Ok(binary)
    }

    /// Use the configured path when it is executable, otherwise search
    /// `$PATH` and persist what was found.
    fn resolve_binary(&self) -> Result<PathBuf> {
        let configured = self.config.string(KEY_MATUGEN_PATH);
        if !configured.is_empty() {
            let path = PathBuf::from(&configured);
            if self.programs.is_executable(&path) {
                return Ok(path);
            }
            tracing::warn!("configured matugen path {} is not executable", configured);
        }

        let found = self
            .programs
            .find_program(MATUGEN_BINARY)
            .ok_or(Error::BinaryNotFound {
                minimum: MIN_MATUGEN_VERSION,
            })?;

        tracing::info!("found matugen at {}", found.display());
        if let Err(e) = self
            .config
            .set_string(KEY_MATUGEN_PATH, &found.to_string_lossy())
        {
            tracing::warn!("could not remember matugen path: {}", e);
        }
        Ok(found)
    }

    async fn check_version(&self, binary: &Path) -> Result<()> {
        let argv = [binary.to_string_lossy().into_owned(), "--version".to_string()];
        let stdout = match self.runner.run(&argv).await {
            Ok(output) => output.stdout,
            Err(e) => {
                tracing::warn!("matugen --version failed: {}", e);
                String::new()
            }
        };

        let found = extract_version(&stdout).ok_or_else(|| Error::VersionUnknown {
            path: binary.to_path_buf(),
            required: MIN_MATUGEN_VERSION,
        })?;

        if compare_versions(found, MIN_MATUGEN_VERSION) == Ordering::Less {
            return Err(Error::VersionTooOld {
                found: found.to_string(),
                required: MIN_MATUGEN_VERSION,
            });
        }

        tracing::debug!("matugen version {}", found);
        Ok(())
    }

    fn check_auxiliary_tools(&self) -> Result<()> {
        for tool in AUXILIARY_TOOLS {
            if self.programs.find_program(tool).is_none() {
                return Err(Error::MissingTool { tool });
            }
        }
        Ok(())
    }
}
