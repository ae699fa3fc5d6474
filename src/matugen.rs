use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::process::ProcessRunner;
use crate::settings::{SettingsStore, KEY_MATUGEN_CONFIG, KEY_MATUGEN_FLAVOR};
use crate::theme::{normalize_flavor, ThemeMode};

pub struct ThemeInvoker {
    config: Rc<dyn SettingsStore>,
    runner: Rc<dyn ProcessRunner>,
    /// Config used when `matugen-config` is empty.
    bundled_config: Option<PathBuf>,
}

impl ThemeInvoker {
    pub fn new(
        config: Rc<dyn SettingsStore>,
        runner: Rc<dyn ProcessRunner>,
        bundled_config: Option<PathBuf>,
    ) -> Self {
        Self {
            config,
            runner,
            bundled_config,
        }
    }

    /// Generate the theme for `image` in `mode`.
    pub async fn run_matugen(&self, binary: &Path, image: &Path, mode: ThemeMode) -> Result<()> {
        let argv = self.build_args(binary, image, mode)?;
        tracing::debug!(?argv, "running matugen");

        let output = self.runner.run(&argv).await?;
        let stdout = output.stdout.trim();
        if !stdout.is_empty() {
            tracing::info!("matugen: {}", stdout);
        }
        Ok(())
    }

    /// `matugen image <path> --mode <mode> [-t <scheme>] [-c <config>]`
    pub fn build_args(&self, binary: &Path, image: &Path, mode: ThemeMode) -> Result<Vec<String>> {
        let mut argv = vec![
            binary.to_string_lossy().into_owned(),
            "image".to_string(),
            image.to_string_lossy().into_owned(),
            "--mode".to_string(),
            mode.as_str().to_string(),
        ];

        if let Some(scheme) = normalize_flavor(&self.config.string(KEY_MATUGEN_FLAVOR)) {
            argv.push("-t".to_string());
            argv.push(scheme);
        }

        if let Some(config) = self.config_path()? {
            argv.push("-c".to_string());
            argv.push(config.to_string_lossy().into_owned());
        }

        Ok(argv)
    }

    /// The configured config file, else the bundled one if installed, else
    /// none so matugen uses its own defaults.
    fn config_path(&self) -> Result<Option<PathBuf>> {
        let configured = self.config.string(KEY_MATUGEN_CONFIG);
        let configured = configured.trim();

        if !configured.is_empty() {
            let path = expand_path(configured);
            if !path.exists() {
                return Err(Error::MissingConfig(path));
            }
            return Ok(Some(path));
        }

        Ok(self.bundled_config.clone().filter(|p| p.exists()))
    }
}

/// Expand a leading `~` or `~/` to the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    if path == "~" {
        return glib::home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => glib::home_dir().join(rest),
        None => PathBuf::from(path),
    }
}

/// Locate the bundled `matugen/config.toml`.
pub fn bundled_config_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok();
    bundled_config_candidates(exe.as_deref())
        .into_iter()
        .find(|p| p.is_file())
}

/// Places the bundled config may live, in lookup order: next to the
/// development tree, then the usual install prefixes.
fn bundled_config_candidates(exe: Option<&Path>) -> Vec<PathBuf> {
    let relative = Path::new("matugen").join("config.toml");
    let mut candidates = Vec::new();

    if let Some(exe) = exe {
        // target/debug/matugen-auto-themer -> project_root/data/matugen/config.toml
        if let Some(project_root) = exe.ancestors().nth(3) {
            candidates.push(project_root.join("data").join(&relative));
        }
        // <prefix>/bin/matugen-auto-themer -> <prefix>/share/matugen-auto-themer
        if let Some(prefix) = exe.ancestors().nth(2) {
            candidates.push(
                prefix
                    .join("share")
                    .join("matugen-auto-themer")
                    .join(&relative),
            );
        }
    }

    candidates.extend(
        ["/usr/share/matugen-auto-themer", "/app/share/matugen-auto-themer"]
            .into_iter()
            .map(|dir| Path::new(dir).join(&relative)),
    );
    candidates
}
