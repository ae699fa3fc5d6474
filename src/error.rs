use std::path::PathBuf;

/// Result type alias for workflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the theme update workflow.
///
/// The `Display` text doubles as the body of the failure notification, so it
/// is phrased for the user rather than for the log.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Neither the configured path nor `$PATH` yields a matugen executable.
    #[error("Matugen binary not found. Please install matugen v{minimum}+.")]
    BinaryNotFound { minimum: &'static str },

    /// `matugen --version` printed nothing that looks like a version.
    #[error("Could not determine the version of {}. v{required}+ required.", .path.display())]
    VersionUnknown {
        path: PathBuf,
        required: &'static str,
    },

    #[error("Matugen v{found} is too old. v{required}+ required.")]
    VersionTooOld {
        found: String,
        required: &'static str,
    },

    /// An auxiliary program is not on `$PATH`.
    #[error("Dependency missing: {tool}")]
    MissingTool { tool: &'static str },

    /// `matugen-config` points at a file that does not exist.
    #[error("Matugen config not found: {}", .0.display())]
    MissingConfig(PathBuf),

    #[error("GSettings schema '{0}' is not installed")]
    SchemaMissing(String),

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: glib::Error,
    },

    /// Non-zero exit. `message` is the captured stderr, or the exit code
    /// when the program printed nothing.
    #[error("{program}: {message}")]
    CommandFailed { program: String, message: String },

    #[error("Image conversion failed: {0}")]
    Conversion(Box<Error>),

    #[error("Failed to write {key}: {source}")]
    SettingsWrite {
        key: String,
        #[source]
        source: glib::BoolError,
    },
}

impl Error {
    /// Build a `CommandFailed` from a program's stderr and exit status.
    pub fn command_failed(program: impl Into<String>, stderr: &str, status: i32) -> Self {
        let stderr = stderr.trim();
        let message = if stderr.is_empty() {
            format!("Exit code {}", status)
        } else {
            stderr.to_string()
        };
        Self::CommandFailed {
            program: program.into(),
            message,
        }
    }
}
