use std::ffi::OsStr;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use gio::prelude::*;

use crate::error::{Error, Result};

/// Boxed future that stays on the main context thread.
pub type LocalBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs a program to completion without blocking the main loop.
pub trait ProcessRunner {
    /// Run `argv[0]` with the remaining arguments. A non-zero exit is an
    /// [`Error::CommandFailed`] carrying the captured stderr.
    fn run<'a>(&'a self, argv: &'a [String]) -> LocalBoxFuture<'a, Result<CommandOutput>>;
}

/// Finds programs on the execution-time `$PATH`.
pub trait ProgramPath {
    fn find_program(&self, name: &str) -> Option<PathBuf>;
    fn is_executable(&self, path: &Path) -> bool;
}

/// [`ProcessRunner`] and [`ProgramPath`] backed by `gio::Subprocess` and glib.
#[derive(Debug, Default, Clone, Copy)]
pub struct GioProcess;

impl ProcessRunner for GioProcess {
    fn run<'a>(&'a self, argv: &'a [String]) -> LocalBoxFuture<'a, Result<CommandOutput>> {
        Box::pin(async move {
            let program = argv.first().cloned().unwrap_or_default();
            tracing::debug!(?argv, "spawning");

            let args: Vec<&OsStr> = argv.iter().map(OsStr::new).collect();
            let proc = gio::Subprocess::newv(
                &args,
                gio::SubprocessFlags::STDOUT_PIPE | gio::SubprocessFlags::STDERR_PIPE,
            )
            .map_err(|source| Error::Spawn {
                program: program.clone(),
                source,
            })?;

            let (stdout, stderr) =
                proc.communicate_utf8_future(None)
                    .await
                    .map_err(|source| Error::Spawn {
                        program: program.clone(),
                        source,
                    })?;
            let stdout = stdout.map(|s| s.to_string()).unwrap_or_default();
            let stderr = stderr.map(|s| s.to_string()).unwrap_or_default();

            if !proc.is_successful() {
                let status = if proc.has_exited() {
                    proc.exit_status()
                } else {
                    -1
                };
                return Err(Error::command_failed(program, &stderr, status));
            }

            Ok(CommandOutput { stdout, stderr })
        })
    }
}

impl ProgramPath for GioProcess {
    fn find_program(&self, name: &str) -> Option<PathBuf> {
        glib::find_program_in_path(name)
    }

    fn is_executable(&self, path: &Path) -> bool {
        // `glib::file_test` is crate-private in glib 0.20; call the same GLib
        // function through its public FFI binding.
        use glib::translate::{from_glib, ToGlibPtr};
        unsafe {
            from_glib(glib::ffi::g_file_test(
                path.to_glib_none().0,
                glib::ffi::G_FILE_TEST_IS_EXECUTABLE,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run on a private context pushed as thread default, so gio delivers
    /// the subprocess callbacks to it.
    fn run(parts: &[&str]) -> Result<CommandOutput> {
        let argv: Vec<String> = parts.iter().map(|s| s.to_string()).collect();
        let ctx = glib::MainContext::new();
        ctx.with_thread_default(|| ctx.block_on(GioProcess.run(&argv)))
            .unwrap()
    }

    #[test]
    fn captures_stdout() {
        let out = run(&["sh", "-c", "printf 'matugen 3.1.0'"]).unwrap();
        assert_eq!(out.stdout, "matugen 3.1.0");
    }

    #[test]
    fn non_zero_exit_carries_stderr() {
        let err = run(&["sh", "-c", "echo broken >&2; exit 2"]).unwrap_err();
        assert_eq!(err.to_string(), "sh: broken");
    }

    #[test]
    fn non_zero_exit_without_stderr_reports_code() {
        let err = run(&["sh", "-c", "exit 4"]).unwrap_err();
        assert_eq!(err.to_string(), "sh: Exit code 4");
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let err = run(&["/nonexistent/matugen", "--version"]).unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }

    #[test]
    fn finds_shell_on_path() {
        let sh = GioProcess.find_program("sh").unwrap();
        assert!(GioProcess.is_executable(&sh));
        assert!(GioProcess.find_program("definitely-not-a-real-program").is_none());
    }
}
