use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::notify::Notifier;
use crate::process::{CommandOutput, LocalBoxFuture, ProcessRunner, ProgramPath};
use crate::settings::SettingsStore;

/// Settings store that records every write and counts value transitions
/// per key, the way `changed` signals would fire.
#[derive(Default)]
pub struct MemorySettings {
    values: RefCell<HashMap<String, String>>,
    writes: RefCell<Vec<(String, String)>>,
    changes: RefCell<HashMap<String, usize>>,
    read_only: RefCell<HashSet<String>>,
}

impl MemorySettings {
    pub fn with(pairs: &[(&str, &str)]) -> Self {
        let settings = Self::default();
        for (key, value) in pairs {
            settings
                .values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
        }
        settings
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    pub fn make_read_only(&self, key: &str) {
        self.read_only.borrow_mut().insert(key.to_string());
    }

    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.borrow().clone()
    }

    pub fn writes_to(&self, key: &str) -> Vec<String> {
        self.writes
            .borrow()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    pub fn change_count(&self, key: &str) -> usize {
        self.changes.borrow().get(key).copied().unwrap_or(0)
    }
}

impl SettingsStore for MemorySettings {
    fn string(&self, key: &str) -> String {
        self.values.borrow().get(key).cloned().unwrap_or_default()
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        if self.read_only.borrow().contains(key) {
            return Err(Error::SettingsWrite {
                key: key.to_string(),
                source: glib::bool_error!("key is not writable"),
            });
        }
        self.writes
            .borrow_mut()
            .push((key.to_string(), value.to_string()));
        let previous = self
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        if previous.as_deref() != Some(value) {
            *self.changes.borrow_mut().entry(key.to_string()).or_default() += 1;
        }
        Ok(())
    }
}

type Responder = Box<dyn Fn(&[String]) -> Result<CommandOutput>>;

/// Fake `$PATH` and process table.
///
/// Programs are found by name from a fixed table. `--version` probes answer
/// with [`FakeSystem::set_version_output`]; every other command succeeds with
/// empty output unless a responder overrides it.
pub struct FakeSystem {
    programs: RefCell<HashMap<String, PathBuf>>,
    executables: RefCell<HashSet<PathBuf>>,
    version_output: RefCell<String>,
    responder: RefCell<Option<Responder>>,
    on_run: RefCell<Option<Box<dyn Fn(&[String])>>>,
    calls: RefCell<Vec<Vec<String>>>,
}

impl FakeSystem {
    pub const MATUGEN: &'static str = "/usr/bin/matugen";

    /// A system with matugen 3.1.0, djxl and sassc installed.
    pub fn complete() -> Self {
        let system = Self::empty();
        system.install("matugen", Self::MATUGEN);
        system.install("djxl", "/usr/bin/djxl");
        system.install("sassc", "/usr/bin/sassc");
        system
    }

    pub fn empty() -> Self {
        Self {
            programs: RefCell::default(),
            executables: RefCell::default(),
            version_output: RefCell::new("matugen 3.1.0\n".to_string()),
            responder: RefCell::default(),
            on_run: RefCell::default(),
            calls: RefCell::default(),
        }
    }

    pub fn install(&self, name: &str, path: &str) {
        self.programs
            .borrow_mut()
            .insert(name.to_string(), PathBuf::from(path));
        self.executables.borrow_mut().insert(PathBuf::from(path));
    }

    pub fn uninstall(&self, name: &str) {
        if let Some(path) = self.programs.borrow_mut().remove(name) {
            self.executables.borrow_mut().remove(&path);
        }
    }

    pub fn set_executable(&self, path: &str) {
        self.executables.borrow_mut().insert(PathBuf::from(path));
    }

    pub fn set_version_output(&self, output: &str) {
        *self.version_output.borrow_mut() = output.to_string();
    }

    pub fn respond_with(&self, responder: impl Fn(&[String]) -> Result<CommandOutput> + 'static) {
        *self.responder.borrow_mut() = Some(Box::new(responder));
    }

    /// Called synchronously at the start of every run, before it resolves.
    pub fn on_run(&self, hook: impl Fn(&[String]) + 'static) {
        *self.on_run.borrow_mut() = Some(Box::new(hook));
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    /// Runs whose argv[1] is `subcommand`.
    pub fn calls_with(&self, subcommand: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|argv| argv.get(1).map(String::as_str) == Some(subcommand))
            .count()
    }
}

impl ProcessRunner for FakeSystem {
    fn run<'a>(&'a self, argv: &'a [String]) -> LocalBoxFuture<'a, Result<CommandOutput>> {
        Box::pin(async move {
            self.calls.borrow_mut().push(argv.to_vec());
            if let Some(hook) = self.on_run.borrow().as_ref() {
                hook(argv);
            }
            if let Some(responder) = self.responder.borrow().as_ref() {
                return responder(argv);
            }
            if argv.get(1).map(String::as_str) == Some("--version") {
                return Ok(CommandOutput {
                    stdout: self.version_output.borrow().clone(),
                    stderr: String::new(),
                });
            }
            Ok(CommandOutput::default())
        })
    }
}

impl ProgramPath for FakeSystem {
    fn find_program(&self, name: &str) -> Option<PathBuf> {
        self.programs.borrow().get(name).cloned()
    }

    fn is_executable(&self, path: &Path) -> bool {
        self.executables.borrow().contains(path)
    }
}

/// Notifier that keeps every (title, body) pair.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: RefCell<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, body: &str) {
        self.sent
            .borrow_mut()
            .push((title.to_string(), body.to_string()));
    }
}
