use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

use crate::convert::ImageAdapter;
use crate::error::{Error, Result};
use crate::interface::InterfaceApplier;
use crate::matugen::ThemeInvoker;
use crate::notify::{Notifier, APP_TITLE};
use crate::process::{ProcessRunner, ProgramPath};
use crate::requirements::DependencyChecker;
use crate::settings::{SettingsStore, KEY_COLOR_MODE, KEY_MATUGEN_FLAVOR};
use crate::theme::{display_flavor, ThemeMode};
use crate::wallpaper::WallpaperResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Idle,
    Running,
    /// Running, and at least one trigger arrived since the run started.
    RunningRerunPending,
}

/// A configuration change, whichever settings schema it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    Wallpaper,
    ColorMode,
    Flavor,
    MatugenConfig,
}

impl ConfigChange {
    /// Whether displayed mode or flavor may have changed.
    pub fn affects_appearance(self) -> bool {
        matches!(self, ConfigChange::ColorMode | ConfigChange::Flavor)
    }
}

type AppearanceListener = Rc<dyn Fn(ThemeMode, &str)>;

/// External collaborators the workflow talks to.
pub struct Services {
    pub config: Rc<dyn SettingsStore>,
    pub background: Rc<dyn SettingsStore>,
    pub interface: Rc<dyn SettingsStore>,
    pub programs: Rc<dyn ProgramPath>,
    pub runner: Rc<dyn ProcessRunner>,
    pub notifier: Rc<dyn Notifier>,
    pub bundled_config: Option<PathBuf>,
}

/// Single-flight driver for the theme update workflow.
///
/// Settings changes call [`Orchestrator::trigger_update`]. At most one
/// workflow runs at a time; triggers that arrive while one is running fold
/// into a single rerun that reads whatever configuration is current when it
/// starts.
pub struct Orchestrator {
    context: glib::MainContext,
    state: Cell<ExecutionState>,
    config: Rc<dyn SettingsStore>,
    notifier: Rc<dyn Notifier>,
    checker: DependencyChecker,
    resolver: WallpaperResolver,
    adapter: ImageAdapter,
    invoker: ThemeInvoker,
    applier: InterfaceApplier,
    appearance_listeners: RefCell<Vec<AppearanceListener>>,
}

impl Orchestrator {
    /// Workflows are spawned on `context`.
    pub fn new(context: glib::MainContext, services: Services) -> Rc<Self> {
        let Services {
            config,
            background,
            interface,
            programs,
            runner,
            notifier,
            bundled_config,
        } = services;

        Rc::new(Self {
            context,
            state: Cell::new(ExecutionState::Idle),
            checker: DependencyChecker::new(config.clone(), programs.clone(), runner.clone()),
            resolver: WallpaperResolver::new(background),
            adapter: ImageAdapter::new(programs, runner.clone()),
            invoker: ThemeInvoker::new(config.clone(), runner, bundled_config),
            applier: InterfaceApplier::new(interface),
            config,
            notifier,
            appearance_listeners: RefCell::new(Vec::new()),
        })
    }

    pub fn state(&self) -> ExecutionState {
        self.state.get()
    }

    /// Mode from the live configuration.
    pub fn current_mode(&self) -> ThemeMode {
        ThemeMode::from_setting(&self.config.string(KEY_COLOR_MODE))
    }

    /// Flavor name for display, e.g. "tonal-spot".
    pub fn current_flavor(&self) -> String {
        display_flavor(&self.config.string(KEY_MATUGEN_FLAVOR))
    }

    /// Register a callback run with the current mode and flavor whenever
    /// either setting changes.
    pub fn connect_appearance_changed(&self, f: impl Fn(ThemeMode, &str) + 'static) {
        self.appearance_listeners.borrow_mut().push(Rc::new(f));
    }

    /// Entry point for every configuration change notification.
    pub fn handle_change(self: &Rc<Self>, change: ConfigChange) {
        tracing::debug!(?change, "configuration changed");
        if change.affects_appearance() {
            let mode = self.current_mode();
            let flavor = self.current_flavor();
            // Listeners may register further listeners.
            let listeners = self.appearance_listeners.borrow().clone();
            for listener in listeners {
                listener(mode, &flavor);
            }
        }
        self.trigger_update();
    }

    /// Request a workflow run.
    ///
    /// When idle, starts the run loop on the orchestrator's main context and
    /// returns its handle. While a run is in progress only the rerun flag is
    /// set and `None` is returned.
    pub fn trigger_update(self: &Rc<Self>) -> Option<glib::JoinHandle<()>> {
        match self.state.get() {
            ExecutionState::Running | ExecutionState::RunningRerunPending => {
                self.state.set(ExecutionState::RunningRerunPending);
                tracing::debug!("workflow busy, rerun requested");
                None
            }
            ExecutionState::Idle => {
                self.state.set(ExecutionState::Running);
                let this = Rc::clone(self);
                Some(self.context.spawn_local(async move {
                    this.run_loop().await;
                }))
            }
        }
    }

    async fn run_loop(&self) {
        loop {
            if let Err(e) = self.run_workflow().await {
                tracing::error!("theme update failed: {}", e);
                self.notifier.notify("Theme Update Failed", &e.to_string());
            }
            if !self.finish_run() {
                break;
            }
            tracing::debug!("rerunning workflow for changes made during the last run");
        }
    }

    /// Leave the running state. Returns true if another run must follow.
    fn finish_run(&self) -> bool {
        match self.state.get() {
            ExecutionState::RunningRerunPending => {
                self.state.set(ExecutionState::Running);
                true
            }
            _ => {
                self.state.set(ExecutionState::Idle);
                false
            }
        }
    }

    /// One pass: check dependencies, resolve and adapt the wallpaper, run
    /// matugen, apply the interface settings.
    ///
    /// A missing wallpaper ends the pass quietly with `Ok`.
    pub async fn run_workflow(&self) -> Result<()> {
        let binary = self.checker.check_requirements().await?;

        let mode = self.current_mode();
        let Some(wallpaper) = self.resolver.resolve(mode) else {
            tracing::warn!("no wallpaper found for {} mode", mode);
            return Ok(());
        };

        tracing::debug!(
            needs_conversion = wallpaper.needs_conversion,
            "wallpaper {}",
            wallpaper.path.display()
        );
        let image = self
            .adapter
            .ensure_compatible_image(&wallpaper.path)
            .await
            .map_err(|e| Error::Conversion(Box::new(e)))?;

        self.notifier
            .notify(APP_TITLE, &format!("Generating {} theme...", mode));
        self.invoker.run_matugen(&binary, &image, mode).await?;
        self.applier.apply_interface_mode(mode);

        tracing::info!("applied {} theme from {}", mode, wallpaper.path.display());
        Ok(())
    }
}
