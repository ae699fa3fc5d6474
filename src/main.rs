mod convert;
mod error;
mod interface;
mod logging;
mod matugen;
mod notify;
mod orchestrator;
mod process;
mod requirements;
mod settings;
mod theme;
mod version;
mod wallpaper;
mod watcher;

#[cfg(test)]
mod testing;

use std::cell::RefCell;
use std::rc::Rc;

use gio::prelude::*;

use crate::error::Result;
use crate::notify::DesktopNotifier;
use crate::orchestrator::{Orchestrator, Services};
use crate::process::GioProcess;
use crate::settings::{SettingsStore, KEY_COLOR_MODE, KEY_MATUGEN_FLAVOR};
use crate::theme::{SchemeFlavor, ThemeMode};
use crate::watcher::ConfigWatcher;

const APP_ID: &str = "io.github.matugen.AutoThemer";

/// Everything that lives as long as the service is active.
struct Service {
    orchestrator: Rc<Orchestrator>,
    config: gio::Settings,
    _watcher: ConfigWatcher,
    _hold: gio::ApplicationHoldGuard,
}

fn main() -> glib::ExitCode {
    logging::init();

    let app = gio::Application::new(Some(APP_ID), gio::ApplicationFlags::default());
    let service: Rc<RefCell<Option<Service>>> = Rc::new(RefCell::new(None));

    app.connect_activate({
        let service = service.clone();
        move |app| {
            if service.borrow().is_some() {
                return;
            }
            match start(app) {
                Ok(started) => {
                    install_actions(app, &started);
                    *service.borrow_mut() = Some(started);
                }
                Err(e) => {
                    tracing::error!("cannot start: {}", e);
                    app.quit();
                }
            }
        }
    });

    app.connect_shutdown(move |_| {
        service.borrow_mut().take();
    });

    app.run()
}

fn start(app: &gio::Application) -> Result<Service> {
    let config = settings::open(settings::APP_SCHEMA)?;
    let background = settings::open(settings::BACKGROUND_SCHEMA)?;
    let interface = settings::open(settings::INTERFACE_SCHEMA)?;
    let system = Rc::new(GioProcess);

    let orchestrator = Orchestrator::new(
        glib::MainContext::default(),
        Services {
            config: Rc::new(config.clone()),
            background: Rc::new(background.clone()),
            interface: Rc::new(interface),
            programs: system.clone(),
            runner: system,
            notifier: Rc::new(DesktopNotifier::new(app)),
            bundled_config: matugen::bundled_config_path(),
        },
    );

    orchestrator.connect_appearance_changed(|mode, flavor| {
        tracing::info!("appearance is now {} / {}", mode, flavor);
    });

    let watcher = ConfigWatcher::attach(&orchestrator, &config, &background);
    tracing::info!(
        "started in {} mode with {} scheme",
        orchestrator.current_mode(),
        orchestrator.current_flavor()
    );
    orchestrator.trigger_update();

    Ok(Service {
        orchestrator,
        config,
        _watcher: watcher,
        _hold: app.hold(),
    })
}

/// `run-now`, `set-color-mode(s)` and `set-flavor(s)`, reachable through
/// `gapplication action` or a shell menu.
fn install_actions(app: &gio::Application, service: &Service) {
    let run_now = gio::SimpleAction::new("run-now", None);
    {
        let orchestrator = Rc::downgrade(&service.orchestrator);
        run_now.connect_activate(move |_, _| {
            if let Some(orchestrator) = orchestrator.upgrade() {
                tracing::debug!(state = ?orchestrator.state(), "run requested");
                orchestrator.trigger_update();
            }
        });
    }
    app.add_action(&run_now);

    let set_mode = gio::SimpleAction::new("set-color-mode", Some(glib::VariantTy::STRING));
    {
        let config = service.config.clone();
        set_mode.connect_activate(move |_, param| {
            let Some(value) = param.and_then(|p| p.get::<String>()) else {
                return;
            };
            let mode = ThemeMode::from_setting(&value);
            if let Err(e) = SettingsStore::set_string(&config, KEY_COLOR_MODE, mode.as_str()) {
                tracing::warn!("{}", e);
            }
        });
    }
    app.add_action(&set_mode);

    let set_flavor = gio::SimpleAction::new("set-flavor", Some(glib::VariantTy::STRING));
    let config = service.config.clone();
    set_flavor.connect_activate(move |_, param| {
        let Some(value) = param.and_then(|p| p.get::<String>()) else {
            return;
        };
        match SchemeFlavor::parse(&value) {
            Some(flavor) => {
                if let Err(e) = SettingsStore::set_string(&config, KEY_MATUGEN_FLAVOR, flavor.as_str())
                {
                    tracing::warn!("{}", e);
                }
            }
            None => tracing::warn!("unknown scheme flavor '{}'", value),
        }
    });
    app.add_action(&set_flavor);
}
