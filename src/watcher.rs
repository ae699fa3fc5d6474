use std::rc::Rc;

use gio::prelude::*;

use crate::orchestrator::{ConfigChange, Orchestrator};
use crate::settings::{
    KEY_COLOR_MODE, KEY_MATUGEN_CONFIG, KEY_MATUGEN_FLAVOR, KEY_PICTURE_URI, KEY_PICTURE_URI_DARK,
};

/// Map a changed key to the change it represents.
///
/// `matugen-path` is not watched: auto-discovery writes it during a run.
pub fn change_for_key(key: &str) -> Option<ConfigChange> {
    match key {
        KEY_PICTURE_URI | KEY_PICTURE_URI_DARK => Some(ConfigChange::Wallpaper),
        KEY_COLOR_MODE => Some(ConfigChange::ColorMode),
        KEY_MATUGEN_FLAVOR => Some(ConfigChange::Flavor),
        KEY_MATUGEN_CONFIG => Some(ConfigChange::MatugenConfig),
        _ => None,
    }
}

const CONFIG_KEYS: [&str; 3] = [KEY_COLOR_MODE, KEY_MATUGEN_FLAVOR, KEY_MATUGEN_CONFIG];
const BACKGROUND_KEYS: [&str; 2] = [KEY_PICTURE_URI, KEY_PICTURE_URI_DARK];

/// Keeps the signal connections alive; disconnects on drop.
pub struct ConfigWatcher {
    connections: Vec<(gio::Settings, glib::SignalHandlerId)>,
}

impl ConfigWatcher {
    pub fn attach(
        orchestrator: &Rc<Orchestrator>,
        config: &gio::Settings,
        background: &gio::Settings,
    ) -> Self {
        let mut connections = Vec::new();
        let sources: [(&gio::Settings, &[&str]); 2] =
            [(config, &CONFIG_KEYS), (background, &BACKGROUND_KEYS)];

        for (settings, keys) in sources {
            for &key in keys {
                let weak = Rc::downgrade(orchestrator);
                let id = settings.connect_changed(Some(key), move |_, key| {
                    let (Some(orchestrator), Some(change)) = (weak.upgrade(), change_for_key(key))
                    else {
                        return;
                    };
                    orchestrator.handle_change(change);
                });
                connections.push((settings.clone(), id));
            }
        }

        tracing::debug!("watching {} settings keys", connections.len());
        Self { connections }
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        for (settings, id) in self.connections.drain(..) {
            settings.disconnect(id);
        }
    }
}
