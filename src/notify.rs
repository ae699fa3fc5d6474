use gio::prelude::*;

/// Title used for every notification the service sends.
pub const APP_TITLE: &str = "Matugen Auto-Themer";

/// Shows a user-visible message.
pub trait Notifier {
    fn notify(&self, title: &str, body: &str);
}

/// Sends desktop notifications through the running `gio::Application`.
/// Falls back to the log when the application is gone or not registered.
pub struct DesktopNotifier {
    app: glib::WeakRef<gio::Application>,
}

impl DesktopNotifier {
    pub fn new(app: &gio::Application) -> Self {
        Self {
            app: app.downgrade(),
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        match self.app.upgrade().filter(|app| app.is_registered()) {
            Some(app) => {
                let notification = gio::Notification::new(title);
                notification.set_body(Some(body));
                // One slot: a newer message replaces the previous one.
                app.send_notification(Some("workflow"), &notification);
            }
            None => tracing::info!("notification: {}: {}", title, body),
        }
    }
}
