//! Notifier that writes alerts to the log.
//!
//! Used where no notification tray exists, such as replaying recorded
//! monitor traffic. The visible set is kept so callers can report what a
//! user would currently see.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{Notification, Notifier, NotifierError};

/// Logs every alert and tracks which ones are still visible.
#[derive(Debug, Default)]
pub struct TracingNotifier {
    visible: Mutex<BTreeMap<u32, Notification>>,
}

impl TracingNotifier {
    /// Visible notifications ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::Unavailable`] if the visible set is poisoned.
    pub fn visible(&self) -> Result<Vec<Notification>, NotifierError> {
        Ok(self.lock()?.values().cloned().collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<u32, Notification>>, NotifierError> {
        self.visible
            .lock()
            .map_err(|_| NotifierError::unavailable("visible notification set poisoned"))
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    async fn show(&self, notification: Notification) -> Result<(), NotifierError> {
        info!(
            channel = %notification.channel,
            id = notification.id,
            title = %notification.title,
            body = %notification.body,
            "notification shown"
        );
        self.lock()?.insert(notification.id, notification);
        Ok(())
    }

    async fn dismiss(&self, id: u32) -> Result<(), NotifierError> {
        if self.lock()?.remove(&id).is_some() {
            info!(id, "notification dismissed");
        }
        Ok(())
    }

    async fn dismiss_all(&self) -> Result<(), NotifierError> {
        let mut visible = self.lock()?;
        info!(count = visible.len(), "all notifications dismissed");
        visible.clear();
        Ok(())
    }
}
