//! Driven port for user-facing proximity notifications.

use std::fmt;

use async_trait::async_trait;

use super::define_port_error;

/// First notification id used for regions; region `r` uses `10 + r`.
pub const REGION_NOTIFICATION_BASE: u32 = 10;
/// First notification id used for POIs; POI `p` uses `1000 + p`.
pub const POI_NOTIFICATION_BASE: u32 = 1_000;

/// Channel a notification is posted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationChannel {
    /// Region entry alerts.
    Region,
    /// Point-of-interest alerts.
    Poi,
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Region => "region_alerts",
            Self::Poi => "poi_alerts",
        })
    }
}

/// A notification to show. Showing an id that is already visible replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Posting channel.
    pub channel: NotificationChannel,
    /// Replacement key.
    pub id: u32,
    /// Title line.
    pub title: String,
    /// Body text.
    pub body: String,
}

define_port_error! {
    /// Errors raised while presenting notifications.
    pub enum NotifierError {
        /// The presentation service refused or failed the request.
        Unavailable { message: String } =>
            "notification service unavailable: {message}",
    }
}

/// Port for showing and dismissing notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Show or replace a notification.
    async fn show(&self, notification: Notification) -> Result<(), NotifierError>;

    /// Dismiss the notification with `id`, if visible.
    async fn dismiss(&self, id: u32) -> Result<(), NotifierError>;

    /// Dismiss every visible notification.
    async fn dismiss_all(&self) -> Result<(), NotifierError>;
}
