use bazaar_store::{keys, Collections, StoreResult};
use uuid::Uuid;

use crate::models::{Notification, NotificationKind};

#[derive(Clone)]
pub struct NotificationService {
    collections: Collections,
}

impl NotificationService {
    pub fn new(collections: Collections) -> Self {
        Self { collections }
    }

    pub fn push(&self, user_id: &str, kind: NotificationKind, message: impl Into<String>) -> StoreResult<Notification> {
        let key = keys::notifications(user_id);
        let mut notifications: Vec<Notification> = self.collections.load(&key)?;
        let notification = Notification::new(user_id.to_string(), kind, message.into());
        notifications.push(notification.clone());
        self.collections.save(&key, &notifications)?;
        Ok(notification)
    }

    /// Newest first
    pub fn list(&self, user_id: &str) -> StoreResult<Vec<Notification>> {
        let mut notifications: Vec<Notification> = self.collections.load(&keys::notifications(user_id))?;
        notifications.reverse();
        Ok(notifications)
    }

    pub fn unread_count(&self, user_id: &str) -> StoreResult<usize> {
        Ok(self.list(user_id)?.iter().filter(|n| !n.read).count())
    }

    /// Returns `false` if the notification does not exist.
    pub fn mark_read(&self, user_id: &str, notification_id: Uuid) -> StoreResult<bool> {
        let key = keys::notifications(user_id);
        let mut notifications: Vec<Notification> = self.collections.load(&key)?;
        let Some(notification) = notifications.iter_mut().find(|n| n.id == notification_id) else {
            return Ok(false);
        };
        notification.read = true;
        self.collections.save(&key, &notifications)?;
        Ok(true)
    }
}
