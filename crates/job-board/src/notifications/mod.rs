//! Notification contract produced by board transitions, plus the inbox that stores delivered
//! notifications and the dispatcher that moves events between the two.

mod dispatcher;
mod event;
mod inbox;
pub mod router;

pub use dispatcher::NotificationDispatcher;
pub use event::{NotificationEvent, NotificationKind, NotificationPayload};
pub use inbox::{InMemoryInbox, InboxError, Notification, NotificationId, NotificationInbox};
pub use router::notification_router;
