pub mod conversation;
pub mod notify;

pub use conversation::{ConversationError, ConversationId};
pub use notify::{NotificationCenter, NotificationDedup};
