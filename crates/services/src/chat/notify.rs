use std::collections::{HashSet, VecDeque};

use bson::oid::ObjectId;
use dashmap::DashMap;

/// Remembers the most recent `capacity` message ids a user was alerted
/// about, so re-delivered messages do not raise a second desktop
/// notification.
#[derive(Debug)]
pub struct NotificationDedup {
    capacity: usize,
    order: VecDeque<ObjectId>,
    seen: HashSet<ObjectId>,
}

impl NotificationDedup {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    /// True the first time `message_id` is offered while it is retained.
    pub fn should_notify(&mut self, message_id: ObjectId) -> bool {
        if !self.seen.insert(message_id) {
            return false;
        }
        self.order.push_back(message_id);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.seen.remove(&evicted);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// One [`NotificationDedup`] per recipient.
pub struct NotificationCenter {
    capacity: usize,
    per_user: DashMap<ObjectId, NotificationDedup>,
}

impl NotificationCenter {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            per_user: DashMap::new(),
        }
    }

    pub fn should_notify(&self, user_id: ObjectId, message_id: ObjectId) -> bool {
        self.per_user
            .entry(user_id)
            .or_insert_with(|| NotificationDedup::new(self.capacity))
            .should_notify(message_id)
    }
}
