use axum::extract::ws::{Message, WebSocket};
use bson::oid::ObjectId;
use dashmap::DashMap;
use futures::stream::SplitSink;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// Which connections listen on which topic.
#[derive(Default)]
pub struct Subscriptions {
    by_topic: DashMap<String, HashSet<String>>,
    by_connection: DashMap<String, HashSet<String>>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the connection was already subscribed.
    pub fn subscribe(&self, connection_id: &str, topic: &str) -> bool {
        self.by_connection
            .entry(connection_id.to_string())
            .or_default()
            .insert(topic.to_string());
        self.by_topic
            .entry(topic.to_string())
            .or_default()
            .insert(connection_id.to_string())
    }

    pub fn unsubscribe(&self, connection_id: &str, topic: &str) {
        if let Some(mut topics) = self.by_connection.get_mut(connection_id) {
            topics.remove(topic);
        }
        self.by_topic
            .remove_if_mut(topic, |_, conns| {
                conns.remove(connection_id);
                conns.is_empty()
            });
    }

    /// Drops every subscription held by a closed connection.
    pub fn drop_connection(&self, connection_id: &str) {
        let Some((_, topics)) = self.by_connection.remove(connection_id) else {
            return;
        };
        for topic in topics {
            self.by_topic.remove_if_mut(&topic, |_, conns| {
                conns.remove(connection_id);
                conns.is_empty()
            });
        }
    }

    pub fn subscribers(&self, topic: &str) -> Vec<String> {
        self.by_topic
            .get(topic)
            .map(|conns| conns.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn topics_of(&self, connection_id: &str) -> Vec<String> {
        self.by_connection
            .get(connection_id)
            .map(|topics| topics.iter().cloned().collect())
            .unwrap_or_default()
    }
}

struct Connection {
    user_id: ObjectId,
    sender: WsSender,
}

/// Tracks all active WebSocket connections and their topic subscriptions.
/// Each user can have multiple connections (multiple tabs/devices).
pub struct WsStorage {
    connections: DashMap<String, Connection>,
    by_user: DashMap<ObjectId, Vec<String>>,
    subscriptions: Subscriptions,
}

impl WsStorage {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            by_user: DashMap::new(),
            subscriptions: Subscriptions::new(),
        }
    }

    pub fn add(&self, user_id: ObjectId, connection_id: String, sender: WsSender) {
        self.by_user
            .entry(user_id)
            .or_default()
            .push(connection_id.clone());
        self.connections
            .insert(connection_id, Connection { user_id, sender });
    }

    pub fn remove(&self, connection_id: &str) {
        self.subscriptions.drop_connection(connection_id);
        let Some((_, conn)) = self.connections.remove(connection_id) else {
            return;
        };
        self.by_user.remove_if_mut(&conn.user_id, |_, ids| {
            ids.retain(|id| id != connection_id);
            ids.is_empty()
        });
    }

    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    pub fn get_sender(&self, connection_id: &str) -> Option<WsSender> {
        self.connections
            .get(connection_id)
            .map(|c| c.sender.clone())
    }

    pub fn get_senders(&self, user_id: &ObjectId) -> Vec<WsSender> {
        self.by_user
            .get(user_id)
            .map(|ids| ids.iter().filter_map(|id| self.get_sender(id)).collect())
            .unwrap_or_default()
    }

    /// Senders subscribed to `topic`, paired with the user they belong to.
    pub fn topic_senders(&self, topic: &str) -> Vec<(ObjectId, WsSender)> {
        self.subscriptions
            .subscribers(topic)
            .iter()
            .filter_map(|id| {
                self.connections
                    .get(id)
                    .map(|c| (c.user_id, c.sender.clone()))
            })
            .collect()
    }
}

impl Default for WsStorage {
    fn default() -> Self {
        Self::new()
    }
}
