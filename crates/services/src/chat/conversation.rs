use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("Malformed conversation id: {0}")]
    Malformed(String),
    #[error("A direct conversation needs two different users")]
    SameUser,
}

/// Either the company-wide channel or a one-on-one conversation.
///
/// Direct ids are the two user ids in hex, sorted and joined with `_`, so
/// both members derive the same id no matter who starts the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationId {
    General,
    Direct(ObjectId, ObjectId),
}

impl ConversationId {
    pub const GENERAL: &'static str = "general";

    pub fn direct(a: ObjectId, b: ObjectId) -> Result<Self, ConversationError> {
        if a == b {
            return Err(ConversationError::SameUser);
        }
        if a.to_hex() <= b.to_hex() {
            Ok(ConversationId::Direct(a, b))
        } else {
            Ok(ConversationId::Direct(b, a))
        }
    }

    /// Both members of a direct conversation; empty for `general`.
    pub fn participants(&self) -> Vec<ObjectId> {
        match self {
            ConversationId::General => Vec::new(),
            ConversationId::Direct(a, b) => vec![*a, *b],
        }
    }

    pub fn includes(&self, user_id: &ObjectId) -> bool {
        match self {
            ConversationId::General => true,
            ConversationId::Direct(a, b) => a == user_id || b == user_id,
        }
    }

    pub fn other_participant(&self, user_id: &ObjectId) -> Option<ObjectId> {
        match self {
            ConversationId::Direct(a, b) if a == user_id => Some(*b),
            ConversationId::Direct(a, b) if b == user_id => Some(*a),
            _ => None,
        }
    }

    /// Live-hub topic carrying this conversation's events.
    pub fn topic(&self) -> String {
        format!("chat:{}", self)
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationId::General => f.write_str(Self::GENERAL),
            ConversationId::Direct(a, b) => write!(f, "{}_{}", a.to_hex(), b.to_hex()),
        }
    }
}

impl FromStr for ConversationId {
    type Err = ConversationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::GENERAL {
            return Ok(ConversationId::General);
        }
        let (a, b) = s
            .split_once('_')
            .ok_or_else(|| ConversationError::Malformed(s.to_string()))?;
        let a = ObjectId::parse_str(a).map_err(|_| ConversationError::Malformed(s.to_string()))?;
        let b = ObjectId::parse_str(b).map_err(|_| ConversationError::Malformed(s.to_string()))?;
        ConversationId::direct(a, b)
    }
}
