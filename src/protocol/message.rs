//! Tagged protocol messages.
//!
//! Inbound messages arrive pre-authenticated from the host: `From` is
//! trusted, `Timestamp` is the only clock the engine ever sees.

use crate::governance::registry::Address;
use serde::{Deserialize, Serialize};

/// Message tag (name/value pair). Tag names are matched exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Inbound message errors.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    pub id: String,
    pub from: Address,
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub data: Option<String>,
}

impl Message {
    pub fn new(id: impl Into<String>, from: impl Into<Address>, timestamp: u64) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            timestamp,
            tags: Vec::new(),
            data: None,
        }
    }

    /// Builder: append a tag.
    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(name, value));
        self
    }

    /// Builder: set the data body.
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// First tag value with this exact name.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }

    pub fn action(&self) -> Option<&str> {
        self.tag("Action")
    }

    pub fn provenance(&self) -> Provenance {
        Provenance {
            from: self.from.clone(),
            timestamp: self.timestamp,
            message_id: self.id.clone(),
        }
    }

    /// Parse one JSON-lines record.
    pub fn from_json_line(line: &str) -> Result<Self, MessageError> {
        Ok(serde_json::from_str(line)?)
    }
}

/// Who sent the message being handled, when, and under which id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub from: Address,
    pub timestamp: u64,
    pub message_id: String,
}
