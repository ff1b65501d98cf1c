//! Conversation data model.
//!
//! A conversation is the complete script for one clip: the two
//! participants plus an ordered list of messages. The JSON form uses
//! camelCase field names and lowercase enum values so conversation
//! files are portable between chatreel frontends.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Delivery state shown next to a message timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Single tick.
    Sent,
    /// Double tick.
    Delivered,
    /// Double tick, highlighted.
    Read,
}

/// Which side of the chat a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The exporting user; rendered right-aligned.
    Own,
    /// The other participant; rendered left-aligned.
    Contact,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier.
    pub id: String,

    /// Message body.
    pub text: String,

    /// Which side sent it.
    pub sender: Sender,

    /// Display timestamp, already formatted (e.g. "10:30").
    pub timestamp: String,

    /// Delivery state; only rendered for own messages.
    pub status: MessageStatus,

    /// Optional attached image (path or data URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One side of the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Display name.
    pub name: String,

    /// Optional avatar image (path or data URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Presence line shown under the name (e.g. "online").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Participant {
    /// Participant with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: None,
            status: None,
        }
    }
}

/// A complete scripted conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique conversation identifier.
    pub id: String,

    /// The contact shown in the header.
    pub contact: Participant,

    /// The exporting user.
    pub user: Participant,

    /// Messages in reveal order.
    pub messages: Vec<Message>,

    /// Whether to render the watermark strip above the composer.
    #[serde(default)]
    pub show_watermark: bool,
}

impl Conversation {
    /// Load a conversation from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();

        let json = std::fs::read_to_string(path).map_err(|e| ScriptError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&json).map_err(|e| ScriptError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Save the conversation as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ScriptError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ScriptError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| ScriptError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| ScriptError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Errors that can occur when working with conversation files.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}
