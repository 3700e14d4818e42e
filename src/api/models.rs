//! Back-office domain records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub discord_id: String,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub total_xp: u64,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub cookies: u64,
    #[serde(default)]
    pub avatar: String,
}

/// Partial update of a [`User`]; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_xp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduledPostStatus {
    Scheduled,
    Processing,
    Sent,
    Cancelled,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: u64,
    pub path: String,
    /// Byte object with numeric keys, or already-encoded base64.
    pub preview: Value,
    #[serde(rename = "scheduledPostId", skip_serializing_if = "Option::is_none")]
    pub scheduled_post_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPost {
    pub id: u64,
    pub channel_id: String,
    pub text: String,
    #[serde(default)]
    pub media: Vec<Media>,
    pub status: ScheduledPostStatus,
    #[serde(default)]
    pub error: Option<String>,
    /// ISO-8601 timestamp as sent by the backend.
    pub scheduled_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoCat {
    pub id: u64,
    pub promocode: String,
    pub discount: f64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoCatImage {
    pub name: String,
    /// Standard base64 of the image bytes.
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoCatSettings {
    pub channel_id: String,
    pub post_time: String,
}

/// A publishing channel. Only `id` is fixed; everything else is passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// String or numeric id.
    pub id: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Who is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub avatar: String,
}
