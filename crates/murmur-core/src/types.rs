// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Murmur relay.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier a channel assigns to a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind the [`PluginAdapter`] base trait.
///
/// [`PluginAdapter`]: crate::traits::PluginAdapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterType {
    Channel,
    Provider,
    Storage,
}

/// Classification of a generation-provider failure.
///
/// Decided by the provider client from the API's structured error status,
/// never by inspecting a free-text message downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum ProviderErrorKind {
    /// The provider is misconfigured (bad or missing API key, bad model).
    Configuration,
    /// The provider rejected the call for quota or rate reasons.
    RateLimited,
    /// Anything else: network faults, 5xx responses, malformed bodies.
    Transient,
}

/// Role tag of a stored conversation turn. Stored as its lowercase string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Kind of non-text attachment carried by an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Photo,
    Document,
    Voice,
}

/// Content of an inbound message after channel-side extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    /// Plain text.
    Text(String),
    /// A non-text attachment, referenced by the channel's file identifier.
    Attachment {
        kind: AttachmentKind,
        file_id: String,
    },
    /// Anything the channel cannot express (stickers, locations, ...).
    Unsupported,
}

/// An inbound message received from a channel adapter.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Channel-side message identifier.
    pub id: String,
    /// Chat to address the reply to.
    pub chat_id: i64,
    /// External numeric identity of the sender.
    pub sender_id: i64,
    /// Sender's given name.
    pub first_name: String,
    /// Sender's family name, when the platform provides one.
    pub last_name: Option<String>,
    pub content: MessageContent,
    /// RFC 3339 receipt timestamp.
    pub timestamp: String,
}

/// An outbound message to be sent via a channel adapter.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub chat_id: i64,
    pub content: String,
}

/// Role label of a turn as the generation API understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// One turn of assembled conversation context, ready for a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextTurn {
    pub role: TurnRole,
    pub content: String,
}

/// A request to a generation provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// System-level instruction prepended to the call.
    pub instruction: String,
    /// Ordered conversation turns, oldest first.
    pub turns: Vec<ContextTurn>,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// A response from a generation provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,
}

/// A stored user row, keyed by the external Telegram identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub tg_id: i64,
    pub full_name: Option<String>,
    pub fio: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub adress: Option<String>,
    pub is_blocked: bool,
    /// RFC 3339, refreshed on every lookup.
    pub last_activity: String,
    /// RFC 3339, set once at creation.
    pub created_at: String,
}

/// One stored conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    /// Rowid, assigned by storage on insert; insertion-order tiebreak.
    pub id: i64,
    /// Display grouping token, no uniqueness semantics.
    pub session_id: String,
    pub tg_id: i64,
    /// RFC 3339.
    pub timestamp: String,
    pub role: Role,
    pub content: String,
    /// Opaque JSON string for auxiliary facts (e.g. attachment references).
    pub metadata: Option<String>,
}

/// A configurable assistant persona record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantProfile {
    pub id: String,
    pub name: String,
    /// "ai" for generative personas, "function" for deterministic ones.
    pub r#type: String,
    pub system_prompt: String,
    pub tov_snippet: Option<String>,
    pub handoff_rules: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields accepted when creating a persona via the admin surface.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAssistant {
    pub name: String,
    #[serde(default = "default_assistant_type")]
    pub r#type: String,
    pub system_prompt: String,
    #[serde(default)]
    pub tov_snippet: Option<String>,
    #[serde(default)]
    pub handoff_rules: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Partial update for a persona; only present fields are applied.
///
/// An absent field keeps its stored value, so the optional columns
/// (`tov_snippet`, `handoff_rules`) cannot be cleared back to null through
/// a patch. Recreate the persona to drop them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub tov_snippet: Option<String>,
    #[serde(default)]
    pub handoff_rules: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

fn default_assistant_type() -> String {
    "ai".to_string()
}

fn default_true() -> bool {
    true
}

/// Row counts reported by the stats endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
    pub users: i64,
    pub dialogs: i64,
    pub assistants: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_round_trips_lowercase() {
        for role in [Role::User, Role::Assistant, Role::System] {
            let s = role.to_string();
            assert_eq!(s, s.to_lowercase());
            assert_eq!(Role::from_str(&s).unwrap(), role);
        }
    }

    #[test]
    fn turn_role_labels_match_generation_api() {
        assert_eq!(TurnRole::User.to_string(), "user");
        assert_eq!(TurnRole::Model.to_string(), "model");
    }

    #[test]
    fn provider_error_kind_serializes() {
        let json = serde_json::to_string(&ProviderErrorKind::RateLimited).unwrap();
        let parsed: ProviderErrorKind = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ProviderErrorKind::RateLimited);
    }

    #[test]
    fn new_assistant_defaults() {
        let parsed: NewAssistant = serde_json::from_str(
            r#"{"name": "Sales", "system_prompt": "Be helpful."}"#,
        )
        .unwrap();
        assert_eq!(parsed.r#type, "ai");
        assert!(parsed.is_active);
        assert!(parsed.tov_snippet.is_none());
    }

    #[test]
    fn assistant_patch_only_present_fields() {
        let parsed: AssistantPatch =
            serde_json::from_str(r#"{"is_active": false}"#).unwrap();
        assert_eq!(parsed.is_active, Some(false));
        assert!(parsed.name.is_none());
        assert!(parsed.system_prompt.is_none());
    }
}
