//! Canonical message type definitions.
//!
//! Core types for the normalized message representation. The serde
//! projection of these types is a wire contract with the downstream trace
//! viewer; field names and tag values must not change.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};

// ============================================================================
// STRONGLY TYPED ENUMS
// ============================================================================

/// Standard chat roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    #[default]
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }

    /// Try to parse a role string, returning None for unknown roles.
    ///
    /// Tolerates role names from multiple upstream generations:
    /// - current: system, user, assistant, tool
    /// - OpenAI-style: developer, function
    /// - chat-history style: human, ai, bot, model
    /// - code execution: ipython
    pub fn try_from_str(s: &str) -> Option<Self> {
        Some(match s.to_lowercase().as_str() {
            "system" | "developer" => Self::System,
            "user" | "human" => Self::User,
            "assistant" | "ai" | "bot" | "model" => Self::Assistant,
            "tool" | "function" | "ipython" => Self::Tool,
            _ => return None,
        })
    }

    /// Normalize a role string, defaulting to User for unknown roles.
    pub fn from_str_normalized(s: &str) -> Self {
        Self::try_from_str(s).unwrap_or(Self::User)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why the model stopped generating.
///
/// Only `ToolCall` and `Stop` are ever inferred from message structure;
/// the other reasons must be supplied explicitly by a caller that knows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    #[default]
    Stop,
    Length,
    ContentFilter,
    ToolCall,
    Error,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::ContentFilter => "content_filter",
            Self::ToolCall => "tool_call",
            Self::Error => "error",
        }
    }

    /// Normalize a provider finish-reason string.
    ///
    /// Providers disagree on vocabulary (end_turn, max_tokens, tool_use, ...);
    /// unknown strings return None rather than guessing.
    pub fn from_provider(s: &str) -> Option<Self> {
        Some(match s.to_lowercase().as_str() {
            "stop" | "end_turn" | "eos" | "end" | "complete" | "completed" | "stop_sequence" => {
                Self::Stop
            }
            "length" | "max_tokens" | "token_limit" | "truncated" => Self::Length,
            "tool_call" | "tool_calls" | "tool_use" | "function_call" => Self::ToolCall,
            "content_filter" | "safety" | "recitation" | "blocked" | "filtered" => {
                Self::ContentFilter
            }
            "error" | "failure" | "failed" => Self::Error,
            _ => return None,
        })
    }
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Media modality for binary and reference parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Image,
    Video,
    Audio,
}

// ============================================================================
// MESSAGE PARTS
// ============================================================================

/// One unit of message content.
///
/// Serializes to a JSON object with a `type` discriminator; optional fields
/// are omitted entirely when absent (never emitted as null).
///
/// Two deliberate deviations from the nominal GenAI message standard are
/// load-bearing here: `ToolCallResponse` carries its payload under `result`
/// (not `response`), and the message that embeds it uses role `user` (not
/// `tool`). The downstream trace viewer parses exactly this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePart {
    /// Plain text content.
    Text { content: String },

    /// Assistant request to invoke a tool.
    ToolCallRequest {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Opaque structured arguments; string blobs are parsed speculatively.
        #[serde(skip_serializing_if = "Option::is_none")]
        arguments: Option<JsonValue>,
    },

    /// Result of a tool invocation. Payload key is `result`, never `response`.
    ToolCallResponse {
        result: JsonValue,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },

    /// Inline binary payload (base64 body of a data URI).
    Blob {
        modality: Modality,
        data: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },

    /// Remote content referenced by URI.
    Uri {
        modality: Modality,
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },

    /// Content referenced by an upload/file identifier.
    File {
        modality: Modality,
        file_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },

    /// Reasoning/thinking trace.
    Reasoning { content: String },

    /// Open-ended part; arbitrary fields are preserved losslessly.
    Generic {
        #[serde(flatten)]
        fields: Map<String, JsonValue>,
    },
}

impl MessagePart {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    pub fn generic(payload: JsonValue) -> Self {
        let fields = match payload {
            JsonValue::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("content".to_string(), other);
                map
            }
        };
        Self::Generic { fields }
    }

    /// Wire discriminator of this part.
    pub fn part_type(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::ToolCallRequest { .. } => "tool_call_request",
            Self::ToolCallResponse { .. } => "tool_call_response",
            Self::Blob { .. } => "blob",
            Self::Uri { .. } => "uri",
            Self::File { .. } => "file",
            Self::Reasoning { .. } => "reasoning",
            Self::Generic { .. } => "generic",
        }
    }
}

// ============================================================================
// MESSAGES
// ============================================================================

/// A message sent to the model: a role plus an ordered list of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InputMessage {
    pub role: Role,
    pub parts: Vec<MessagePart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl InputMessage {
    pub fn new(role: Role, parts: Vec<MessagePart>) -> Self {
        Self {
            role,
            parts,
            name: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }
}

/// A message produced by the model; carries a mandatory finish reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OutputMessage {
    pub role: Role,
    pub parts: Vec<MessagePart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub finish_reason: FinishReason,
}

impl OutputMessage {
    pub fn from_input(message: InputMessage, finish_reason: FinishReason) -> Self {
        Self {
            role: message.role,
            parts: message.parts,
            name: message.name,
            finish_reason,
        }
    }
}

// ============================================================================
// TOOL DEFINITIONS
// ============================================================================

/// Declaration of a tool available to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ToolDefinition {
    pub name: String,
    /// Empty string when the tool declares no description.
    pub description: String,
    /// JSON-Schema-shaped parameter declaration; empty object when absent.
    pub parameters: JsonValue,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        parameters: Option<JsonValue>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.unwrap_or_default(),
            parameters: parameters.unwrap_or_else(|| json!({})),
        }
    }
}

// ============================================================================
// CONVERSION RESULT
// ============================================================================

/// Canonical split of one upstream conversation.
///
/// The sole artifact of conversation conversion; it has no lifecycle beyond
/// the call that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversion {
    /// System-instruction parts, populated only when system separation was
    /// requested and the conversation contained system turns.
    pub system_instructions: Option<Vec<MessagePart>>,
    pub input_messages: Vec<InputMessage>,
    /// At most one: the trailing assistant turn, when present.
    pub output_messages: Vec<OutputMessage>,
}

impl Conversion {
    pub fn is_empty(&self) -> bool {
        self.system_instructions.is_none()
            && self.input_messages.is_empty()
            && self.output_messages.is_empty()
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
