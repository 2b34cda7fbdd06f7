//! Upstream conversation record shapes.
//!
//! Conversation history is produced by an orchestration crate that versions
//! its message taxonomy independently of this library. Records therefore
//! arrive in one of a small set of known shapes and are probed structurally;
//! see [`crate::convert::classify`] for the resolution order.

use serde_json::{Map, Value as JsonValue};

/// One record of an upstream conversation.
#[derive(Debug, Clone)]
pub enum ChatRecord {
    /// Plain string-keyed map: older upstream releases and hand-built
    /// history entries (`{"role": ..., "content": ...}`).
    Map(JsonValue),
    /// Typed record from the current upstream API.
    Typed(UpstreamMessage),
}

impl ChatRecord {
    /// Key/value view, when this record is map-shaped.
    pub fn as_map(&self) -> Option<&Map<String, JsonValue>> {
        match self {
            Self::Map(value) => value.as_object(),
            Self::Typed(_) => None,
        }
    }

    /// Free-form metadata bag (usage, model id, timing, provider extras).
    pub fn metadata(&self) -> Option<&JsonValue> {
        match self {
            Self::Typed(message) => message.metadata.as_ref(),
            Self::Map(value) => value.get("metadata"),
        }
    }

    /// Plain-text content of the record, when it carries any.
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Typed(message) => message.content.clone(),
            Self::Map(value) => match value.get("content")? {
                JsonValue::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            },
        }
    }

    /// Participant name, when the record carries one.
    pub fn participant_name(&self) -> Option<String> {
        match self {
            Self::Typed(message) => message.name.clone(),
            Self::Map(value) => value
                .get("name")
                .and_then(|n| n.as_str())
                .map(String::from),
        }
    }

    /// Image attachment locators (inline data URIs or remote URLs).
    pub fn images(&self) -> Vec<String> {
        match self {
            Self::Typed(message) => message.images.clone(),
            Self::Map(value) => value
                .get("images")
                .and_then(|i| i.as_array())
                .map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(String::from))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Pending tool calls, parsed tolerantly. Map-shaped entries that cannot
    /// be parsed are skipped here; the span assembler keeps them as opaque
    /// entries instead.
    pub fn tool_calls(&self) -> Vec<ToolCallRecord> {
        match self {
            Self::Typed(message) => message.tool_calls.clone(),
            Self::Map(value) => raw_tool_calls(value)
                .iter()
                .filter_map(|entry| {
                    let parsed = ToolCallRecord::from_value(entry);
                    if parsed.is_none() {
                        tracing::trace!(entry = %entry, "unparseable tool call entry, skipping");
                    }
                    parsed
                })
                .collect(),
        }
    }

    /// True when the record carries at least one pending tool call.
    pub fn has_tool_calls(&self) -> bool {
        match self {
            Self::Typed(message) => !message.tool_calls.is_empty(),
            Self::Map(value) => !raw_tool_calls(value).is_empty(),
        }
    }

    /// Identifier of the tool call this record answers.
    pub fn tool_call_id(&self) -> Option<String> {
        match self {
            Self::Typed(message) => message.tool_call_id.clone(),
            Self::Map(value) => value
                .get("tool_call_id")
                .or_else(|| value.get("tool_use_id"))
                .and_then(|id| id.as_str())
                .map(String::from),
        }
    }

    /// Tool execution payload, for tool-result records.
    pub fn tool_result(&self) -> Option<JsonValue> {
        match self {
            Self::Typed(message) => message.tool_result.clone(),
            Self::Map(value) => value
                .get("tool_result")
                .or_else(|| value.get("result"))
                .cloned(),
        }
    }

    /// Opaque serialization of the whole record, for unrecognized shapes.
    pub fn opaque(&self) -> String {
        match self {
            Self::Typed(message) => message
                .content
                .clone()
                .unwrap_or_else(|| message.type_name.clone()),
            Self::Map(value) => value.to_string(),
        }
    }
}

impl From<JsonValue> for ChatRecord {
    fn from(value: JsonValue) -> Self {
        Self::Map(value)
    }
}

impl From<UpstreamMessage> for ChatRecord {
    fn from(message: UpstreamMessage) -> Self {
        Self::Typed(message)
    }
}

/// Raw `tool_calls` array of a map-shaped record.
fn raw_tool_calls(value: &JsonValue) -> &[JsonValue] {
    value
        .get("tool_calls")
        .and_then(|tc| tc.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

// ============================================================================
// TYPED RECORD MIRROR
// ============================================================================

/// Mirror of the upstream orchestration crate's typed message record.
///
/// Fields are optional where upstream releases disagree about their
/// presence; classification never assumes any one of them is populated.
#[derive(Debug, Clone, Default)]
pub struct UpstreamMessage {
    /// Declared type name of the concrete record (e.g. `SystemPrompt`).
    pub type_name: String,
    /// Raw `role` field, when the record carries one.
    pub role: Option<String>,
    /// The upstream library's own role rendering, when available.
    pub role_label: Option<String>,
    /// Plain-text content.
    pub content: Option<String>,
    /// Participant name.
    pub name: Option<String>,
    /// Image attachment locators.
    pub images: Vec<String>,
    /// Pending tool calls (assistant turns).
    pub tool_calls: Vec<ToolCallRecord>,
    /// Identifier of the call this record answers (tool turns).
    pub tool_call_id: Option<String>,
    /// Tool execution payload (tool turns).
    pub tool_result: Option<JsonValue>,
    /// Free-form response metadata bag.
    pub metadata: Option<JsonValue>,
}

impl UpstreamMessage {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    #[must_use]
    pub fn with_role_label(mut self, label: impl Into<String>) -> Self {
        self.role_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

// ============================================================================
// TOOL CALL RECORDS
// ============================================================================

/// One pending tool call carried by an assistant record.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRecord {
    pub name: String,
    pub id: Option<String>,
    /// Opaque structured arguments.
    pub arguments: Option<JsonValue>,
}

impl ToolCallRecord {
    /// Parse a map-shaped tool-call entry.
    ///
    /// Tolerates the flat layout (`{name, id, args|arguments}`), the nested
    /// layout (`{function: {name, arguments}, id}`), and an extra
    /// `tool_call` wrapper around either. Returns None when no name can be
    /// located.
    pub fn from_value(entry: &JsonValue) -> Option<Self> {
        let entry = entry.get("tool_call").unwrap_or(entry);

        let (name, arguments, id) = if let Some(function) = entry.get("function") {
            (
                function.get("name")?.as_str()?,
                function.get("arguments").or_else(|| function.get("args")),
                entry.get("id"),
            )
        } else {
            (
                entry.get("name")?.as_str()?,
                entry.get("arguments").or_else(|| entry.get("args")),
                entry.get("id").or_else(|| entry.get("tool_call_id")),
            )
        };

        Some(Self {
            name: name.to_string(),
            id: id.and_then(|i| i.as_str()).map(String::from),
            arguments: arguments.map(parse_arguments),
        })
    }
}

/// Interpret a tool-call argument value.
///
/// String blobs are attempted as JSON; on failure the raw string is kept.
/// Structured values pass through losslessly.
pub(crate) fn parse_arguments(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::String(s) => serde_json::from_str(s).unwrap_or_else(|_| {
            tracing::trace!("tool arguments are not JSON, keeping raw string");
            value.clone()
        }),
        other => other.clone(),
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
