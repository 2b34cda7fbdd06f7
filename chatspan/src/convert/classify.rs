//! Role and shape classification for upstream records.
//!
//! The upstream crate's message taxonomy evolves independently of this
//! library, so records are classified by an ordered chain of structural
//! probes rather than a closed type switch. Classification never fails:
//! every record resolves to one of the four roles, defaulting to `user`.

use crate::model::Role;
use crate::record::ChatRecord;

/// Coarse shape of an upstream record, used to pick a conversion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    System,
    UserWithImages,
    User,
    /// Assistant turn carrying pending tool calls.
    ToolRequest,
    /// Tool execution result.
    ToolResult,
    Assistant,
    /// Structured data payload presented as conversation history.
    Data,
    /// No probe matched; handled as opaque user content.
    Unrecognized,
}

/// Classify one upstream record into a role and a coarse shape.
///
/// Role resolution probes, in order:
/// 1. map-shaped record: the `role` field
/// 2. typed record: the upstream library's own role rendering
/// 3. typed record: declared type name, matched against role substrings
/// 4. typed record: the raw `role` field
/// 5. default to `user`
pub fn classify(record: &ChatRecord) -> (Role, MessageKind) {
    let role_str = resolve_role(record);

    // The "data" pseudo-role is conversation context, not a chat turn.
    if let Some(s) = role_str.as_deref()
        && s.eq_ignore_ascii_case("data")
    {
        return (Role::User, MessageKind::Data);
    }

    let Some(role_str) = role_str else {
        // No role evidence at all. Records that still carry text are plain
        // user turns; anything else is unrecognized and kept opaque.
        return if record.text().is_some_and(|t| !t.is_empty()) {
            (Role::User, MessageKind::User)
        } else {
            (Role::User, MessageKind::Unrecognized)
        };
    };

    let role = Role::from_str_normalized(&role_str);
    let kind = match role {
        Role::System => MessageKind::System,
        Role::Tool => MessageKind::ToolResult,
        Role::Assistant => {
            if record.has_tool_calls() {
                MessageKind::ToolRequest
            } else {
                MessageKind::Assistant
            }
        }
        Role::User => {
            // A user-role record answering a tool call is a tool result in
            // upstream shapes that never use the tool role.
            if record.tool_call_id().is_some() && record.tool_result().is_some() {
                MessageKind::ToolResult
            } else if record.images().is_empty() {
                MessageKind::User
            } else {
                MessageKind::UserWithImages
            }
        }
    };
    (role, kind)
}

fn resolve_role(record: &ChatRecord) -> Option<String> {
    match record {
        // 1. Plain map: read the role field directly.
        ChatRecord::Map(value) => value
            .get("role")
            .and_then(|r| r.as_str())
            .map(String::from),
        ChatRecord::Typed(message) => {
            // 2. The upstream library's own role rendering.
            if let Some(label) = message.role_label.as_deref()
                && !label.is_empty()
            {
                return Some(label.to_string());
            }
            // 3. Declared type name, matched against role substrings.
            if let Some(role) = role_from_type_name(&message.type_name) {
                return Some(role.to_string());
            }
            // 4. Raw role field.
            message.role.clone()
        }
    }
}

/// Match a declared type name against role substrings, case-insensitive.
///
/// Checked in a fixed order so that a name like `SystemUserPrompt` resolves
/// the same way across upstream releases.
fn role_from_type_name(type_name: &str) -> Option<&'static str> {
    let lowered = type_name.to_lowercase();
    if lowered.contains("system") {
        Some("system")
    } else if lowered.contains("user") {
        Some("user")
    } else if lowered.contains("ai") || lowered.contains("assistant") {
        Some("assistant")
    } else if lowered.contains("tool") {
        Some("tool")
    } else {
        None
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
