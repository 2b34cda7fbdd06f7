//! Conversation conversion.
//!
//! Walks an ordered upstream conversation and produces the canonical split:
//! system-instruction parts, input messages, and at most one output message
//! (the trailing assistant turn). Conversion is total: unknown shapes
//! degrade to opaque parts, never to an error.

use crate::model::{
    Conversion, FinishReason, InputMessage, MessagePart, Modality, OutputMessage, Role,
};
use crate::record::ChatRecord;

use super::classify::{MessageKind, classify};

/// Convert an upstream conversation into canonical messages.
///
/// When `separate_system` is set, system-role parts are diverted into
/// `system_instructions` instead of the input list. After the walk, a
/// trailing assistant message is popped and promoted to the sole output
/// message, with its finish reason inferred from its parts. An empty
/// conversation yields an empty result; a conversation with no assistant
/// tail yields no output message. Neither case is an error.
pub fn convert(conversation: &[ChatRecord], separate_system: bool) -> Conversion {
    let mut system_parts: Vec<MessagePart> = Vec::new();
    let mut input_messages: Vec<InputMessage> = Vec::new();

    for record in conversation {
        let (role, kind) = classify(record);
        match kind {
            MessageKind::System if separate_system => {
                if let Some(text) = record.text().filter(|t| !t.is_empty()) {
                    system_parts.push(MessagePart::text(text));
                }
            }
            MessageKind::System | MessageKind::User | MessageKind::Assistant => {
                input_messages.push(text_message(role, record));
            }
            MessageKind::UserWithImages => {
                input_messages.push(image_message(record));
            }
            MessageKind::ToolRequest => {
                input_messages.push(tool_request_message(record));
            }
            MessageKind::ToolResult => {
                input_messages.push(tool_result_message(record));
            }
            MessageKind::Data => {
                let payload = match record {
                    ChatRecord::Map(value) => value
                        .get("content")
                        .cloned()
                        .unwrap_or(serde_json::Value::Null),
                    ChatRecord::Typed(_) => serde_json::Value::String(record.opaque()),
                };
                input_messages.push(InputMessage::new(
                    Role::User,
                    vec![MessagePart::generic(payload)],
                ));
            }
            MessageKind::Unrecognized => {
                tracing::trace!("unrecognized conversation record, keeping opaque text");
                input_messages.push(InputMessage::new(
                    Role::User,
                    vec![MessagePart::text(record.opaque())],
                ));
            }
        }
    }

    // Promote a trailing assistant turn to the sole output message.
    let mut output_messages = Vec::new();
    if input_messages.last().is_some_and(|m| m.role == Role::Assistant)
        && let Some(last) = input_messages.pop()
    {
        let reason = infer_finish_reason(&last.parts);
        output_messages.push(OutputMessage::from_input(last, reason));
    }

    Conversion {
        system_instructions: if system_parts.is_empty() {
            None
        } else {
            Some(system_parts)
        },
        input_messages,
        output_messages,
    }
}

/// Infer a finish reason from message parts.
///
/// Any pending tool call means the model stopped to call tools; everything
/// else is a normal stop. The remaining reasons carry information only a
/// caller can know and are never inferred here.
pub fn infer_finish_reason(parts: &[MessagePart]) -> FinishReason {
    if parts
        .iter()
        .any(|p| matches!(p, MessagePart::ToolCallRequest { .. }))
    {
        FinishReason::ToolCall
    } else {
        FinishReason::Stop
    }
}

// ============================================================================
// PER-SHAPE MESSAGE CONSTRUCTION
// ============================================================================

fn text_message(role: Role, record: &ChatRecord) -> InputMessage {
    let text = record.text().unwrap_or_default();
    InputMessage::new(role, vec![MessagePart::text(text)]).with_name(record.participant_name())
}

fn image_message(record: &ChatRecord) -> InputMessage {
    let mut parts = Vec::new();
    if let Some(text) = record.text().filter(|t| !t.is_empty()) {
        parts.push(MessagePart::text(text));
    }
    for locator in record.images() {
        parts.push(image_part(&locator));
    }
    InputMessage::new(Role::User, parts).with_name(record.participant_name())
}

fn tool_request_message(record: &ChatRecord) -> InputMessage {
    let mut parts = Vec::new();
    if let Some(text) = record.text().filter(|t| !t.is_empty()) {
        parts.push(MessagePart::text(text));
    }
    for call in record.tool_calls() {
        parts.push(MessagePart::ToolCallRequest {
            name: call.name,
            id: call.id,
            arguments: call.arguments,
        });
    }
    InputMessage::new(Role::Assistant, parts).with_name(record.participant_name())
}

/// Build a tool-result message.
///
/// The enclosing role is `user`, not `tool`: the downstream viewer renders
/// tool results only on user turns, and this shape is part of the wire
/// contract.
fn tool_result_message(record: &ChatRecord) -> InputMessage {
    let result = record
        .tool_result()
        .or_else(|| record.text().map(serde_json::Value::String))
        .unwrap_or(serde_json::Value::Null);
    let part = MessagePart::ToolCallResponse {
        result,
        id: record.tool_call_id(),
        name: record.participant_name(),
    };
    InputMessage::new(Role::User, vec![part])
}

/// Build a part for one image attachment locator.
///
/// Inline `data:` URIs become blobs (mime type split out of the URI prefix,
/// payload kept as the base64 body); anything else is a remote reference.
fn image_part(locator: &str) -> MessagePart {
    if let Some(rest) = locator.strip_prefix("data:") {
        // Format: data:<media_type>;base64,<data>
        if let Some((prefix, body)) = rest.split_once(',') {
            let mime_type = prefix
                .split(';')
                .next()
                .filter(|s| !s.is_empty())
                .map(String::from);
            return MessagePart::Blob {
                modality: Modality::Image,
                data: body.to_string(),
                mime_type,
            };
        }
    }
    MessagePart::Uri {
        modality: Modality::Image,
        uri: locator.to_string(),
        mime_type: None,
    }
}

#[cfg(test)]
#[path = "conversation_tests.rs"]
mod tests;
