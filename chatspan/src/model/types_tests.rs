//! Tests for the canonical message model and its wire projection.

use serde_json::json;

use super::*;

// ============================================================================
// ROLES
// ============================================================================

#[test]
fn test_role_wire_strings() {
    assert_eq!(serde_json::to_value(Role::System).unwrap(), json!("system"));
    assert_eq!(serde_json::to_value(Role::User).unwrap(), json!("user"));
    assert_eq!(
        serde_json::to_value(Role::Assistant).unwrap(),
        json!("assistant")
    );
    assert_eq!(serde_json::to_value(Role::Tool).unwrap(), json!("tool"));
}

#[test]
fn test_role_alias_parsing() {
    assert_eq!(Role::try_from_str("developer"), Some(Role::System));
    assert_eq!(Role::try_from_str("human"), Some(Role::User));
    assert_eq!(Role::try_from_str("AI"), Some(Role::Assistant));
    assert_eq!(Role::try_from_str("model"), Some(Role::Assistant));
    assert_eq!(Role::try_from_str("function"), Some(Role::Tool));
    assert_eq!(Role::try_from_str("ipython"), Some(Role::Tool));
    assert_eq!(Role::try_from_str("martian"), None);
}

#[test]
fn test_role_defaults_to_user() {
    assert_eq!(Role::from_str_normalized("martian"), Role::User);
    assert_eq!(Role::default(), Role::User);
}

// ============================================================================
// FINISH REASONS
// ============================================================================

#[test]
fn test_finish_reason_wire_strings() {
    assert_eq!(
        serde_json::to_value(FinishReason::ToolCall).unwrap(),
        json!("tool_call")
    );
    assert_eq!(
        serde_json::to_value(FinishReason::ContentFilter).unwrap(),
        json!("content_filter")
    );
    assert_eq!(serde_json::to_value(FinishReason::Stop).unwrap(), json!("stop"));
}

#[test]
fn test_finish_reason_provider_normalization() {
    assert_eq!(FinishReason::from_provider("end_turn"), Some(FinishReason::Stop));
    assert_eq!(
        FinishReason::from_provider("max_tokens"),
        Some(FinishReason::Length)
    );
    assert_eq!(
        FinishReason::from_provider("tool_use"),
        Some(FinishReason::ToolCall)
    );
    assert_eq!(
        FinishReason::from_provider("SAFETY"),
        Some(FinishReason::ContentFilter)
    );
    assert_eq!(FinishReason::from_provider("failed"), Some(FinishReason::Error));
    assert_eq!(FinishReason::from_provider("martian"), None);
}

#[test]
fn test_finish_reason_default_is_stop() {
    assert_eq!(FinishReason::default(), FinishReason::Stop);
}

// ============================================================================
// MESSAGE PARTS
// ============================================================================

#[test]
fn test_text_part_serialization() {
    let part = MessagePart::text("Hello");
    assert_eq!(
        serde_json::to_value(&part).unwrap(),
        json!({"type": "text", "content": "Hello"})
    );
}

#[test]
fn test_tool_call_response_uses_result_key() {
    // The downstream viewer parses `result`, never `response`.
    let part = MessagePart::ToolCallResponse {
        result: json!({"ok": true}),
        id: Some("call-1".to_string()),
        name: None,
    };
    let value = serde_json::to_value(&part).unwrap();
    assert_eq!(
        value,
        json!({"type": "tool_call_response", "result": {"ok": true}, "id": "call-1"})
    );
    let raw = serde_json::to_string(&part).unwrap();
    assert!(raw.contains("\"result\""));
    assert!(!raw.contains("\"response\""));
}

#[test]
fn test_optional_fields_are_omitted_not_null() {
    let part = MessagePart::ToolCallRequest {
        name: "search".to_string(),
        id: None,
        arguments: None,
    };
    let raw = serde_json::to_string(&part).unwrap();
    assert_eq!(raw, r#"{"type":"tool_call_request","name":"search"}"#);
}

#[test]
fn test_blob_and_uri_parts() {
    let blob = MessagePart::Blob {
        modality: Modality::Image,
        data: "QUJD".to_string(),
        mime_type: Some("image/png".to_string()),
    };
    assert_eq!(
        serde_json::to_value(&blob).unwrap(),
        json!({"type": "blob", "modality": "image", "data": "QUJD", "mime_type": "image/png"})
    );

    let uri = MessagePart::Uri {
        modality: Modality::Audio,
        uri: "https://example.com/a.mp3".to_string(),
        mime_type: None,
    };
    assert_eq!(
        serde_json::to_value(&uri).unwrap(),
        json!({"type": "uri", "modality": "audio", "uri": "https://example.com/a.mp3"})
    );
}

#[test]
fn test_generic_part_preserves_fields() {
    let part = MessagePart::generic(json!({"kind": "widget", "payload": {"a": 1}}));
    let value = serde_json::to_value(&part).unwrap();
    assert_eq!(
        value,
        json!({"type": "generic", "kind": "widget", "payload": {"a": 1}})
    );

    let back: MessagePart = serde_json::from_value(value).unwrap();
    assert_eq!(back, part);
}

#[test]
fn test_generic_part_wraps_scalars() {
    let part = MessagePart::generic(json!("raw payload"));
    assert_eq!(
        serde_json::to_value(&part).unwrap(),
        json!({"type": "generic", "content": "raw payload"})
    );
}

#[test]
fn test_part_type_names() {
    assert_eq!(MessagePart::text("x").part_type(), "text");
    assert_eq!(
        MessagePart::Reasoning {
            content: "thinking".to_string()
        }
        .part_type(),
        "reasoning"
    );
}

// ============================================================================
// MESSAGES
// ============================================================================

#[test]
fn test_input_message_wire_shape() {
    let message = InputMessage::new(Role::User, vec![MessagePart::text("hi")])
        .with_name(Some("alice".to_string()));
    assert_eq!(
        serde_json::to_value(&message).unwrap(),
        json!({"role": "user", "parts": [{"type": "text", "content": "hi"}], "name": "alice"})
    );
}

#[test]
fn test_output_message_carries_finish_reason() {
    let output = OutputMessage::from_input(
        InputMessage::new(Role::Assistant, vec![MessagePart::text("done")]),
        FinishReason::Stop,
    );
    let value = serde_json::to_value(&output).unwrap();
    assert_eq!(value["finish_reason"], json!("stop"));
    assert_eq!(value["role"], json!("assistant"));
}

#[test]
fn test_message_list_round_trip() {
    let messages = vec![
        InputMessage::new(Role::System, vec![MessagePart::text("Be terse.")]),
        InputMessage::new(
            Role::Assistant,
            vec![
                MessagePart::text("Looking that up."),
                MessagePart::ToolCallRequest {
                    name: "search".to_string(),
                    id: Some("c1".to_string()),
                    arguments: Some(json!({"q": "rust"})),
                },
            ],
        ),
        InputMessage::new(
            Role::User,
            vec![MessagePart::ToolCallResponse {
                result: json!([1, 2, 3]),
                id: Some("c1".to_string()),
                name: Some("search".to_string()),
            }],
        ),
    ];

    let raw = serde_json::to_string(&messages).unwrap();
    let back: Vec<InputMessage> = serde_json::from_str(&raw).unwrap();
    assert_eq!(back, messages);
}

// ============================================================================
// TOOL DEFINITIONS
// ============================================================================

#[test]
fn test_tool_definition_defaults() {
    let tool = ToolDefinition::new("search", None, None);
    assert_eq!(
        serde_json::to_value(&tool).unwrap(),
        json!({"name": "search", "description": "", "parameters": {}})
    );
}

#[test]
fn test_conversion_default_is_empty() {
    assert!(Conversion::default().is_empty());
}
