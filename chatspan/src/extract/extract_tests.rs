//! Tests for usage and response-metadata extraction.

use opentelemetry::Value;
use serde_json::json;

use crate::record::{ChatRecord, UpstreamMessage};
use crate::span::keys;

use super::*;

fn with_bag(bag: serde_json::Value) -> ChatRecord {
    ChatRecord::Map(json!({"role": "assistant", "content": "x", "metadata": bag}))
}

fn attr<'a>(attrs: &'a [(&'static str, Value)], key: &str) -> Option<&'a Value> {
    attrs.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
}

// ============================================================================
// TWO-TIER PRECEDENCE
// ============================================================================

#[test]
fn test_unified_key_wins_over_fallback() {
    let attrs = message_attributes(&with_bag(json!({
        "cache_read_tokens": 100,
        "cache_read_input_tokens": 500
    })));
    assert_eq!(
        attr(&attrs, keys::GEN_AI_USAGE_CACHE_READ_TOKENS),
        Some(&Value::I64(100))
    );
}

#[test]
fn test_flat_legacy_fallback_applies() {
    let attrs = message_attributes(&with_bag(json!({"cache_read_input_tokens": 500})));
    assert_eq!(
        attr(&attrs, keys::GEN_AI_USAGE_CACHE_READ_TOKENS),
        Some(&Value::I64(500))
    );
}

#[test]
fn test_nested_prompt_details_fallback() {
    let attrs = message_attributes(&with_bag(json!({
        "prompt_tokens_details": {"cached_tokens": 42, "audio_tokens": 7}
    })));
    assert_eq!(
        attr(&attrs, keys::GEN_AI_USAGE_CACHE_READ_TOKENS),
        Some(&Value::I64(42))
    );
    assert_eq!(
        attr(&attrs, keys::GEN_AI_USAGE_AUDIO_INPUT_TOKENS),
        Some(&Value::I64(7))
    );
}

#[test]
fn test_nested_completion_details_fallback() {
    let attrs = message_attributes(&with_bag(json!({
        "completion_tokens_details": {
            "reasoning_tokens": 11,
            "audio_tokens": 3,
            "accepted_prediction_tokens": 5,
            "rejected_prediction_tokens": 2
        }
    })));
    assert_eq!(
        attr(&attrs, keys::GEN_AI_USAGE_REASONING_TOKENS),
        Some(&Value::I64(11))
    );
    assert_eq!(
        attr(&attrs, keys::GEN_AI_USAGE_AUDIO_OUTPUT_TOKENS),
        Some(&Value::I64(3))
    );
    assert_eq!(
        attr(&attrs, keys::GEN_AI_USAGE_ACCEPTED_PREDICTION_TOKENS),
        Some(&Value::I64(5))
    );
    assert_eq!(
        attr(&attrs, keys::GEN_AI_USAGE_REJECTED_PREDICTION_TOKENS),
        Some(&Value::I64(2))
    );
}

#[test]
fn test_unified_null_suppresses_fallback() {
    // Presence of the unified key suppresses the fallback even when it holds
    // null; nothing is set for the field.
    let attrs = message_attributes(&with_bag(json!({
        "cache_read_tokens": null,
        "cache_read_input_tokens": 500
    })));
    assert_eq!(attr(&attrs, keys::GEN_AI_USAGE_CACHE_READ_TOKENS), None);
}

#[test]
fn test_numeric_zero_is_a_valid_value() {
    let attrs = message_attributes(&with_bag(json!({"input_tokens": 0})));
    assert_eq!(
        attr(&attrs, keys::GEN_AI_USAGE_INPUT_TOKENS),
        Some(&Value::I64(0))
    );
}

#[test]
fn test_prompt_completion_legacy_names() {
    let attrs = message_attributes(&with_bag(json!({
        "prompt_tokens": 10,
        "completion_tokens": 4,
        "total_tokens": 14
    })));
    assert_eq!(
        attr(&attrs, keys::GEN_AI_USAGE_INPUT_TOKENS),
        Some(&Value::I64(10))
    );
    assert_eq!(
        attr(&attrs, keys::GEN_AI_USAGE_OUTPUT_TOKENS),
        Some(&Value::I64(4))
    );
    assert_eq!(
        attr(&attrs, keys::GEN_AI_USAGE_TOTAL_TOKENS),
        Some(&Value::I64(14))
    );
}

#[test]
fn test_ephemeral_cache_write_durations() {
    let unified = message_attributes(&with_bag(json!({
        "cache_write_1h_tokens": 10,
        "cache_write_5m_tokens": 5
    })));
    assert_eq!(
        attr(&unified, keys::GEN_AI_USAGE_CACHE_WRITE_1H_TOKENS),
        Some(&Value::I64(10))
    );
    assert_eq!(
        attr(&unified, keys::GEN_AI_USAGE_CACHE_WRITE_5M_TOKENS),
        Some(&Value::I64(5))
    );

    let raw = message_attributes(&with_bag(json!({
        "cache_creation": {
            "ephemeral_1h_input_tokens": 20,
            "ephemeral_5m_input_tokens": 8
        }
    })));
    assert_eq!(
        attr(&raw, keys::GEN_AI_USAGE_CACHE_WRITE_1H_TOKENS),
        Some(&Value::I64(20))
    );
    assert_eq!(
        attr(&raw, keys::GEN_AI_USAGE_CACHE_WRITE_5M_TOKENS),
        Some(&Value::I64(8))
    );
}

#[test]
fn test_web_search_requests() {
    let unified = message_attributes(&with_bag(json!({"web_search_requests": 3})));
    assert_eq!(
        attr(&unified, keys::GEN_AI_USAGE_WEB_SEARCH_REQUESTS),
        Some(&Value::I64(3))
    );

    let raw = message_attributes(&with_bag(json!({
        "server_tool_use": {"web_search_requests": 2}
    })));
    assert_eq!(
        attr(&raw, keys::GEN_AI_USAGE_WEB_SEARCH_REQUESTS),
        Some(&Value::I64(2))
    );
}

#[test]
fn test_service_tier() {
    let attrs = message_attributes(&with_bag(json!({"service_tier": "priority"})));
    assert_eq!(
        attr(&attrs, keys::GEN_AI_SERVICE_TIER),
        Some(&Value::String("priority".to_string().into()))
    );

    let empty = message_attributes(&with_bag(json!({"service_tier": ""})));
    assert_eq!(attr(&empty, keys::GEN_AI_SERVICE_TIER), None);
}

// ============================================================================
// ABSENT BAGS
// ============================================================================

#[test]
fn test_no_metadata_bag_yields_empty_result() {
    let record = ChatRecord::Map(json!({"role": "assistant", "content": "x"}));
    assert!(message_attributes(&record).is_empty());

    let typed = ChatRecord::Typed(UpstreamMessage::new("AiReply"));
    assert!(message_attributes(&typed).is_empty());
}

#[test]
fn test_non_object_bag_yields_empty_result() {
    let record = ChatRecord::Map(json!({"role": "assistant", "metadata": "oops"}));
    assert!(message_attributes(&record).is_empty());
}

// ============================================================================
// RESPONSE METADATA
// ============================================================================

#[test]
fn test_response_metadata_lookups() {
    let attrs = message_attributes(&with_bag(json!({
        "model_name": "gpt-4.1-2025-04-14",
        "finish_reason": "end_turn",
        "duration": 1.5,
        "cost": 0.0125,
        "response_id": "resp-1",
        "system_fingerprint": "fp_abc",
        "status": "success",
        "run_id": "run-9",
        "cache_status": "hit",
        "cache_key": "k-1",
        "streamed": false,
        "num_chunks": 17
    })));

    assert_eq!(
        attr(&attrs, keys::GEN_AI_RESPONSE_MODEL),
        Some(&Value::String("gpt-4.1-2025-04-14".to_string().into()))
    );
    // Raw provider vocabulary, passed through verbatim.
    match attr(&attrs, keys::GEN_AI_RESPONSE_FINISH_REASONS) {
        Some(Value::Array(opentelemetry::Array::String(reasons))) => {
            assert_eq!(reasons.len(), 1);
            assert_eq!(reasons[0].as_str(), "end_turn");
        }
        other => panic!("unexpected finish_reasons value: {other:?}"),
    }
    assert_eq!(attr(&attrs, keys::GEN_AI_LATENCY_MS), Some(&Value::F64(1500.0)));
    assert_eq!(attr(&attrs, keys::GEN_AI_COST), Some(&Value::F64(0.0125)));
    assert_eq!(
        attr(&attrs, keys::GEN_AI_RESPONSE_ID),
        Some(&Value::String("resp-1".to_string().into()))
    );
    assert_eq!(
        attr(&attrs, keys::GEN_AI_SYSTEM_FINGERPRINT),
        Some(&Value::String("fp_abc".to_string().into()))
    );
    assert_eq!(
        attr(&attrs, keys::GEN_AI_RESPONSE_STATUS),
        Some(&Value::String("success".to_string().into()))
    );
    assert_eq!(
        attr(&attrs, keys::GEN_AI_RESPONSE_RUN_ID),
        Some(&Value::String("run-9".to_string().into()))
    );
    assert_eq!(
        attr(&attrs, keys::GEN_AI_CACHE_STATUS),
        Some(&Value::String("hit".to_string().into()))
    );
    assert_eq!(
        attr(&attrs, keys::GEN_AI_CACHE_KEY),
        Some(&Value::String("k-1".to_string().into()))
    );
    // Boolean false is a valid value and must be set.
    assert_eq!(
        attr(&attrs, keys::GEN_AI_RESPONSE_STREAMED),
        Some(&Value::Bool(false))
    );
    assert_eq!(
        attr(&attrs, keys::GEN_AI_RESPONSE_NUM_CHUNKS),
        Some(&Value::I64(17))
    );
}

#[test]
fn test_response_id_prefers_id_key() {
    let attrs = message_attributes(&with_bag(json!({
        "id": "resp-a",
        "response_id": "resp-b"
    })));
    assert_eq!(
        attr(&attrs, keys::GEN_AI_RESPONSE_ID),
        Some(&Value::String("resp-a".to_string().into()))
    );
}

#[test]
fn test_typed_record_metadata_bag() {
    let message = UpstreamMessage::new("AiReply").with_metadata(json!({
        "input_tokens": 12,
        "output_tokens": 5
    }));
    let attrs = message_attributes(&ChatRecord::from(message));
    assert_eq!(
        attr(&attrs, keys::GEN_AI_USAGE_INPUT_TOKENS),
        Some(&Value::I64(12))
    );
    assert_eq!(
        attr(&attrs, keys::GEN_AI_USAGE_OUTPUT_TOKENS),
        Some(&Value::I64(5))
    );
}
