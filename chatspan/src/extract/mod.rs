//! Usage and response-metadata extraction.
//!
//! Reads a message's free-form metadata bag and emits the canonical usage
//! and response attributes. Extraction is side-effect-free and never fails:
//! an absent bag yields an empty result.
//!
//! ## Precedence (usage fields)
//!
//! Each logical usage field resolves through a strict two-tier table:
//!
//! 1. unified, provider-agnostic key on the bag itself
//! 2. legacy/provider-raw fallback, consulted only when the unified key is
//!    absent: the nested `prompt_tokens_details` / `completion_tokens_details`
//!    maps, the nested `cache_creation` durations, and flat legacy
//!    cache-token names from the older provider convention
//!
//! Presence of a unified key (even holding null) suppresses that field's
//! fallback lookup. A resolved value is set only when non-null — and, for
//! strings, non-empty — but numeric zero and boolean false are valid values
//! and are set. The table below IS the contract; change it deliberately.
//!
//! Response metadata (model id, finish reasons, latency, cost, ids, cache
//! and streaming flags) is extracted by independent direct lookups with the
//! same set-only-if-present rule; it does not participate in the tiering.

use opentelemetry::{Array, StringValue, Value};
use serde_json::{Map, Value as JsonValue};

use crate::record::ChatRecord;
use crate::span::keys;

// ============================================================================
// USAGE FIELD TABLE
// ============================================================================

/// Fallback lookup path for one logical usage field.
enum Fallback {
    None,
    /// Flat legacy key on the bag.
    Flat(&'static str),
    /// Sub-field of a nested details map.
    Nested(&'static str, &'static str),
    /// Nested path first, then a flat legacy key.
    NestedThenFlat {
        parent: &'static str,
        field: &'static str,
        flat: &'static str,
    },
}

/// One row of the usage precedence table.
struct UsageField {
    attr: &'static str,
    unified: &'static str,
    fallback: Fallback,
}

const USAGE_FIELDS: &[UsageField] = &[
    UsageField {
        attr: keys::GEN_AI_USAGE_INPUT_TOKENS,
        unified: "input_tokens",
        fallback: Fallback::Flat("prompt_tokens"),
    },
    UsageField {
        attr: keys::GEN_AI_USAGE_OUTPUT_TOKENS,
        unified: "output_tokens",
        fallback: Fallback::Flat("completion_tokens"),
    },
    UsageField {
        attr: keys::GEN_AI_USAGE_TOTAL_TOKENS,
        unified: "total_tokens",
        fallback: Fallback::None,
    },
    UsageField {
        attr: keys::GEN_AI_USAGE_CACHE_READ_TOKENS,
        unified: "cache_read_tokens",
        fallback: Fallback::NestedThenFlat {
            parent: "prompt_tokens_details",
            field: "cached_tokens",
            flat: "cache_read_input_tokens",
        },
    },
    UsageField {
        attr: keys::GEN_AI_USAGE_CACHE_WRITE_TOKENS,
        unified: "cache_write_tokens",
        fallback: Fallback::Flat("cache_creation_input_tokens"),
    },
    UsageField {
        attr: keys::GEN_AI_USAGE_CACHE_WRITE_1H_TOKENS,
        unified: "cache_write_1h_tokens",
        fallback: Fallback::Nested("cache_creation", "ephemeral_1h_input_tokens"),
    },
    UsageField {
        attr: keys::GEN_AI_USAGE_CACHE_WRITE_5M_TOKENS,
        unified: "cache_write_5m_tokens",
        fallback: Fallback::Nested("cache_creation", "ephemeral_5m_input_tokens"),
    },
    UsageField {
        attr: keys::GEN_AI_USAGE_REASONING_TOKENS,
        unified: "reasoning_tokens",
        fallback: Fallback::Nested("completion_tokens_details", "reasoning_tokens"),
    },
    UsageField {
        attr: keys::GEN_AI_USAGE_AUDIO_INPUT_TOKENS,
        unified: "audio_input_tokens",
        fallback: Fallback::Nested("prompt_tokens_details", "audio_tokens"),
    },
    UsageField {
        attr: keys::GEN_AI_USAGE_AUDIO_OUTPUT_TOKENS,
        unified: "audio_output_tokens",
        fallback: Fallback::Nested("completion_tokens_details", "audio_tokens"),
    },
    UsageField {
        attr: keys::GEN_AI_USAGE_ACCEPTED_PREDICTION_TOKENS,
        unified: "accepted_prediction_tokens",
        fallback: Fallback::Nested("completion_tokens_details", "accepted_prediction_tokens"),
    },
    UsageField {
        attr: keys::GEN_AI_USAGE_REJECTED_PREDICTION_TOKENS,
        unified: "rejected_prediction_tokens",
        fallback: Fallback::Nested("completion_tokens_details", "rejected_prediction_tokens"),
    },
    UsageField {
        attr: keys::GEN_AI_USAGE_WEB_SEARCH_REQUESTS,
        unified: "web_search_requests",
        fallback: Fallback::Nested("server_tool_use", "web_search_requests"),
    },
];

impl Fallback {
    fn lookup<'a>(&self, bag: &'a Map<String, JsonValue>) -> Option<&'a JsonValue> {
        match self {
            Self::None => None,
            Self::Flat(key) => non_null(bag.get(*key)),
            Self::Nested(parent, field) => non_null(bag.get(*parent).and_then(|p| p.get(*field))),
            Self::NestedThenFlat {
                parent,
                field,
                flat,
            } => non_null(bag.get(*parent).and_then(|p| p.get(*field)))
                .or_else(|| non_null(bag.get(*flat))),
        }
    }
}

impl UsageField {
    fn resolve<'a>(&self, bag: &'a Map<String, JsonValue>) -> Option<&'a JsonValue> {
        if bag.contains_key(self.unified) {
            // A unified key always wins, even when the fallback disagrees.
            non_null(bag.get(self.unified))
        } else {
            self.fallback.lookup(bag)
        }
    }
}

fn non_null(value: Option<&JsonValue>) -> Option<&JsonValue> {
    value.filter(|v| !v.is_null())
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Extract every canonical usage and response attribute from a message.
///
/// Returns attribute pairs ready to set on a span; the list is empty when
/// the message carries no metadata bag.
pub fn message_attributes(record: &ChatRecord) -> Vec<(&'static str, Value)> {
    let Some(bag) = record.metadata().and_then(|m| m.as_object()) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    extract_usage(bag, &mut out);
    extract_response_metadata(bag, &mut out);
    out
}

fn extract_usage(bag: &Map<String, JsonValue>, out: &mut Vec<(&'static str, Value)>) {
    for field in USAGE_FIELDS {
        if let Some(value) = field.resolve(bag)
            && let Some(n) = value.as_i64()
        {
            out.push((field.attr, Value::I64(n)));
        }
    }

    // Service tier is the one string-typed field of the unified schema; it
    // has no raw-dict fallback.
    if let Some(tier) = bag.get("service_tier").and_then(|v| v.as_str())
        && !tier.is_empty()
    {
        out.push((keys::GEN_AI_SERVICE_TIER, string_value(tier)));
    }
}

fn extract_response_metadata(bag: &Map<String, JsonValue>, out: &mut Vec<(&'static str, Value)>) {
    push_str(
        out,
        keys::GEN_AI_RESPONSE_MODEL,
        first_str(bag, &["model", "model_name"]),
    );
    if let Some(reason) = bag.get("finish_reason").and_then(|v| v.as_str())
        && !reason.is_empty()
    {
        // Raw provider vocabulary, passed through verbatim.
        out.push((
            keys::GEN_AI_RESPONSE_FINISH_REASONS,
            Value::Array(Array::String(vec![StringValue::from(reason.to_string())])),
        ));
    }
    if let Some(secs) = bag.get("duration").and_then(|v| v.as_f64()) {
        out.push((keys::GEN_AI_LATENCY_MS, Value::F64(secs * 1000.0)));
    }
    if let Some(cost) = bag.get("cost").and_then(|v| v.as_f64()) {
        out.push((keys::GEN_AI_COST, Value::F64(cost)));
    }
    push_str(
        out,
        keys::GEN_AI_RESPONSE_ID,
        first_str(bag, &["id", "response_id"]),
    );
    push_str(
        out,
        keys::GEN_AI_SYSTEM_FINGERPRINT,
        first_str(bag, &["system_fingerprint"]),
    );
    push_str(out, keys::GEN_AI_RESPONSE_STATUS, first_str(bag, &["status"]));
    push_str(out, keys::GEN_AI_RESPONSE_RUN_ID, first_str(bag, &["run_id"]));
    push_str(
        out,
        keys::GEN_AI_CACHE_STATUS,
        first_str(bag, &["cache_status"]),
    );
    push_str(out, keys::GEN_AI_CACHE_KEY, first_str(bag, &["cache_key"]));
    if let Some(streamed) = bag.get("streamed").and_then(|v| v.as_bool()) {
        out.push((keys::GEN_AI_RESPONSE_STREAMED, Value::Bool(streamed)));
    }
    if let Some(chunks) = bag.get("num_chunks").and_then(|v| v.as_i64()) {
        out.push((keys::GEN_AI_RESPONSE_NUM_CHUNKS, Value::I64(chunks)));
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// First non-empty string among the given bag keys.
fn first_str<'a>(bag: &'a Map<String, JsonValue>, bag_keys: &[&str]) -> Option<&'a str> {
    bag_keys
        .iter()
        .find_map(|k| bag.get(*k).and_then(|v| v.as_str()).filter(|s| !s.is_empty()))
}

fn push_str(out: &mut Vec<(&'static str, Value)>, attr: &'static str, value: Option<&str>) {
    if let Some(s) = value {
        out.push((attr, string_value(s)));
    }
}

fn string_value(s: &str) -> Value {
    Value::String(StringValue::from(s.to_string()))
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
