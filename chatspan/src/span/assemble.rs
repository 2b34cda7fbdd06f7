//! Span attribute assembly.
//!
//! Orchestrates classification, conversion, and extraction to populate one
//! span with the canonical GenAI attribute set. Two call sites per traced
//! operation: [`Assembler::start`] when the request is issued and
//! [`Assembler::finish`] when the conversation is complete. Request-start
//! attributes always land before request-end attributes, and end-of-call
//! processing always completes (successfully or as a captured failure)
//! before the span is closed — the downstream viewer renders spans
//! incrementally and expects monotonic attribute arrival.

use std::collections::HashMap;
use std::sync::OnceLock;

use opentelemetry::{Array, StringValue, Value};
use schemars::JsonSchema;
use serde_json::{Map, Value as JsonValue, json};
use thiserror::Error;

use crate::convert::{MessageKind, classify, convert};
use crate::extract;
use crate::model::{FinishReason, InputMessage, MessagePart, OutputMessage, Role, ToolDefinition};
use crate::record::{ChatRecord, ToolCallRecord};

use super::{SpanCloser, SpanHandle, keys, truncate_bytes};

// ============================================================================
// PROVIDER TAG
// ============================================================================

/// Provider tag written to `gen_ai.system`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
    Ollama,
    Unknown,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::Ollama => "ollama",
            Self::Unknown => "unknown",
        }
    }

    /// Infer a provider tag from a model identifier.
    pub fn from_model_id(model: &str) -> Self {
        let lowered = model.to_lowercase();
        if lowered.starts_with("gpt")
            || lowered.starts_with("o1")
            || lowered.starts_with("o3")
            || lowered.starts_with("o4")
            || lowered.contains("davinci")
        {
            Self::OpenAi
        } else if lowered.starts_with("claude") {
            Self::Anthropic
        } else if lowered.starts_with("gemini") || lowered.starts_with("palm") {
            Self::Google
        } else if lowered.contains("llama") || lowered.contains("mistral") {
            Self::Ollama
        } else {
            Self::Unknown
        }
    }
}

// ============================================================================
// MODEL ALIASES
// ============================================================================

/// Read-only model-alias lookup table.
///
/// Injected into the assembler rather than held as process state; unresolved
/// aliases pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct ModelAliases(HashMap<String, String>);

impl ModelAliases {
    pub fn resolve(&self, model: &str) -> String {
        self.0
            .get(model)
            .cloned()
            .unwrap_or_else(|| model.to_string())
    }
}

impl FromIterator<(String, String)> for ModelAliases {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================================
// CALL OPTIONS
// ============================================================================

/// Request-start inputs.
#[derive(Debug, Clone, Default)]
pub struct StartOptions<'a> {
    pub operation: &'a str,
    pub model: Option<&'a str>,
    /// Explicit provider tag; inferred from the resolved model when absent.
    pub provider: Option<Provider>,
    /// Caller-supplied request parameter bag; only the whitelisted keys are
    /// projected onto the span.
    pub params: Option<&'a JsonValue>,
    pub tools: Option<&'a [ToolDefinition]>,
}

impl<'a> StartOptions<'a> {
    pub fn new(operation: &'a str) -> Self {
        Self {
            operation,
            ..Default::default()
        }
    }
}

/// Request-end inputs.
#[derive(Debug, Clone, Default)]
pub struct EndOptions<'a> {
    /// Divert system turns into `gen_ai.system_instructions`.
    pub separate_system: bool,
    /// Raw provider finish reason, when the caller knows it. Only the
    /// non-inferable reasons (length, content_filter, error) override the
    /// part-scan inference.
    pub finish_reason: Option<&'a str>,
}

// ============================================================================
// FAILURE
// ============================================================================

/// Failure raised while building end-of-call attributes.
///
/// Never escapes [`Assembler::finish`]: it is recorded onto the span as the
/// exception attribute set and then suppressed.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("failed to serialize {what}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl AssembleError {
    fn exception_type(&self) -> &'static str {
        match self {
            Self::Serialize { .. } => "SerializeError",
        }
    }
}

// ============================================================================
// ASSEMBLER
// ============================================================================

/// Populates a span with the canonical GenAI attribute set.
pub struct Assembler {
    aliases: ModelAliases,
}

impl Assembler {
    pub fn new(aliases: ModelAliases) -> Self {
        Self { aliases }
    }

    /// Set request-start attributes.
    pub fn start<S: SpanHandle + ?Sized>(&self, span: &mut S, opts: &StartOptions<'_>) {
        span.set_attribute(keys::GEN_AI_OPERATION_NAME, string_value(opts.operation));

        let resolved = opts.model.map(|m| self.aliases.resolve(m));
        let provider = opts.provider.unwrap_or_else(|| {
            resolved
                .as_deref()
                .map(Provider::from_model_id)
                .unwrap_or(Provider::Unknown)
        });
        span.set_attribute(keys::GEN_AI_SYSTEM, string_value(provider.as_str()));
        if let Some(model) = resolved {
            span.set_attribute(keys::GEN_AI_REQUEST_MODEL, string_value(&model));
        }

        if let Some(params) = opts.params.and_then(|p| p.as_object()) {
            set_request_params(span, params);
        }

        if let Some(tools) = opts.tools.filter(|t| !t.is_empty()) {
            span.set_attribute(
                keys::GEN_AI_TOOL_DEFINITIONS,
                string_value(&serialize_json(&tools)),
            );
        }
    }

    /// Set request-end attributes and close the span.
    ///
    /// Every internal failure is captured and recorded as the exception
    /// attribute set; the span is closed on all exit paths.
    pub fn finish<S: SpanHandle + ?Sized>(
        &self,
        span: &mut S,
        conversation: &[ChatRecord],
        opts: &EndOptions<'_>,
    ) {
        let mut span = SpanCloser(span);
        if let Err(error) = finish_inner(&mut *span, conversation, opts) {
            tracing::debug!(error = %error, "end-of-call assembly failed, recording on span");
            record_failure(&mut *span, &error);
        }
    }
}

fn finish_inner<S: SpanHandle + ?Sized>(
    span: &mut S,
    conversation: &[ChatRecord],
    opts: &EndOptions<'_>,
) -> Result<(), AssembleError> {
    let primary = primary_message(conversation);

    let mut conversion = convert(conversation, opts.separate_system);
    if let Some(reason) = opts.finish_reason.and_then(FinishReason::from_provider)
        && matches!(
            reason,
            FinishReason::Length | FinishReason::ContentFilter | FinishReason::Error
        )
        && let Some(output) = conversion.output_messages.first_mut()
    {
        output.finish_reason = reason;
    }

    let mut any_messages = false;
    if !conversion.input_messages.is_empty() {
        let payload = to_json(&conversion.input_messages, "input messages")?;
        span.set_attribute(keys::GEN_AI_INPUT_MESSAGES, string_value(&payload));
        any_messages = true;
    }
    if !conversion.output_messages.is_empty() {
        let payload = to_json(&conversion.output_messages, "output messages")?;
        span.set_attribute(keys::GEN_AI_OUTPUT_MESSAGES, string_value(&payload));
        any_messages = true;
    }
    if let Some(system) = conversion
        .system_instructions
        .as_ref()
        .filter(|parts| !parts.is_empty())
    {
        let payload = to_json(system, "system instructions")?;
        span.set_attribute(keys::GEN_AI_SYSTEM_INSTRUCTIONS, string_value(&payload));
        any_messages = true;
    }

    if let Some(record) = primary {
        for (key, value) in extract::message_attributes(record) {
            span.set_attribute(key, value);
        }

        let entries = tool_call_entries(record);
        if !entries.is_empty() {
            span.set_attribute(
                keys::GEN_AI_RESPONSE_TOOL_CALLS_COUNT,
                Value::I64(entries.len() as i64),
            );
            span.set_attribute(keys::GEN_AI_TOOL_CALLS, string_value(&serialize_json(&entries)));
        }
    }

    if any_messages {
        span.set_attribute(keys::GEN_AI_MESSAGES_JSON_SCHEMA, string_value(messages_schema()));
    }

    Ok(())
}

/// Locate the primary assistant message: the most recent assistant turn,
/// else the last message, else none.
fn primary_message(conversation: &[ChatRecord]) -> Option<&ChatRecord> {
    conversation
        .iter()
        .rev()
        .find(|record| classify(record).0 == Role::Assistant)
        .or_else(|| conversation.last())
}

fn record_failure<S: SpanHandle + ?Sized>(span: &mut S, error: &AssembleError) {
    let message = error.to_string();
    span.set_attribute(keys::EXCEPTION_TYPE, string_value(error.exception_type()));
    span.set_attribute(keys::EXCEPTION_MESSAGE, string_value(&message));
    let chain = error_chain(error);
    span.set_attribute(
        keys::EXCEPTION_STACKTRACE,
        string_value(truncate_bytes(&chain, keys::EXCEPTION_STACKTRACE_MAX_LEN)),
    );
    span.set_attribute(keys::LOG_LEVEL, string_value("error"));
    span.set_error_status(&message);
}

/// Render an error and its source chain.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(err) = source {
        out.push_str("\nCaused by: ");
        out.push_str(&err.to_string());
        source = err.source();
    }
    out
}

// ============================================================================
// REQUEST PARAMETERS
// ============================================================================

fn set_request_params<S: SpanHandle + ?Sized>(span: &mut S, params: &Map<String, JsonValue>) {
    if let Some(v) = params.get("temperature").and_then(|v| v.as_f64()) {
        span.set_attribute(keys::GEN_AI_REQUEST_TEMPERATURE, Value::F64(v));
    }
    if let Some(v) = params.get("top_p").and_then(|v| v.as_f64()) {
        span.set_attribute(keys::GEN_AI_REQUEST_TOP_P, Value::F64(v));
    }
    if let Some(v) = params.get("max_tokens").and_then(|v| v.as_i64()) {
        span.set_attribute(keys::GEN_AI_REQUEST_MAX_TOKENS, Value::I64(v));
    }
    if let Some(stop) = params.get("stop") {
        match stop {
            JsonValue::String(s) => {
                span.set_attribute(keys::GEN_AI_REQUEST_STOP, string_value(s));
            }
            JsonValue::Array(arr) => {
                let sequences: Vec<StringValue> = arr
                    .iter()
                    .filter_map(|v| v.as_str().map(|s| StringValue::from(s.to_string())))
                    .collect();
                if !sequences.is_empty() {
                    span.set_attribute(
                        keys::GEN_AI_REQUEST_STOP,
                        Value::Array(Array::String(sequences)),
                    );
                }
            }
            _ => {}
        }
    }
    if let Some(v) = params.get("presence_penalty").and_then(|v| v.as_f64()) {
        span.set_attribute(keys::GEN_AI_REQUEST_PRESENCE_PENALTY, Value::F64(v));
    }
    if let Some(v) = params.get("frequency_penalty").and_then(|v| v.as_f64()) {
        span.set_attribute(keys::GEN_AI_REQUEST_FREQUENCY_PENALTY, Value::F64(v));
    }
}

// ============================================================================
// TOOL CALL SERIALIZATION
// ============================================================================

/// Structured tool-call entries for the primary message.
///
/// Tool-request turns contribute `{id, name, arguments}` entries; tool-result
/// turns contribute a single `{id, name, result}` entry. Map-shaped entries
/// that defeat parsing are kept as their opaque serialization rather than
/// aborting the list.
fn tool_call_entries(record: &ChatRecord) -> Vec<JsonValue> {
    let (_, kind) = classify(record);
    match kind {
        MessageKind::ToolResult => {
            let mut entry = Map::new();
            if let Some(id) = record.tool_call_id() {
                entry.insert("id".to_string(), json!(id));
            }
            if let Some(name) = record.participant_name() {
                entry.insert("name".to_string(), json!(name));
            }
            entry.insert(
                "result".to_string(),
                record.tool_result().unwrap_or(JsonValue::Null),
            );
            vec![JsonValue::Object(entry)]
        }
        MessageKind::ToolRequest => match record {
            ChatRecord::Typed(message) => {
                message.tool_calls.iter().map(request_entry).collect()
            }
            ChatRecord::Map(value) => value
                .get("tool_calls")
                .and_then(|tc| tc.as_array())
                .map(|arr| {
                    arr.iter()
                        .map(|entry| match ToolCallRecord::from_value(entry) {
                            Some(call) => request_entry(&call),
                            None => {
                                tracing::trace!(
                                    entry = %entry,
                                    "unparseable tool call, keeping opaque entry"
                                );
                                entry.clone()
                            }
                        })
                        .collect()
                })
                .unwrap_or_default(),
        },
        _ => Vec::new(),
    }
}

fn request_entry(call: &ToolCallRecord) -> JsonValue {
    let mut entry = Map::new();
    if let Some(id) = &call.id {
        entry.insert("id".to_string(), json!(id));
    }
    entry.insert("name".to_string(), json!(call.name));
    if let Some(arguments) = &call.arguments {
        entry.insert("arguments".to_string(), arguments.clone());
    }
    JsonValue::Object(entry)
}

// ============================================================================
// SERIALIZATION HELPERS
// ============================================================================

fn to_json<T: serde::Serialize>(value: &T, what: &'static str) -> Result<String, AssembleError> {
    serde_json::to_string(value).map_err(|source| AssembleError::Serialize { what, source })
}

/// Serialize with local recovery: retry with the value's string form, then
/// fall back to the fixed sentinel instead of failing the call.
fn serialize_json<T: serde::Serialize + std::fmt::Debug>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(payload) => payload,
        Err(_) => serde_json::to_string(&format!("{value:?}"))
            .unwrap_or_else(|_| keys::SERIALIZATION_SENTINEL.to_string()),
    }
}

/// Schema declaration for the three serialized message attributes.
fn messages_schema() -> &'static str {
    static SCHEMA: OnceLock<String> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        json!({
            "input_messages": schema_value::<Vec<InputMessage>>(),
            "output_messages": schema_value::<Vec<OutputMessage>>(),
            "system_instructions": schema_value::<Vec<MessagePart>>(),
        })
        .to_string()
    })
}

fn schema_value<T: JsonSchema>() -> JsonValue {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or_else(|_| json!({}))
}

fn string_value(s: &str) -> Value {
    Value::String(StringValue::from(s.to_string()))
}

#[cfg(test)]
#[path = "assemble_tests.rs"]
mod tests;
