//! Canonical span attribute keys.
//!
//! The full attribute surface this library produces. The downstream trace
//! viewer matches these strings literally; treat the table as frozen.

// ============================================================================
// OPERATION / REQUEST
// ============================================================================

pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";
pub const GEN_AI_SYSTEM: &str = "gen_ai.system";
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";
pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";
pub const GEN_AI_REQUEST_TOP_P: &str = "gen_ai.request.top_p";
pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";
pub const GEN_AI_REQUEST_STOP: &str = "gen_ai.request.stop";
pub const GEN_AI_REQUEST_PRESENCE_PENALTY: &str = "gen_ai.request.presence_penalty";
pub const GEN_AI_REQUEST_FREQUENCY_PENALTY: &str = "gen_ai.request.frequency_penalty";

// ============================================================================
// RESPONSE METADATA
// ============================================================================

pub const GEN_AI_RESPONSE_MODEL: &str = "gen_ai.response.model";
pub const GEN_AI_RESPONSE_ID: &str = "gen_ai.response.id";
pub const GEN_AI_RESPONSE_FINISH_REASONS: &str = "gen_ai.response.finish_reasons";
pub const GEN_AI_RESPONSE_STATUS: &str = "gen_ai.response.status";
pub const GEN_AI_RESPONSE_RUN_ID: &str = "gen_ai.response.run_id";
pub const GEN_AI_SYSTEM_FINGERPRINT: &str = "gen_ai.system.fingerprint";
pub const GEN_AI_LATENCY_MS: &str = "gen_ai.latency_ms";
pub const GEN_AI_COST: &str = "gen_ai.cost";

// ============================================================================
// USAGE
// ============================================================================

pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";
pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";
pub const GEN_AI_USAGE_TOTAL_TOKENS: &str = "gen_ai.usage.total_tokens";
pub const GEN_AI_USAGE_CACHE_READ_TOKENS: &str = "gen_ai.usage.cache_read_tokens";
pub const GEN_AI_USAGE_CACHE_WRITE_TOKENS: &str = "gen_ai.usage.cache_write_tokens";
pub const GEN_AI_USAGE_CACHE_WRITE_1H_TOKENS: &str = "gen_ai.usage.cache_write_1h_tokens";
pub const GEN_AI_USAGE_CACHE_WRITE_5M_TOKENS: &str = "gen_ai.usage.cache_write_5m_tokens";
pub const GEN_AI_USAGE_REASONING_TOKENS: &str = "gen_ai.usage.reasoning_tokens";
pub const GEN_AI_USAGE_AUDIO_INPUT_TOKENS: &str = "gen_ai.usage.audio_input_tokens";
pub const GEN_AI_USAGE_AUDIO_OUTPUT_TOKENS: &str = "gen_ai.usage.audio_output_tokens";
pub const GEN_AI_USAGE_ACCEPTED_PREDICTION_TOKENS: &str =
    "gen_ai.usage.accepted_prediction_tokens";
pub const GEN_AI_USAGE_REJECTED_PREDICTION_TOKENS: &str =
    "gen_ai.usage.rejected_prediction_tokens";
pub const GEN_AI_USAGE_WEB_SEARCH_REQUESTS: &str = "gen_ai.usage.web_search_requests";
pub const GEN_AI_SERVICE_TIER: &str = "gen_ai.service_tier";

// ============================================================================
// CACHE / STREAMING
// ============================================================================

pub const GEN_AI_CACHE_STATUS: &str = "gen_ai.cache.status";
pub const GEN_AI_CACHE_KEY: &str = "gen_ai.cache.key";
pub const GEN_AI_RESPONSE_STREAMED: &str = "gen_ai.response.streamed";
pub const GEN_AI_RESPONSE_NUM_CHUNKS: &str = "gen_ai.response.num_chunks";

// ============================================================================
// MESSAGES / TOOLS
// ============================================================================

pub const GEN_AI_INPUT_MESSAGES: &str = "gen_ai.input.messages";
pub const GEN_AI_OUTPUT_MESSAGES: &str = "gen_ai.output.messages";
pub const GEN_AI_SYSTEM_INSTRUCTIONS: &str = "gen_ai.system_instructions";
pub const GEN_AI_MESSAGES_JSON_SCHEMA: &str = "gen_ai.messages.json_schema";
pub const GEN_AI_TOOL_DEFINITIONS: &str = "gen_ai.tool.definitions";
pub const GEN_AI_TOOL_CALLS: &str = "gen_ai.tool_calls";
pub const GEN_AI_RESPONSE_TOOL_CALLS_COUNT: &str = "gen_ai.response.tool_calls.count";

// ============================================================================
// FAILURE
// ============================================================================

pub const EXCEPTION_TYPE: &str = "exception.type";
pub const EXCEPTION_MESSAGE: &str = "exception.message";
pub const EXCEPTION_STACKTRACE: &str = "exception.stacktrace";
pub const LOG_LEVEL: &str = "log.level";

/// Maximum length for the exception stacktrace attribute.
pub const EXCEPTION_STACKTRACE_MAX_LEN: usize = 50_000;

/// Sentinel emitted when a value defeats every serialization attempt.
pub const SERIALIZATION_SENTINEL: &str = "<not serializable>";
