//! # chatspan
//!
//! Normalize heterogeneous LLM conversation records into a canonical,
//! wire-stable message representation, and project that representation onto
//! the attribute set of a single observability span.
//!
//! Conversation history comes from an orchestration crate that versions its
//! message taxonomy independently; records are classified structurally and
//! every unknown shape degrades to an opaque serialization rather than an
//! error. The output contract is the `gen_ai.*` attribute table consumed by
//! a downstream trace viewer — including its two deliberate deviations from
//! the nominal GenAI message standard (tool results under a `result` key,
//! embedded in `user`-role messages).
//!
//! # Example
//!
//! ```
//! use chatspan::model::Role;
//! use chatspan::record::ChatRecord;
//! use chatspan::span::{Assembler, EndOptions, ModelAliases, SpanHandle, StartOptions};
//! use opentelemetry::Value;
//!
//! # struct NoopSpan;
//! # impl SpanHandle for NoopSpan {
//! #     fn set_attribute(&mut self, _key: &'static str, _value: Value) {}
//! #     fn set_error_status(&mut self, _message: &str) {}
//! #     fn close(&mut self) {}
//! # }
//! let assembler = Assembler::new(ModelAliases::default());
//! let mut span = NoopSpan;
//!
//! assembler.start(&mut span, &StartOptions::new("chat"));
//!
//! let conversation = vec![
//!     ChatRecord::Map(serde_json::json!({"role": "user", "content": "Hello"})),
//!     ChatRecord::Map(serde_json::json!({"role": "assistant", "content": "Hi!"})),
//! ];
//! assembler.finish(&mut span, &conversation, &EndOptions::default());
//! # let _ = Role::User;
//! ```
//!
//! The core is single-threaded and synchronous: it performs no I/O and owns
//! no tracer, exporter, or provider. Span export, configuration, and
//! transport belong to external collaborators reached through the
//! [`span::SpanHandle`] capability.

pub mod convert;
pub mod extract;
pub mod model;
pub mod record;
pub mod span;

pub use convert::{MessageKind, classify, convert};
pub use model::{
    Conversion, FinishReason, InputMessage, MessagePart, Modality, OutputMessage, Role,
    ToolDefinition,
};
pub use record::{ChatRecord, ToolCallRecord, UpstreamMessage};
pub use span::{Assembler, EndOptions, ModelAliases, OtelSpan, Provider, SpanHandle, StartOptions};
