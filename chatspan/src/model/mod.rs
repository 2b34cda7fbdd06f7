//! Canonical message model.
//!
//! The wire-stable representation every upstream conversation is normalized
//! into before being projected onto span attributes. Serialization is the
//! contract: see [`MessagePart`] for the two deliberate deviations from the
//! nominal GenAI message standard that the downstream viewer depends on.

mod types;

pub use types::{
    Conversion, FinishReason, InputMessage, MessagePart, Modality, OutputMessage, Role,
    ToolDefinition,
};
