//! Conversation classification and conversion.
//!
//! Two stages: [`classify`] resolves an arbitrary upstream record to a role
//! and coarse shape through an ordered probe chain, and [`convert`] walks a
//! whole conversation to produce the canonical
//! [`Conversion`](crate::model::Conversion) split. Both stages are total
//! functions; malformed input degrades, it never errors.

pub mod classify;
mod conversation;

pub use classify::{MessageKind, classify};
pub use conversation::{convert, infer_finish_reason};
