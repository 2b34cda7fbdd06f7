//! Span capability seam and attribute assembly.
//!
//! The core never owns a tracer, exporter, or provider: it consumes a
//! minimal [`SpanHandle`] capability (set an attribute, mark error status,
//! close) supplied by the caller, and produces serialized attribute values
//! for it. [`OtelSpan`] adapts any OpenTelemetry span to the capability.

pub mod keys;

mod assemble;

pub use assemble::{Assembler, EndOptions, ModelAliases, Provider, StartOptions};

use opentelemetry::trace::{Span, Status};
use opentelemetry::{KeyValue, Value};

/// The span capability this library consumes.
///
/// Implementations serialize all mutation of one span instance; the core is
/// single-threaded per call and never shares a handle across threads.
pub trait SpanHandle {
    fn set_attribute(&mut self, key: &'static str, value: Value);
    fn set_error_status(&mut self, message: &str);
    fn close(&mut self);
}

/// Adapter projecting the capability onto an OpenTelemetry span.
pub struct OtelSpan<S: Span>(pub S);

impl<S: Span> SpanHandle for OtelSpan<S> {
    fn set_attribute(&mut self, key: &'static str, value: Value) {
        self.0.set_attribute(KeyValue::new(key, value));
    }

    fn set_error_status(&mut self, message: &str) {
        self.0.set_status(Status::error(message.to_string()));
    }

    fn close(&mut self) {
        self.0.end();
    }
}

/// Scoped guard that closes the span when dropped.
///
/// End-of-call assembly runs through this guard so the span is closed on
/// every exit path, including a captured failure.
pub(crate) struct SpanCloser<'a, S: SpanHandle + ?Sized>(pub &'a mut S);

impl<S: SpanHandle + ?Sized> Drop for SpanCloser<'_, S> {
    fn drop(&mut self) {
        self.0.close();
    }
}

impl<S: SpanHandle + ?Sized> std::ops::Deref for SpanCloser<'_, S> {
    type Target = S;
    fn deref(&self) -> &S {
        self.0
    }
}

impl<S: SpanHandle + ?Sized> std::ops::DerefMut for SpanCloser<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.0
    }
}

/// Truncate a string to at most `max` bytes on a UTF-8 char boundary.
pub(crate) fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
