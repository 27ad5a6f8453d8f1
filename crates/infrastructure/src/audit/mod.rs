//! Security event sinks.

mod memory_sink;
mod tracing_sink;

pub use memory_sink::MemoryEventSink;
pub use tracing_sink::{AUDIT_TARGET, TracingEventSink};
