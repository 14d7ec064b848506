//! Boundaries to the host application: command execution and fault
//! reporting.
//!
//! The console does not interpret commands itself. Once a message has
//! made it through decoding, hooks, and tokenization, the resulting
//! `(command, args)` pair is handed to the host's [`CommandExecutor`] and
//! forgotten — any reply the host wants to make goes back independently
//! through the broadcast API.

/// Executes a parsed console command.
///
/// Fire-and-forget from the console's perspective: no return value is
/// observed, and no timeout is applied. A slow executor slows nothing in
/// the protocol layer because dispatch happens on the connection's task.
pub trait CommandExecutor: Send + Sync {
    /// Runs `command` with its positional arguments.
    ///
    /// `command` is already case-folded to lowercase.
    fn execute(&self, command: &str, args: &[String]);
}

/// Receives faults that deserve more than a log line, e.g. a crash
/// reporter or external monitoring.
///
/// The console reports start/bind failures here after logging them; it
/// never retries or propagates them.
pub trait FaultSink: Send + Sync {
    /// Reports `error` together with a short human-readable context.
    fn report(&self, context: &str, error: &(dyn std::error::Error + 'static));
}

/// A [`FaultSink`] that discards every report. Used when the host wires
/// up no reporter; faults are still logged before reaching the sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFaultSink;

impl FaultSink for NoopFaultSink {
    fn report(&self, _context: &str, _error: &(dyn std::error::Error + 'static)) {}
}
