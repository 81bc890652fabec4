/// Receiver of informational messages from save and load passes.
///
/// Delivery failures stay inside the sink; they never fail a conversion.
pub trait MessageSink: Send + Sync {
    fn send(&self, message: &str);
}

/// Forwards messages to the `log` facade at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl MessageSink for LogSink {
    fn send(&self, message: &str) {
        log::info!("{}", message);
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl MessageSink for NullSink {
    fn send(&self, _message: &str) {}
}
