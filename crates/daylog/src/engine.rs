use crate::format::Record;
use crate::sink::Sink;

/// The set of currently attached sinks.
///
/// Records are rendered and written to each sink directly, so delivery
/// never depends on tracing's static or global level filters.
#[derive(Debug, Default)]
pub(crate) struct Engine {
    sinks: Vec<Sink>,
}

impl Engine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Attach `sink` unless an equivalent sink is already attached.
    pub(crate) fn attach(&mut self, sink: Sink) -> bool {
        if self.sinks.iter().any(|attached| attached.same_as(&sink)) {
            return false;
        }
        self.sinks.push(sink);
        true
    }

    pub(crate) fn detach_all(&mut self) {
        self.sinks.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.sinks.len()
    }

    pub(crate) fn emit(&self, record: &Record) {
        for sink in &self.sinks {
            // Fire-and-forget: a failed write must not reach the caller.
            let _ = sink.write_record(record);
        }
    }

    /// Flush every attached file sink.
    pub(crate) fn flush(&self) {
        for sink in &self.sinks {
            let _ = sink.flush();
        }
    }
}
