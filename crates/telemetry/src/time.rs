// Path: crates/telemetry/src/time.rs
use crate::sinks::MiningMetricsSink;
use std::time::Instant;

/// Observes the lifetime of a loop iteration on drop.
pub struct IterationTimer<'a> {
    sink: &'a dyn MiningMetricsSink,
    start: Instant,
}

impl<'a> IterationTimer<'a> {
    pub fn new(sink: &'a dyn MiningMetricsSink) -> Self {
        Self {
            sink,
            start: Instant::now(),
        }
    }
}

impl Drop for IterationTimer<'_> {
    fn drop(&mut self) {
        self.sink
            .observe_iteration_duration(self.start.elapsed().as_secs_f64());
    }
}
