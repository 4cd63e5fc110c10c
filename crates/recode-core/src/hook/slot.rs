use std::sync::atomic::{AtomicU32, Ordering};

/// A single `f32` handed from one hook callback to another.
///
/// Exactly one producer hook writes and exactly one consumer hook reads, and
/// the host always executes the producer before the consumer within one call
/// path. Relaxed ordering is enough under that invariant. A consumer that runs
/// first observes whatever the previous producer call left behind.
#[derive(Debug, Default)]
pub struct ScalerSlot(AtomicU32);

impl ScalerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}
