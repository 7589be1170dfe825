//! Inter-document pacing.
//!
//! The reconciler calls [`Pacer::wait`] after every document it mutates,
//! whatever the outcome.

use std::time::Duration;

/// Backpressure applied between documents.
pub trait Pacer {
    fn wait(&mut self);
}

/// Sleep for a fixed interval after each document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

impl Pacer for FixedDelay {
    fn wait(&mut self) {
        if !self.0.is_zero() {
            std::thread::sleep(self.0);
        }
    }
}

/// No pacing at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unpaced;

impl Pacer for Unpaced {
    fn wait(&mut self) {}
}
