//! Hooks for measuring how long each pass takes.

use std::time::{Duration, Instant};

/// Receives start and end events around the execution of every pass. Labels are pass names.
pub trait Profiler {
    fn start(&mut self, label: &str);
    fn end(&mut self, label: &str);
}

/// A [`Profiler`] that records the wall clock time between matching `start` and `end` events.
///
/// Note that this measures CPU time spent recording work. A backend that executes commands asynchronously should
/// implement [`Profiler`] itself using GPU timestamp queries.
#[derive(Debug, Default)]
pub struct PassTimings {
    pending: Vec<(String, Instant)>,
    samples: Vec<(String, Duration)>,
}

impl PassTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// All finished measurements, in the order they ended.
    pub fn samples(&self) -> &[(String, Duration)] {
        &self.samples
    }

    /// Sum of every measurement with this label.
    pub fn total(&self, label: &str) -> Duration {
        self.samples
            .iter()
            .filter(|(sample, _)| sample == label)
            .map(|(_, duration)| *duration)
            .sum()
    }

    /// Labels that were started but never ended.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(|(label, _)| label.as_str())
    }

    /// Discard all measurements.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.samples.clear();
    }
}

impl Profiler for PassTimings {
    fn start(&mut self, label: &str) {
        self.pending.push((label.to_owned(), Instant::now()));
    }

    fn end(&mut self, label: &str) {
        match self.pending.iter().rposition(|(pending, _)| pending == label) {
            Some(index) => {
                let (label, started) = self.pending.remove(index);
                self.samples.push((label, started.elapsed()));
            }
            None => warn!("Profiler event `{label}` ended without being started"),
        }
    }
}
