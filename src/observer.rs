// src/observer.rs
//! Trace points emitted while matching.
//!
//! The matcher reports what it is doing through a [`MatchObserver`] instead of
//! printing. [`LogObserver`] forwards events to the `log` facade and
//! [`NoopObserver`] drops them.

use crate::models::Divergence;
use log::{debug, trace};
#[cfg(test)]
use std::cell::RefCell;
use std::rc::Rc;

/// Something the matcher did or decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// Pre-filter finished for the exemplar root tag
    CandidatesFound { tag: String, count: usize },

    /// Node-level check passed at this depth
    NodeCompared { depth: usize, tag: String },

    /// Tag (or attributes, in strict mode) differ
    NodeMismatch {
        depth: usize,
        exemplar: String,
        candidate: String,
    },

    /// Children below this depth are not inspected
    DepthCutoff { depth: usize },

    /// Child lists had different lengths
    ChildCountDiverged {
        depth: usize,
        divergence: Divergence,
        tolerated: bool,
    },

    /// Structural validation finished
    MatchesFound { count: usize },
}

pub trait MatchObserver {
    fn on_event(&self, event: &TraceEvent);
}

impl<T: MatchObserver + ?Sized> MatchObserver for Rc<T> {
    fn on_event(&self, event: &TraceEvent) {
        (**self).on_event(event)
    }
}

/// Drops every event
pub struct NoopObserver;
impl MatchObserver for NoopObserver {
    fn on_event(&self, _event: &TraceEvent) {}
}

/// Writes events to the `log` facade. Per-node events go to `trace`.
pub struct LogObserver;
impl MatchObserver for LogObserver {
    fn on_event(&self, event: &TraceEvent) {
        match event {
            TraceEvent::CandidatesFound { tag, count } => {
                debug!("Number of <{}> candidates: {}", tag, count)
            }
            TraceEvent::MatchesFound { count } => debug!("Number of matches: {}", count),
            TraceEvent::NodeCompared { depth, tag } => trace!("[depth {}] <{}> matches", depth, tag),
            TraceEvent::NodeMismatch { depth, exemplar, candidate } => {
                trace!("[depth {}] Elements differ: {} vs {}", depth, exemplar, candidate)
            }
            TraceEvent::DepthCutoff { depth } => trace!("[depth {}] Max depth reached", depth),
            TraceEvent::ChildCountDiverged { depth, divergence, tolerated } => trace!(
                "[depth {}] Number of children differ ({:?}), tolerated: {}",
                depth,
                divergence,
                tolerated
            ),
        }
    }
}

/// Keeps every event in order. Only built for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: RefCell<Vec<TraceEvent>>,
}

#[cfg(test)]
impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

#[cfg(test)]
impl MatchObserver for RecordingObserver {
    fn on_event(&self, event: &TraceEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_through_rc() {
        let recorder = Rc::new(RecordingObserver::new());
        let shared: Rc<dyn MatchObserver> = recorder.clone();

        shared.on_event(&TraceEvent::DepthCutoff { depth: 2 });
        shared.on_event(&TraceEvent::MatchesFound { count: 1 });

        assert_eq!(
            recorder.events(),
            vec![
                TraceEvent::DepthCutoff { depth: 2 },
                TraceEvent::MatchesFound { count: 1 },
            ]
        );

        recorder.clear();
        assert!(recorder.events().is_empty());
    }
}
