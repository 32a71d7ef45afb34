// src/analysis/structural.rs
//! Structural comparison of an exemplar subtree against document subtrees.
//!
//! Candidates are found in two passes:
//! - a flat pre-filter keeps every document element that passes the
//!   node-level check against the exemplar root;
//! - each survivor is then compared recursively, children paired purely by
//!   sibling position, down to `match_max_depth`.
//!
//! Child-count differences are resolved by the configured tolerance. The
//! comparison is not symmetric: "missing" and "redundant" children are
//! tolerated by different policies.

use crate::analysis::node::nodes_match;
use crate::dom::DomNode;
use crate::models::{Divergence, MatchConfig};
use crate::observer::{MatchObserver, TraceEvent};

/// Recursive matcher bound to one policy and one observer
pub struct StructuralMatcher<'a> {
    config: &'a MatchConfig,
    observer: &'a dyn MatchObserver,
}

impl<'a> StructuralMatcher<'a> {
    pub fn new(config: &'a MatchConfig, observer: &'a dyn MatchObserver) -> Self {
        Self { config, observer }
    }

    /// All descendants of `document` structurally matching `exemplar`, in
    /// document order. Nested matches are all reported.
    pub fn find_matches<N: DomNode>(&self, exemplar: &N, document: &N) -> Vec<N> {
        let candidates: Vec<N> = document
            .descendants()
            .into_iter()
            .filter(|candidate| nodes_match(exemplar, candidate, self.config.match_type))
            .collect();

        self.observer.on_event(&TraceEvent::CandidatesFound {
            tag: exemplar.tag_name().unwrap_or_default(),
            count: candidates.len(),
        });

        let matches: Vec<N> = candidates
            .into_iter()
            .filter(|candidate| self.is_structural_match(exemplar, candidate, 0))
            .collect();

        self.observer.on_event(&TraceEvent::MatchesFound { count: matches.len() });

        matches
    }

    /// Compare `exemplar` and `candidate`, both sitting at `depth`
    pub fn is_structural_match<N: DomNode>(&self, exemplar: &N, candidate: &N, depth: usize) -> bool {
        let max_depth = self.config.match_max_depth;

        if max_depth.is_some_and(|max| depth > max) {
            self.observer.on_event(&TraceEvent::DepthCutoff { depth });
            return true;
        }

        if !nodes_match(exemplar, candidate, self.config.match_type) {
            self.observer.on_event(&TraceEvent::NodeMismatch {
                depth,
                exemplar: exemplar.summary(),
                candidate: candidate.summary(),
            });
            return false;
        }

        self.observer.on_event(&TraceEvent::NodeCompared {
            depth,
            tag: exemplar.tag_name().unwrap_or_default(),
        });

        if max_depth == Some(depth) {
            self.observer.on_event(&TraceEvent::DepthCutoff { depth });
            return true;
        }

        let mut exemplar_children = exemplar.element_children().into_iter();
        let mut candidate_children = candidate.element_children().into_iter();

        loop {
            match (exemplar_children.next(), candidate_children.next()) {
                (Some(e), Some(c)) => {
                    if !self.is_structural_match(&e, &c, depth + 1) {
                        return false;
                    }
                }
                (None, None) => return true,
                (Some(_), None) => return self.resolve_divergence(depth, Divergence::MissingChild),
                (None, Some(_)) => return self.resolve_divergence(depth, Divergence::RedundantChild),
            }
        }
    }

    fn resolve_divergence(&self, depth: usize, divergence: Divergence) -> bool {
        let tolerated = self.config.match_tolerance.tolerates(divergence);
        self.observer.on_event(&TraceEvent::ChildCountDiverged {
            depth,
            divergence,
            tolerated,
        });
        tolerated
    }
}
