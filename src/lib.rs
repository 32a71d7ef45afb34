//! Find subtrees of an HTML document that are shaped like an exemplar
//! element, e.g. every item of a listing given one item as a template.

pub mod models;
pub mod dom;
pub mod observer;
pub mod cli;
pub mod suite;

/// Node-level and structural comparison
pub mod analysis;

/// Match sessions
pub mod matcher;

pub use analysis::{nodes_match, StructuralMatcher};
pub use dom::DomNode;
pub use matcher::ExemplarMatcher;
pub use models::{ConfigurationError, MatchConfig, MatchTolerance, MatchType};
pub use observer::{LogObserver, MatchObserver, TraceEvent};
