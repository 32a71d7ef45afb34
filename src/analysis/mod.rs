// src/analysis/mod.rs
//! Matching engine
//!
//! `node` compares a single pair of elements, `structural` recursively
//! compares subtrees and drives candidate discovery over a document.

pub mod node;
pub mod structural;

pub use node::nodes_match;
pub use structural::StructuralMatcher;
