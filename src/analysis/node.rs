// src/analysis/node.rs
//! Node-level comparison: one exemplar node against one candidate node,
//! children never inspected.

use crate::dom::DomNode;
use crate::models::MatchType;

/// Whether two nodes are equivalent under `match_type`.
///
/// A non-element on either side never matches. Tag names are compared as the
/// parser produced them, with no further normalization. Under
/// [`MatchType::Strict`] the attribute maps must be exactly equal as well.
pub fn nodes_match<N: DomNode>(exemplar: &N, candidate: &N, match_type: MatchType) -> bool {
    let (Some(exemplar_tag), Some(candidate_tag)) = (exemplar.tag_name(), candidate.tag_name()) else {
        return false;
    };

    match match_type {
        MatchType::Loose => exemplar_tag == candidate_tag,
        MatchType::Strict => {
            exemplar_tag == candidate_tag && exemplar.attributes() == candidate.attributes()
        }
    }
}
