// src/dom.rs
//! DOM tree access for the matcher.
//!
//! The matcher never parses markup itself. It only needs a read-only view of
//! a tree: tag names, attribute maps, ordered element children and a
//! document-order walk. [`DomNode`] describes that view, and this module
//! implements it for the `markup5ever_rcdom` tree that `html5ever` builds.

use html5ever::parse_document;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::QualName;
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

/// Errors raised while loading or serializing documents
#[derive(Error, Debug)]
pub enum DomError {
    #[error("Failed to parse HTML: {0}")]
    ParseError(String),

    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Snippet contains no element")]
    EmptySnippet,

    #[error("Failed to serialize node: {0}")]
    SerializeError(String),
}

/// Read-only view of a parsed document node.
///
/// Only element nodes take part in matching. Text, comments, doctypes and the
/// document node itself report no tag name and are skipped by
/// [`DomNode::element_children`].
pub trait DomNode: Clone {
    /// Tag name as normalized by the parser, `None` for non-element nodes
    fn tag_name(&self) -> Option<String>;

    /// Attribute mapping keyed by qualified name (`xlink:href`); empty for
    /// non-element nodes
    fn attributes(&self) -> BTreeMap<String, String>;

    /// Element children in sibling order
    fn element_children(&self) -> Vec<Self>;

    /// All element descendants in document order, excluding `self`
    fn descendants(&self) -> Vec<Self> {
        let mut found = Vec::new();
        let mut stack: Vec<Self> = self.element_children().into_iter().rev().collect();

        while let Some(node) = stack.pop() {
            stack.extend(node.element_children().into_iter().rev());
            found.push(node);
        }

        found
    }

    /// Short opening-tag rendering, e.g. `<div class="a">`
    fn summary(&self) -> String {
        let Some(tag) = self.tag_name() else {
            return "#non-element".to_string();
        };

        let attrs: String = self
            .attributes()
            .iter()
            .map(|(k, v)| format!(" {}=\"{}\"", k, v.replace('&', "&amp;").replace('"', "&quot;")))
            .collect();

        format!("<{}{}>", tag, attrs)
    }
}

impl DomNode for Handle {
    fn tag_name(&self) -> Option<String> {
        match &self.data {
            NodeData::Element { name, .. } => Some(name.local.to_string()),
            _ => None,
        }
    }

    fn attributes(&self) -> BTreeMap<String, String> {
        match &self.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .map(|a| (qualified_name(&a.name), a.value.to_string()))
                .collect(),
            _ => BTreeMap::new(),
        }
    }

    fn element_children(&self) -> Vec<Self> {
        self.children
            .borrow()
            .iter()
            .filter(|child| matches!(child.data, NodeData::Element { .. }))
            .cloned()
            .collect()
    }
}

fn qualified_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.to_string(),
    }
}

/// Parse a full HTML document and return its document node
pub fn parse_html(html: &str) -> Result<Handle, DomError> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|e| DomError::ParseError(e.to_string()))?;

    Ok(dom.document)
}

/// Parse an HTML snippet and return the element it describes.
///
/// The parser wraps a snippet in `html`/`head`/`body`; the exemplar is the
/// first element placed in the body, or in the head for head-only content
/// such as `<title>`. The element is detached from the wrapper document, so
/// it keeps its subtree after that document is dropped.
pub fn parse_snippet(snippet: &str) -> Result<Handle, DomError> {
    let document = parse_html(snippet)?;

    for container in ["body", "head"] {
        let first = find_first(&document, container)
            .and_then(|c| c.element_children().into_iter().next());
        if let Some(element) = first {
            detach(&element);
            return Ok(element);
        }
    }

    Err(DomError::EmptySnippet)
}

// Dropping an rcdom node empties the child lists of everything still linked
// below it.
fn detach(node: &Handle) {
    if let Some(parent) = node.parent.take().and_then(|weak| weak.upgrade()) {
        parent.children.borrow_mut().retain(|child| !Rc::ptr_eq(child, node));
    }
}

/// Load and parse a document from disk
pub fn parse_file(path: impl AsRef<Path>) -> Result<Handle, DomError> {
    parse_html(&read_file(path.as_ref())?)
}

/// Load an exemplar snippet from disk
pub fn parse_snippet_file(path: impl AsRef<Path>) -> Result<Handle, DomError> {
    parse_snippet(&read_file(path.as_ref())?)
}

fn read_file(path: &Path) -> Result<String, DomError> {
    fs::read_to_string(path).map_err(|source| DomError::ReadError {
        path: path.display().to_string(),
        source,
    })
}

/// First descendant with the given tag, in document order
pub fn find_first<N: DomNode>(root: &N, tag: &str) -> Option<N> {
    root.descendants()
        .into_iter()
        .find(|n| n.tag_name().as_deref() == Some(tag))
}

/// Serialize a node including its own tags
pub fn outer_html(node: &Handle) -> Result<String, DomError> {
    let mut bytes = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    serialize(&mut bytes, &SerializableHandle::from(node.clone()), opts)
        .map_err(|e| DomError::SerializeError(e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| DomError::SerializeError(e.to_string()))
}
