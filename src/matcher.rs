// src/matcher.rs
//! Match session: one exemplar bound to one policy.

use crate::analysis::StructuralMatcher;
use crate::dom::DomNode;
use crate::models::{ConfigurationError, MatchConfig};
use crate::observer::{LogObserver, MatchObserver};
use log::{debug, info, warn};
use markup5ever_rcdom::Handle;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Finds document elements shaped like an exemplar element.
///
/// ```no_run
/// use rust_pattern_hunter::dom::{parse_html, parse_snippet};
/// use rust_pattern_hunter::ExemplarMatcher;
///
/// let exemplar = parse_snippet("<li><a></a></li>").unwrap();
/// let document = parse_html("<ul><li><a>1</a></li><li><a>2</a></li></ul>").unwrap();
///
/// let matches = ExemplarMatcher::new(exemplar).find_matches(&document).unwrap();
/// assert_eq!(matches.len(), 2);
/// ```
pub struct ExemplarMatcher<N: DomNode = Handle> {
    exemplar: Option<N>,
    config: MatchConfig,
    observer: Box<dyn MatchObserver>,
}

impl<N: DomNode> ExemplarMatcher<N> {
    pub fn new(exemplar: N) -> Self {
        Self {
            exemplar: Some(exemplar),
            ..Self::empty()
        }
    }

    /// A session with no exemplar yet; matching fails until one is set
    pub fn empty() -> Self {
        Self {
            exemplar: None,
            config: MatchConfig::default(),
            observer: Box::new(LogObserver),
        }
    }

    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_observer(mut self, observer: impl MatchObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Bind a new exemplar, replacing the previous one
    pub fn set_exemplar(&mut self, exemplar: N) {
        self.exemplar = Some(exemplar);
    }

    pub fn exemplar(&self) -> Option<&N> {
        self.exemplar.as_ref()
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut MatchConfig {
        &mut self.config
    }

    /// Set a policy field by name, see [`MatchConfig::set`]
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigurationError> {
        self.config.set(key, value)
    }

    /// Every element of `document` structurally matching the exemplar, in
    /// document order. An empty result is a normal outcome.
    pub fn find_matches(&self, document: &N) -> Result<Vec<N>, ConfigurationError> {
        let exemplar = self.exemplar.as_ref().ok_or(ConfigurationError::MissingExemplar)?;

        if exemplar.tag_name().is_none() {
            return Err(ConfigurationError::InvalidExemplar(exemplar.summary()));
        }

        if let Some(scope) = &self.config.match_inside_element {
            warn!("matchInsideElement ({}) is not supported yet; searching the whole document", scope);
        }

        debug!(
            "Matching {} (type: {}, max depth: {:?}, tolerance: {})",
            exemplar.summary(),
            self.config.match_type,
            self.config.match_max_depth,
            self.config.match_tolerance
        );

        let matches = StructuralMatcher::new(&self.config, self.observer.as_ref())
            .find_matches(exemplar, document);

        info!("Found {} element(s) matching {}", matches.len(), exemplar.summary());

        Ok(matches)
    }

    /// Session settings for diagnostics. Has no effect on matching.
    pub fn settings(&self) -> BTreeMap<String, Value> {
        let mut settings = self.config.settings();
        let exemplar = match &self.exemplar {
            Some(node) => json!({
                "tag": node.tag_name(),
                "attrs": node.attributes(),
            }),
            None => Value::Null,
        };
        settings.insert("exemplar".to_string(), exemplar);
        settings
    }
}
