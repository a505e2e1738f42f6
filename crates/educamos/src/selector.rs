//! Selector registry: logical element names mapped to CSS address templates.
//!
//! Every node of the hierarchy owns one [`SelectorRegistry`], built from the
//! node's defaults with caller overrides laid on top. Two names are reserved:
//!
//! - [`ROOT`]: when present, every other address of the node is scoped under
//!   it with a descendant combinator (a table row scopes its cells).
//! - [`FRAME`]: the element hosting the node's embedded document.
//!
//! Templates may carry a placeholder character that is replaced on request,
//! e.g. `tr:nth-of-type(#)` with parameter `"3"` becomes `tr:nth-of-type(3)`.

use std::collections::HashMap;

use crate::result::{NotifierError, NotifierResult};

/// Reserved name of the scoping root selector
pub const ROOT: &str = "root";

/// Reserved name of the frame-hosting selector
pub const FRAME: &str = "frame";

/// Placeholder replaced by [`SelectorRegistry::resolve_address`]
pub const DEFAULT_PLACEHOLDER: char = '#';

/// Name/template pairs, used for node defaults and caller overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorMap {
    entries: HashMap<String, String>,
}

impl SelectorMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, replacing any previous template for `name`
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.set(name, template);
        self
    }

    /// Add an entry in place
    pub fn set(&mut self, name: impl Into<String>, template: impl Into<String>) {
        let _ = self.entries.insert(name.into(), template.into());
    }

    /// Look up a template
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Whether `name` is present
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Lay `overrides` on top of `self`; entries from `overrides` win
    #[must_use]
    pub fn overlay(mut self, overrides: &SelectorMap) -> Self {
        for (name, template) in &overrides.entries {
            let _ = self.entries.insert(name.clone(), template.clone());
        }
        self
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Replace every `placeholder` in `template` with `parameter`.
///
/// Without a parameter the template is returned unchanged.
#[must_use]
pub fn substitute(template: &str, parameter: Option<&str>, placeholder: char) -> String {
    match parameter {
        Some(value) => template.replace(placeholder, value),
        None => template.to_string(),
    }
}

/// The merged selector set of one node
#[derive(Debug, Clone)]
pub struct SelectorRegistry {
    owner: String,
    selectors: SelectorMap,
}

impl SelectorRegistry {
    /// Build a registry from `defaults`, with `overrides` winning on conflicts.
    ///
    /// Every registry also knows `body`, unless the node redefines it.
    #[must_use]
    pub fn new(
        owner: impl Into<String>,
        defaults: SelectorMap,
        overrides: Option<&SelectorMap>,
    ) -> Self {
        let mut selectors = SelectorMap::new().with("body", "body").overlay(&defaults);
        if let Some(overrides) = overrides {
            selectors = selectors.overlay(overrides);
        }
        Self {
            owner: owner.into(),
            selectors,
        }
    }

    /// Name of the owning node, used in error reports
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Whether `name` is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.selectors.contains(name)
    }

    /// Whether the node declares an embedded document
    #[must_use]
    pub fn has_frame(&self) -> bool {
        self.contains(FRAME)
    }

    /// Whether the node scopes its children under a root element
    #[must_use]
    pub fn has_root(&self) -> bool {
        self.contains(ROOT)
    }

    /// Raw template for `name`.
    ///
    /// # Errors
    ///
    /// [`NotifierError::SelectorNotFound`] if `name` is absent or empty.
    pub fn get_selector(&self, name: &str) -> NotifierResult<&str> {
        match self.selectors.get(name) {
            Some(template) if !template.is_empty() => Ok(template),
            _ => Err(NotifierError::SelectorNotFound {
                node: self.owner.clone(),
                name: name.to_string(),
            }),
        }
    }

    /// Root selector, or `body` when the node declares none
    #[must_use]
    pub fn root_selector(&self) -> &str {
        self.selectors
            .get(ROOT)
            .filter(|root| !root.is_empty())
            .unwrap_or("body")
    }

    /// Replace the root selector
    pub fn set_root(&mut self, root: impl Into<String>) {
        self.selectors.set(ROOT, root);
    }

    /// Final address for `name`: placeholder substituted, root-scoped if the
    /// node declares a root and `name` is not the root itself.
    ///
    /// # Errors
    ///
    /// [`NotifierError::SelectorNotFound`] if `name` (or the root) is absent.
    pub fn resolve_address(
        &self,
        name: &str,
        parameter: Option<&str>,
        placeholder: char,
    ) -> NotifierResult<String> {
        let own = substitute(self.get_selector(name)?, parameter, placeholder);
        if name != ROOT && self.has_root() {
            let root = self.get_selector(ROOT)?;
            Ok(format!("{root} {own}"))
        } else {
            Ok(own)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row_registry() -> SelectorRegistry {
        SelectorRegistry::new(
            "row",
            SelectorMap::new()
                .with(ROOT, "table tr:nth-of-type(2)")
                .with("date", "td:nth-of-type(4)")
                .with("cell", "td:nth-of-type(#)"),
            None,
        )
    }

    mod selector_map_tests {
        use super::*;

        #[test]
        fn test_overlay_override_wins() {
            let defaults = SelectorMap::new().with("a", "#a").with("b", "#b");
            let overrides = SelectorMap::new().with("b", "#other");
            let merged = defaults.overlay(&overrides);

            assert_eq!(merged.get("a"), Some("#a"));
            assert_eq!(merged.get("b"), Some("#other"));
            assert_eq!(merged.len(), 2);
        }

        #[test]
        fn test_empty_map() {
            let map = SelectorMap::new();
            assert!(map.is_empty());
            assert!(!map.contains("body"));
        }
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_registry_knows_body() {
            let registry = SelectorRegistry::new("page", SelectorMap::new(), None);
            assert_eq!(registry.get_selector("body").unwrap(), "body");
        }

        #[test]
        fn test_overrides_beat_defaults() {
            let defaults = SelectorMap::new().with("username", "#username");
            let overrides = SelectorMap::new().with("username", "input[name='user']");
            let registry = SelectorRegistry::new("login", defaults, Some(&overrides));
            assert_eq!(
                registry.get_selector("username").unwrap(),
                "input[name='user']"
            );
        }

        #[test]
        fn test_missing_name_fails() {
            let registry = SelectorRegistry::new("login", SelectorMap::new(), None);
            let err = registry.get_selector("nope").unwrap_err();
            assert!(matches!(
                err,
                NotifierError::SelectorNotFound { ref node, ref name } if node == "login" && name == "nope"
            ));
        }

        #[test]
        fn test_empty_template_fails() {
            let registry =
                SelectorRegistry::new("login", SelectorMap::new().with("blank", ""), None);
            assert!(registry.get_selector("blank").is_err());
        }

        #[test]
        fn test_root_and_frame_flags() {
            let registry = row_registry();
            assert!(registry.has_root());
            assert!(!registry.has_frame());

            let frame = SelectorRegistry::new(
                "cuerpo",
                SelectorMap::new().with(FRAME, "[name='cuerpo']"),
                None,
            );
            assert!(frame.has_frame());
            assert_eq!(frame.root_selector(), "body");
        }

        #[test]
        fn test_set_root() {
            let mut registry = SelectorRegistry::new("page", SelectorMap::new(), None);
            registry.set_root("#main");
            assert_eq!(registry.root_selector(), "#main");
        }
    }

    mod resolve_address_tests {
        use super::*;

        #[test]
        fn test_child_is_scoped_under_root() {
            let address = row_registry()
                .resolve_address("date", None, DEFAULT_PLACEHOLDER)
                .unwrap();
            assert_eq!(address, "table tr:nth-of-type(2) td:nth-of-type(4)");
        }

        #[test]
        fn test_root_is_not_self_concatenated() {
            let address = row_registry()
                .resolve_address(ROOT, None, DEFAULT_PLACEHOLDER)
                .unwrap();
            assert_eq!(address, "table tr:nth-of-type(2)");
        }

        #[test]
        fn test_parameter_replaces_every_placeholder() {
            let registry = SelectorRegistry::new(
                "page",
                SelectorMap::new().with("input", "input:nth-of-type(#) + x#"),
                None,
            );
            let address = registry
                .resolve_address("input", Some("5"), DEFAULT_PLACEHOLDER)
                .unwrap();
            assert_eq!(address, "input:nth-of-type(5) + x5");
        }

        #[test]
        fn test_no_parameter_leaves_template() {
            let registry = SelectorRegistry::new(
                "login",
                SelectorMap::new().with("username", "#username"),
                None,
            );
            let address = registry
                .resolve_address("username", None, DEFAULT_PLACEHOLDER)
                .unwrap();
            assert_eq!(address, "#username");
        }

        #[test]
        fn test_custom_placeholder() {
            let registry = SelectorRegistry::new(
                "page",
                SelectorMap::new().with("byText", "a:has-text('$')"),
                None,
            );
            let address = registry
                .resolve_address("byText", Some("Mensajes"), '$')
                .unwrap();
            assert_eq!(address, "a:has-text('Mensajes')");
        }

        #[test]
        fn test_parameter_inside_scoped_child() {
            let address = row_registry()
                .resolve_address("cell", Some("7"), DEFAULT_PLACEHOLDER)
                .unwrap();
            assert_eq!(address, "table tr:nth-of-type(2) td:nth-of-type(7)");
        }
    }

    proptest! {
        #[test]
        fn prop_substitution_leaves_no_placeholder(
            prefix in "[a-z]{0,8}",
            suffix in "[a-z]{0,8}",
            value in "[0-9]{1,4}",
        ) {
            let template = format!("{prefix}#{suffix}#");
            let out = substitute(&template, Some(&value), '#');
            prop_assert!(!out.contains('#'));
            prop_assert_eq!(out, format!("{prefix}{value}{suffix}{value}"));
        }

        #[test]
        fn prop_without_parameter_is_identity(template in "[a-z#:()\\[\\]=' ]{0,24}") {
            prop_assert_eq!(substitute(&template, None, '#'), template);
        }

        #[test]
        fn prop_root_composition(root in "[a-z]{1,8}", child in "[a-z]{1,8}") {
            let registry = SelectorRegistry::new(
                "node",
                SelectorMap::new().with(ROOT, root.clone()).with("child", child.clone()),
                None,
            );
            let address = registry.resolve_address("child", None, '#').unwrap();
            prop_assert_eq!(address, format!("{root} {child}"));
            prop_assert_eq!(registry.resolve_address(ROOT, None, '#').unwrap(), root);
        }
    }
}
