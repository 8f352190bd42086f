//! Class attribute helpers.
//!
//! Space-separated class token utilities plus the node-level accessors built
//! on them. The free functions are pure string algorithms; the accessors
//! read and write the class attribute through the backend.

use crate::backend::Backend;
use crate::error::DomResult;
use crate::NodeId;

/// Split a class attribute value into its tokens.
pub fn parse_class_names(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Append tokens to a class attribute value. Entries may themselves be
/// space-separated. No deduplication.
pub fn join_class_names(base: &str, extra: &[&str]) -> String {
    let mut out = base.trim().to_string();
    for chunk in extra {
        if out.is_empty() {
            out.push_str(chunk);
        } else {
            out.push(' ');
            out.push_str(chunk);
        }
    }
    out
}

/// Deduplicate tokens, keeping the first occurrence of each.
pub fn unique_class_names(value: &str) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for token in value.split_whitespace() {
        if !seen.contains(&token) {
            seen.push(token);
        }
    }
    seen.join(" ")
}

/// Remove tokens from a class attribute value. Entries in `del` may
/// themselves be space-separated.
pub fn remove_class_names(value: &str, del: &[&str]) -> String {
    let mut doomed: Vec<&str> = Vec::new();
    for entry in del {
        doomed.extend(entry.split_whitespace());
    }
    value
        .split_whitespace()
        .filter(|token| !doomed.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

impl<B: Backend> super::Dom<B> {
    /// All class tokens on the node's element
    pub fn class_names(&self, node: NodeId) -> DomResult<Vec<String>> {
        let element = self.require_element(node)?;
        Ok(parse_class_names(&self.backend.class_name(element)))
    }

    pub fn has_class_name(&self, node: NodeId, class: &str) -> DomResult<bool> {
        Ok(self.class_names(node)?.iter().any(|token| token == class))
    }

    /// Overwrite the class attribute with the given tokens.
    pub fn set_class_names(&mut self, node: NodeId, classes: &[&str]) -> DomResult<()> {
        let element = self.require_element(node)?;
        self.backend.set_class_name(element, &classes.join(" "));
        Ok(())
    }

    /// Add tokens, deduplicating against what is already present.
    pub fn add_class_names(&mut self, node: NodeId, classes: &[&str]) -> DomResult<()> {
        let element = self.require_element(node)?;
        let merged = join_class_names(&self.backend.class_name(element), classes);
        self.backend
            .set_class_name(element, &unique_class_names(&merged));
        Ok(())
    }

    /// Remove tokens.
    pub fn del_class_names(&mut self, node: NodeId, classes: &[&str]) -> DomResult<()> {
        let element = self.require_element(node)?;
        let remaining = remove_class_names(&self.backend.class_name(element), classes);
        self.backend.set_class_name(element, &remaining);
        Ok(())
    }

    /// Add every token in `add` and remove every token in `del`, in one
    /// write.
    pub fn replace_class_names(
        &mut self,
        node: NodeId,
        del: &[&str],
        add: &[&str],
    ) -> DomResult<()> {
        let element = self.require_element(node)?;
        let merged = join_class_names(&self.backend.class_name(element), add);
        let result = remove_class_names(&merged, del);
        self.backend.set_class_name(element, &result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ElementOptions;
    use crate::headless::HeadlessBackend;
    use crate::Dom;

    #[test]
    fn test_parse_class_names() {
        assert_eq!(parse_class_names("btn active"), vec!["btn", "active"]);
        assert_eq!(parse_class_names("  btn  "), vec!["btn"]);
        assert!(parse_class_names("").is_empty());
    }

    #[test]
    fn test_join_class_names() {
        assert_eq!(join_class_names("", &["a", "b"]), "a b");
        assert_eq!(join_class_names("base", &["a b", "c"]), "base a b c");
    }

    #[test]
    fn test_unique_keeps_first_occurrence() {
        assert_eq!(unique_class_names("a b a c b"), "a b c");
    }

    #[test]
    fn test_remove_class_names_with_mixed_entries() {
        assert_eq!(remove_class_names("a b c d", &["b d", "x"]), "a c");
    }

    #[test]
    fn test_node_class_accessors() {
        let mut dom = Dom::new(HeadlessBackend::new());
        let node = dom
            .create(
                "div",
                ElementOptions {
                    class_name: Some("panel".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        dom.add_class_names(node, &["wide", "panel"]).unwrap();
        assert_eq!(dom.class_names(node).unwrap(), vec!["panel", "wide"]);

        dom.replace_class_names(node, &["panel"], &["tall"]).unwrap();
        assert_eq!(dom.class_names(node).unwrap(), vec!["wide", "tall"]);

        dom.del_class_names(node, &["wide tall"]).unwrap();
        assert!(dom.class_names(node).unwrap().is_empty());

        dom.set_class_names(node, &["fresh"]).unwrap();
        assert!(dom.has_class_name(node, "fresh").unwrap());
    }
}
