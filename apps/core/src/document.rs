use std::collections::BTreeSet;

use crate::model::{ContainerId, ElementId, TextSegment};
use crate::source::{HighlightSurface, TextSource};

/// A recorded write against the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    AddClass(ElementId, String),
    RemoveClass(ElementId, String),
    SetFlag(String, bool),
    Scroll(ElementId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Element(ElementId),
    Text(String),
}

#[derive(Debug, Clone)]
struct ElementNode {
    tag: String,
    classes: BTreeSet<String>,
    parent: Option<ElementId>,
    children: Vec<Node>,
}

/// In-memory element tree. Element ids stay stable; removed elements leave a hole.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    elements: Vec<Option<ElementNode>>,
    roots: Vec<ElementId>,
    flags: BTreeSet<String>,
    mutations: Vec<Mutation>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element under `parent`, or as a new root when `parent` is `None`.
    pub fn append_element(
        &mut self,
        parent: Option<ElementId>,
        tag: &str,
        classes: &[&str],
    ) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Some(ElementNode {
            tag: tag.to_ascii_lowercase(),
            classes: classes.iter().map(|class| class.to_string()).collect(),
            parent,
            children: Vec::new(),
        }));

        match parent.and_then(|parent| self.node_mut(parent)) {
            Some(node) => node.children.push(Node::Element(id)),
            None => self.roots.push(id),
        }
        id
    }

    /// Appends a text node to `parent`. Returns false when `parent` no longer exists.
    pub fn append_text(&mut self, parent: ElementId, text: &str) -> bool {
        match self.node_mut(parent) {
            Some(node) => {
                node.children.push(Node::Text(text.to_string()));
                true
            }
            None => false,
        }
    }

    /// Detaches `element` and its whole subtree.
    pub fn remove(&mut self, element: ElementId) -> bool {
        let Some(node) = self.elements.get_mut(element.0).and_then(Option::take) else {
            return false;
        };

        match node.parent.and_then(|parent| self.node_mut(parent)) {
            Some(parent) => parent
                .children
                .retain(|child| *child != Node::Element(element)),
            None => self.roots.retain(|root| *root != element),
        }

        for child in node.children {
            if let Node::Element(child) = child {
                self.remove_detached(child);
            }
        }
        true
    }

    fn remove_detached(&mut self, element: ElementId) {
        let Some(node) = self.elements.get_mut(element.0).and_then(Option::take) else {
            return;
        };
        for child in node.children {
            if let Node::Element(child) = child {
                self.remove_detached(child);
            }
        }
    }

    pub fn tag(&self, element: ElementId) -> Option<&str> {
        self.node(element).map(|node| node.tag.as_str())
    }

    pub fn classes(&self, element: ElementId) -> Vec<&str> {
        self.node(element)
            .map(|node| node.classes.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Concatenated text of `element`'s subtree.
    pub fn text_content(&self, element: ElementId) -> String {
        let mut out = String::new();
        self.collect_text(element, &mut out);
        out
    }

    fn collect_text(&self, element: ElementId, out: &mut String) {
        let Some(node) = self.node(element) else {
            return;
        };
        for child in &node.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(child) => self.collect_text(*child, out),
            }
        }
    }

    /// Live elements carrying `class`, in document order.
    pub fn elements_with_class(&self, class: &str) -> Vec<ElementId> {
        let mut found = Vec::new();
        for &root in &self.roots {
            self.walk(root, &mut |id: ElementId, node: &ElementNode| {
                if node.classes.contains(class) {
                    found.push(id);
                }
            });
        }
        found
    }

    pub fn flags(&self) -> Vec<&str> {
        self.flags.iter().map(String::as_str).collect()
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    /// How many times `class` was added to any element.
    pub fn class_additions(&self, class: &str) -> usize {
        self.mutations
            .iter()
            .filter(|mutation| matches!(mutation, Mutation::AddClass(_, added) if added == class))
            .count()
    }

    pub fn scrolled(&self) -> Vec<ElementId> {
        self.mutations
            .iter()
            .filter_map(|mutation| match mutation {
                Mutation::Scroll(element) => Some(*element),
                _ => None,
            })
            .collect()
    }

    fn walk(&self, id: ElementId, visit: &mut dyn FnMut(ElementId, &ElementNode)) {
        let Some(node) = self.node(id) else {
            return;
        };
        visit(id, node);
        for child in &node.children {
            if let Node::Element(child) = child {
                self.walk(*child, visit);
            }
        }
    }

    fn collect_segments<'a>(&'a self, id: ElementId, out: &mut Vec<TextSegment<'a>>) {
        let Some(node) = self.node(id) else {
            return;
        };
        for child in &node.children {
            match child {
                Node::Text(text) => out.push(TextSegment::new(id, &node.tag, text)),
                Node::Element(child) => self.collect_segments(*child, out),
            }
        }
    }

    fn node(&self, id: ElementId) -> Option<&ElementNode> {
        self.elements.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut ElementNode> {
        self.elements.get_mut(id.0).and_then(Option::as_mut)
    }
}

impl TextSource for MemoryDocument {
    fn searchable_containers(&self, container_class: &str) -> Vec<ContainerId> {
        self.elements_with_class(container_class)
            .into_iter()
            .map(ContainerId)
            .collect()
    }

    fn segments(&self, container: ContainerId) -> Vec<TextSegment<'_>> {
        let mut segments = Vec::new();
        self.collect_segments(container.element(), &mut segments);
        segments
    }
}

impl HighlightSurface for MemoryDocument {
    fn contains(&self, element: ElementId) -> bool {
        self.node(element).is_some()
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.node(element)
            .map(|node| node.classes.contains(class))
            .unwrap_or(false)
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        if let Some(node) = self.node_mut(element) {
            node.classes.insert(class.to_string());
            self.mutations
                .push(Mutation::AddClass(element, class.to_string()));
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        if let Some(node) = self.node_mut(element) {
            node.classes.remove(class);
            self.mutations
                .push(Mutation::RemoveClass(element, class.to_string()));
        }
    }

    fn set_flag(&mut self, flag: &str, on: bool) {
        let changed = if on {
            self.flags.insert(flag.to_string())
        } else {
            self.flags.remove(flag)
        };
        if changed {
            self.mutations.push(Mutation::SetFlag(flag.to_string(), on));
        }
    }

    fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    fn scroll_into_view(&mut self, element: ElementId) {
        if self.contains(element) {
            self.mutations.push(Mutation::Scroll(element));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryDocument, Mutation};
    use crate::model::ContainerId;
    use crate::source::{HighlightSurface, TextSource};

    fn sample() -> MemoryDocument {
        let mut doc = MemoryDocument::new();
        let list = doc.append_element(None, "div", &["messages"]);
        let first = doc.append_element(Some(list), "div", &["message-content"]);
        doc.append_text(first, "hello ");
        let bold = doc.append_element(Some(first), "b", &[]);
        doc.append_text(bold, "world");
        let second = doc.append_element(Some(list), "div", &["message-content"]);
        doc.append_text(second, "again");
        doc
    }

    #[test]
    fn containers_come_back_in_document_order() {
        let doc = sample();
        let containers = doc.searchable_containers("message-content");
        assert_eq!(containers.len(), 2);
        assert!(containers[0] < containers[1]);
    }

    #[test]
    fn segments_carry_their_parent_element() {
        let doc = sample();
        let first = doc.searchable_containers("message-content")[0];
        let segments = doc.segments(first);
        let texts: Vec<&str> = segments.iter().map(|segment| segment.text).collect();
        assert_eq!(texts, vec!["hello ", "world"]);
        assert_eq!(segments[1].tag, "b");
        assert_ne!(segments[0].element, segments[1].element);
    }

    #[test]
    fn removing_an_element_drops_its_subtree() {
        let mut doc = sample();
        let first = doc.searchable_containers("message-content")[0];
        let bold = doc.segments(first)[1].element;

        assert!(doc.remove(first.element()));
        assert!(!doc.contains(first.element()));
        assert!(!doc.contains(bold));
        assert!(doc.segments(ContainerId(bold)).is_empty());
        assert_eq!(doc.searchable_containers("message-content").len(), 1);
    }

    #[test]
    fn writes_to_missing_elements_are_ignored() {
        let mut doc = sample();
        let first = doc.searchable_containers("message-content")[0].element();
        doc.remove(first);
        doc.add_class(first, "js-search-highlighted");
        assert!(doc.mutations().is_empty());
    }

    #[test]
    fn flags_only_log_changes() {
        let mut doc = MemoryDocument::new();
        doc.set_flag("search-active-mode", true);
        doc.set_flag("search-active-mode", true);
        doc.set_flag("search-active-mode", false);
        assert_eq!(doc.mutations().len(), 2);
        assert!(!doc.has_flag("search-active-mode"));
    }

    #[test]
    fn class_writes_are_visible_and_drained_from_the_log() {
        let mut doc = MemoryDocument::new();
        let message = doc.append_element(None, "DIV", &["message-content"]);
        assert_eq!(doc.tag(message), Some("div"));

        doc.add_class(message, "js-search-highlighted");
        assert_eq!(
            doc.classes(message),
            vec!["js-search-highlighted", "message-content"]
        );
        assert_eq!(
            doc.take_mutations(),
            vec![Mutation::AddClass(message, "js-search-highlighted".into())]
        );
        assert!(doc.mutations().is_empty());

        doc.remove(message);
        assert_eq!(doc.tag(message), None);
        assert!(doc.classes(message).is_empty());
    }
}
