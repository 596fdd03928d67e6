//! In-memory document model the controller operates on.
//!
//! A [`Page`] is an arena of elements rooted at a `body` node. Elements carry
//! an optional unique id, classes, attributes, inline style and their own
//! text. Lookups return `Option` so callers decide what a missing element
//! means. A [`NodeId`] only resolves on the page that issued it; on any other
//! page it behaves like an element that is not there.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PAGE: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    page: u64,
    index: usize,
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            text: String::new(),
            parent,
            children: Vec::new(),
        }
    }
}

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta"];

#[derive(Debug, Clone)]
pub struct Page {
    id: u64,
    nodes: Vec<Element>,
    ids: HashMap<String, NodeId>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    pub fn new() -> Self {
        Self {
            id: NEXT_PAGE.fetch_add(1, Ordering::Relaxed),
            nodes: vec![Element::new("body", None)],
            ids: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.node_id(0)
    }

    /// True when `node` was issued by this page.
    pub fn owns(&self, node: NodeId) -> bool {
        node.page == self.id && node.index < self.nodes.len()
    }

    /// Appends a new element under `parent` and returns a builder for it.
    /// A `parent` from another page leaves the element detached.
    pub fn append(&mut self, parent: NodeId, tag: &str) -> ElementBuilder<'_> {
        let node = self.node_id(self.nodes.len());
        let parent = self.owns(parent).then_some(parent);
        self.nodes.push(Element::new(tag, parent));
        if let Some(element) = parent.and_then(|parent| self.node_mut(parent)) {
            element.children.push(node);
        }
        ElementBuilder { page: self, node }
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// First element carrying `class`, in document order.
    pub fn query_selector_class(&self, class: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|node| self.has_class(*node, class))
    }

    /// Every `tag` element that has an ancestor carrying `ancestor_class`,
    /// in document order.
    pub fn select_within_class(&self, ancestor_class: &str, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|node| self.node(*node).is_some_and(|element| element.tag == tag))
            .filter(|node| {
                let mut current = self.parent(*node);
                while let Some(ancestor) = current {
                    if self.has_class(ancestor, ancestor_class) {
                        return true;
                    }
                    current = self.parent(ancestor);
                }
                false
            })
            .collect()
    }

    /// True when `node` is `ancestor` or sits somewhere below it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.owns(ancestor) || !self.owns(node) {
            return false;
        }
        let mut current = Some(node);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.parent(candidate);
        }
        false
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)?.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.node_mut(node) {
            element
                .attributes
                .insert(name.to_string(), value.to_string());
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node)
            .is_some_and(|element| element.classes.iter().any(|c| c == class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        if let Some(element) = self.node_mut(node) {
            element.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.node_mut(node) {
            element.classes.retain(|c| c != class);
        }
    }

    /// Returns whether the class is present afterwards.
    pub fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            true
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.node(node)?.style.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(element) = self.node_mut(node) {
            element
                .style
                .insert(property.to_string(), value.to_string());
        }
    }

    /// Text of the element followed by the text of its descendants.
    pub fn inner_text(&self, node: NodeId) -> String {
        self.descendants(node)
            .into_iter()
            .filter_map(|descendant| self.node(descendant))
            .map(|element| element.text.as_str())
            .collect()
    }

    /// Replaces the element's content with plain text, detaching its children.
    pub fn set_inner_text(&mut self, node: NodeId, text: &str) {
        let Some(element) = self.node_mut(node) else {
            return;
        };
        element.text = text.to_string();
        let detached = std::mem::take(&mut element.children);
        for child in detached {
            for removed in self.descendants(child) {
                let Some(element) = self.node_mut(removed) else {
                    continue;
                };
                element.parent = None;
                if let Some(id) = element.id.take() {
                    if self.ids.get(&id) == Some(&removed) {
                        self.ids.remove(&id);
                    }
                }
            }
        }
    }

    /// Serializes everything below the root.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in self.children(self.root()) {
            self.write_element(&mut out, child);
        }
        out
    }

    fn write_element(&self, out: &mut String, node: NodeId) {
        let Some(element) = self.node(node) else {
            return;
        };
        let _ = write!(out, "<{}", element.tag);
        if let Some(id) = &element.id {
            let _ = write!(out, " id=\"{}\"", escape(id));
        }
        if !element.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&element.classes.join(" ")));
        }
        for (name, value) in &element.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        if !element.style.is_empty() {
            let style = element
                .style
                .iter()
                .map(|(property, value)| format!("{property}: {value}"))
                .collect::<Vec<_>>()
                .join("; ");
            let _ = write!(out, " style=\"{}\"", escape(&style));
        }
        out.push('>');
        if VOID_TAGS.contains(&element.tag.as_str()) {
            return;
        }
        out.push_str(&escape(&element.text));
        for child in &element.children {
            self.write_element(out, *child);
        }
        let _ = write!(out, "</{}>", element.tag);
    }

    /// `node` and everything below it, in document order. Empty for a
    /// node this page does not own.
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.owns(node) {
            return out;
        }
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).into_iter().rev());
        }
        out
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|element| element.children.clone())
            .unwrap_or_default()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    fn node_id(&self, index: usize) -> NodeId {
        NodeId {
            page: self.id,
            index,
        }
    }

    fn node(&self, node: NodeId) -> Option<&Element> {
        if node.page != self.id {
            return None;
        }
        self.nodes.get(node.index)
    }

    fn node_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        if node.page != self.id {
            return None;
        }
        self.nodes.get_mut(node.index)
    }
}

pub struct ElementBuilder<'a> {
    page: &'a mut Page,
    node: NodeId,
}

impl ElementBuilder<'_> {
    /// Registers a document-unique id. A later element with the same id
    /// takes over the lookup.
    pub fn id(self, id: &str) -> Self {
        if let Some(element) = self.page.node_mut(self.node) {
            element.id = Some(id.to_string());
            self.page.ids.insert(id.to_string(), self.node);
        }
        self
    }

    pub fn class(self, class: &str) -> Self {
        self.page.add_class(self.node, class);
        self
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        self.page.set_attribute(self.node, name, value);
        self
    }

    pub fn style(self, property: &str, value: &str) -> Self {
        self.page.set_style(self.node, property, value);
        self
    }

    pub fn text(self, text: &str) -> Self {
        if let Some(element) = self.page.node_mut(self.node) {
            element.text = text.to_string();
        }
        self
    }

    pub fn node(self) -> NodeId {
        self.node
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Page, NodeId, NodeId, NodeId) {
        let mut page = Page::new();
        let root = page.root();
        let row = page.append(root, "li").class("task").node();
        let text = page.append(row, "span").id("task_1").text("Buy milk").node();
        let due = page.append(row, "div").class("due_date").text("Due: ").node();
        let date = page.append(due, "span").id("due_date_1").text("2026-10-18").node();
        (page, row, text, date)
    }

    #[test]
    fn contains_is_inclusive_and_follows_parents() {
        let (page, row, text, date) = sample();
        assert!(page.contains(text, text));
        assert!(page.contains(row, date));
        assert!(!page.contains(text, date));
        assert!(!page.contains(date, row));
    }

    #[test]
    fn select_within_class_matches_descendant_spans_only() {
        let (page, _, _, date) = sample();
        assert_eq!(page.select_within_class("due_date", "span"), vec![date]);
    }

    #[test]
    fn inner_text_concatenates_in_document_order() {
        let (page, row, _, _) = sample();
        assert_eq!(page.inner_text(row), "Buy milkDue: 2026-10-18");
    }

    #[test]
    fn set_inner_text_drops_detached_ids() {
        let (mut page, row, _, _) = sample();
        page.set_inner_text(row, "gone");
        assert_eq!(page.get_element_by_id("task_1"), None);
        assert_eq!(page.get_element_by_id("due_date_1"), None);
        assert_eq!(page.inner_text(row), "gone");
    }

    #[test]
    fn nodes_from_another_page_do_not_resolve() {
        let (mut page, row, text, _) = sample();
        let mut other = Page::new();
        let other_root = other.root();
        let mut stranger = other_root;
        for _ in 0..5 {
            stranger = other.append(other_root, "span").attr("data-task-id", "1").node();
        }

        assert!(!page.owns(stranger));
        assert!(!other.owns(text));
        assert_eq!(page.attribute(stranger, "data-task-id"), None);
        assert!(!page.contains(row, stranger));
        assert_eq!(page.inner_text(stranger), "");

        page.set_style(stranger, "display", "none");
        page.add_class(stranger, "line-through");
        page.set_inner_text(stranger, "ignored");
        assert_eq!(page.inner_text(row), "Buy milkDue: 2026-10-18");

        let detached = page.append(stranger, "p").text("loose").node();
        assert!(page.owns(detached));
        assert!(!page.to_html().contains("loose"));
    }

    #[test]
    fn to_html_escapes_and_renders_style() {
        let mut page = Page::new();
        let root = page.root();
        page.append(root, "button")
            .id("save_button_2")
            .attr("data-task-id", "2")
            .style("display", "none")
            .text("<Save>");
        page.append(root, "input").attr("name", "task");
        assert_eq!(
            page.to_html(),
            "<button id=\"save_button_2\" data-task-id=\"2\" style=\"display: none\">&lt;Save&gt;</button><input name=\"task\">"
        );
    }
}
