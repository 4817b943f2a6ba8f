//! In-memory document used by tests, fixtures and the replay driver.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Document, ElementId, SyntheticEvent};

/// Subtrees left out of `page_text`
const NON_CONTENT_TAGS: &[&str] = &["SCRIPT", "STYLE", "NAV", "HEADER", "FOOTER"];
const NON_CONTENT_CLASSES: &[&str] = &["ad", "advertisement"];

/// Declarative element description, also the JSON fixture format.
///
/// ```json
/// {"tag":"form","children":[{"tag":"input","attrs":{"type":"search","id":"q"}}]}
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: Option<String>,
    /// Not laid out (display: none)
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// A whole page: hostname plus the children of `<body>`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFixture {
    pub hostname: String,
    #[serde(default)]
    pub body: Vec<ElementSpec>,
}

/// Something the page observed, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DispatchRecord {
    Event {
        target: ElementId,
        event: SyntheticEvent,
    },
    Click {
        target: ElementId,
    },
    Submit {
        form: ElementId,
    },
}

#[derive(Debug, Clone)]
struct MemoryNode {
    tag: String,
    attrs: BTreeMap<String, String>,
    parent: Option<usize>,
    children: Vec<usize>,
    value: String,
    text: String,
    rendered: bool,
    attached: bool,
}

#[derive(Debug, Clone)]
pub struct MemoryDocument {
    hostname: String,
    nodes: Vec<MemoryNode>,
    log: Vec<DispatchRecord>,
    style_sheets: BTreeMap<String, String>,
}

impl MemoryDocument {
    /// Empty page with just a `<body>`
    pub fn new(hostname: impl Into<String>) -> Self {
        let body = MemoryNode {
            tag: "BODY".to_string(),
            attrs: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
            value: String::new(),
            text: String::new(),
            rendered: true,
            attached: true,
        };
        Self {
            hostname: hostname.into().to_ascii_lowercase(),
            nodes: vec![body],
            log: Vec::new(),
            style_sheets: BTreeMap::new(),
        }
    }

    pub fn from_fixture(fixture: &PageFixture) -> Self {
        let mut doc = Self::new(fixture.hostname.clone());
        let body = doc.body();
        for spec in &fixture.body {
            doc.append(body, spec);
        }
        doc
    }

    pub fn body(&self) -> ElementId {
        ElementId(0)
    }

    /// Append an element (and its children) under `parent`
    pub fn append(&mut self, parent: ElementId, spec: &ElementSpec) -> ElementId {
        let index = self.nodes.len();
        let parent_index = self.live_index(parent);
        let attrs: BTreeMap<String, String> = spec
            .attrs
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect();
        let value = spec
            .value
            .clone()
            .or_else(|| attrs.get("value").cloned())
            .unwrap_or_default();

        self.nodes.push(MemoryNode {
            tag: spec.tag.to_ascii_uppercase(),
            attrs,
            parent: parent_index,
            children: Vec::new(),
            value,
            text: spec.text.clone(),
            rendered: !spec.hidden,
            attached: parent_index.is_some(),
        });
        if let Some(p) = parent_index {
            self.nodes[p].children.push(index);
        }

        let id = ElementId(index as u64);
        for child in &spec.children {
            self.append(id, child);
        }
        id
    }

    /// Detach an element and its subtree. Its handle stays dangling.
    pub fn remove(&mut self, el: ElementId) {
        let Some(index) = self.live_index(el) else {
            return;
        };
        if index == 0 {
            return;
        }
        if let Some(parent) = self.nodes[index].parent {
            self.nodes[parent].children.retain(|&c| c != index);
        }
        self.detach_subtree(index);
    }

    fn detach_subtree(&mut self, index: usize) {
        self.nodes[index].attached = false;
        let children = self.nodes[index].children.clone();
        for child in children {
            self.detach_subtree(child);
        }
    }

    pub fn set_rendered(&mut self, el: ElementId, rendered: bool) {
        if let Some(index) = self.live_index(el) {
            self.nodes[index].rendered = rendered;
        }
    }

    pub fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) {
        if let Some(index) = self.live_index(el) {
            self.nodes[index]
                .attrs
                .insert(name.to_ascii_lowercase(), value.to_string());
        }
    }

    pub fn remove_attribute(&mut self, el: ElementId, name: &str) {
        if let Some(index) = self.live_index(el) {
            self.nodes[index].attrs.remove(&name.to_ascii_lowercase());
        }
    }

    /// First attached element with the given `id` attribute
    pub fn find_by_id(&self, id: &str) -> Option<ElementId> {
        self.elements()
            .into_iter()
            .find(|&el| self.attribute(el, "id") == Some(id))
    }

    /// Everything dispatched, clicked or submitted so far
    pub fn dispatched(&self) -> &[DispatchRecord] {
        &self.log
    }

    /// Synthetic events dispatched on one element, in order
    pub fn events_for(&self, el: ElementId) -> Vec<SyntheticEvent> {
        self.log
            .iter()
            .filter_map(|r| match r {
                DispatchRecord::Event { target, event } if *target == el => Some(*event),
                _ => None,
            })
            .collect()
    }

    pub fn clear_dispatched(&mut self) {
        self.log.clear();
    }

    pub fn style_sheet(&self, sheet_id: &str) -> Option<&str> {
        self.style_sheets.get(sheet_id).map(String::as_str)
    }

    fn live_index(&self, el: ElementId) -> Option<usize> {
        let index = usize::try_from(el.0).ok()?;
        self.nodes
            .get(index)
            .filter(|node| node.attached)
            .map(|_| index)
    }

    fn node(&self, el: ElementId) -> Option<&MemoryNode> {
        self.live_index(el).map(|i| &self.nodes[i])
    }

    fn collect_preorder(&self, index: usize, out: &mut Vec<ElementId>) {
        out.push(ElementId(index as u64));
        for &child in &self.nodes[index].children {
            self.collect_preorder(child, out);
        }
    }

    fn collect_text(&self, index: usize, out: &mut String) {
        let node = &self.nodes[index];
        out.push_str(&node.text);
        for &child in &node.children {
            out.push(' ');
            self.collect_text(child, out);
        }
    }

    fn collect_content_text(&self, index: usize, out: &mut String) {
        let node = &self.nodes[index];
        if NON_CONTENT_TAGS.contains(&node.tag.as_str()) {
            return;
        }
        let is_ad = node.attrs.get("class").is_some_and(|classes| {
            classes
                .split_whitespace()
                .any(|c| NON_CONTENT_CLASSES.contains(&c))
        });
        if is_ad {
            return;
        }
        out.push(' ');
        out.push_str(&node.text);
        for &child in &node.children {
            self.collect_content_text(child, out);
        }
    }
}

impl Document for MemoryDocument {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn elements(&self) -> Vec<ElementId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.collect_preorder(0, &mut out);
        out
    }

    fn tag_name(&self, el: ElementId) -> Option<&str> {
        self.node(el).map(|n| n.tag.as_str())
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<&str> {
        self.node(el)?
            .attrs
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.node(el)?.parent.map(|p| ElementId(p as u64))
    }

    fn is_content_editable(&self, el: ElementId) -> bool {
        let mut current = self.live_index(el);
        while let Some(index) = current {
            let node = &self.nodes[index];
            match node.attrs.get("contenteditable").map(|v| v.to_ascii_lowercase()) {
                Some(v) if v.is_empty() || v == "true" || v == "plaintext-only" => return true,
                Some(v) if v == "false" => return false,
                _ => current = node.parent,
            }
        }
        false
    }

    fn is_rendered(&self, el: ElementId) -> bool {
        let mut current = self.live_index(el);
        if current.is_none() {
            return false;
        }
        while let Some(index) = current {
            let node = &self.nodes[index];
            if !node.rendered || node.attrs.contains_key("hidden") {
                return false;
            }
            current = node.parent;
        }
        true
    }

    fn value(&self, el: ElementId) -> Option<String> {
        self.node(el).map(|n| n.value.clone())
    }

    fn text_content(&self, el: ElementId) -> Option<String> {
        let index = self.live_index(el)?;
        let mut out = String::new();
        self.collect_text(index, &mut out);
        Some(out.trim().to_string())
    }

    fn set_value(&mut self, el: ElementId, value: &str) -> bool {
        match self.live_index(el) {
            Some(index) => {
                self.nodes[index].value = value.to_string();
                true
            }
            None => false,
        }
    }

    fn set_text_content(&mut self, el: ElementId, text: &str) -> bool {
        let Some(index) = self.live_index(el) else {
            return false;
        };
        let children = std::mem::take(&mut self.nodes[index].children);
        for child in children {
            self.detach_subtree(child);
        }
        self.nodes[index].text = text.to_string();
        true
    }

    fn dispatch(&mut self, el: ElementId, event: SyntheticEvent) -> bool {
        if !self.is_attached(el) {
            return false;
        }
        self.log.push(DispatchRecord::Event { target: el, event });
        true
    }

    fn click(&mut self, el: ElementId) -> bool {
        if !self.is_attached(el) {
            return false;
        }
        self.log.push(DispatchRecord::Click { target: el });
        true
    }

    fn submit(&mut self, form: ElementId) -> bool {
        if !self.has_tag(form, "form") {
            return false;
        }
        self.log.push(DispatchRecord::Submit { form });
        true
    }

    fn page_text(&self) -> String {
        let mut raw = String::new();
        self.collect_content_text(0, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn install_style_sheet(&mut self, sheet_id: &str, css: &str) {
        self.style_sheets
            .insert(sheet_id.to_string(), css.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (MemoryDocument, ElementId, ElementId) {
        let mut doc = MemoryDocument::new("Example.COM");
        let body = doc.body();
        let form = doc.append(
            body,
            &ElementSpec::new("form").child(ElementSpec::new("input").attr("id", "q").value("rust")),
        );
        let input = doc.find_by_id("q").unwrap();
        (doc, form, input)
    }

    #[test]
    fn hostname_is_lowercased() {
        let (doc, _, _) = sample();
        assert_eq!(doc.hostname(), "example.com");
    }

    #[test]
    fn closest_form_walks_ancestors() {
        let (doc, form, input) = sample();
        assert_eq!(doc.closest_form(input), Some(form));
        assert!(doc.contains(form, input));
        assert!(!doc.contains(input, form));
    }

    #[test]
    fn removed_elements_become_inert() {
        let (mut doc, form, input) = sample();
        doc.remove(form);
        assert!(!doc.is_attached(input));
        assert!(!doc.set_value(input, "x"));
        assert!(!doc.dispatch(input, SyntheticEvent::Input));
        assert!(doc.find_by_id("q").is_none());
    }

    #[test]
    fn hidden_ancestor_hides_descendants() {
        let (mut doc, form, input) = sample();
        assert!(doc.is_rendered(input));
        doc.set_rendered(form, false);
        assert!(!doc.is_rendered(input));
    }

    #[test]
    fn content_editable_is_inherited_until_false() {
        let mut doc = MemoryDocument::new("example.com");
        let body = doc.body();
        let host = doc.append(
            body,
            &ElementSpec::new("div")
                .attr("contenteditable", "true")
                .child(ElementSpec::new("p").attr("id", "inner"))
                .child(ElementSpec::new("span").attr("contenteditable", "false").attr("id", "off")),
        );
        assert!(doc.is_content_editable(host));
        assert!(doc.is_content_editable(doc.find_by_id("inner").unwrap()));
        assert!(!doc.is_content_editable(doc.find_by_id("off").unwrap()));
        assert!(!doc.is_content_editable(body));
    }

    #[test]
    fn removing_disabled_makes_input_usable_again() {
        let mut doc = MemoryDocument::new("example.com");
        let body = doc.body();
        let q = doc.append(body, &ElementSpec::new("input").attr("id", "q").attr("disabled", ""));
        assert!(doc.is_disabled(q));

        doc.remove_attribute(q, "DISABLED");
        assert!(!doc.is_disabled(q));
        doc.set_attribute(q, "readonly", "");
        assert!(doc.is_read_only(q));
    }

    #[test]
    fn page_text_skips_chrome_and_ads() {
        let fixture = PageFixture {
            hostname: "news.example".into(),
            body: vec![
                ElementSpec::new("header").text("Site Header"),
                ElementSpec::new("p").text("Hello   big\n world"),
                ElementSpec::new("div").attr("class", "banner ad").text("Buy now"),
                ElementSpec::new("script").text("var x = 1;"),
                ElementSpec::new("footer").text("Footer"),
            ],
        };
        let doc = MemoryDocument::from_fixture(&fixture);
        assert_eq!(doc.page_text(), "Hello big world");
    }

    #[test]
    fn set_text_content_replaces_children() {
        let mut doc = MemoryDocument::new("example.com");
        let body = doc.body();
        let div = doc.append(
            body,
            &ElementSpec::new("div").child(ElementSpec::new("b").text("old")),
        );
        assert_eq!(doc.text_content(div).as_deref(), Some("old"));
        doc.set_text_content(div, "new");
        assert_eq!(doc.text_content(div).as_deref(), Some("new"));
    }

    #[test]
    fn fixture_deserializes_from_json() {
        let json = r#"{"hostname":"example.com","body":[{"tag":"input","attrs":{"type":"search","id":"q","value":"hi"}}]}"#;
        let fixture: PageFixture = serde_json::from_str(json).unwrap();
        let doc = MemoryDocument::from_fixture(&fixture);
        let q = doc.find_by_id("q").unwrap();
        assert_eq!(doc.value(q).as_deref(), Some("hi"));
        assert_eq!(doc.input_type(q), "search");
    }
}
