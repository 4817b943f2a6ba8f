//! Page access seam.
//!
//! The agent and the resolver never touch a concrete DOM. They go through
//! the `Document` trait, which a browser binding or the in-memory
//! `MemoryDocument` implements. Element handles are weak: once an element
//! has left the document every query returns `None`/`false` and every
//! mutation is a no-op.

mod memory;

pub use memory::{DispatchRecord, ElementSpec, MemoryDocument, PageFixture};

use serde::{Deserialize, Serialize};

/// Opaque handle to an element of one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

/// `<input type=..>` values that never take free text
const NON_TEXT_INPUT_TYPES: &[&str] = &[
    "button", "checkbox", "color", "file", "hidden", "image", "radio", "range", "reset",
    "submit",
];

/// Synthetic events the agent dispatches on page elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyntheticEvent {
    /// Bubbling `input` event after a programmatic value change
    Input,
    /// Enter key, one phase of the down/press/up triplet
    EnterKey(KeyPhase),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyPhase {
    Down,
    Press,
    Up,
}

impl KeyPhase {
    pub const TRIPLET: [KeyPhase; 3] = [KeyPhase::Down, KeyPhase::Press, KeyPhase::Up];
}

/// Read and write access to one page.
pub trait Document {
    /// Hostname of the page URL
    fn hostname(&self) -> &str;

    /// Attached elements in document order
    fn elements(&self) -> Vec<ElementId>;

    /// Upper-case tag name, `None` once the element is gone
    fn tag_name(&self, el: ElementId) -> Option<&str>;

    /// Attribute value by (case-insensitive) name
    fn attribute(&self, el: ElementId, name: &str) -> Option<&str>;

    fn parent(&self, el: ElementId) -> Option<ElementId>;

    /// Editing host or inside one
    fn is_content_editable(&self, el: ElementId) -> bool;

    /// Laid out and not hidden (has an offset parent)
    fn is_rendered(&self, el: ElementId) -> bool;

    /// Current `value` of a form control
    fn value(&self, el: ElementId) -> Option<String>;

    fn text_content(&self, el: ElementId) -> Option<String>;

    fn set_value(&mut self, el: ElementId, value: &str) -> bool;

    fn set_text_content(&mut self, el: ElementId, text: &str) -> bool;

    fn dispatch(&mut self, el: ElementId, event: SyntheticEvent) -> bool;

    fn click(&mut self, el: ElementId) -> bool;

    /// Submit a form element
    fn submit(&mut self, form: ElementId) -> bool;

    /// Visible text of the page body, without script/style/navigation
    /// chrome and advertisement blocks, whitespace collapsed.
    fn page_text(&self) -> String;

    /// Install (or replace) the style sheet with the given identifier
    fn install_style_sheet(&mut self, sheet_id: &str, css: &str);

    // ------------------------------------------------------------------
    // Derived queries
    // ------------------------------------------------------------------

    fn is_attached(&self, el: ElementId) -> bool {
        self.tag_name(el).is_some()
    }

    fn has_tag(&self, el: ElementId, tag: &str) -> bool {
        self.tag_name(el)
            .is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    fn has_attribute(&self, el: ElementId, name: &str) -> bool {
        self.attribute(el, name).is_some()
    }

    fn is_disabled(&self, el: ElementId) -> bool {
        self.has_attribute(el, "disabled")
    }

    fn is_read_only(&self, el: ElementId) -> bool {
        self.has_attribute(el, "readonly")
    }

    /// `type` attribute of an input, lower-cased, "text" when absent
    fn input_type(&self, el: ElementId) -> String {
        self.attribute(el, "type")
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "text".to_string())
    }

    /// An `<input>` that takes free text
    fn is_text_input(&self, el: ElementId) -> bool {
        self.has_tag(el, "input") && !NON_TEXT_INPUT_TYPES.contains(&self.input_type(el).as_str())
    }

    /// Text input, text area or content-editable region
    fn is_editable(&self, el: ElementId) -> bool {
        self.is_text_input(el) || self.has_tag(el, "textarea") || self.is_content_editable(el)
    }

    /// `node` is `ancestor` or one of its descendants
    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(el) = current {
            if el == ancestor {
                return true;
            }
            current = self.parent(el);
        }
        false
    }

    /// Nearest inclusive ancestor with the given tag
    fn closest_tag(&self, el: ElementId, tag: &str) -> Option<ElementId> {
        let mut current = Some(el);
        while let Some(candidate) = current {
            if self.has_tag(candidate, tag) {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    fn closest_form(&self, el: ElementId) -> Option<ElementId> {
        self.closest_tag(el, "form")
    }

    /// What the surrogate editor should show for this element
    fn editable_text(&self, el: ElementId) -> String {
        if self.is_content_editable(el) {
            self.text_content(el).unwrap_or_default()
        } else {
            self.value(el).unwrap_or_default()
        }
    }

    /// Write text back the way the element stores it
    fn write_editable_text(&mut self, el: ElementId, text: &str) -> bool {
        if self.is_content_editable(el) {
            self.set_text_content(el, text)
        } else {
            self.set_value(el, text)
        }
    }
}
