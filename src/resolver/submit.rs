//! Submit-side heuristics used by the Enter-commit policy.

use super::{attr_contains, attr_is};
use crate::dom::{Document, ElementId};

/// One heuristic for a clickable control
pub struct ButtonRule {
    pub name: &'static str,
    pub matches: fn(&dyn Document, ElementId) -> bool,
}

/// Dedicated send control of a chat composer, highest priority first
pub const SEND_BUTTON_RULES: &[ButtonRule] = &[
    ButtonRule {
        name: "button-testid-send",
        matches: button_testid_send,
    },
    ButtonRule {
        name: "button-aria-label-send",
        matches: button_aria_label_send,
    },
    ButtonRule {
        name: "button-title-send",
        matches: button_title_send,
    },
];

/// Generic submit or search trigger, highest priority first
pub const SUBMIT_BUTTON_RULES: &[ButtonRule] = &[
    ButtonRule {
        name: "input-type-submit",
        matches: input_type_submit,
    },
    ButtonRule {
        name: "button-type-submit",
        matches: button_type_submit,
    },
    ButtonRule {
        name: "aria-label-search",
        matches: aria_label_search,
    },
    ButtonRule {
        name: "title-search",
        matches: title_search,
    },
    ButtonRule {
        name: "button-class-search",
        matches: button_class_search,
    },
    ButtonRule {
        name: "input-class-search",
        matches: input_class_search,
    },
];

fn button_testid_send(doc: &dyn Document, el: ElementId) -> bool {
    doc.has_tag(el, "button") && attr_is(doc, el, "data-testid", "send-button")
}

fn button_aria_label_send(doc: &dyn Document, el: ElementId) -> bool {
    doc.has_tag(el, "button") && attr_contains(doc, el, "aria-label", "send")
}

fn button_title_send(doc: &dyn Document, el: ElementId) -> bool {
    doc.has_tag(el, "button") && attr_contains(doc, el, "title", "send")
}

fn input_type_submit(doc: &dyn Document, el: ElementId) -> bool {
    doc.has_tag(el, "input") && attr_is(doc, el, "type", "submit")
}

fn button_type_submit(doc: &dyn Document, el: ElementId) -> bool {
    doc.has_tag(el, "button") && attr_is(doc, el, "type", "submit")
}

fn aria_label_search(doc: &dyn Document, el: ElementId) -> bool {
    attr_contains(doc, el, "aria-label", "search")
}

fn title_search(doc: &dyn Document, el: ElementId) -> bool {
    attr_contains(doc, el, "title", "search")
}

fn button_class_search(doc: &dyn Document, el: ElementId) -> bool {
    doc.has_tag(el, "button") && attr_contains(doc, el, "class", "search")
}

/// Only button-like inputs; a text field with a search class is not a trigger
fn input_class_search(doc: &dyn Document, el: ElementId) -> bool {
    doc.has_tag(el, "input")
        && attr_contains(doc, el, "class", "search")
        && matches!(doc.input_type(el).as_str(), "submit" | "button" | "image")
}

/// First enabled control matching the rules, never the field itself
fn find_button(rules: &[ButtonRule], doc: &dyn Document, field: ElementId) -> Option<ElementId> {
    let elements = doc.elements();
    rules.iter().find_map(|rule| {
        elements.iter().copied().find(|&el| {
            !doc.contains(field, el) && !doc.is_disabled(el) && (rule.matches)(doc, el)
        })
    })
}

pub fn find_send_button(doc: &dyn Document, field: ElementId) -> Option<ElementId> {
    find_button(SEND_BUTTON_RULES, doc, field)
}

pub fn find_submit_button(doc: &dyn Document, field: ElementId) -> Option<ElementId> {
    find_button(SUBMIT_BUTTON_RULES, doc, field)
}

/// Page belongs to one of the known chat applications (exact host or subdomain)
pub fn is_chat_host(hostname: &str, chat_hosts: &[String]) -> bool {
    let hostname = hostname.to_ascii_lowercase();
    chat_hosts.iter().any(|host| {
        let host = host.to_ascii_lowercase();
        hostname == host || hostname.ends_with(&format!(".{}", host))
    })
}

/// Attributes suggest the field is a search input
pub fn looks_like_search_field(doc: &dyn Document, el: ElementId) -> bool {
    attr_is(doc, el, "type", "search")
        || attr_is(doc, el, "role", "searchbox")
        || ["name", "id", "class", "placeholder"]
            .into_iter()
            .any(|attr| attr_contains(doc, el, attr, "search"))
}
