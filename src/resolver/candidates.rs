//! Candidate search box detection.
//!
//! Runs on every DOM mutation, so it is a single read-only pass per rule
//! over the element list.

use super::{attr_contains, attr_is};
use crate::dom::{Document, ElementId};

/// One heuristic in the priority list
pub struct CandidateRule {
    pub name: &'static str,
    pub matches: fn(&dyn Document, ElementId) -> bool,
}

/// Highest priority first
pub const CANDIDATE_RULES: &[CandidateRule] = &[
    CandidateRule {
        name: "input-type-search",
        matches: input_type_search,
    },
    CandidateRule {
        name: "input-role-search",
        matches: input_role_search,
    },
    CandidateRule {
        name: "input-aria-label-search",
        matches: input_aria_label_search,
    },
    CandidateRule {
        name: "input-placeholder-search",
        matches: input_placeholder_search,
    },
    CandidateRule {
        name: "input-id-search",
        matches: input_id_search,
    },
    CandidateRule {
        name: "input-class-search",
        matches: input_class_search,
    },
    CandidateRule {
        name: "input-plain-text",
        matches: input_plain_text,
    },
    CandidateRule {
        name: "textarea-placeholder-search",
        matches: textarea_placeholder_search,
    },
    CandidateRule {
        name: "role-searchbox",
        matches: role_searchbox,
    },
];

fn input_type_search(doc: &dyn Document, el: ElementId) -> bool {
    doc.has_tag(el, "input") && attr_is(doc, el, "type", "search")
}

fn input_role_search(doc: &dyn Document, el: ElementId) -> bool {
    doc.has_tag(el, "input") && attr_contains(doc, el, "role", "search")
}

fn input_aria_label_search(doc: &dyn Document, el: ElementId) -> bool {
    doc.has_tag(el, "input") && attr_contains(doc, el, "aria-label", "search")
}

fn input_placeholder_search(doc: &dyn Document, el: ElementId) -> bool {
    doc.has_tag(el, "input") && attr_contains(doc, el, "placeholder", "search")
}

fn input_id_search(doc: &dyn Document, el: ElementId) -> bool {
    doc.has_tag(el, "input") && attr_contains(doc, el, "id", "search")
}

fn input_class_search(doc: &dyn Document, el: ElementId) -> bool {
    doc.has_tag(el, "input") && attr_contains(doc, el, "class", "search")
}

fn input_plain_text(doc: &dyn Document, el: ElementId) -> bool {
    doc.has_tag(el, "input") && doc.input_type(el) == "text"
}

fn textarea_placeholder_search(doc: &dyn Document, el: ElementId) -> bool {
    doc.has_tag(el, "textarea") && attr_contains(doc, el, "placeholder", "search")
}

fn role_searchbox(doc: &dyn Document, el: ElementId) -> bool {
    attr_is(doc, el, "role", "searchbox")
}

/// Visible, enabled and writable
fn is_usable(doc: &dyn Document, el: ElementId) -> bool {
    doc.is_rendered(el) && !doc.is_disabled(el) && !doc.is_read_only(el)
}

/// Best candidate together with the name of the rule that picked it
pub fn find_best_candidate_with_rule(doc: &dyn Document) -> Option<(ElementId, &'static str)> {
    let elements = doc.elements();
    CANDIDATE_RULES.iter().find_map(|rule| {
        elements
            .iter()
            .copied()
            .find(|&el| (rule.matches)(doc, el) && is_usable(doc, el))
            .map(|el| (el, rule.name))
    })
}

/// The page's primary search input, if any rule matches a usable element
pub fn find_best_candidate(doc: &dyn Document) -> Option<ElementId> {
    find_best_candidate_with_rule(doc).map(|(el, _)| el)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, MemoryDocument};

    fn page(children: Vec<ElementSpec>) -> MemoryDocument {
        let mut doc = MemoryDocument::new("example.com");
        let body = doc.body();
        for child in &children {
            doc.append(body, child);
        }
        doc
    }

    #[test]
    fn explicit_search_type_wins_over_earlier_text_input() {
        let doc = page(vec![
            ElementSpec::new("input").attr("id", "name"),
            ElementSpec::new("input").attr("type", "search").attr("id", "q"),
        ]);
        let (el, rule) = find_best_candidate_with_rule(&doc).unwrap();
        assert_eq!(Some(el), doc.find_by_id("q"));
        assert_eq!(rule, "input-type-search");
    }

    #[test]
    fn hidden_disabled_and_readonly_matches_are_skipped() {
        let doc = page(vec![
            ElementSpec::new("input").attr("type", "search").hidden(),
            ElementSpec::new("input").attr("type", "search").attr("disabled", ""),
            ElementSpec::new("input")
                .attr("placeholder", "Search docs")
                .attr("readonly", ""),
            ElementSpec::new("input").attr("aria-label", "SEARCH").attr("id", "ok"),
        ]);
        assert_eq!(find_best_candidate(&doc), doc.find_by_id("ok"));
    }

    #[test]
    fn falls_back_to_plain_text_input() {
        let doc = page(vec![
            ElementSpec::new("input").attr("type", "checkbox"),
            ElementSpec::new("input").attr("type", "email"),
            ElementSpec::new("input").attr("id", "plain"),
        ]);
        assert_eq!(find_best_candidate(&doc), doc.find_by_id("plain"));
    }

    #[test]
    fn search_textarea_then_searchbox_role() {
        let doc = page(vec![
            ElementSpec::new("div").attr("role", "searchbox").attr("id", "box"),
            ElementSpec::new("textarea")
                .attr("placeholder", "Search anything")
                .attr("id", "area"),
        ]);
        assert_eq!(find_best_candidate(&doc), doc.find_by_id("area"));

        let doc = page(vec![ElementSpec::new("div")
            .attr("role", "searchbox")
            .attr("id", "box")]);
        assert_eq!(find_best_candidate(&doc), doc.find_by_id("box"));
    }

    #[test]
    fn no_match_returns_none() {
        let doc = page(vec![
            ElementSpec::new("textarea").attr("placeholder", "Comment"),
            ElementSpec::new("button").text("Go"),
        ]);
        assert_eq!(find_best_candidate(&doc), None);
    }

    #[test]
    fn repeated_calls_are_deterministic_and_read_only() {
        let doc = page(vec![
            ElementSpec::new("input").attr("class", "site-search"),
            ElementSpec::new("input").attr("id", "search-2"),
        ]);
        let first = find_best_candidate(&doc);
        for _ in 0..10 {
            assert_eq!(find_best_candidate(&doc), first);
        }
        assert_eq!(first, doc.find_by_id("search-2"));
        assert!(doc.dispatched().is_empty());
    }
}
