//! Heuristic page matching: the page's main search box, and the controls
//! an Enter press should trigger.
//!
//! Both are ordered rule lists evaluated first-match-wins. The lists are
//! plain data, so a new heuristic is one more entry, not new control flow.
//! Nothing here mutates the document.

mod candidates;
mod submit;

pub use candidates::{find_best_candidate, find_best_candidate_with_rule, CandidateRule, CANDIDATE_RULES};
pub use submit::{
    find_send_button, find_submit_button, is_chat_host, looks_like_search_field, ButtonRule,
    SEND_BUTTON_RULES, SUBMIT_BUTTON_RULES,
};

use crate::dom::{Document, ElementId};

/// Case-insensitive substring match on an attribute
pub(crate) fn attr_contains(doc: &dyn Document, el: ElementId, name: &str, needle: &str) -> bool {
    doc.attribute(el, name)
        .is_some_and(|value| value.to_lowercase().contains(needle))
}

/// Case-insensitive exact match on an attribute
pub(crate) fn attr_is(doc: &dyn Document, el: ElementId, name: &str, expected: &str) -> bool {
    doc.attribute(el, name)
        .is_some_and(|value| value.trim().eq_ignore_ascii_case(expected))
}
