//! Enter-commit policy.
//!
//! An ordered list of policies, first applicable wins. Each policy is an
//! ordered list of steps, first step that finds something wins. Extending
//! the heuristics means editing `COMMIT_POLICIES`, not the control flow.

use serde::Serialize;
use tracing::debug;

use super::{CaptureState, PageAgent};
use crate::dom::{Document, ElementId, KeyPhase, SyntheticEvent};
use crate::resolver::{find_send_button, find_submit_button, is_chat_host, looks_like_search_field};

use super::capture::CloseReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "camelCase")]
pub enum CommitAction {
    SubmitForm(ElementId),
    Click(ElementId),
    /// keydown/keypress/keyup for Enter on the target
    EnterTriplet(ElementId),
    Nothing,
}

/// Chosen action and the policy that chose it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommitPlan {
    pub policy: Option<&'static str>,
    pub action: CommitAction,
}

struct CommitContext<'a> {
    doc: &'a dyn Document,
    capture: CaptureState,
    target: ElementId,
    on_chat_host: bool,
}

type CommitStep = fn(&CommitContext) -> Option<CommitAction>;

struct CommitPolicy {
    name: &'static str,
    applies: fn(&CommitContext) -> bool,
    steps: &'static [CommitStep],
}

const COMMIT_POLICIES: &[CommitPolicy] = &[
    CommitPolicy {
        name: "auto-search-box",
        applies: is_auto_target,
        steps: &[submit_enclosing_form, enter_triplet],
    },
    CommitPolicy {
        name: "chat-composer",
        applies: is_manual_on_chat_host,
        steps: &[click_send_button, enter_triplet],
    },
    CommitPolicy {
        name: "search-or-form",
        applies: is_search_or_in_form,
        steps: &[submit_enclosing_form, click_submit_button, enter_triplet],
    },
];

fn is_auto_target(ctx: &CommitContext) -> bool {
    matches!(ctx.capture, CaptureState::AutoCapture(_))
}

fn is_manual_on_chat_host(ctx: &CommitContext) -> bool {
    matches!(ctx.capture, CaptureState::ManualCapture(_)) && ctx.on_chat_host
}

fn is_search_or_in_form(ctx: &CommitContext) -> bool {
    looks_like_search_field(ctx.doc, ctx.target) || ctx.doc.closest_form(ctx.target).is_some()
}

fn submit_enclosing_form(ctx: &CommitContext) -> Option<CommitAction> {
    ctx.doc.closest_form(ctx.target).map(CommitAction::SubmitForm)
}

fn click_send_button(ctx: &CommitContext) -> Option<CommitAction> {
    find_send_button(ctx.doc, ctx.target).map(CommitAction::Click)
}

fn click_submit_button(ctx: &CommitContext) -> Option<CommitAction> {
    find_submit_button(ctx.doc, ctx.target).map(CommitAction::Click)
}

fn enter_triplet(ctx: &CommitContext) -> Option<CommitAction> {
    Some(CommitAction::EnterTriplet(ctx.target))
}

/// Decide what Enter in the surrogate does to the page. Read-only.
pub fn plan_commit(doc: &dyn Document, capture: CaptureState, chat_hosts: &[String]) -> CommitPlan {
    let nothing = CommitPlan {
        policy: None,
        action: CommitAction::Nothing,
    };
    let Some(target) = capture.target() else {
        return nothing;
    };
    if !doc.is_attached(target) {
        return nothing;
    }
    let ctx = CommitContext {
        doc,
        capture,
        target,
        on_chat_host: is_chat_host(doc.hostname(), chat_hosts),
    };
    COMMIT_POLICIES
        .iter()
        .find(|policy| (policy.applies)(&ctx))
        .map(|policy| CommitPlan {
            policy: Some(policy.name),
            action: policy
                .steps
                .iter()
                .find_map(|step| step(&ctx))
                .unwrap_or(CommitAction::Nothing),
        })
        .unwrap_or(nothing)
}

/// Carry out a planned action. False when nothing reached the page.
pub fn execute_commit(doc: &mut dyn Document, action: CommitAction) -> bool {
    match action {
        CommitAction::SubmitForm(form) => doc.submit(form),
        CommitAction::Click(button) => doc.click(button),
        CommitAction::EnterTriplet(target) => KeyPhase::TRIPLET
            .into_iter()
            .fold(true, |ok, phase| doc.dispatch(target, SyntheticEvent::EnterKey(phase)) && ok),
        CommitAction::Nothing => false,
    }
}

impl PageAgent {
    /// Enter inside the surrogate. The overlay closes whatever happens.
    pub(super) fn commit(&mut self, doc: &mut dyn Document) {
        let plan = plan_commit(doc, self.capture, &self.chat_hosts);
        let fired = execute_commit(doc, plan.action);
        debug!(
            page_id = self.page_id,
            policy = ?plan.policy,
            action = ?plan.action,
            fired,
            "Enter committed"
        );
        self.release(CloseReason::Committed);
    }
}
