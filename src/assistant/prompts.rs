//! The four fixed prompt templates plus the free-form one.

use serde::{Deserialize, Serialize};

pub const MISSING_CREDENTIAL_MESSAGE: &str = "Please set your API key in the extension settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssistantAction {
    /// Generate CSS for the page from a description
    ModifyCss,
    Summarize,
    /// Rewrite the user's text
    ImproveText,
    /// Pull facts, entities and contact details out of the page
    ExtractInfo,
    CustomPrompt,
}

impl AssistantAction {
    /// Actions that do nothing until the prompt box has text
    pub fn needs_input(self) -> bool {
        matches!(
            self,
            Self::ModifyCss | Self::ImproveText | Self::CustomPrompt
        )
    }

    /// How much page text goes into the prompt, if any
    pub fn page_text_limit(self) -> Option<usize> {
        match self {
            Self::ModifyCss => Some(1000),
            Self::Summarize => Some(2000),
            Self::ImproveText => None,
            Self::ExtractInfo | Self::CustomPrompt => Some(3000),
        }
    }

    pub fn pending_message(self) -> &'static str {
        match self {
            Self::ModifyCss => "Generating CSS modifications...",
            Self::Summarize => "Generating summary...",
            Self::ImproveText => "Improving text...",
            Self::ExtractInfo => "Extracting information...",
            Self::CustomPrompt => "Processing custom prompt...",
        }
    }

    pub fn success_heading(self) -> &'static str {
        match self {
            Self::ModifyCss => "CSS applied successfully!",
            Self::Summarize => "Summary generated:",
            Self::ImproveText => "Improved text:",
            Self::ExtractInfo => "Extracted information:",
            Self::CustomPrompt => "Result:",
        }
    }
}

/// Truncate to at most `max` characters (not bytes)
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Build the prompt for an action. `None` when the action needs input and
/// the input is blank.
pub fn build_prompt(action: AssistantAction, input: &str, page_text: &str) -> Option<String> {
    let input = input.trim();
    if action.needs_input() && input.is_empty() {
        return None;
    }
    let page = action
        .page_text_limit()
        .map(|limit| truncate_chars(page_text, limit))
        .unwrap_or_default();

    let prompt = match action {
        AssistantAction::ModifyCss => format!(
            "Based on this page content and the user's request, generate CSS modifications.\n\n\
             Page content: {page}\n\
             User request: {input}\n\n\
             Generate only valid CSS rules that can be applied to modify the page. \
             Return only the CSS code, no explanations."
        ),
        AssistantAction::Summarize => format!(
            "Summarize the following web page content in a clear and concise way:\n\n\
             {page}\n\n\
             Provide a well-structured summary with key points."
        ),
        AssistantAction::ImproveText => format!(
            "Improve the following text by making it more clear, professional, and engaging:\n\n\
             \"{input}\"\n\n\
             Return only the improved text, no explanations."
        ),
        AssistantAction::ExtractInfo => format!(
            "Extract the most important information, facts, entities, and contact details \
             (emails, phone numbers, links) from the following web page content. \
             Present the results in a clear, structured format.\n\n{page}"
        ),
        AssistantAction::CustomPrompt => format!(
            "You are an assistant for web page analysis. The user prompt is: \"{input}\"\n\n\
             Here is the web page content for context:\n\n{page}"
        ),
    };
    Some(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_a_no_op_for_input_driven_actions() {
        assert_eq!(build_prompt(AssistantAction::ModifyCss, "   ", "page"), None);
        assert_eq!(build_prompt(AssistantAction::ImproveText, "", "page"), None);
        assert_eq!(build_prompt(AssistantAction::CustomPrompt, "\n", "page"), None);
        assert!(build_prompt(AssistantAction::Summarize, "", "page").is_some());
        assert!(build_prompt(AssistantAction::ExtractInfo, "", "page").is_some());
    }

    #[test]
    fn page_text_is_truncated_per_action() {
        let page = "x".repeat(5000);
        let css = build_prompt(AssistantAction::ModifyCss, "dark mode", &page).unwrap();
        assert!(css.contains(&"x".repeat(1000)));
        assert!(!css.contains(&"x".repeat(1001)));

        let summary = build_prompt(AssistantAction::Summarize, "", &page).unwrap();
        assert!(summary.contains(&"x".repeat(2000)));
        assert!(!summary.contains(&"x".repeat(2001)));

        let custom = build_prompt(AssistantAction::CustomPrompt, "who?", &page).unwrap();
        assert!(custom.contains(&"x".repeat(3000)));
        assert!(!custom.contains(&"x".repeat(3001)));
    }

    #[test]
    fn improve_text_ignores_page() {
        let prompt = build_prompt(AssistantAction::ImproveText, "teh cat", "SECRET PAGE").unwrap();
        assert!(prompt.contains("\"teh cat\""));
        assert!(!prompt.contains("SECRET PAGE"));
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
