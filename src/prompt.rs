//! Builds the effective prompt for a task from upstream results.
//!
//! Two strategies, both deterministic for identical inputs:
//! template substitution of `{{nodeId}}` placeholders, and optional
//! prepending of labeled context blocks from successful upstream nodes.

use regex::Regex;

use crate::task::ResultMap;

pub struct PromptContextBuilder {
    placeholder: Regex,
}

impl PromptContextBuilder {
    pub fn new() -> Self {
        Self {
            placeholder: Regex::new(r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}").unwrap(),
        }
    }

    /// Materialize the effective prompt for `node_id`.
    ///
    /// Placeholders referencing nodes without a recorded text output are left
    /// verbatim so the workflow author can see the dangling reference.
    pub fn build(
        &self,
        prompt: &str,
        node_id: &str,
        inject_context: bool,
        previous: &ResultMap,
    ) -> String {
        let substituted = self.substitute(prompt, previous);
        if !inject_context {
            return substituted;
        }

        let blocks: Vec<String> = previous
            .iter()
            .filter(|(id, result)| *id != node_id && result.success)
            .filter_map(|(id, result)| result.text().map(|t| format!("Output of {}:\n{}", id, t)))
            .collect();
        if blocks.is_empty() {
            return substituted;
        }

        format!("{}\n\n---\n\n{}", blocks.join("\n\n"), substituted)
    }

    fn substitute(&self, prompt: &str, previous: &ResultMap) -> String {
        self.placeholder
            .replace_all(prompt, |caps: &regex::Captures| {
                match previous.get(&caps[1]).and_then(|r| r.text()) {
                    Some(text) => text.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

impl Default for PromptContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskData, TaskResult};

    fn succeeded(node_id: &str, text: &str) -> TaskResult {
        TaskResult::succeeded(
            node_id,
            TaskData {
                text: text.to_string(),
                tokens: 1,
                model: "m".to_string(),
            },
        )
    }

    #[test]
    fn test_substitutes_upstream_output() {
        let mut previous = ResultMap::new();
        previous.insert("A".into(), succeeded("A", "X"));

        let builder = PromptContextBuilder::new();
        let prompt = builder.build("Use {{A}}", "B", false, &previous);
        assert_eq!(prompt, "Use X");
    }

    #[test]
    fn test_unmatched_placeholder_left_verbatim() {
        let previous = ResultMap::new();
        let builder = PromptContextBuilder::new();
        let prompt = builder.build("Use {{missing}} here", "B", false, &previous);
        assert_eq!(prompt, "Use {{missing}} here");
    }

    #[test]
    fn test_failed_node_placeholder_left_verbatim() {
        let mut previous = ResultMap::new();
        previous.insert("A".into(), TaskResult::failed("A", "boom"));

        let builder = PromptContextBuilder::new();
        let prompt = builder.build("Use {{A}}", "B", false, &previous);
        assert_eq!(prompt, "Use {{A}}");
    }

    #[test]
    fn test_substitution_with_whitespace_in_placeholder() {
        let mut previous = ResultMap::new();
        previous.insert("A".into(), succeeded("A", "X"));

        let builder = PromptContextBuilder::new();
        assert_eq!(builder.build("{{ A }}", "B", false, &previous), "X");
    }

    #[test]
    fn test_context_blocks_prepended_in_completion_order() {
        let mut previous = ResultMap::new();
        previous.insert("first".into(), succeeded("first", "one"));
        previous.insert("second".into(), succeeded("second", "two"));

        let builder = PromptContextBuilder::new();
        let prompt = builder.build("Summarize", "B", true, &previous);
        assert_eq!(
            prompt,
            "Output of first:\none\n\nOutput of second:\ntwo\n\n---\n\nSummarize"
        );
    }

    #[test]
    fn test_context_excludes_failures_and_current_node() {
        let mut previous = ResultMap::new();
        previous.insert("ok".into(), succeeded("ok", "good"));
        previous.insert("bad".into(), TaskResult::failed("bad", "err"));
        previous.insert("me".into(), succeeded("me", "self"));

        let builder = PromptContextBuilder::new();
        let prompt = builder.build("Go", "me", true, &previous);
        assert_eq!(prompt, "Output of ok:\ngood\n\n---\n\nGo");
    }

    #[test]
    fn test_no_context_blocks_yields_plain_prompt() {
        let previous = ResultMap::new();
        let builder = PromptContextBuilder::new();
        assert_eq!(builder.build("Go", "A", true, &previous), "Go");
    }

    #[test]
    fn test_substitution_applies_before_context_prepend() {
        let mut previous = ResultMap::new();
        previous.insert("A".into(), succeeded("A", "X"));

        let builder = PromptContextBuilder::new();
        let prompt = builder.build("Use {{A}}", "B", true, &previous);
        assert_eq!(prompt, "Output of A:\nX\n\n---\n\nUse X");
    }
}
