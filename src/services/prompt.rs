// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use crate::config::Config;
use crate::domain::{
    CommitGroups, CommitType, DiffText, LogEntry, MAX_HEADER_CHARS, Prompt, PromptKind,
};

/// Appended after a diff that was cut to fit the budget.
const OMITTED_NOTE: &str = "and some other things.";

pub enum PromptInput<'a> {
    Commit { diff: &'a DiffText },
    PrSummary { commits: &'a [LogEntry] },
    ReleaseNote { heading: &'a str, groups: &'a CommitGroups },
    PrDescription { diff: &'a DiffText },
    PrTitle { description: &'a str },
}

/// Builds deterministic prompt text. Pure: identical input and config give
/// byte-identical prompts.
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder {
    commit_max_tokens: u32,
    summary_max_tokens: u32,
    title_max_tokens: u32,
}

impl PromptBuilder {
    pub fn new(config: &Config) -> Self {
        Self {
            commit_max_tokens: config.commit_max_tokens,
            summary_max_tokens: config.summary_max_tokens,
            title_max_tokens: config.title_max_tokens,
        }
    }

    pub fn build(&self, input: PromptInput<'_>) -> Prompt {
        match input {
            PromptInput::Commit { diff } => Prompt {
                kind: PromptKind::Commit,
                text: commit_text(diff),
                max_output_tokens: self.commit_max_tokens,
            },
            PromptInput::PrSummary { commits } => Prompt {
                kind: PromptKind::PrSummary,
                text: pr_summary_text(commits),
                max_output_tokens: self.summary_max_tokens,
            },
            PromptInput::ReleaseNote { heading, groups } => Prompt {
                kind: PromptKind::ReleaseNote,
                text: release_note_text(heading, groups),
                max_output_tokens: self.summary_max_tokens,
            },
            PromptInput::PrDescription { diff } => Prompt {
                kind: PromptKind::PrDescription,
                text: pr_description_text(diff),
                max_output_tokens: self.summary_max_tokens,
            },
            PromptInput::PrTitle { description } => Prompt {
                kind: PromptKind::PrTitle,
                text: pr_title_text(description),
                max_output_tokens: self.title_max_tokens,
            },
        }
    }
}

fn diff_block(diff: &DiffText) -> String {
    let mut block = diff.as_str().trim_end().to_string();
    if diff.truncated {
        block.push('\n');
        block.push_str(OMITTED_NOTE);
    }
    block
}

fn commit_text(diff: &DiffText) -> String {
    format!(
        "Given the following code changes in a git diff:\n\n\
{diff}\n\n\
Please analyze these code changes and generate a commit message that adheres to the \
Conventional Commits guidelines.\n\n\
RULES:\n\
- Exactly one line: <type>(<scope>): <description>\n\
- type is one of: {types}\n\
- scope is optional; add ! before the colon only for breaking changes\n\
- description in imperative mood (\"add\", not \"added\"), no trailing period\n\
- at most {max} characters in total\n\n\
Your answer will only have the commit message as output.",
        diff = diff_block(diff),
        types = CommitType::allowed_list(),
        max = MAX_HEADER_CHARS,
    )
}

fn pr_summary_text(commits: &[LogEntry]) -> String {
    let subjects: String = commits
        .iter()
        .map(|c| format!("- {}\n", c.subject.trim()))
        .collect();
    format!(
        "Given the following commit subjects, oldest first:\n\n\
{subjects}\n\
Please write a pull request summary in markdown. Start with a single top-level \
heading (## Summary), then group related changes as bullet lines (- ...). \
Do not invent changes that are not listed.\n\n\
YOUR ANSWER MUST ONLY HAVE THE MARKDOWN SUMMARY AS OUTPUT."
    )
}

fn release_note_text(heading: &str, groups: &CommitGroups) -> String {
    format!(
        "Given the following changes grouped by type:\n\n\
{outline}\n\
Please write release notes in markdown under the heading \"{heading}\". Keep every \
### section heading exactly as given and in the same order, with one bullet line per \
change rewritten for end users.\n\n\
YOUR ANSWER MUST ONLY HAVE THE RELEASE NOTES AS OUTPUT.",
        outline = groups.outline(),
    )
}

fn pr_description_text(diff: &DiffText) -> String {
    format!(
        "Given all the following code changes in a git diff:\n\n\
{diff}\n\n\
Please generate a pull request description. The description has to be concise and to \
the point, and it has to be written in a way that is easy to understand for \
non-technical people.\n\n\
YOUR ANSWER MUST ONLY HAVE THE DESCRIPTION AS OUTPUT.",
        diff = diff_block(diff),
    )
}

fn pr_title_text(description: &str) -> String {
    format!(
        "Given the following pull request description:\n\n\
{description}\n\n\
Please generate a concise and clear pull request title that summarizes the changes, \
on a single line of at most {MAX_HEADER_CHARS} characters.\n\n\
YOUR ANSWER MUST ONLY HAVE THE TITLE AS OUTPUT.",
        description = description.trim(),
    )
}
