// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Commit,
    PrSummary,
    ReleaseNote,
    PrDescription,
    PrTitle,
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Commit => "commit",
            Self::PrSummary => "pr-summary",
            Self::ReleaseNote => "release-note",
            Self::PrDescription => "pr-description",
            Self::PrTitle => "pr-title",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub text: String,
    pub max_output_tokens: u32,
}

impl Prompt {
    /// Same prompt with a stricter instruction naming the rejected output.
    pub fn with_correction(&self, rejected: &str) -> Prompt {
        let rule = match self.kind {
            PromptKind::Commit => {
                "Reply with exactly one line of the form type(scope): subject, \
                 72 characters at most, no trailing period, and nothing else."
            }
            PromptKind::PrSummary => {
                "Reply with markdown only: one top-level heading followed by bullet lines."
            }
            PromptKind::ReleaseNote => {
                "Reply with markdown only, keeping the ### section headings exactly as given."
            }
            PromptKind::PrDescription => "Reply with the description text only.",
            PromptKind::PrTitle => "Reply with a single-line title only, without quotes.",
        };
        let rejected = rejected.trim();
        let rejected: String = rejected.chars().take(200).collect();

        Prompt {
            kind: self.kind,
            text: format!(
                "{}\n\nYour previous answer was rejected:\n{rejected}\n\n{rule}",
                self.text
            ),
            max_output_tokens: self.max_output_tokens,
        }
    }
}
