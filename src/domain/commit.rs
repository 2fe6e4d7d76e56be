// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Longest header line accepted for a commit message.
pub const MAX_HEADER_CHARS: usize = 72;

/// `type(scope)!: description`, type matched case-insensitively.
static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>[A-Za-z]+)(?:\((?P<scope>[^()\s][^()]*)\))?(?P<bang>!)?: (?P<desc>\S.*)$")
        .unwrap_or_else(|e| unreachable!("header pattern is valid: {e}"))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitType {
    Feat,
    Fix,
    Perf,
    Refactor,
    Docs,
    Test,
    Build,
    Ci,
    Style,
    Chore,
}

impl CommitType {
    /// Release-note section order.
    pub const ALL: [CommitType; 10] = [
        Self::Feat,
        Self::Fix,
        Self::Perf,
        Self::Refactor,
        Self::Docs,
        Self::Test,
        Self::Build,
        Self::Ci,
        Self::Style,
        Self::Chore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feat => "feat",
            Self::Fix => "fix",
            Self::Perf => "perf",
            Self::Refactor => "refactor",
            Self::Docs => "docs",
            Self::Test => "test",
            Self::Build => "build",
            Self::Ci => "ci",
            Self::Style => "style",
            Self::Chore => "chore",
        }
    }

    pub fn section_title(&self) -> &'static str {
        match self {
            Self::Feat => "Features",
            Self::Fix => "Fixes",
            Self::Perf => "Performance",
            Self::Refactor => "Refactoring",
            Self::Docs => "Documentation",
            Self::Test => "Tests",
            Self::Build => "Build",
            Self::Ci => "CI",
            Self::Style => "Style",
            Self::Chore => "Chores",
        }
    }

    /// Case-insensitive lookup of a type keyword.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == lower)
    }

    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(CommitType::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed conventional-commit header. Pieces are untouched apart from
/// lowercasing the type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHeader {
    pub commit_type: Option<CommitType>,
    pub raw_type: String,
    pub scope: Option<String>,
    pub breaking: bool,
    pub description: String,
}

impl ParsedHeader {
    pub fn parse(line: &str) -> Option<Self> {
        let caps = HEADER_REGEX.captures(line.trim())?;
        let raw_type = caps["type"].to_string();
        Some(Self {
            commit_type: CommitType::parse(&raw_type),
            raw_type,
            scope: caps.name("scope").map(|m| m.as_str().trim().to_string()),
            breaking: caps.name("bang").is_some(),
            description: caps["desc"].trim().to_string(),
        })
    }
}

/// Validated single-line conventional commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub commit_type: CommitType,
    pub scope: Option<String>,
    pub breaking: bool,
    pub subject: String,
}

impl CommitMessage {
    pub fn header(&self) -> String {
        let scope = self
            .scope
            .as_ref()
            .map(|s| format!("({s})"))
            .unwrap_or_default();
        let bang = if self.breaking { "!" } else { "" };
        format!("{}{scope}{bang}: {}", self.commit_type, self.subject)
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header())
    }
}

/// One commit from history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub hash: String,
    pub subject: String,
    pub type_hint: Option<CommitType>,
}

impl LogEntry {
    pub fn new(hash: impl Into<String>, subject: impl Into<String>) -> Self {
        let subject = subject.into();
        let type_hint = ParsedHeader::parse(&subject).and_then(|h| h.commit_type);
        Self {
            hash: hash.into(),
            subject,
            type_hint,
        }
    }

    /// Subject without its conventional prefix; scope kept as `scope: `.
    /// Breaking changes are prefixed with `**BREAKING** `.
    pub fn description(&self) -> String {
        match ParsedHeader::parse(&self.subject) {
            Some(h) if h.commit_type.is_some() => {
                let marker = if h.breaking { "**BREAKING** " } else { "" };
                match h.scope {
                    Some(scope) => format!("{marker}{scope}: {}", h.description),
                    None => format!("{marker}{}", h.description),
                }
            }
            _ => self.subject.trim().to_string(),
        }
    }
}

/// Commit subjects grouped by type in release-note section order.
/// Non-conventional subjects land in a trailing "Other" group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitGroups {
    groups: Vec<(CommitType, Vec<String>)>,
    other: Vec<String>,
}

impl CommitGroups {
    pub const OTHER_TITLE: &'static str = "Other";

    /// Entries are expected oldest first; that order is kept inside a group.
    pub fn from_log(entries: &[LogEntry]) -> Self {
        let mut groups: Vec<(CommitType, Vec<String>)> = CommitType::ALL
            .into_iter()
            .map(|t| (t, Vec::new()))
            .collect();
        let mut other = Vec::new();

        for entry in entries {
            match entry.type_hint {
                Some(t) => {
                    if let Some((_, subjects)) = groups.iter_mut().find(|(g, _)| *g == t) {
                        subjects.push(entry.description());
                    }
                }
                None => other.push(entry.description()),
            }
        }

        groups.retain(|(_, subjects)| !subjects.is_empty());
        Self { groups, other }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.other.is_empty()
    }

    /// `(section title, subjects)` pairs, empty sections omitted.
    pub fn sections(&self) -> Vec<(&'static str, &[String])> {
        let mut out: Vec<(&'static str, &[String])> = self
            .groups
            .iter()
            .map(|(t, s)| (t.section_title(), s.as_slice()))
            .collect();
        if !self.other.is_empty() {
            out.push((Self::OTHER_TITLE, self.other.as_slice()));
        }
        out
    }

    /// `### Section` blocks with one bullet per subject.
    pub fn outline(&self) -> String {
        self.sections()
            .into_iter()
            .map(|(title, subjects)| {
                let bullets: String = subjects.iter().map(|s| format!("- {s}\n")).collect();
                format!("### {title}\n{bullets}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Full markdown release note under `heading`.
    pub fn render(&self, heading: &str) -> String {
        format!("{heading}\n\n{}", self.outline())
    }
}
