// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use crate::domain::{CommitMessage, MAX_HEADER_CHARS, ParsedHeader};
use crate::error::{Error, Result};

static PREAMBLE_PATTERNS: &[&str] = &[
    "here's the commit message",
    "here is the commit message",
    "here's a commit message",
    "here is a commit message",
    "commit message:",
    "suggested commit:",
    "title:",
    "pr title:",
    "description:",
];

const WRAPPING_QUOTES: &[char] = &['"', '\'', '`'];

/// Turns raw model text into validated artifacts.
pub struct ResponseFormatter;

impl ResponseFormatter {
    /// Parse and validate a single-line conventional commit message.
    pub fn commit_message(raw: &str) -> Result<CommitMessage> {
        let line = first_content_line(raw)
            .ok_or_else(|| Error::UnparsableResponse("empty response".into()))?;

        let header = ParsedHeader::parse(&line).ok_or_else(|| {
            Error::UnparsableResponse(format!(
                "not a conventional commit: '{}'",
                line.chars().take(40).collect::<String>()
            ))
        })?;

        let commit_type = header.commit_type.ok_or_else(|| {
            Error::UnparsableResponse(format!("unknown commit type '{}'", header.raw_type))
        })?;

        let subject = header.description.trim_end_matches('.').trim().to_string();
        if subject.is_empty() {
            return Err(Error::UnparsableResponse("empty commit subject".into()));
        }

        let message = CommitMessage {
            commit_type,
            scope: header.scope.filter(|s| !s.is_empty()),
            breaking: header.breaking,
            subject,
        };

        let len = message.header().chars().count();
        if len > MAX_HEADER_CHARS {
            return Err(Error::UnparsableResponse(format!(
                "commit header is {len} characters (max {MAX_HEADER_CHARS})"
            )));
        }

        Ok(message)
    }

    /// Markdown PR summary with a top-level heading and bullet lines.
    pub fn pr_summary(raw: &str) -> Result<String> {
        let body = strip_fences(raw);
        if body.is_empty() {
            return Err(Error::UnparsableResponse("empty summary".into()));
        }

        let has_bullets = body.lines().any(is_bullet);
        let mut lines: Vec<String> = Vec::new();
        for line in body.lines() {
            let trimmed = line.trim();
            if has_bullets || trimmed.is_empty() || trimmed.starts_with('#') {
                lines.push(line.trim_end().to_string());
            } else {
                lines.push(format!("- {trimmed}"));
            }
        }

        let mut out = lines.join("\n");
        let starts_with_heading = out.trim_start().starts_with('#');
        if !starts_with_heading {
            out = format!("## Summary\n\n{out}");
        }
        Ok(out)
    }

    /// Release note under `heading`; the model's own heading, if any, is
    /// dropped. At least one `### ` section is required.
    pub fn release_note(heading: &str, raw: &str) -> Result<String> {
        let body = strip_fences(raw);
        let lines: Vec<&str> = body.lines().collect();
        let first_section = lines
            .iter()
            .position(|l| l.trim_start().starts_with("### "))
            .ok_or_else(|| Error::UnparsableResponse("release note has no ### sections".into()))?;

        let sections = lines[first_section..]
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n");
        Ok(format!("{heading}\n\n{}", sections.trim_end()))
    }

    pub fn pr_description(raw: &str) -> Result<String> {
        let body = strip_fences(raw);
        let body = strip_preamble(&body);
        if body.is_empty() {
            return Err(Error::UnparsableResponse("empty PR description".into()));
        }
        Ok(body)
    }

    /// Single-line, unquoted title, cut at a word boundary to fit.
    pub fn pr_title(raw: &str) -> Result<String> {
        let line = first_content_line(raw)
            .ok_or_else(|| Error::UnparsableResponse("empty PR title".into()))?;
        let line = line.trim_start_matches('#').trim().to_string();
        if line.is_empty() {
            return Err(Error::UnparsableResponse("empty PR title".into()));
        }
        Ok(cut_at_word(&line, MAX_HEADER_CHARS))
    }
}

fn is_bullet(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("- ") || t.starts_with("* ")
}

/// Removes fence marker lines (```` ``` ```` / ```` ```lang ````), keeping
/// whatever was inside.
fn strip_fences(raw: &str) -> String {
    raw.lines()
        .filter(|l| !l.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Drops a leading "Here is ...:" style preamble (case insensitive).
fn strip_preamble(text: &str) -> String {
    for pattern in PREAMBLE_PATTERNS {
        let matched = text
            .get(..pattern.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(pattern));
        if matched {
            let rest = &text[pattern.len()..];
            return rest.trim_start_matches(':').trim().to_string();
        }
    }
    text.trim().to_string()
}

fn strip_wrapping_quotes(line: &str) -> &str {
    let mut s = line.trim();
    for q in WRAPPING_QUOTES {
        if s.len() >= 2 && s.starts_with(*q) && s.ends_with(*q) {
            s = s[1..s.len() - 1].trim();
        }
    }
    s
}

/// First non-empty line after dropping fences, preambles and quotes.
fn first_content_line(raw: &str) -> Option<String> {
    let cleaned = strip_fences(raw);
    for line in cleaned.lines() {
        let line = strip_wrapping_quotes(line);
        let line = strip_preamble(line);
        let line = strip_wrapping_quotes(&line).to_string();
        if !line.is_empty() {
            return Some(line);
        }
    }
    None
}

fn cut_at_word(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max).collect();
    let cut = match head.rfind(' ') {
        Some(pos) if pos > 0 => &head[..pos],
        _ => head.as_str(),
    };
    cut.trim_end_matches([' ', ',', ';', ':', '-']).to_string()
}
