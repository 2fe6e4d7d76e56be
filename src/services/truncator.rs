// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use crate::domain::DiffText;

const ESC: char = '\x1b';

/// Lines that belong to a file or hunk header and are never cut mid-line.
const HEADER_PREFIXES: &[&str] = &[
    "diff --git",
    "@@",
    "--- ",
    "+++ ",
    "index ",
    "new file mode",
    "deleted file mode",
    "old mode",
    "new mode",
    "similarity index",
    "rename from",
    "rename to",
    "Binary files",
];

pub struct Truncator;

impl Truncator {
    /// Cut `text` to at most `max_chars` characters.
    ///
    /// Whole chunks (a file header or a hunk with its lines) are kept from the
    /// front while they fit. When not even the first chunk fits, its leading
    /// complete lines are kept instead; a non-header line may be hard-cut at a
    /// character boundary as a last resort.
    pub fn truncate(text: &str, max_chars: usize) -> DiffText {
        if text.chars().count() <= max_chars {
            return DiffText::raw(text);
        }

        let chunks = split_chunks(text);
        let mut out = String::new();
        let mut used = 0usize;

        for chunk in &chunks {
            let len = chunk.chars().count();
            if used + len > max_chars {
                break;
            }
            out.push_str(chunk);
            used += len;
        }

        if out.is_empty()
            && let Some(first) = chunks.first()
        {
            out = fill_lines(first, max_chars);
        }

        strip_dangling(&mut out);

        DiffText {
            text: out,
            truncated: true,
        }
    }
}

impl Truncator {
    /// [`Truncator::truncate`] over an already collected diff. An earlier cut
    /// stays recorded, so a second pass with the same budget returns the
    /// same value.
    pub fn fit(diff: &DiffText, max_chars: usize) -> DiffText {
        let mut out = Self::truncate(&diff.text, max_chars);
        out.truncated |= diff.truncated;
        out
    }
}

fn is_chunk_start(line: &str) -> bool {
    line.starts_with("diff --git") || line.starts_with("@@")
}

fn is_header(line: &str) -> bool {
    HEADER_PREFIXES.iter().any(|p| line.starts_with(p))
}

/// Lines keep their terminators so chunks concatenate back to the input.
fn split_chunks(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut offset = 0usize;

    for line in text.split_inclusive('\n') {
        if offset > start && is_chunk_start(line) {
            chunks.push(&text[start..offset]);
            start = offset;
        }
        offset += line.len();
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

fn fill_lines(chunk: &str, max_chars: usize) -> String {
    let mut out = String::new();
    let mut used = 0usize;

    for line in chunk.split_inclusive('\n') {
        let len = line.chars().count();
        if used + len <= max_chars {
            out.push_str(line);
            used += len;
            continue;
        }
        if !is_header(line) {
            out.extend(line.chars().take(max_chars - used));
        }
        break;
    }
    out
}

/// Drop an escape sequence missing its final byte, then a trailing lone
/// backslash.
fn strip_dangling(out: &mut String) {
    if let Some(pos) = out.rfind(ESC)
        && !escape_complete(&out[pos..])
    {
        out.truncate(pos);
    }

    if out.ends_with('\\') && !out.ends_with("\\\\") {
        out.pop();
    }
}

fn escape_complete(seq: &str) -> bool {
    let mut chars = seq.chars().skip(1);
    match chars.next() {
        // CSI: parameters then a final byte in '@'..='~'
        Some('[') => chars.any(|c| ('@'..='~').contains(&c)),
        Some(c) => ('@'..='_').contains(&c),
        None => false,
    }
}
