// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

/// Diff text handed to the prompt builder.
///
/// `truncated` is set when the text was cut to fit a character budget; the
/// text itself never carries a marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffText {
    pub text: String,
    pub truncated: bool,
}

impl DiffText {
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            truncated: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
