// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

#![no_main]

use comixtral::domain::MAX_HEADER_CHARS;
use comixtral::services::formatter::ResponseFormatter;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(message) = ResponseFormatter::commit_message(data) {
        assert!(message.header().chars().count() <= MAX_HEADER_CHARS);
        assert!(!message.header().contains('\n'));
    }
    if let Ok(title) = ResponseFormatter::pr_title(data) {
        assert!(title.chars().count() <= MAX_HEADER_CHARS);
    }
    let _ = ResponseFormatter::pr_summary(data);
    let _ = ResponseFormatter::pr_description(data);
    if let Ok(note) = ResponseFormatter::release_note("## Unreleased", data) {
        assert!(note.starts_with("## Unreleased\n\n") && note.contains("### "));
    }
});
