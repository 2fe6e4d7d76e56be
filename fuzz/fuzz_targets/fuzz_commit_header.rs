// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

#![no_main]

use comixtral::domain::{LogEntry, ParsedHeader};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Some(header) = ParsedHeader::parse(data) {
        assert!(!header.description.is_empty());
    }
    let _ = LogEntry::new("0000000", data).description();
});
