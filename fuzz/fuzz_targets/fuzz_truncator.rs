// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

#![no_main]

use comixtral::services::truncator::Truncator;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u16, &str)| {
    let (max, text) = input;
    let max = usize::from(max);

    let once = Truncator::truncate(text, max);
    assert!(once.text.chars().count() <= max);
    assert!(text.starts_with(&once.text));

    let twice = Truncator::fit(&once, max);
    assert_eq!(twice, once);
});
