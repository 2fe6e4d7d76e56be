// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use proptest::prelude::*;

use comixtral::domain::DiffText;
use comixtral::services::truncator::Truncator;

fn file_diff(name: &str, added: &[&str]) -> String {
    let mut out = format!(
        "diff --git a/{name} b/{name}\nindex 1111111..2222222 100644\n--- a/{name}\n+++ b/{name}\n@@ -1,{n} +1,{n} @@\n",
        n = added.len()
    );
    for line in added {
        out.push('+');
        out.push_str(line);
        out.push('\n');
    }
    out
}

// ─── Budget behaviour ────────────────────────────────────────────────────────

#[test]
fn diff_within_budget_is_not_marked() {
    let diff = file_diff("src/lib.rs", &["pub fn answer() -> u32 { 42 }"]);
    let out = Truncator::truncate(&diff, 2000);
    assert_eq!(out.text, diff);
    assert!(!out.truncated);
}

#[test]
fn exact_budget_is_not_truncated() {
    let diff = file_diff("a.txt", &["hello"]);
    let out = Truncator::truncate(&diff, diff.chars().count());
    assert!(!out.truncated);
}

#[test]
fn later_files_are_dropped_whole() {
    let first = file_diff("README.md", &["# Title", "Intro"]);
    let second = file_diff("src/main.rs", &["fn main() {}"]);
    let diff = format!("{first}{second}");

    let out = Truncator::truncate(&diff, first.chars().count() + 10);

    assert!(out.truncated);
    assert_eq!(out.text, first);
    assert!(!out.text.contains("src/main.rs"));
}

#[test]
fn large_hunk_is_cut_at_line_boundaries() {
    let lines: Vec<String> = (0..100).map(|i| format!("line {i:03}")).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let diff = file_diff("big.txt", &refs);

    let out = Truncator::truncate(&diff, 300);

    assert!(out.truncated);
    assert!(out.text.chars().count() <= 300);
    assert!(out.text.starts_with("diff --git a/big.txt"));
}

#[test]
fn zero_budget_yields_empty_text() {
    let diff = file_diff("a", &["b"]);
    let out = Truncator::truncate(&diff, 0);
    assert_eq!(out.text, "");
    assert!(out.truncated);
}

#[test]
fn cut_diff_stays_cut_on_refit() {
    let diff = format!("@@ -1 +1 @@\n+{}\n", "x".repeat(100));
    let once = Truncator::truncate(&diff, 20);
    assert!(once.truncated);

    let twice = Truncator::fit(&once, 20);
    assert_eq!(twice, once);
}

#[test]
fn fit_of_untouched_diff_matches_truncate() {
    let diff = DiffText::raw(file_diff("a.txt", &["hello"]));
    assert_eq!(Truncator::fit(&diff, 2000), Truncator::truncate(&diff.text, 2000));
}

// ─── Invariants ──────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn output_is_a_bounded_prefix(text in "(\\PC{0,40}\n){0,30}", max in 0usize..600) {
        let out = Truncator::truncate(&text, max);
        prop_assert!(out.text.chars().count() <= max);
        prop_assert!(text.starts_with(&out.text));
        prop_assert_eq!(out.truncated, text.chars().count() > max);
    }

    #[test]
    fn second_pass_is_stable(text in "(\\PC{0,40}\n){0,30}", max in 0usize..600) {
        let once = Truncator::truncate(&text, max);
        let twice = Truncator::fit(&once, max);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn diff_shaped_input_stays_bounded(
        files in proptest::collection::vec(("[a-z]{1,8}", proptest::collection::vec("[ -~]{0,60}", 0..20)), 1..6),
        max in 1usize..1500,
    ) {
        let diff: String = files
            .iter()
            .map(|(name, lines)| {
                let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
                file_diff(name, &refs)
            })
            .collect();
        let out = Truncator::truncate(&diff, max);
        prop_assert!(out.text.chars().count() <= max);
        prop_assert!(diff.starts_with(&out.text));
    }
}
