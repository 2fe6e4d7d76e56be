// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

mod helpers;

use comixtral::domain::{CommitMessage, CommitType};
use comixtral::error::Error;
use comixtral::services::driver::{AmendOutcome, GitDriver, UpdateState, branch_slug};
use comixtral::services::git::RebaseOutcome;
use helpers::{FakePr, FakeVcs};

fn message(subject: &str) -> CommitMessage {
    CommitMessage {
        commit_type: CommitType::Fix,
        scope: None,
        breaking: false,
        subject: subject.into(),
    }
}

// ─── Commit ──────────────────────────────────────────────────────────────────

#[test]
fn first_push_sets_upstream() {
    let vcs = FakeVcs {
        upstream: false,
        ..FakeVcs::default()
    };
    let pr = FakePr::default();
    let receipt = GitDriver::new(&vcs, &pr)
        .commit(&message("handle empty input"), true, true)
        .unwrap();

    assert_eq!(receipt.hash, "1a2b3c4");
    assert_eq!(receipt.pushed.as_deref(), Some("feature"));
    assert_eq!(
        vcs.mutations(),
        vec!["stage_tracked", "commit:fix: handle empty input", "push:feature:true"]
    );
}

#[test]
fn push_disabled_only_commits() {
    let vcs = FakeVcs::default();
    let pr = FakePr::default();
    let receipt = GitDriver::new(&vcs, &pr)
        .commit(&message("handle empty input"), false, false)
        .unwrap();

    assert_eq!(receipt.pushed, None);
    assert_eq!(vcs.mutations(), vec!["commit:fix: handle empty input"]);
}

#[test]
fn rejected_push_keeps_the_local_commit() {
    let vcs = FakeVcs {
        push_rejection: Some("! [rejected] feature -> feature (fetch first)".into()),
        ..FakeVcs::default()
    };
    let pr = FakePr::default();
    let err = GitDriver::new(&vcs, &pr)
        .commit(&message("handle empty input"), false, true)
        .unwrap_err();

    assert!(matches!(err, Error::PushRejected(ref reason) if reason.contains("fetch first")));
    assert_eq!(
        vcs.mutations(),
        vec!["commit:fix: handle empty input", "push:feature:false"]
    );
}

// ─── Amend ───────────────────────────────────────────────────────────────────

#[test]
fn amend_without_staged_changes_is_a_no_op() {
    let vcs = FakeVcs::default();
    let pr = FakePr::default();
    let outcome = GitDriver::new(&vcs, &pr).amend(None).unwrap();

    assert_eq!(outcome, AmendOutcome::NothingToAmend);
    assert!(vcs.mutations().is_empty());
}

#[test]
fn amend_keeps_message_when_none_given() {
    let vcs = FakeVcs {
        staged: true,
        ..FakeVcs::default()
    };
    let pr = FakePr::default();
    let outcome = GitDriver::new(&vcs, &pr).amend(None).unwrap();

    assert_eq!(
        outcome,
        AmendOutcome::Amended {
            hash: "5d6e7f8".into()
        }
    );
    assert_eq!(vcs.mutations(), vec!["amend:--no-edit"]);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[test]
fn update_on_trunk_only_pulls() {
    let vcs = FakeVcs::default().on_branch("main");
    let pr = FakePr::default();
    let state = GitDriver::new(&vcs, &pr).update("main").unwrap();

    assert_eq!(state, UpdateState::Done);
    assert_eq!(vcs.mutations(), vec!["pull"]);
}

#[test]
fn update_conflict_stops_mid_rebase() {
    let vcs = FakeVcs {
        rebase: RebaseOutcome::Conflicted,
        ..FakeVcs::default()
    };
    let pr = FakePr::default();
    let err = GitDriver::new(&vcs, &pr).update("main").unwrap_err();

    match err {
        Error::RebaseConflict { branch, onto } => {
            assert_eq!(branch, "feature");
            assert_eq!(onto, "main");
        }
        other => panic!("expected RebaseConflict, got: {other:?}"),
    }
    assert_eq!(
        vcs.mutations(),
        vec!["checkout:main", "pull", "checkout:feature", "rebase:main"]
    );
}

#[test]
fn failed_pull_returns_to_feature_branch() {
    let vcs = FakeVcs {
        pull_failure: Some("Could not resolve host".into()),
        ..FakeVcs::default()
    };
    let pr = FakePr::default();
    let err = GitDriver::new(&vcs, &pr).update("main").unwrap_err();

    assert!(matches!(err, Error::Git(ref msg) if msg.contains("Could not resolve host")));
    assert_eq!(*vcs.branch.lock().unwrap(), "feature");
    assert_eq!(vcs.mutations(), vec!["checkout:main", "pull", "checkout:feature"]);
}

// ─── Pull requests ───────────────────────────────────────────────────────────

#[test]
fn pull_request_from_base_branch_gets_a_slug_branch() {
    let vcs = FakeVcs::default().on_branch("develop");
    let pr = FakePr::default();
    let receipt = GitDriver::new(&vcs, &pr)
        .prepare_pr("develop", "Fix: crash when config is missing!", "Body")
        .unwrap();

    assert!(receipt.created_branch);
    assert_eq!(receipt.head, "fix-crash-when-config-is-missing");
    assert_eq!(
        vcs.mutations(),
        vec![
            "create_branch:fix-crash-when-config-is-missing",
            "push:fix-crash-when-config-is-missing:true",
        ]
    );
    let created = pr.created.lock().unwrap();
    assert_eq!(
        created[0],
        (
            "develop".to_string(),
            "fix-crash-when-config-is-missing".to_string(),
            "Fix: crash when config is missing!".to_string(),
            "Body".to_string(),
        )
    );
}

#[test]
fn slug_handles_unicode_and_length() {
    assert_eq!(branch_slug("Übersicht für Nutzer"), "bersicht-f-r-nutzer");
    assert_eq!(branch_slug("!!!"), "comixtral-pr");
    let long = branch_slug(&"word ".repeat(40));
    assert!(long.chars().count() <= 50);
    assert!(!long.ends_with('-'));
}
