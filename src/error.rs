// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

// miette's Diagnostic derive generates code that triggers this false positive
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("No changes found")]
    #[diagnostic(
        code(comixtral::git::no_changes),
        help("Edit some tracked files or stage them with: git add <files>")
    )]
    NoChanges,

    #[error("Not a git repository")]
    #[diagnostic(
        code(comixtral::git::not_repo),
        help("Run this command inside a git repository")
    )]
    NotAGitRepo,

    #[error("Operation in progress: {0}")]
    #[diagnostic(
        code(comixtral::git::in_progress),
        help("Finish or abort it first (e.g. git rebase --abort, git merge --abort)")
    )]
    OperationInProgress(String),

    #[error("No API key configured")]
    #[diagnostic(
        code(comixtral::config::missing_credential),
        help("Set COMIXTRAL_API_KEY (or MISTRAL_API_KEY), or add api_key to your config file")
    )]
    MissingCredential,

    #[error("Completion API unavailable after {attempts} attempts: {message}")]
    #[diagnostic(
        code(comixtral::api::transient),
        help("The endpoint kept failing; try again in a moment")
    )]
    TransientApi { attempts: u32, message: String },

    #[error("Completion API rejected the credentials (HTTP {status})")]
    #[diagnostic(
        code(comixtral::api::auth),
        help("Check that your API key is valid and has access to the configured model")
    )]
    Auth { status: u16 },

    #[error("Prompt too large for the completion API")]
    #[diagnostic(
        code(comixtral::api::payload_too_large),
        help("Lower commit_diff_chars / pr_diff_chars in your config")
    )]
    PayloadTooLarge,

    #[error("Completion API error (HTTP {status}): {message}")]
    #[diagnostic(code(comixtral::api::error))]
    Api { status: u16, message: String },

    #[error("Model response is not usable: {0}")]
    #[diagnostic(code(comixtral::response::unparsable))]
    UnparsableResponse(String),

    #[error("Push rejected by remote: {0}")]
    #[diagnostic(
        code(comixtral::git::push_rejected),
        help("Your commit is kept locally. Integrate the remote changes (comixtral update) and push again")
    )]
    PushRejected(String),

    #[error("Rebase of '{branch}' onto '{onto}' stopped on conflicts")]
    #[diagnostic(
        code(comixtral::git::rebase_conflict),
        help("Resolve the conflicts, then run: git rebase --continue (or git rebase --abort)")
    )]
    RebaseConflict { branch: String, onto: String },

    #[error("GitHub CLI (gh) is not available")]
    #[diagnostic(
        code(comixtral::pr::gh_missing),
        help("Install it from https://cli.github.com and run: gh auth login")
    )]
    PrToolUnavailable,

    #[error("Pull request creation failed: {0}")]
    #[diagnostic(code(comixtral::pr::failed))]
    PrTool(String),

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("Configuration error: {0}")]
    #[diagnostic(code(comixtral::config::error))]
    Config(String),

    #[error("Git error: {0}")]
    #[diagnostic(code(comixtral::git::error))]
    Git(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Dialog error: {0}")]
    Dialog(String),
}

impl From<dialoguer::Error> for Error {
    fn from(e: dialoguer::Error) -> Self {
        Error::Dialog(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
