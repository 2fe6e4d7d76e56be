// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use secrecy::SecretString;

use comixtral::config::Config;
use comixtral::domain::{LogEntry, Prompt};
use comixtral::error::{Error, Result};
use comixtral::router::Interaction;
use comixtral::services::completion::{Completion, CompletionResult, Usage};
use comixtral::services::git::{RebaseOutcome, Vcs};
use comixtral::services::pr::PrTool;

/// Call prefixes that change the repository or a remote.
const MUTATING: &[&str] = &[
    "stage_tracked",
    "commit",
    "amend",
    "checkout",
    "pull",
    "rebase",
    "push",
    "create_branch",
];

pub fn test_config() -> Config {
    Config {
        api_key: Some(SecretString::from("test-key".to_string())),
        retry_initial_ms: 1,
        retry_max_ms: 5,
        timeout_secs: 5,
        ..Config::default()
    }
}

// ─── Vcs ─────────────────────────────────────────────────────────────────────

pub struct FakeVcs {
    pub is_repo: bool,
    pub operation: Option<String>,
    pub worktree_diff: String,
    pub staged_diff: String,
    pub range_diff: String,
    pub log: Vec<LogEntry>,
    pub tag: Option<String>,
    pub branch: Mutex<String>,
    pub upstream: bool,
    pub staged: bool,
    pub rebase: RebaseOutcome,
    pub push_rejection: Option<String>,
    pub pull_failure: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl Default for FakeVcs {
    fn default() -> Self {
        Self {
            is_repo: true,
            operation: None,
            worktree_diff: String::new(),
            staged_diff: String::new(),
            range_diff: String::new(),
            log: Vec::new(),
            tag: None,
            branch: Mutex::new("feature".into()),
            upstream: true,
            staged: false,
            rebase: RebaseOutcome::Clean,
            push_rejection: None,
            pull_failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeVcs {
    pub fn with_diff(diff: &str) -> Self {
        Self {
            worktree_diff: diff.into(),
            staged_diff: diff.into(),
            range_diff: diff.into(),
            staged: !diff.is_empty(),
            ..Self::default()
        }
    }

    pub fn with_log(subjects: &[&str]) -> Self {
        let log = subjects
            .iter()
            .enumerate()
            .map(|(i, s)| LogEntry::new(format!("abc{i:04}"), *s))
            .collect();
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn on_branch(self, branch: &str) -> Self {
        *self.branch.lock().unwrap() = branch.into();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| MUTATING.iter().any(|m| c.starts_with(m)))
            .collect()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl Vcs for FakeVcs {
    fn is_repository(&self) -> bool {
        self.is_repo
    }

    fn operation_in_progress(&self) -> Option<String> {
        self.operation.clone()
    }

    fn diff(&self, staged_only: bool) -> Result<String> {
        self.record(format!("diff:{staged_only}"));
        Ok(if staged_only {
            self.staged_diff.clone()
        } else {
            self.worktree_diff.clone()
        })
    }

    fn diff_range(&self, base: &str) -> Result<String> {
        self.record(format!("diff_range:{base}"));
        Ok(self.range_diff.clone())
    }

    fn diff_staged_against(&self, rev: &str) -> Result<String> {
        self.record(format!("diff_staged_against:{rev}"));
        Ok(self.staged_diff.clone())
    }

    fn commit_log(&self, since: Option<&str>) -> Result<Vec<LogEntry>> {
        self.record(format!("commit_log:{}", since.unwrap_or("-")));
        Ok(self.log.clone())
    }

    fn latest_tag(&self) -> Result<Option<String>> {
        Ok(self.tag.clone())
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.branch.lock().unwrap().clone())
    }

    fn has_upstream(&self) -> Result<bool> {
        Ok(self.upstream)
    }

    fn has_staged_changes(&self) -> Result<bool> {
        Ok(self.staged)
    }

    fn stage_tracked(&self) -> Result<()> {
        self.record("stage_tracked");
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        self.record(format!("commit:{message}"));
        Ok("1a2b3c4".into())
    }

    fn amend_commit(&self, message: Option<&str>) -> Result<String> {
        self.record(format!("amend:{}", message.unwrap_or("--no-edit")));
        Ok("5d6e7f8".into())
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.record(format!("checkout:{branch}"));
        *self.branch.lock().unwrap() = branch.into();
        Ok(())
    }

    fn pull(&self) -> Result<()> {
        self.record("pull");
        match &self.pull_failure {
            Some(reason) => Err(Error::Git(reason.clone())),
            None => Ok(()),
        }
    }

    fn rebase(&self, onto: &str) -> Result<RebaseOutcome> {
        self.record(format!("rebase:{onto}"));
        Ok(self.rebase)
    }

    fn push(&self, branch: &str, set_upstream: bool) -> Result<()> {
        self.record(format!("push:{branch}:{set_upstream}"));
        match &self.push_rejection {
            Some(reason) => Err(Error::PushRejected(reason.clone())),
            None => Ok(()),
        }
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        self.record(format!("create_branch:{name}"));
        *self.branch.lock().unwrap() = name.into();
        Ok(())
    }
}

// ─── PrTool ──────────────────────────────────────────────────────────────────

pub struct FakePr {
    pub available: bool,
    pub created: Mutex<Vec<(String, String, String, String)>>,
}

impl Default for FakePr {
    fn default() -> Self {
        Self {
            available: true,
            created: Mutex::new(Vec::new()),
        }
    }
}

impl PrTool for FakePr {
    fn is_available(&self) -> bool {
        self.available
    }

    fn create_pull_request(
        &self,
        base: &str,
        head: &str,
        title: &str,
        body: &str,
    ) -> Result<String> {
        self.created.lock().unwrap().push((
            base.into(),
            head.into(),
            title.into(),
            body.into(),
        ));
        Ok("https://github.com/acme/repo/pull/42".into())
    }
}

// ─── Completion ──────────────────────────────────────────────────────────────

pub enum Reply {
    Text(&'static str),
    Fail(fn() -> Error),
}

/// Replays canned replies in order and records every prompt it was sent.
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Reply>>,
    pub prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedCompletion {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn texts(texts: &[&'static str]) -> Self {
        Self::new(texts.iter().map(|t| Reply::Text(*t)).collect())
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompt(&self, i: usize) -> Prompt {
        self.prompts.lock().unwrap()[i].clone()
    }
}

#[async_trait]
impl Completion for ScriptedCompletion {
    async fn complete(&self, prompt: &Prompt) -> Result<CompletionResult> {
        self.prompts.lock().unwrap().push(prompt.clone());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Text(text)) => Ok(CompletionResult {
                text: text.into(),
                usage: Usage::default(),
            }),
            Some(Reply::Fail(make)) => Err(make()),
            None => panic!("completion script exhausted"),
        }
    }
}

// ─── Interaction ─────────────────────────────────────────────────────────────

pub struct ScriptedInteraction {
    pub interactive: bool,
    answers: Mutex<VecDeque<bool>>,
    manual: Mutex<VecDeque<Option<String>>>,
    pub confirmed: Mutex<Vec<String>>,
    pub statuses: Mutex<Vec<String>>,
}

impl ScriptedInteraction {
    /// A non-terminal session: nothing is ever asked.
    pub fn headless() -> Self {
        Self::new(false, Vec::new(), Vec::new())
    }

    pub fn answering(answers: Vec<bool>) -> Self {
        Self::new(true, answers, Vec::new())
    }

    pub fn new(interactive: bool, answers: Vec<bool>, manual: Vec<Option<String>>) -> Self {
        Self {
            interactive,
            answers: Mutex::new(answers.into()),
            manual: Mutex::new(manual.into()),
            confirmed: Mutex::new(Vec::new()),
            statuses: Mutex::new(Vec::new()),
        }
    }
}

impl Interaction for ScriptedInteraction {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn status(&self, message: &str) {
        self.statuses.lock().unwrap().push(message.into());
    }

    fn show_prompt(&self, _prompt: &Prompt) {}

    fn begin_wait(&self, _label: &str) {}

    fn end_wait(&self) {}

    fn confirm(&self, _question: &str, artifact: &str) -> Result<bool> {
        self.confirmed.lock().unwrap().push(artifact.into());
        Ok(self.answers.lock().unwrap().pop_front().unwrap_or(false))
    }

    fn manual_message(&self, _reason: &str) -> Result<Option<String>> {
        Ok(self.manual.lock().unwrap().pop_front().flatten())
    }
}
