// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

//! Command dispatch: diff → truncate → prompt → completion → format → git.
//!
//! The router is generic over its collaborators so the whole pipeline can be
//! driven with fakes. Every git mutation happens strictly after the artifact
//! has been validated and approved.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::Config;
use crate::domain::{CommitGroups, CommitMessage, DiffText, Prompt};
use crate::error::{Error, Result};
use crate::services::collector::DiffCollector;
use crate::services::completion::{Completion, CompletionResult};
use crate::services::driver::{AmendOutcome, CommitReceipt, GitDriver, PrReceipt, UpdateState};
use crate::services::formatter::ResponseFormatter;
use crate::services::git::Vcs;
use crate::services::pr::PrTool;
use crate::services::prompt::{PromptBuilder, PromptInput};
use crate::services::truncator::Truncator;

/// Terminal-facing seam: confirmations, status lines, manual fallbacks.
pub trait Interaction {
    fn is_interactive(&self) -> bool;

    fn status(&self, message: &str);

    fn show_prompt(&self, prompt: &Prompt);

    fn begin_wait(&self, label: &str);

    fn end_wait(&self);

    /// Shows `artifact` and asks `question`.
    fn confirm(&self, question: &str, artifact: &str) -> Result<bool>;

    /// Asks for a hand-written commit message; `None` gives up.
    fn manual_message(&self, reason: &str) -> Result<Option<String>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    pub yes: bool,
    pub show_prompt: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Artifact produced without touching the repository.
    Printed(String),
    Committed {
        message: String,
        receipt: CommitReceipt,
    },
    Amended(AmendOutcome),
    Updated(UpdateState),
    PullRequest {
        title: String,
        receipt: PrReceipt,
    },
}

pub struct ReleaseNoteRequest<'r> {
    pub since: Option<&'r str>,
    pub version: Option<&'r str>,
    pub date: Option<&'r str>,
    pub no_ai: bool,
}

enum Approval {
    Go,
    PrintOnly,
}

pub struct Router<'a, V, P, C, I>
where
    V: Vcs,
    P: PrTool,
    C: Completion,
    I: Interaction,
{
    config: &'a Config,
    vcs: &'a V,
    pr: &'a P,
    completion: &'a C,
    ui: &'a I,
    options: RunOptions,
    prompts: PromptBuilder,
    cancel: CancellationToken,
}

impl<'a, V, P, C, I> Router<'a, V, P, C, I>
where
    V: Vcs,
    P: PrTool,
    C: Completion,
    I: Interaction,
{
    pub fn new(
        config: &'a Config,
        vcs: &'a V,
        pr: &'a P,
        completion: &'a C,
        ui: &'a I,
        options: RunOptions,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            vcs,
            pr,
            completion,
            ui,
            options,
            prompts: PromptBuilder::new(config),
            cancel,
        }
    }

    fn collector(&self) -> DiffCollector<'a, V> {
        DiffCollector::new(self.vcs)
    }

    fn driver(&self) -> GitDriver<'a, V, P> {
        GitDriver::new(self.vcs, self.pr)
    }

    // ─── Commands ───────────────────────────────────────────────────────────

    pub async fn commit(&self, staged_only: bool) -> Result<Outcome> {
        self.ensure_mutable_repository()?;

        self.ui.status(if staged_only {
            "Reading staged changes..."
        } else {
            "Reading tracked changes..."
        });
        let raw = self.collector().collect(staged_only)?;

        let message = self.commit_message_for(&raw).await?;
        let line = message.header();

        if self.options.dry_run {
            return Ok(Outcome::Printed(line));
        }
        if let Approval::PrintOnly = self.approve("Create commit with this message?", &line)? {
            return Ok(Outcome::Printed(line));
        }

        self.check_cancelled()?;
        let receipt = self
            .driver()
            .commit(&message, !staged_only, self.config.push)?;

        Ok(Outcome::Committed {
            message: line,
            receipt,
        })
    }

    pub async fn pr_summary(&self, base: Option<&str>) -> Result<Outcome> {
        let base = match base {
            Some(b) => b.to_string(),
            None => self
                .vcs
                .latest_tag()?
                .unwrap_or_else(|| self.config.trunk_branch.clone()),
        };
        self.ui.status(&format!("Reading commits since {base}..."));
        let commits = self.collector().collect_commit_subjects(Some(&base))?;

        let prompt = self.prompts.build(PromptInput::PrSummary { commits: &commits });
        let summary = self
            .generate(|_| prompt.clone(), None, ResponseFormatter::pr_summary)
            .await?;
        Ok(Outcome::Printed(summary))
    }

    pub async fn amend(&self, regenerate: bool) -> Result<Outcome> {
        self.ensure_mutable_repository()?;

        if !self.vcs.has_staged_changes()? {
            return Ok(Outcome::Amended(AmendOutcome::NothingToAmend));
        }

        let message = if regenerate {
            let raw = self.collector().collect_staged_against("HEAD~1")?;
            Some(self.commit_message_for(&raw).await?)
        } else {
            None
        };

        let artifact = message
            .as_ref()
            .map(CommitMessage::header)
            .unwrap_or_else(|| "(keep the current commit message)".to_string());

        if self.options.dry_run {
            return Ok(Outcome::Printed(artifact));
        }
        if let Approval::PrintOnly = self.approve("Amend the last commit?", &artifact)? {
            return Ok(Outcome::Printed(artifact));
        }

        self.check_cancelled()?;
        let outcome = self.driver().amend(message.as_ref())?;
        Ok(Outcome::Amended(outcome))
    }

    pub async fn update(&self, trunk: Option<&str>) -> Result<Outcome> {
        self.ensure_mutable_repository()?;
        let trunk = trunk.unwrap_or(&self.config.trunk_branch);

        if self.options.dry_run {
            let branch = self.vcs.current_branch()?;
            let plan = if branch == trunk {
                format!("Would pull '{trunk}'")
            } else {
                format!("Would pull '{trunk}' and rebase '{branch}' onto it")
            };
            return Ok(Outcome::Printed(plan));
        }

        self.check_cancelled()?;
        self.ui.status(&format!("Updating from '{trunk}'..."));
        let state = self.driver().update(trunk)?;
        Ok(Outcome::Updated(state))
    }

    pub async fn prepare_pr(&self, base: &str) -> Result<Outcome> {
        self.ensure_mutable_repository()?;
        if !self.pr.is_available() {
            return Err(Error::PrToolUnavailable);
        }

        let branch = self.vcs.current_branch()?;
        let diff_base = if branch == base {
            format!("{}/{base}", self.config.remote)
        } else {
            base.to_string()
        };
        self.ui.status(&format!("Reading changes against {diff_base}..."));
        let raw = self.collector().collect_range(&diff_base)?;

        let description = self
            .generate(
                |budget| {
                    let diff = Truncator::fit(&raw, budget);
                    self.prompts.build(PromptInput::PrDescription { diff: &diff })
                },
                Some(self.config.pr_diff_chars),
                ResponseFormatter::pr_description,
            )
            .await?;

        let title_prompt = self.prompts.build(PromptInput::PrTitle {
            description: &description,
        });
        let title = self
            .generate(|_| title_prompt.clone(), None, ResponseFormatter::pr_title)
            .await?;

        let artifact = format!("{title}\n\n{description}");
        if self.options.dry_run {
            return Ok(Outcome::Printed(artifact));
        }
        let question = format!("Push and open a pull request into '{base}'?");
        if let Approval::PrintOnly = self.approve(&question, &artifact)? {
            return Ok(Outcome::Printed(artifact));
        }

        self.check_cancelled()?;
        let receipt = self.driver().prepare_pr(base, &title, &description)?;
        Ok(Outcome::PullRequest { title, receipt })
    }

    pub async fn release_note(&self, request: ReleaseNoteRequest<'_>) -> Result<Outcome> {
        let since = match request.since {
            Some(s) => Some(s.to_string()),
            None => self.vcs.latest_tag()?,
        };
        let commits = self.collector().collect_commit_subjects(since.as_deref())?;
        let groups = CommitGroups::from_log(&commits);

        let version = request.version.unwrap_or("Unreleased");
        let date = request
            .date
            .map(str::to_string)
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
        let heading = format!("## {version} ({date})");

        if request.no_ai {
            return Ok(Outcome::Printed(groups.render(&heading)));
        }

        let prompt = self.prompts.build(PromptInput::ReleaseNote {
            heading: &heading,
            groups: &groups,
        });
        let note = self
            .generate(
                |_| prompt.clone(),
                None,
                |raw| ResponseFormatter::release_note(&heading, raw),
            )
            .await;

        match note {
            Ok(note) => Ok(Outcome::Printed(note)),
            Err(Error::UnparsableResponse(reason)) => {
                warn!(reason = %reason, "model release note rejected, rendering locally");
                Ok(Outcome::Printed(groups.render(&heading)))
            }
            Err(e) => Err(e),
        }
    }

    // ─── Pipeline ───────────────────────────────────────────────────────────

    async fn commit_message_for(&self, raw: &DiffText) -> Result<CommitMessage> {
        let generated = self
            .generate(
                |budget| {
                    let diff = Truncator::fit(raw, budget);
                    debug!(chars = diff.char_len(), truncated = diff.truncated, "diff truncated");
                    self.prompts.build(PromptInput::Commit { diff: &diff })
                },
                Some(self.config.commit_diff_chars),
                ResponseFormatter::commit_message,
            )
            .await;

        match generated {
            Err(Error::UnparsableResponse(reason))
                if !self.options.yes && self.ui.is_interactive() =>
            {
                let Some(manual) = self.ui.manual_message(&reason)? else {
                    return Err(Error::Cancelled);
                };
                ResponseFormatter::commit_message(&manual)
            }
            other => other,
        }
    }

    /// One request, a halved budget on 413, and a single corrective
    /// regeneration when `validate` rejects the text.
    async fn generate<T, B, F>(&self, build: B, budget: Option<usize>, validate: F) -> Result<T>
    where
        B: Fn(usize) -> Prompt,
        F: Fn(&str) -> Result<T>,
    {
        let budget = budget.unwrap_or(usize::MAX);
        let mut prompt = build(budget);

        let result = match self.request(&prompt).await {
            Err(Error::PayloadTooLarge) if budget != usize::MAX => {
                let halved = budget / 2;
                warn!(budget, halved, "payload too large, retrying with a smaller diff");
                prompt = build(halved);
                self.request(&prompt).await?
            }
            other => other?,
        };

        match validate(&result.text) {
            Ok(value) => Ok(value),
            Err(Error::UnparsableResponse(reason)) => {
                warn!(kind = %prompt.kind, reason = %reason, "response rejected, regenerating");
                let corrected = prompt.with_correction(&result.text);
                let retry = self.request(&corrected).await?;
                validate(&retry.text)
            }
            Err(e) => Err(e),
        }
    }

    async fn request(&self, prompt: &Prompt) -> Result<CompletionResult> {
        self.check_cancelled()?;
        if self.options.show_prompt {
            self.ui.show_prompt(prompt);
        }

        self.ui.begin_wait(&format!("Generating {}...", prompt.kind));
        let result = tokio::select! {
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            r = self.completion.complete(prompt) => r,
        };
        self.ui.end_wait();
        result
    }

    // ─── Guards ─────────────────────────────────────────────────────────────

    fn ensure_mutable_repository(&self) -> Result<()> {
        if !self.vcs.is_repository() {
            return Err(Error::NotAGitRepo);
        }
        if let Some(op) = self.vcs.operation_in_progress() {
            return Err(Error::OperationInProgress(op));
        }
        Ok(())
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    fn approve(&self, question: &str, artifact: &str) -> Result<Approval> {
        if self.options.yes {
            return Ok(Approval::Go);
        }
        if !self.ui.is_interactive() {
            self.ui
                .status("Not a terminal. Use --yes to apply changes from scripts.");
            return Ok(Approval::PrintOnly);
        }
        if self.ui.confirm(question, artifact)? {
            Ok(Approval::Go)
        } else {
            Err(Error::Cancelled)
        }
    }
}
