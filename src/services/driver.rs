// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use tracing::{debug, info, warn};

use crate::domain::CommitMessage;
use crate::error::{Error, Result};
use crate::services::git::{RebaseOutcome, Vcs};
use crate::services::pr::PrTool;

const MAX_BRANCH_SLUG: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub hash: String,
    /// Branch pushed to, `None` when pushing was skipped.
    pub pushed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmendOutcome {
    Amended { hash: String },
    NothingToAmend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    Idle,
    CheckedOutTrunk,
    Pulled,
    Rebasing,
    Done,
    Conflicted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrReceipt {
    pub url: String,
    pub head: String,
    /// Set when a fresh branch was created off the base branch.
    pub created_branch: bool,
}

/// Applies validated artifacts to the repository. Nothing here talks to the
/// model, and callers only reach it after formatting succeeded.
pub struct GitDriver<'a, V: Vcs, P: PrTool> {
    vcs: &'a V,
    pr: &'a P,
}

impl<'a, V: Vcs, P: PrTool> GitDriver<'a, V, P> {
    pub fn new(vcs: &'a V, pr: &'a P) -> Self {
        Self { vcs, pr }
    }

    pub fn commit(
        &self,
        message: &CommitMessage,
        stage_tracked: bool,
        push: bool,
    ) -> Result<CommitReceipt> {
        if stage_tracked {
            self.vcs.stage_tracked()?;
        }

        let hash = self.vcs.commit(&message.header())?;
        info!(hash = %hash, "committed");

        if !push {
            return Ok(CommitReceipt { hash, pushed: None });
        }

        let branch = self.vcs.current_branch()?;
        let set_upstream = !self.vcs.has_upstream()?;
        self.vcs.push(&branch, set_upstream)?;
        info!(branch = %branch, set_upstream, "pushed");

        Ok(CommitReceipt {
            hash,
            pushed: Some(branch),
        })
    }

    /// Folds staged changes into HEAD. Never pushes.
    pub fn amend(&self, message: Option<&CommitMessage>) -> Result<AmendOutcome> {
        if !self.vcs.has_staged_changes()? {
            return Ok(AmendOutcome::NothingToAmend);
        }
        let header = message.map(CommitMessage::header);
        let hash = self.vcs.amend_commit(header.as_deref())?;
        Ok(AmendOutcome::Amended { hash })
    }

    /// `Idle → CheckedOutTrunk → Pulled → Rebasing → Done | Conflicted`.
    /// A conflict leaves the repository mid-rebase for the user to resolve;
    /// any other failure after leaving `branch` checks it out again.
    pub fn update(&self, trunk: &str) -> Result<UpdateState> {
        let branch = self.vcs.current_branch()?;
        let mut state = UpdateState::Idle;

        if branch == trunk {
            self.vcs.pull()?;
            transition(&mut state, UpdateState::Pulled);
            transition(&mut state, UpdateState::Done);
            return Ok(state);
        }

        self.vcs.checkout(trunk)?;
        transition(&mut state, UpdateState::CheckedOutTrunk);

        if let Err(e) = self.vcs.pull() {
            self.restore_branch(&branch);
            return Err(e);
        }
        transition(&mut state, UpdateState::Pulled);

        if let Err(e) = self.vcs.checkout(&branch) {
            self.restore_branch(&branch);
            return Err(e);
        }
        transition(&mut state, UpdateState::Rebasing);

        match self.vcs.rebase(trunk)? {
            RebaseOutcome::Clean => {
                transition(&mut state, UpdateState::Done);
                Ok(state)
            }
            RebaseOutcome::Conflicted => {
                transition(&mut state, UpdateState::Conflicted);
                Err(Error::RebaseConflict {
                    branch,
                    onto: trunk.to_string(),
                })
            }
        }
    }

    fn restore_branch(&self, branch: &str) {
        match self.vcs.checkout(branch) {
            Ok(()) => debug!(branch, "restored branch after failed update"),
            Err(e) => warn!(branch, error = %e, "could not return to branch"),
        }
    }

    /// Pushes HEAD (on a new branch when HEAD is `base`) and opens the PR.
    pub fn prepare_pr(&self, base: &str, title: &str, body: &str) -> Result<PrReceipt> {
        let current = self.vcs.current_branch()?;

        let (head, created_branch) = if current == base {
            let name = branch_slug(title);
            self.vcs.create_branch(&name)?;
            (name, true)
        } else {
            (current, false)
        };

        self.vcs.push(&head, true)?;
        let url = self.pr.create_pull_request(base, &head, title, body)?;
        info!(url = %url, head = %head, "pull request created");

        Ok(PrReceipt {
            url,
            head,
            created_branch,
        })
    }
}

fn transition(state: &mut UpdateState, next: UpdateState) {
    debug!(from = ?state, to = ?next, "update");
    *state = next;
}

/// Lowercase ASCII slug of `title`, usable as a branch name.
pub fn branch_slug(title: &str) -> String {
    let mut slug = String::new();
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug: String = slug.chars().take(MAX_BRANCH_SLUG).collect();
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "comixtral-pr".to_string()
    } else {
        slug.to_string()
    }
}
