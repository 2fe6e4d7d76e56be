// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use std::path::{Path, PathBuf};
use std::process::Output;

use tracing::debug;

use crate::domain::LogEntry;
use crate::error::{Error, Result};

/// Field separator for `git log --format`.
const LOG_SEP: char = '\u{1f}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebaseOutcome {
    Clean,
    Conflicted,
}

/// The git operations comixtral needs. Implemented by [`GitCli`] and by
/// in-memory fakes in tests.
pub trait Vcs {
    fn is_repository(&self) -> bool;

    /// Name of an in-progress merge/rebase/cherry-pick, if any.
    fn operation_in_progress(&self) -> Option<String>;

    /// Staged changes only, or staged + unstaged tracked changes.
    fn diff(&self, staged_only: bool) -> Result<String>;

    /// Changes on HEAD since it diverged from `base` (`base...HEAD`).
    fn diff_range(&self, base: &str) -> Result<String>;

    /// Staged tree against `rev`.
    fn diff_staged_against(&self, rev: &str) -> Result<String>;

    /// Commits in `since..HEAD` (all of HEAD when `None`), oldest first.
    fn commit_log(&self, since: Option<&str>) -> Result<Vec<LogEntry>>;

    fn latest_tag(&self) -> Result<Option<String>>;
    fn current_branch(&self) -> Result<String>;
    fn has_upstream(&self) -> Result<bool>;
    fn has_staged_changes(&self) -> Result<bool>;

    /// `git add -u`
    fn stage_tracked(&self) -> Result<()>;

    /// Returns the new commit's short hash.
    fn commit(&self, message: &str) -> Result<String>;

    /// Amends HEAD, keeping its message when `message` is `None`.
    fn amend_commit(&self, message: Option<&str>) -> Result<String>;

    fn checkout(&self, branch: &str) -> Result<()>;
    fn pull(&self) -> Result<()>;
    fn rebase(&self, onto: &str) -> Result<RebaseOutcome>;

    /// Never forces. A remote rejection maps to [`Error::PushRejected`].
    fn push(&self, branch: &str, set_upstream: bool) -> Result<()>;

    /// Creates `name` at HEAD and switches to it.
    fn create_branch(&self, name: &str) -> Result<()>;
}

pub struct GitCli {
    repo: gix::Repository,
    work_dir: PathBuf,
    remote: String,
}

impl GitCli {
    pub fn discover(remote: &str) -> Result<Self> {
        Self::discover_at(Path::new("."), remote)
    }

    pub fn discover_at(dir: &Path, remote: &str) -> Result<Self> {
        let repo = gix::discover(dir).map_err(|_| Error::NotAGitRepo)?;

        let work_dir = repo
            .workdir()
            .ok_or_else(|| Error::Git("Bare repository not supported".into()))?
            .to_path_buf();

        Ok(Self {
            repo,
            work_dir,
            remote: remote.to_string(),
        })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(args = ?args, "git");
        let output = std::process::Command::new("git")
            .args(args)
            .current_dir(&self.work_dir)
            .output()?;
        Ok(output)
    }

    /// Runs git and returns stdout, mapping a non-zero exit to `Error::Git`.
    fn run_ok(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        if !output.status.success() {
            return Err(Error::Git(stderr_of(&output)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn head_exists(&self) -> Result<bool> {
        Ok(self
            .run(&["rev-parse", "--verify", "--quiet", "HEAD"])?
            .status
            .success())
    }

    fn short_head(&self) -> Result<String> {
        Ok(self.run_ok(&["rev-parse", "--short", "HEAD"])?.trim().to_string())
    }
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

fn is_push_rejection(stderr: &str) -> bool {
    stderr.contains("[rejected]")
        || stderr.contains("[remote rejected]")
        || stderr.contains("non-fast-forward")
        || stderr.contains("fetch first")
}

impl Vcs for GitCli {
    fn is_repository(&self) -> bool {
        self.run(&["rev-parse", "--is-inside-work-tree"])
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn operation_in_progress(&self) -> Option<String> {
        use gix::state::InProgress;

        let name = match self.repo.state()? {
            InProgress::Merge => "merge",
            InProgress::Rebase | InProgress::RebaseInteractive => "rebase",
            InProgress::CherryPick | InProgress::CherryPickSequence => "cherry-pick",
            InProgress::Revert | InProgress::RevertSequence => "revert",
            InProgress::Bisect => "bisect",
            InProgress::ApplyMailbox | InProgress::ApplyMailboxRebase => "am",
        };
        Some(name.to_string())
    }

    fn diff(&self, staged_only: bool) -> Result<String> {
        // --no-ext-diff: don't use external diff tools
        let args: &[&str] = if staged_only || !self.head_exists()? {
            &["diff", "--cached", "--no-ext-diff", "--no-color"]
        } else {
            &["diff", "HEAD", "--no-ext-diff", "--no-color"]
        };
        self.run_ok(args)
    }

    fn diff_range(&self, base: &str) -> Result<String> {
        let range = format!("{base}...HEAD");
        self.run_ok(&["diff", "--no-ext-diff", "--no-color", &range])
    }

    fn diff_staged_against(&self, rev: &str) -> Result<String> {
        self.run_ok(&["diff", "--cached", "--no-ext-diff", "--no-color", rev])
    }

    fn commit_log(&self, since: Option<&str>) -> Result<Vec<LogEntry>> {
        let format = format!("--format=%h{LOG_SEP}%s");
        let range = since.map(|s| format!("{s}..HEAD"));
        let mut args = vec!["log", "--reverse", "--no-color", format.as_str()];
        args.push(range.as_deref().unwrap_or("HEAD"));

        let output = self.run(&args)?;
        if !output.status.success() {
            let stderr = stderr_of(&output);
            // Unborn branch
            if stderr.contains("does not have any commits yet") {
                return Ok(Vec::new());
            }
            return Err(Error::Git(stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(|line| line.split_once(LOG_SEP))
            .map(|(hash, subject)| LogEntry::new(hash, subject))
            .collect())
    }

    fn latest_tag(&self) -> Result<Option<String>> {
        let output = self.run(&["describe", "--tags", "--abbrev=0"])?;
        if !output.status.success() {
            return Ok(None);
        }
        let tag = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!tag.is_empty()).then_some(tag))
    }

    fn current_branch(&self) -> Result<String> {
        let output = self.run(&["symbolic-ref", "--short", "HEAD"])?;
        if !output.status.success() {
            return Err(Error::Git("HEAD is detached; check out a branch first".into()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn has_upstream(&self) -> Result<bool> {
        Ok(self
            .run(&["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"])?
            .status
            .success())
    }

    fn has_staged_changes(&self) -> Result<bool> {
        let output = self.run(&["diff", "--cached", "--quiet"])?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(Error::Git(stderr_of(&output))),
        }
    }

    fn stage_tracked(&self) -> Result<()> {
        self.run_ok(&["add", "-u"]).map(|_| ())
    }

    fn commit(&self, message: &str) -> Result<String> {
        self.run_ok(&["commit", "-m", message])?;
        self.short_head()
    }

    fn amend_commit(&self, message: Option<&str>) -> Result<String> {
        match message {
            Some(m) => self.run_ok(&["commit", "--amend", "-m", m])?,
            None => self.run_ok(&["commit", "--amend", "--no-edit"])?,
        };
        self.short_head()
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.run_ok(&["checkout", branch]).map(|_| ())
    }

    fn pull(&self) -> Result<()> {
        self.run_ok(&["pull"]).map(|_| ())
    }

    fn rebase(&self, onto: &str) -> Result<RebaseOutcome> {
        let output = self.run(&["rebase", onto])?;
        if output.status.success() {
            return Ok(RebaseOutcome::Clean);
        }
        // Conflicts leave the rebase in progress
        if self.operation_in_progress().is_some() {
            return Ok(RebaseOutcome::Conflicted);
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.contains("CONFLICT") {
            return Ok(RebaseOutcome::Conflicted);
        }
        Err(Error::Git(stderr_of(&output)))
    }

    fn push(&self, branch: &str, set_upstream: bool) -> Result<()> {
        let output = if set_upstream {
            self.run(&["push", "--set-upstream", &self.remote, branch])?
        } else {
            self.run(&["push"])?
        };
        if output.status.success() {
            return Ok(());
        }
        let stderr = stderr_of(&output);
        if is_push_rejection(&stderr) {
            return Err(Error::PushRejected(stderr));
        }
        Err(Error::Git(stderr))
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        self.run_ok(&["checkout", "-b", name]).map(|_| ())
    }
}
