// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use tracing::debug;

use crate::domain::{DiffText, LogEntry};
use crate::error::{Error, Result};
use crate::services::git::Vcs;

/// Reads raw diffs and commit history from a [`Vcs`]. Empty results are
/// reported as [`Error::NoChanges`].
pub struct DiffCollector<'a, V: Vcs> {
    vcs: &'a V,
}

impl<'a, V: Vcs> DiffCollector<'a, V> {
    pub fn new(vcs: &'a V) -> Self {
        Self { vcs }
    }

    pub fn collect(&self, staged_only: bool) -> Result<DiffText> {
        self.ensure_repository()?;
        non_empty(self.vcs.diff(staged_only)?)
    }

    pub fn collect_range(&self, base: &str) -> Result<DiffText> {
        self.ensure_repository()?;
        non_empty(self.vcs.diff_range(base)?)
    }

    pub fn collect_staged_against(&self, rev: &str) -> Result<DiffText> {
        self.ensure_repository()?;
        non_empty(self.vcs.diff_staged_against(rev)?)
    }

    pub fn collect_commit_subjects(&self, since: Option<&str>) -> Result<Vec<LogEntry>> {
        self.ensure_repository()?;
        let entries = self.vcs.commit_log(since)?;
        debug!(since = ?since, count = entries.len(), "commit log collected");
        if entries.is_empty() {
            return Err(Error::NoChanges);
        }
        Ok(entries)
    }

    fn ensure_repository(&self) -> Result<()> {
        if self.vcs.is_repository() {
            Ok(())
        } else {
            Err(Error::NotAGitRepo)
        }
    }
}

fn non_empty(text: String) -> Result<DiffText> {
    let diff = DiffText::raw(text);
    debug!(chars = diff.char_len(), "diff collected");
    if diff.is_blank() {
        return Err(Error::NoChanges);
    }
    Ok(diff)
}
