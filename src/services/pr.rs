// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use std::path::PathBuf;

use tracing::debug;

use crate::error::{Error, Result};

/// Pull-request host collaborator.
pub trait PrTool {
    fn is_available(&self) -> bool;

    /// Opens a PR from `head` into `base` and returns its URL.
    fn create_pull_request(&self, base: &str, head: &str, title: &str, body: &str)
    -> Result<String>;
}

/// The GitHub CLI (`gh`).
pub struct GhCli {
    work_dir: PathBuf,
}

impl GhCli {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }
}

impl PrTool for GhCli {
    fn is_available(&self) -> bool {
        std::process::Command::new("gh")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn create_pull_request(
        &self,
        base: &str,
        head: &str,
        title: &str,
        body: &str,
    ) -> Result<String> {
        debug!(base, head, "gh pr create");
        let output = std::process::Command::new("gh")
            .args([
                "pr", "create", "--base", base, "--head", head, "--title", title, "--body", body,
            ])
            .current_dir(&self.work_dir)
            .output()
            .map_err(|_| Error::PrToolUnavailable)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::PrTool(stderr.trim().to_string()));
        }

        Ok(pr_url(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// `gh pr create` prints the PR URL as its last line.
fn pr_url(stdout: &str) -> String {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| l.starts_with("http"))
        .or_else(|| stdout.lines().rev().map(str::trim).find(|l| !l.is_empty()))
        .unwrap_or_default()
        .to_string()
}
