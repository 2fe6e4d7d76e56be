// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::error::{Error, Result};

/// Fallback variables checked when `COMIXTRAL_API_KEY` is unset, in order.
pub const API_KEY_ENV_FALLBACKS: &[&str] = &["MISTRAL_API_KEY", "MIXTRAL_API_KEY"];

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Model used for commit messages, PR summaries and release notes
    #[serde(default = "default_model")]
    pub model: String,

    /// Model used for PR title/description generation
    #[serde(default = "default_pr_model")]
    pub pr_model: String,

    /// Base URL of the chat-completions API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Never serialized; loaded from env or config file
    #[serde(skip)]
    pub api_key: Option<SecretString>,

    /// Request timeout in seconds (default 60)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Fixed seed keeps generations reproducible for identical prompts
    #[serde(default = "default_random_seed")]
    pub random_seed: Option<u64>,

    /// Diff budget (characters) for commit messages
    #[serde(default = "default_commit_diff_chars")]
    pub commit_diff_chars: usize,

    /// Diff budget (characters) for PR descriptions
    #[serde(default = "default_pr_diff_chars")]
    pub pr_diff_chars: usize,

    #[serde(default = "default_commit_max_tokens")]
    pub commit_max_tokens: u32,

    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: u32,

    #[serde(default = "default_title_max_tokens")]
    pub title_max_tokens: u32,

    /// Total attempts per completion call on transient failures
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_initial_ms")]
    pub retry_initial_ms: u64,

    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,

    /// Branch that `update` rebases onto and PR flows compare against
    #[serde(default = "default_trunk_branch")]
    pub trunk_branch: String,

    #[serde(default = "default_remote")]
    pub remote: String,

    /// Push after committing (default: true)
    #[serde(default = "default_true")]
    pub push: bool,
}

fn default_true() -> bool {
    true
}
fn default_model() -> String {
    "mistral-small-latest".into()
}
fn default_pr_model() -> String {
    "codestral-latest".into()
}
fn default_api_base_url() -> String {
    "https://api.mistral.ai/v1".into()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    1.0
}
fn default_random_seed() -> Option<u64> {
    Some(1337)
}
fn default_commit_diff_chars() -> usize {
    2_000
}
fn default_pr_diff_chars() -> usize {
    8_000
}
fn default_commit_max_tokens() -> u32 {
    50
}
fn default_summary_max_tokens() -> u32 {
    1_024
}
fn default_title_max_tokens() -> u32 {
    100
}
fn default_max_attempts() -> u32 {
    3
}
fn default_retry_initial_ms() -> u64 {
    500
}
fn default_retry_max_ms() -> u64 {
    8_000
}
fn default_trunk_branch() -> String {
    "main".into()
}
fn default_remote() -> String {
    "origin".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            pr_model: default_pr_model(),
            api_base_url: default_api_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            random_seed: default_random_seed(),
            commit_diff_chars: default_commit_diff_chars(),
            pr_diff_chars: default_pr_diff_chars(),
            commit_max_tokens: default_commit_max_tokens(),
            summary_max_tokens: default_summary_max_tokens(),
            title_max_tokens: default_title_max_tokens(),
            max_attempts: default_max_attempts(),
            retry_initial_ms: default_retry_initial_ms(),
            retry_max_ms: default_retry_max_ms(),
            trunk_branch: default_trunk_branch(),
            remote: default_remote(),
            push: default_true(),
        }
    }
}

impl Config {
    /// Load with priority: CLI > ENV > user config > project config > defaults
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Project-level config (.comixtral.toml in the working directory)
        if let Ok(cwd) = std::env::current_dir() {
            let project_config = cwd.join(".comixtral.toml");
            if project_config.exists() {
                figment = figment.merge(Toml::file(&project_config));
            }
        }

        if let Some(path) = Self::config_path()
            && path.exists()
        {
            figment = figment.merge(Toml::file(&path));
        }

        // COMIXTRAL_MODEL, COMIXTRAL_API_KEY, ...
        figment = figment.merge(Env::prefixed("COMIXTRAL_").split("__"));

        let mut config: Config = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        // api_key is skipped by serde so it never round-trips through
        // Serialized::defaults or `comixtral config`
        let key = figment
            .extract_inner::<String>("api_key")
            .ok()
            .or_else(|| {
                API_KEY_ENV_FALLBACKS
                    .iter()
                    .find_map(|var| std::env::var(var).ok())
            })
            .filter(|k| !k.trim().is_empty());
        config.api_key = key.map(SecretString::from);

        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "comixtral").map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// The credential for the completion endpoint, or `MissingCredential`.
    pub fn api_key(&self) -> Result<&SecretString> {
        self.api_key.as_ref().ok_or(Error::MissingCredential)
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref m) = cli.model {
            self.model = m.clone();
        }
        if cli.no_push {
            self.push = false;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() || self.pr_model.trim().is_empty() {
            return Err(Error::Config("model names cannot be empty".into()));
        }

        let url = url::Url::parse(&self.api_base_url).map_err(|e| {
            Error::Config(format!("api_base_url '{}' is invalid: {e}", self.api_base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "api_base_url must start with http:// or https://, got '{}'",
                self.api_base_url
            )));
        }

        if !(100..=200_000).contains(&self.commit_diff_chars) {
            return Err(Error::Config(format!(
                "commit_diff_chars must be 100–200000, got {}",
                self.commit_diff_chars
            )));
        }

        if !(100..=200_000).contains(&self.pr_diff_chars) {
            return Err(Error::Config(format!(
                "pr_diff_chars must be 100–200000, got {}",
                self.pr_diff_chars
            )));
        }

        for (name, value) in [
            ("commit_max_tokens", self.commit_max_tokens),
            ("summary_max_tokens", self.summary_max_tokens),
            ("title_max_tokens", self.title_max_tokens),
        ] {
            if !(10..=8_192).contains(&value) {
                return Err(Error::Config(format!(
                    "{name} must be 10–8192, got {value}"
                )));
            }
        }

        if !(1..=10).contains(&self.max_attempts) {
            return Err(Error::Config(format!(
                "max_attempts must be 1–10, got {}",
                self.max_attempts
            )));
        }

        if self.retry_initial_ms > self.retry_max_ms {
            return Err(Error::Config(format!(
                "retry_initial_ms ({}) cannot exceed retry_max_ms ({})",
                self.retry_initial_ms, self.retry_max_ms
            )));
        }

        if !(1..=3600).contains(&self.timeout_secs) {
            return Err(Error::Config(format!(
                "timeout_secs must be 1–3600, got {}",
                self.timeout_secs
            )));
        }

        if !(0.0..=1.5).contains(&self.temperature) {
            return Err(Error::Config(format!(
                "temperature must be 0.0–1.5, got {}",
                self.temperature
            )));
        }

        if !(0.0..=1.0).contains(&self.top_p) || self.top_p == 0.0 {
            return Err(Error::Config(format!(
                "top_p must be in (0.0, 1.0], got {}",
                self.top_p
            )));
        }

        if self.trunk_branch.trim().is_empty() || self.remote.trim().is_empty() {
            return Err(Error::Config("trunk_branch and remote cannot be empty".into()));
        }

        Ok(())
    }

    /// Create default config file with secure permissions
    pub fn create_default() -> Result<PathBuf> {
        let Some(dir) = Self::config_dir() else {
            return Err(Error::Config("Cannot determine config directory".into()));
        };

        fs::create_dir_all(&dir)?;

        let path = dir.join("config.toml");
        let content = r#"# comixtral configuration

# API key for the completion endpoint. Prefer the COMIXTRAL_API_KEY or
# MISTRAL_API_KEY environment variables over storing it here.
# api_key = ""

# Chat-completions endpoint and models
api_base_url = "https://api.mistral.ai/v1"
model = "mistral-small-latest"
pr_model = "codestral-latest"

# Diff budgets in characters
commit_diff_chars = 2000
pr_diff_chars = 8000

# Output token hints
commit_max_tokens = 50
summary_max_tokens = 1024
title_max_tokens = 100

# Retries on network errors, HTTP 5xx and 429
max_attempts = 3
retry_initial_ms = 500
retry_max_ms = 8000

# Branch used by `update` and the PR commands
trunk_branch = "main"
remote = "origin"

# Push after each generated commit
push = true
"#;

        fs::write(&path, content)?;

        // Set secure permissions (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)?;
        }

        Ok(path)
    }
}
