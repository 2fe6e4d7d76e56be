// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "comixtral")]
#[command(version)]
#[command(
    about = "Conventional commits, PR descriptions and release notes from your git diff",
    long_about = None
)]
pub struct Cli {
    /// Model name
    #[arg(short, long, env = "COMIXTRAL_MODEL", global = true)]
    pub model: Option<String>,

    /// Only use staged changes (default: staged + unstaged tracked changes)
    #[arg(long)]
    pub staged: bool,

    /// Commit without pushing
    #[arg(long)]
    pub no_push: bool,

    /// Print the message only, don't commit
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Auto-confirm without prompting
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Show the prompt sent to the model
    #[arg(long, global = true)]
    pub show_prompt: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Summarize the commits since a base ref as a markdown PR summary
    PrSummary {
        /// Base ref (default: latest tag, else the trunk branch)
        #[arg(long)]
        base: Option<String>,
    },
    /// Fold staged changes into the last commit
    Amend {
        /// Generate a fresh message instead of keeping the current one
        #[arg(long)]
        regenerate: bool,
    },
    /// Pull the trunk branch and rebase the current branch onto it
    Update {
        /// Trunk branch (default: config trunk_branch)
        #[arg(long)]
        trunk: Option<String>,
    },
    /// Generate a PR title and description, push, and open the PR with gh
    PreparePr {
        /// Branch the PR targets
        base: String,
    },
    /// Render release notes from conventional commit history
    ReleaseNote {
        /// Start ref, exclusive (default: latest tag)
        #[arg(long)]
        since: Option<String>,
        /// Version shown in the heading (default: Unreleased)
        #[arg(long = "version", id = "release_version", value_name = "VERSION")]
        version: Option<String>,
        /// Date shown in the heading (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Render locally without calling the model
        #[arg(long)]
        no_ai: bool,
    },
    /// Initialize config file
    Init,
    /// Show current configuration
    Config,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    /// Whether the selected command talks to the completion endpoint.
    pub fn needs_model(&self) -> bool {
        match &self.command {
            None => true,
            Some(Commands::Amend { regenerate }) => *regenerate,
            Some(Commands::ReleaseNote { no_ai, .. }) => !no_ai,
            Some(Commands::PrSummary { .. }) | Some(Commands::PreparePr { .. }) => true,
            Some(Commands::Update { .. })
            | Some(Commands::Init)
            | Some(Commands::Config)
            | Some(Commands::Completions { .. }) => false,
        }
    }
}
