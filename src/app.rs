// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use std::cell::RefCell;
use std::io::IsTerminal;
use std::time::Duration;

use async_trait::async_trait;
use console::style;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::domain::Prompt;
use crate::error::{Error, Result};
use crate::router::{Interaction, Outcome, ReleaseNoteRequest, Router, RunOptions};
use crate::services::completion::{Completion, CompletionClient, CompletionResult};
use crate::services::driver::{AmendOutcome, UpdateState};
use crate::services::git::GitCli;
use crate::services::pr::GhCli;

pub struct App {
    cli: Cli,
    config: Config,
    cancel_token: CancellationToken,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self> {
        let config = Config::load(&cli)?;
        if cli.needs_model() {
            config.api_key()?;
        }
        debug!(
            model = %config.model,
            pr_model = %config.pr_model,
            commit_diff_chars = config.commit_diff_chars,
            pr_diff_chars = config.pr_diff_chars,
            "config loaded"
        );
        let cancel_token = CancellationToken::new();
        Ok(Self {
            cli,
            config,
            cancel_token,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup Ctrl+C handler with CancellationToken
        let cancel = self.cancel_token.clone();
        tokio::spawn(async move {
            signal::ctrl_c().await.ok();
            cancel.cancel();
        });

        match self.cli.command {
            Some(Commands::Init) => {
                let path = Config::create_default()?;
                println!("Created config: {}", path.display());
                return Ok(());
            }
            Some(Commands::Config) => return self.print_config(),
            Some(Commands::Completions { shell }) => {
                let mut cmd = <Cli as clap::CommandFactory>::command();
                clap_complete::generate(shell, &mut cmd, "comixtral", &mut std::io::stdout());
                return Ok(());
            }
            _ => {}
        }

        let outcome = if self.cli.needs_model() {
            let client = CompletionClient::new(&self.config)?;
            self.dispatch(&client).await?
        } else {
            self.dispatch(&Offline).await?
        };

        self.report(outcome);
        Ok(())
    }

    async fn dispatch<C: Completion>(&self, completion: &C) -> Result<Outcome> {
        let vcs = GitCli::discover(&self.config.remote)?;
        let gh = GhCli::new(vcs.work_dir());
        let ui = TerminalInteraction::new();
        let options = RunOptions {
            dry_run: self.cli.dry_run,
            yes: self.cli.yes,
            show_prompt: self.cli.show_prompt,
        };
        let router = Router::new(
            &self.config,
            &vcs,
            &gh,
            completion,
            &ui,
            options,
            self.cancel_token.clone(),
        );

        match &self.cli.command {
            None => router.commit(self.cli.staged).await,
            Some(Commands::PrSummary { base }) => router.pr_summary(base.as_deref()).await,
            Some(Commands::Amend { regenerate }) => router.amend(*regenerate).await,
            Some(Commands::Update { trunk }) => router.update(trunk.as_deref()).await,
            Some(Commands::PreparePr { base }) => router.prepare_pr(base).await,
            Some(Commands::ReleaseNote {
                since,
                version,
                date,
                no_ai,
            }) => {
                router
                    .release_note(ReleaseNoteRequest {
                        since: since.as_deref(),
                        version: version.as_deref(),
                        date: date.as_deref(),
                        no_ai: *no_ai,
                    })
                    .await
            }
            Some(Commands::Init | Commands::Config | Commands::Completions { .. }) => {
                Err(Error::Config("command does not operate on a repository".into()))
            }
        }
    }

    fn report(&self, outcome: Outcome) {
        match outcome {
            Outcome::Printed(text) => println!("{text}"),
            Outcome::Committed { message, receipt } => {
                println!("{} {}", receipt.hash, message);
                eprintln!("{} Committed!", style("✓").green().bold());
                match receipt.pushed {
                    Some(branch) => eprintln!("{} Pushed to {branch}", style("✓").green().bold()),
                    None => print_info("Not pushed"),
                }
            }
            Outcome::Amended(AmendOutcome::Amended { hash }) => {
                println!("{hash}");
                eprintln!("{} Amended last commit", style("✓").green().bold());
            }
            Outcome::Amended(AmendOutcome::NothingToAmend) => {
                print_info("Nothing staged; last commit left unchanged");
            }
            Outcome::Updated(state) => {
                if state == UpdateState::Done {
                    eprintln!("{} Branch is up to date", style("✓").green().bold());
                }
            }
            Outcome::PullRequest { title, receipt } => {
                if receipt.created_branch {
                    print_info(&format!("Created branch {}", receipt.head));
                }
                eprintln!("{} Opened: {title}", style("✓").green().bold());
                println!("{}", receipt.url);
            }
        }
    }

    fn print_config(&self) -> Result<()> {
        let rendered =
            toml::to_string_pretty(&self.config).map_err(|e| Error::Config(e.to_string()))?;
        print!("{rendered}");
        let key = if self.config.api_key.is_some() {
            style("configured").green()
        } else {
            style("missing").red()
        };
        println!("# api_key: {key}");
        if let Some(ref path) = Config::config_path() {
            let status = if path.exists() { "found" } else { "not found" };
            println!("# config file: {} ({status})", path.display());
        }
        Ok(())
    }
}

fn print_info(msg: &str) {
    eprintln!("{} {}", style("info:").cyan(), msg);
}

/// Completion stand-in for commands that never call the model.
struct Offline;

#[async_trait]
impl Completion for Offline {
    async fn complete(&self, _prompt: &Prompt) -> Result<CompletionResult> {
        Err(Error::MissingCredential)
    }
}

/// `dialoguer` prompts and an `indicatif` spinner on stderr.
pub struct TerminalInteraction {
    interactive: bool,
    spinner: RefCell<Option<ProgressBar>>,
}

impl TerminalInteraction {
    pub fn new() -> Self {
        Self {
            interactive: std::io::stdout().is_terminal() && std::io::stdin().is_terminal(),
            spinner: RefCell::new(None),
        }
    }
}

impl Default for TerminalInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl Interaction for TerminalInteraction {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn status(&self, message: &str) {
        eprintln!("{} {}", style("→").cyan(), message);
    }

    fn show_prompt(&self, prompt: &Prompt) {
        eprintln!("{}", style("--- PROMPT ---").dim());
        eprintln!("{}", prompt.text);
        eprintln!("{}", style("--- END PROMPT ---").dim());
    }

    fn begin_wait(&self, label: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(label.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        if let Some(old) = self.spinner.replace(Some(spinner)) {
            old.finish_and_clear();
        }
    }

    fn end_wait(&self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn confirm(&self, question: &str, artifact: &str) -> Result<bool> {
        eprintln!();
        eprintln!("{}", style(artifact).green());
        eprintln!();
        let confirmed = Confirm::new()
            .with_prompt(question)
            .default(true)
            .interact()?;
        Ok(confirmed)
    }

    fn manual_message(&self, reason: &str) -> Result<Option<String>> {
        eprintln!(
            "{} The model did not produce a usable commit message ({reason})",
            style("warning:").yellow().bold()
        );
        let message: String = Input::new()
            .with_prompt("Commit message (empty to abort)")
            .allow_empty(true)
            .interact_text()?;
        let message = message.trim().to_string();
        Ok((!message.is_empty()).then_some(message))
    }
}
