// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use comixtral::config::Config;
use comixtral::error::Error;

// ─── Default values ──────────────────────────────────────────────────────────

#[test]
fn default_config_values() {
    let config = Config::default();
    assert_eq!(config.model, "mistral-small-latest");
    assert_eq!(config.pr_model, "codestral-latest");
    assert_eq!(config.api_base_url, "https://api.mistral.ai/v1");
    assert!(config.api_key.is_none());
    assert_eq!(config.timeout_secs, 60);
    assert!((config.temperature - 0.7).abs() < f32::EPSILON);
    assert!((config.top_p - 1.0).abs() < f32::EPSILON);
    assert_eq!(config.random_seed, Some(1337));
    assert_eq!(config.commit_diff_chars, 2000);
    assert_eq!(config.pr_diff_chars, 8000);
    assert_eq!(config.commit_max_tokens, 50);
    assert_eq!(config.summary_max_tokens, 1024);
    assert_eq!(config.title_max_tokens, 100);
    assert_eq!(config.max_attempts, 3);
    assert_eq!(config.trunk_branch, "main");
    assert_eq!(config.remote, "origin");
    assert!(config.push);
}

#[test]
fn defaults_validate() {
    Config::default().validate().unwrap();
}

#[test]
fn missing_key_is_reported() {
    assert!(matches!(
        Config::default().api_key(),
        Err(Error::MissingCredential)
    ));
}

// ─── TOML deserialization ────────────────────────────────────────────────────

#[test]
fn load_from_valid_toml() {
    let toml_str = r#"
model = "mistral-large-latest"
pr_model = "mistral-large-latest"
api_base_url = "http://localhost:8080/v1"
commit_diff_chars = 4000
pr_diff_chars = 16000
max_attempts = 5
trunk_branch = "develop"
push = false
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.model, "mistral-large-latest");
    assert_eq!(config.api_base_url, "http://localhost:8080/v1");
    assert_eq!(config.commit_diff_chars, 4000);
    assert_eq!(config.pr_diff_chars, 16000);
    assert_eq!(config.max_attempts, 5);
    assert_eq!(config.trunk_branch, "develop");
    assert!(!config.push);
    config.validate().unwrap();
}

#[test]
fn load_partial_toml_uses_defaults() {
    let config: Config = toml::from_str(r#"model = "open-mistral-nemo""#).unwrap();
    assert_eq!(config.model, "open-mistral-nemo");
    // Everything else should be default
    assert_eq!(config.pr_model, "codestral-latest");
    assert_eq!(config.commit_diff_chars, 2000);
    assert_eq!(config.random_seed, Some(1337));
    assert!(config.push);
}

#[test]
fn api_key_is_never_read_from_serde() {
    let config: Config = toml::from_str(r#"api_key = "sk-in-file""#).unwrap();
    assert!(config.api_key.is_none());
}

#[test]
fn api_key_is_never_serialized() {
    let mut config = Config::default();
    config.api_key = Some("sk-secret".to_string().into());
    let rendered = toml::to_string_pretty(&config).unwrap();
    assert!(!rendered.contains("sk-secret"));
    assert!(!rendered.contains("api_key"));
}

#[test]
fn invalid_toml_returns_error() {
    let result: std::result::Result<Config, _> = toml::from_str("model = [invalid");
    assert!(result.is_err(), "invalid TOML should return an error");
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn rejects(mutate: impl FnOnce(&mut Config)) -> String {
    let mut config = Config::default();
    mutate(&mut config);
    match config.validate() {
        Err(Error::Config(msg)) => msg,
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn rejects_bad_base_url() {
    assert!(rejects(|c| c.api_base_url = "not a url".into()).contains("api_base_url"));
    assert!(rejects(|c| c.api_base_url = "ftp://example.com".into()).contains("http"));
}

#[test]
fn rejects_out_of_range_budgets() {
    assert!(rejects(|c| c.commit_diff_chars = 10).contains("commit_diff_chars"));
    assert!(rejects(|c| c.pr_diff_chars = 1_000_000).contains("pr_diff_chars"));
    assert!(rejects(|c| c.title_max_tokens = 0).contains("title_max_tokens"));
}

#[test]
fn rejects_bad_retry_settings() {
    assert!(rejects(|c| c.max_attempts = 0).contains("max_attempts"));
    assert!(rejects(|c| c.retry_initial_ms = 10_000).contains("retry_initial_ms"));
}

#[test]
fn rejects_bad_sampling() {
    assert!(rejects(|c| c.temperature = 2.0).contains("temperature"));
    assert!(rejects(|c| c.top_p = 0.0).contains("top_p"));
}

#[test]
fn rejects_empty_names() {
    assert!(rejects(|c| c.model = " ".into()).contains("model"));
    assert!(rejects(|c| c.remote = String::new()).contains("remote"));
}

// ─── Default file ────────────────────────────────────────────────────────────

#[test]
fn default_file_content_parses_and_validates() {
    // Mirrors what `comixtral init` writes
    let content = r#"
api_base_url = "https://api.mistral.ai/v1"
model = "mistral-small-latest"
pr_model = "codestral-latest"
commit_diff_chars = 2000
pr_diff_chars = 8000
commit_max_tokens = 50
summary_max_tokens = 1024
title_max_tokens = 100
max_attempts = 3
retry_initial_ms = 500
retry_max_ms = 8000
trunk_branch = "main"
remote = "origin"
push = true
"#;
    let config: Config = toml::from_str(content).unwrap();
    config.validate().unwrap();
}
