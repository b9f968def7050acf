// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for configuration loading and diagnostics.

use ideabox_config::{ConfigError, IdeaboxConfig, load_and_validate_str, load_config_from_str};

#[test]
fn full_document_deserializes() {
    let toml = r#"
[service]
name = "ideas-staging"
log_level = "debug"

[telegram]
bot_token = "123:ABC"
allowed_chats = [-1001234567890]
min_idea_chars = 5
max_idea_chars = 1000

[anthropic]
api_key = "sk-ant-123"
default_model = "claude-3-5-haiku-latest"

[storage]
database_path = "/tmp/ideas.db"
wal_mode = false

[rate_limit]
per_user = 2
global = 20
sweep_interval_secs = 600

[intake]
candidate_window = 25
llm_budget_secs = 30
system_prompt_file = "/etc/ideabox/prompt.md"

[gateway]
enabled = true
host = "0.0.0.0"
port = 9000
username = "admin"
password = "hunter2"
base_url = "https://ideas.example.com"
"#;

    let config = load_and_validate_str(toml).expect("valid config");
    assert_eq!(config.service.name, "ideas-staging");
    assert_eq!(config.telegram.allowed_chats, vec![-1001234567890]);
    assert_eq!(config.telegram.max_idea_chars, 1000);
    assert_eq!(config.anthropic.default_model, "claude-3-5-haiku-latest");
    assert_eq!(config.anthropic.api_version, "2023-06-01");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.rate_limit.per_user, 2);
    assert_eq!(config.intake.candidate_window, 25);
    assert_eq!(config.intake.enrich_max_tokens, 2000);
    assert_eq!(config.gateway.port, 9000);
    assert_eq!(config.gateway.base_url, "https://ideas.example.com");
}

#[test]
fn empty_document_yields_defaults() {
    let config = load_config_from_str("").expect("defaults");
    assert_eq!(config, IdeaboxConfig::default());
    assert_eq!(config.rate_limit.per_user, 5);
    assert_eq!(config.rate_limit.global, 50);
    assert_eq!(config.intake.candidate_window, 100);
    assert_eq!(config.intake.llm_budget_secs, 60);
    assert_eq!(config.intake.duplicate_max_tokens, 500);
    assert_eq!(config.telegram.min_idea_chars, 10);
    assert_eq!(config.gateway.port, 8080);
    assert!(config.storage.database_path.ends_with("ideas.db"));
}

#[test]
fn unknown_key_gets_suggestion() {
    let toml = "[rate_limit]\nper_usr = 3\n";
    let errors = load_and_validate_str(toml).expect_err("unknown key");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "per_usr");
            assert_eq!(suggestion.as_deref(), Some("per_user"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[metrics]\nenabled = true\n").expect_err("unknown section");
    assert!(matches!(&errors[0], ConfigError::UnknownKey { key, .. } if key == "metrics"));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[rate_limit]\nglobal = \"many\"\n").expect_err("bad type");
    assert!(matches!(&errors[0], ConfigError::InvalidType { key, .. } if key.contains("global")));
}

#[test]
fn validation_runs_after_successful_parse() {
    let errors = load_and_validate_str("[rate_limit]\nper_user = 0\n").expect_err("zero quota");
    assert!(matches!(
        &errors[0],
        ConfigError::Validation { message } if message.contains("per_user")
    ));
}
