// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::IdeaboxConfig;

/// Upper bound for `intake.llm_budget_secs`.
pub const MAX_LLM_BUDGET_SECS: u64 = 3600;

/// Validates a deserialized configuration, collecting every problem found.
pub fn validate_config(config: &IdeaboxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.rate_limit.per_user == 0 {
        fail("rate_limit.per_user must be at least 1".to_string());
    }
    if config.rate_limit.global == 0 {
        fail("rate_limit.global must be at least 1".to_string());
    }
    if config.rate_limit.sweep_interval_secs == 0 {
        fail("rate_limit.sweep_interval_secs must be at least 1".to_string());
    }

    if config.intake.candidate_window == 0 {
        fail("intake.candidate_window must be at least 1".to_string());
    }
    if config.intake.llm_budget_secs == 0 {
        fail("intake.llm_budget_secs must be at least 1".to_string());
    } else if config.intake.llm_budget_secs > MAX_LLM_BUDGET_SECS {
        fail(format!(
            "intake.llm_budget_secs ({}) must not exceed {MAX_LLM_BUDGET_SECS}",
            config.intake.llm_budget_secs
        ));
    }
    if config.intake.enrich_max_tokens == 0 || config.intake.duplicate_max_tokens == 0 {
        fail("intake.enrich_max_tokens and intake.duplicate_max_tokens must be positive".to_string());
    }

    let telegram = &config.telegram;
    if telegram.min_idea_chars > telegram.max_idea_chars {
        fail(format!(
            "telegram.min_idea_chars ({}) must not exceed telegram.max_idea_chars ({})",
            telegram.min_idea_chars, telegram.max_idea_chars
        ));
    }

    let gateway = &config.gateway;
    let host = gateway.host.trim();
    let valid_host = host.parse::<std::net::IpAddr>().is_ok()
        || (!host.is_empty()
            && host
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-'));
    if !valid_host {
        fail(format!(
            "gateway.host `{host}` is not a valid IP address or hostname"
        ));
    }
    if gateway.enabled {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        if blank(&gateway.username) || blank(&gateway.password) {
            fail("gateway.username and gateway.password are required when the gateway is enabled".to_string());
        }
    }
    if !(gateway.base_url.starts_with("http://") || gateway.base_url.starts_with("https://")) {
        fail(format!(
            "gateway.base_url `{}` must start with http:// or https://",
            gateway.base_url
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &IdeaboxConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&IdeaboxConfig::default()).is_ok());
    }

    #[test]
    fn zero_quotas_are_rejected() {
        let mut config = IdeaboxConfig::default();
        config.rate_limit.per_user = 0;
        config.rate_limit.global = 0;
        let msgs = messages(&config);
        assert_eq!(msgs.len(), 2);
        assert!(msgs.iter().any(|m| m.contains("rate_limit.per_user")));
        assert!(msgs.iter().any(|m| m.contains("rate_limit.global")));
    }

    #[test]
    fn zero_window_and_budget_are_rejected() {
        let mut config = IdeaboxConfig::default();
        config.intake.candidate_window = 0;
        config.intake.llm_budget_secs = 0;
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.contains("candidate_window")));
        assert!(msgs.iter().any(|m| m.contains("llm_budget_secs")));
    }

    #[test]
    fn oversized_budget_is_rejected() {
        let mut config = IdeaboxConfig::default();
        config.intake.llm_budget_secs = u64::MAX;
        let msgs = messages(&config);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("must not exceed 3600"));

        config.intake.llm_budget_secs = MAX_LLM_BUDGET_SECS;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn inverted_length_bounds_are_rejected() {
        let mut config = IdeaboxConfig::default();
        config.telegram.min_idea_chars = 500;
        config.telegram.max_idea_chars = 100;
        assert!(messages(&config)[0].contains("min_idea_chars"));
    }

    #[test]
    fn enabled_gateway_needs_credentials() {
        let mut config = IdeaboxConfig::default();
        config.gateway.enabled = true;
        config.gateway.username = Some("admin".into());
        config.gateway.password = Some("  ".into());
        assert!(messages(&config)[0].contains("gateway.password"));

        config.gateway.password = Some("secret".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn bad_host_and_base_url_are_rejected() {
        let mut config = IdeaboxConfig::default();
        config.gateway.host = "not a host!".into();
        config.gateway.base_url = "localhost:8080".into();
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.contains("gateway.host")));
        assert!(msgs.iter().any(|m| m.contains("gateway.base_url")));
    }
}
