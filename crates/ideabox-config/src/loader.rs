// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-based layered loading.
//!
//! Merge order, later wins: compiled defaults, `/etc/ideabox/ideabox.toml`,
//! `~/.config/ideabox/ideabox.toml`, `./ideabox.toml`, then `IDEABOX_*`
//! environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::IdeaboxConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/ideabox/ideabox.toml";
pub(crate) const LOCAL_CONFIG: &str = "ideabox.toml";

/// Top-level sections an environment variable may address.
const ENV_SECTIONS: &[&str] = &[
    "service",
    "telegram",
    "anthropic",
    "storage",
    "rate_limit",
    "intake",
    "gateway",
];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ideabox").join(LOCAL_CONFIG))
}

/// Builds the full layered figment without extracting it.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(IdeaboxConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

pub fn load_config() -> Result<IdeaboxConfig, figment::Error> {
    build_figment().extract()
}

/// Defaults plus an inline TOML document. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<IdeaboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(IdeaboxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Defaults, one explicit file, then the environment.
pub fn load_config_from_path(path: &Path) -> Result<IdeaboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(IdeaboxConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// `IDEABOX_RATE_LIMIT_PER_USER` becomes `rate_limit.per_user`.
///
/// Splitting on `_` would break keys such as `bot_token`, so only the first
/// matching section prefix is turned into a dot.
fn env_provider() -> Env {
    Env::prefixed("IDEABOX_").map(|key| {
        let key = key.as_str();
        ENV_SECTIONS
            .iter()
            .find_map(|section| {
                key.strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|field| format!("{section}.{field}"))
            })
            .unwrap_or_else(|| key.to_string())
            .into()
    })
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn env_overrides_local_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG,
                r#"
[rate_limit]
per_user = 3
global = 30
"#,
            )?;
            jail.set_env("IDEABOX_RATE_LIMIT_PER_USER", "7");
            jail.set_env("IDEABOX_TELEGRAM_BOT_TOKEN", "123:abc");

            let config = load_config().expect("should load");
            assert_eq!(config.rate_limit.per_user, 7);
            assert_eq!(config.rate_limit.global, 30);
            assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
            Ok(())
        });
    }

    #[test]
    fn env_list_value_is_parsed() {
        Jail::expect_with(|jail| {
            jail.set_env("IDEABOX_TELEGRAM_ALLOWED_CHATS", "[-100123, 42]");
            let config = load_config().expect("should load");
            assert_eq!(config.telegram.allowed_chats, vec![-100123, 42]);
            Ok(())
        });
    }

    #[test]
    fn explicit_path_is_loaded() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[gateway]\nport = 9090\n")?;
            let config = load_config_from_path(Path::new("custom.toml")).expect("should load");
            assert_eq!(config.gateway.port, 9090);
            Ok(())
        });
    }
}
