// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ideabox serve` command implementation.
//!
//! Opens SQLite storage, builds the Anthropic provider and the intake
//! pipeline, then runs the Telegram transport and the moderation gateway
//! until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use ideabox_anthropic::AnthropicProvider;
use ideabox_config::IdeaboxConfig;
use ideabox_core::{HealthStatus, IdeaboxError, PluginAdapter, ProviderAdapter, StorageAdapter};
use ideabox_gateway::{GatewayState, ServerConfig, start_server};
use ideabox_intake::{IntakePipeline, IntakeSettings, RateLimiter, load_instruction_template};
use ideabox_storage::SqliteStorage;
use ideabox_telegram::TelegramChannel;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::shutdown;

/// Hourly quotas refill completely after this long, so an idle bucket
/// older than it can be dropped without changing any decision.
const MIN_IDLE_BEFORE_EVICTION: Duration = Duration::from_secs(3600);

/// Extra time past the model budget that in-flight Telegram handlers get
/// to store and deliver their result on shutdown.
const DRAIN_GRACE: Duration = Duration::from_secs(30);

/// Runs the `ideabox serve` command.
pub async fn run_serve(config: IdeaboxConfig) -> Result<(), IdeaboxError> {
    init_tracing(&config.service.log_level);

    info!(name = %config.service.name, "starting ideabox serve");

    let storage = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage)
    };
    let storage_dyn: Arc<dyn StorageAdapter> = storage.clone();

    let provider: Arc<dyn ProviderAdapter> = Arc::new(AnthropicProvider::new(&config)?);
    let instructions =
        load_instruction_template(config.intake.system_prompt_file.as_deref()).await;

    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit.per_user,
        config.rate_limit.global,
    ));
    let pipeline = Arc::new(IntakePipeline::new(
        IntakeSettings::from_config(&config.intake),
        limiter.clone(),
        storage_dyn.clone(),
        provider,
        &instructions,
    ));

    let shutdown = shutdown::install_signal_handler();
    let mut tasks = JoinSet::new();

    tasks.spawn(sweep_rate_limiter(
        limiter,
        Duration::from_secs(config.rate_limit.sweep_interval_secs),
        shutdown.clone(),
    ));

    let mut transports = 0;

    if config.gateway.enabled {
        let server_config = ServerConfig::from_config(&config.gateway)?;
        let state = GatewayState::new(storage_dyn.clone());
        let token = shutdown.clone();
        tasks.spawn(async move {
            if let Err(e) = start_server(&server_config, state, token.clone()).await {
                error!(error = %e, "gateway failed, shutting down");
                token.cancel();
            }
        });
        transports += 1;
    }

    if config.telegram.bot_token.is_some() {
        let drain_timeout =
            Duration::from_secs(config.intake.llm_budget_secs).saturating_add(DRAIN_GRACE);
        let channel = TelegramChannel::new(&config.telegram, &config.gateway.base_url, pipeline)?
            .with_drain_timeout(drain_timeout);
        match channel.health_check().await? {
            HealthStatus::Healthy => info!("Telegram bot reachable"),
            HealthStatus::Degraded(reason) | HealthStatus::Unhealthy(reason) => {
                warn!(reason = %reason, "Telegram health check failed, polling anyway");
            }
        }
        let token = shutdown.clone();
        tasks.spawn(async move {
            channel.run(token).await;
        });
        transports += 1;
    } else {
        warn!("telegram.bot_token is not set, Telegram transport disabled");
    }

    if transports == 0 {
        warn!("neither Telegram nor the gateway is enabled, nothing to serve");
    }

    shutdown.cancelled().await;
    info!("shutting down");

    // The Telegram task drains its message handlers before it completes, so
    // storage is closed only after in-flight submissions are done.
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "background task panicked");
        }
    }

    storage.close().await?;
    info!("ideabox stopped");
    Ok(())
}

/// Evicts idle per-submitter buckets every `every` until shutdown.
async fn sweep_rate_limiter(limiter: Arc<RateLimiter>, every: Duration, shutdown: CancellationToken) {
    let max_idle = every.max(MIN_IDLE_BEFORE_EVICTION);
    let mut ticker = tokio::time::interval(every);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                let evicted = limiter.sweep_idle(max_idle);
                debug!(
                    evicted,
                    tracked = limiter.tracked_submitters(),
                    "rate limiter sweep"
                );
            }
        }
    }
}

/// Installs the global tracing subscriber. `RUST_LOG` wins over the config.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ideabox={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sweeper_stops_on_shutdown() {
        let limiter = Arc::new(RateLimiter::new(5, 50));
        assert!(limiter.allow(1));
        let token = CancellationToken::new();
        let handle = tokio::spawn(sweep_rate_limiter(
            limiter.clone(),
            Duration::from_secs(60),
            token.clone(),
        ));

        tokio::time::sleep(Duration::from_secs(180)).await;
        // Idle for three minutes, well under an hour: still tracked.
        assert_eq!(limiter.tracked_submitters(), 1);

        token.cancel();
        handle.await.unwrap();
    }
}
