/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (認証解決 / trace)
 * - 失効 sweep タスクの起動、axum::serve() で起動
 */
use std::sync::Arc;
use std::time::Duration;
use std::{panic, process};

use anyhow::Result;
use axum::Router;
use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repos::{ProductRepo, UserRepo};
use crate::services::auth::{RevocationStore, Role, TokenService};
use crate::services::password;
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,catalog_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get "lost"
        // (stderr can be hidden depending on how the process is launched.)
        tracing::error!(?info, "panic");

        // In development, fail fast: crash the whole process so we notice immediately.
        // In production, prefer the default behavior (stderr) and let the server keep running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    let abort_on_panic = !config.app_env.is_production();
    init_panic_hook(abort_on_panic);

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    seed_admin(&state, &config)?;
    spawn_revocation_sweep(
        Arc::clone(&state.revocations),
        Duration::from_secs(config.revocation_sweep_interval_seconds),
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build process-level services once and inject them into the shared state.
/// Every request handler sees the same instances by reference.
pub fn build_state(config: &Config) -> Result<AppState> {
    let tokens = Arc::new(TokenService::new(
        &config.token_secret,
        config.token_ttl_seconds,
    ));
    let revocations = Arc::new(RevocationStore::new(
        config.revocation_sweep_threshold,
        config.token_ttl_seconds,
    ));

    Ok(AppState::new(
        tokens,
        revocations,
        Arc::new(UserRepo::new()),
        Arc::new(ProductRepo::new()),
    ))
}

pub fn build_router(state: AppState) -> Router {
    let api = middleware::auth::apply(api::v1::routes(), state.clone());

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bootstrap admin account (in-memory store starts empty on every boot).
fn seed_admin(state: &AppState, config: &Config) -> Result<()> {
    let (Some(email), Some(raw)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };
    if state.users.find_by_email(email)?.is_some() {
        return Ok(());
    }
    let hash = password::hash_password(raw)?;
    state.users.create("Administrator", email, &hash, Role::Admin)?;
    tracing::info!("seeded bootstrap admin account");
    Ok(())
}

/// Periodic revocation sweep, independent of request traffic. The store's
/// own threshold keeps this a no-op while the set is small.
fn spawn_revocation_sweep(revocations: Arc<RevocationStore>, every: Duration) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval の初回 tick は即時に返るので読み捨てる
        tick.tick().await;
        loop {
            tick.tick().await;
            let removed = revocations.sweep(Utc::now().timestamp());
            if removed > 0 {
                tracing::info!(removed, remaining = revocations.len(), "revocation sweep");
            }
        }
    });
}
