/**
 * SKYMONITOR SHELL - Point d'entrée
 *
 * RÔLE : Bootstrap de la coquille headless : config, logs, backend HTTP,
 * canal MQTT, commandes stdin, boucle d'événements.
 */

use anyhow::{Context, Result};
use skymonitor_shell::runtime::commands::spawn_stdin_commands;
use skymonitor_shell::runtime::http::HttpFetcher;
use skymonitor_shell::runtime::mqtt::spawn_mqtt_listener;
use skymonitor_shell::runtime::run_event_loop;
use skymonitor_shell::runtime::timers::TokioTimers;
use skymonitor_shell::{load_config, Host, MemoryDocument, MemoryHistory, Shell, SystemClock};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Ok si .env n'existe pas

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skymonitor_shell=info")),
        )
        .init();

    let cfg = load_config().await;
    info!("backend {} / MQTT {}:{}", cfg.backend.base_url, cfg.mqtt.host, cfg.mqtt.port);

    let fetcher = Arc::new(HttpFetcher::new(&cfg.backend).context("client HTTP")?);
    let (tx, rx) = mpsc::unbounded_channel();

    let host = Host {
        document: Box::new(MemoryDocument::shell_layout(&cfg.metrics.display)),
        history: Box::new(MemoryHistory::new(&cfg.navigation.initial_path)),
        timers: Box::new(TokioTimers::new(tx.clone())),
        clock: Arc::new(SystemClock::new()),
    };
    let mut shell = Shell::new(&cfg, host);
    shell.boot();

    spawn_mqtt_listener(cfg.mqtt.clone(), tx.clone());
    spawn_stdin_commands(tx.clone());

    tokio::select! {
        _ = run_event_loop(&mut shell, fetcher, tx, rx) => {}
        _ = tokio::signal::ctrl_c() => info!("arrêt demandé"),
    }
    Ok(())
}
