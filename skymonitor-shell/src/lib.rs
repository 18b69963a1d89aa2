/**
 * SKYMONITOR SHELL - Coquille du tableau de bord, sans navigateur
 *
 * RÔLE :
 * Navigation par fragments (historique, séquences, initialiseurs de pages)
 * et arbitrage des métriques de la barre de navigation (live vs simulé).
 *
 * ARCHITECTURE :
 * Moteurs purs derrière des traits d'hôte (`Document`, `History`, `Timers`,
 * `Clock`, `Fetcher`) ; `Shell` les orchestre, `runtime` les branche sur
 * tokio, reqwest et MQTT.
 */

pub mod config;
pub mod dom;
pub mod events;
pub mod fetch;
pub mod format;
pub mod fragment;
pub mod host;
pub mod metrics;
pub mod models;
pub mod navigation;
pub mod notifier;
pub mod pages;
pub mod routes;
pub mod runtime;
pub mod scan;
pub mod shell;
pub mod state;

pub use config::{load_config, ShellConfig};
pub use dom::{Document, MemoryDocument};
pub use host::{Clock, History, MemoryHistory, Millis, SystemClock, TimerId, Timers};
pub use metrics::{LiveMetrics, MetricReading, MetricsEngine, Mode};
pub use navigation::{ClickedElement, LoadTicket, NavigationEngine};
pub use routes::Route;
pub use shell::{Host, NavDisplay, Outgoing, Shell, ShellEvent};
