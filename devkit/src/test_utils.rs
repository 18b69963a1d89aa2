/*!
Test Harness pour la coquille SkyMonitor

Câble une `Shell` complète sur les stubs du devkit :
- document en mémoire avec le gabarit de base
- historique en mémoire
- temps virtuel (horloge + minuteries manuelles)
- backend simulé (`StubFetcher`)

Le harness exécute lui-même les `Outgoing` : `settle` vide la file réseau
jusqu'à stabilité, `advance` fait avancer le temps en déclenchant les
minuteries dans l'ordre.
*/

use crate::fetch_stub::StubFetcher;
use crate::host_stub::{ManualClock, ManualTimers};
use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use skymonitor_shell::dom::MemoryDocument;
use skymonitor_shell::navigation::MAIN_CONTENT_ID;
use skymonitor_shell::runtime::execute;
use skymonitor_shell::{
    ClickedElement, Clock, Host, MemoryHistory, Millis, NavDisplay, Outgoing, Shell,
    ShellConfig, ShellEvent,
};
use std::sync::Arc;

pub struct TestHarness {
    pub shell: Shell<StdRng>,
    pub fetcher: StubFetcher,
    pub clock: ManualClock,
    pub timers: ManualTimers,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(ShellConfig::default())
    }

    pub fn with_config(config: ShellConfig) -> Self {
        env_logger::try_init().ok(); // Init logging pour tests

        let clock = ManualClock::new();
        let timers = ManualTimers::new(clock.clone());
        let host = Host {
            document: Box::new(MemoryDocument::shell_layout(&config.metrics.display)),
            history: Box::new(MemoryHistory::new(&config.navigation.initial_path)),
            timers: Box::new(timers.clone()),
            clock: Arc::new(clock.clone()),
        };
        // graine fixe : marche aléatoire reproductible
        let shell = Shell::with_rng(&config, host, StdRng::seed_from_u64(7));

        Self { shell, fetcher: StubFetcher::new(), clock, timers }
    }

    /// Enregistre une page complète servie pour `path`.
    pub fn page(&self, path: &str, html: &str) -> &Self {
        self.fetcher.respond(path, html);
        self
    }

    /// Page standard dont la région de contenu vaut `content`.
    pub fn content_page(&self, path: &str, content: &str) -> &Self {
        let html = format!(
            r#"<!DOCTYPE html><html><head><title>SkyMonitor</title></head><body><nav class="navbar"></nav><div class="page-content">{content}</div></body></html>"#
        );
        self.page(path, &html)
    }

    pub fn api(&self, path: &str, body: &Value) -> &Self {
        self.fetcher.respond_json(path, body);
        self
    }

    pub fn boot(&mut self) {
        self.shell.boot();
        log::info!("🚀 Shell booted at {}", self.now());
    }

    /// Clic sur un lien `data-route` ; `false` si non intercepté.
    pub fn click_link(&mut self, href: &str) -> bool {
        self.shell.click(&[ClickedElement::route_link(href)])
    }

    pub fn navigate(&mut self, path: &str) {
        self.shell.handle(ShellEvent::Navigate(path.to_string()));
    }

    pub fn back(&mut self) {
        self.shell.handle(ShellEvent::Back);
    }

    pub fn forward(&mut self) {
        self.shell.handle(ShellEvent::Forward);
    }

    pub fn push(&mut self, event: ShellEvent) {
        self.shell.handle(event);
    }

    pub fn take_outgoing(&mut self) -> Vec<Outgoing> {
        self.shell.drain_outgoing()
    }

    /// Exécute une requête contre le backend simulé et réinjecte le résultat.
    pub async fn execute(&mut self, outgoing: Outgoing) {
        if let Some(event) = execute(outgoing, &self.fetcher).await {
            self.shell.handle(event);
        }
    }

    /// Exécute tout le travail réseau en file, y compris celui qu'il engendre.
    pub async fn settle(&mut self) -> usize {
        let mut executed = 0;
        loop {
            let pending = self.take_outgoing();
            if pending.is_empty() {
                return executed;
            }
            for outgoing in pending {
                self.execute(outgoing).await;
                executed += 1;
            }
        }
    }

    /// Avance le temps virtuel de `delta` ms en déclenchant les minuteries échues.
    pub fn advance(&mut self, delta: Millis) -> Result<()> {
        let target = self.now() + delta;
        let mut fired = 0usize;
        while let Some((id, due)) = self.timers.next_due(target) {
            self.clock.set(due);
            if !self.timers.fire(id) {
                anyhow::bail!("timer {id:?} vanished before firing");
            }
            self.shell.handle(ShellEvent::TimerFired(id));
            fired += 1;
            if fired > 100_000 {
                anyhow::bail!("timer storm while advancing to {target}");
            }
        }
        self.clock.set(target);
        Ok(())
    }

    pub fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    pub fn display(&self) -> NavDisplay {
        self.shell.nav_display()
    }

    pub fn main_content(&self) -> Option<String> {
        self.shell.document().inner_html(MAIN_CONTENT_ID)
    }

    pub fn html(&self, id: &str) -> Option<String> {
        self.shell.document().inner_html(id)
    }

    pub fn history_path(&self) -> String {
        self.shell.history().current()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
