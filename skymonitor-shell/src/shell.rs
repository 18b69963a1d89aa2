/**
 * COQUILLE - Contexte unique du tableau de bord
 *
 * RÔLE :
 * Possède les moteurs (navigation, pages, métriques, notifications) et
 * l'hôte (document, historique, minuteries, horloge). Tous les événements
 * passent par `handle`, un à la fois : aucune concurrence interne.
 *
 * FONCTIONNEMENT :
 * - Les entrées (clics, popstate, minuteries, réponses réseau, pushs) sont
 *   des `ShellEvent`
 * - Le travail réseau est émis en `Outgoing` ; le runtime l'exécute et
 *   réinjecte le résultat sous forme d'événement
 */

use crate::config::ShellConfig;
use crate::dom::Document;
use crate::events::PushEvent;
use crate::fetch::FetchError;
use crate::host::{Clock, History, Millis, TimerId, Timers};
use crate::metrics::{MetricReading, MetricsEngine, Mode};
use crate::models::ScanRequest;
use crate::navigation::{ClickedElement, LoadOutcome, LoadTicket, NavigationEngine};
use crate::notifier::{NotificationKind, Notifier};
use crate::pages::{render_devices, render_live_stats, DataOutcome, DataTicket, PageInitializers};
use crate::scan::{render_progress, render_results, SCAN_PROGRESS_ID, SCAN_RESULTS_ID};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const CONNECTION_STATUS_ID: &str = "connection-status";

/// Facilités du navigateur prêtées à la coquille
pub struct Host {
    pub document: Box<dyn Document>,
    pub history: Box<dyn History>,
    pub timers: Box<dyn Timers>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone)]
pub enum ShellEvent {
    /// Chaîne d'éléments sous le clic, du plus interne vers la racine
    Click(Vec<ClickedElement>),
    Navigate(String),
    PopState(String),
    Back,
    Forward,
    Report,
    TimerFired(TimerId),
    FragmentFetched { ticket: LoadTicket, result: Result<String, FetchError> },
    PageDataFetched { ticket: DataTicket, result: Result<String, FetchError> },
    StartScan(ScanRequest),
    ScanAcknowledged(Result<String, FetchError>),
    Push(PushEvent),
}

/// Travail réseau à exécuter par le runtime
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    FetchFragment(LoadTicket),
    FetchPageData(DataTicket),
    StartScan(ScanRequest),
}

/// Valeurs affichées dans la barre de navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavDisplay {
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub disk: Option<String>,
    pub simulated_badge: bool,
}

pub struct Shell<R: Rng = StdRng> {
    host: Host,
    navigation: NavigationEngine,
    pages: PageInitializers,
    metrics: MetricsEngine<R>,
    notifier: Notifier,
    outgoing: Vec<Outgoing>,
}

impl Shell<StdRng> {
    pub fn new(config: &ShellConfig, host: Host) -> Self {
        Self::with_rng(config, host, StdRng::from_entropy())
    }
}

impl<R: Rng> Shell<R> {
    pub fn with_rng(config: &ShellConfig, host: Host, rng: R) -> Self {
        let initial = host.history.current();
        Self {
            navigation: NavigationEngine::new(&config.navigation, &initial),
            pages: PageInitializers::new(),
            metrics: MetricsEngine::with_rng(config.metrics.clone(), rng),
            notifier: Notifier::new(Duration::from_millis(config.notifications.duration_ms)),
            outgoing: Vec::new(),
            host,
        }
    }

    /// Démarrage : métriques simulées en attendant le live, puis chargement
    /// de la route courante de l'historique (sans nouvelle entrée).
    pub fn boot(&mut self) {
        let now = self.now();
        self.metrics.start(now, self.host.timers.as_mut(), self.host.document.as_mut());
        let path = self.host.history.current();
        info!("démarrage de la coquille sur {path}");
        self.load(&path);
    }

    pub fn handle(&mut self, event: ShellEvent) {
        match event {
            ShellEvent::Click(chain) => {
                self.click(&chain);
            }
            ShellEvent::Navigate(path) => self.navigate(&path),
            ShellEvent::PopState(path) => self.pop_state(&path),
            ShellEvent::Back => self.go_back(),
            ShellEvent::Forward => self.go_forward(),
            ShellEvent::Report => self.report(),
            ShellEvent::TimerFired(id) => self.on_timer(id),
            ShellEvent::FragmentFetched { ticket, result } => self.on_fragment(&ticket, result),
            ShellEvent::PageDataFetched { ticket, result } => self.on_page_data(&ticket, result),
            ShellEvent::StartScan(request) => self.start_scan(request),
            ShellEvent::ScanAcknowledged(result) => self.on_scan_ack(result),
            ShellEvent::Push(push) => self.on_push(push),
        }
    }

    /// `true` si le clic a été intercepté (comportement par défaut empêché).
    pub fn click(&mut self, chain: &[ClickedElement]) -> bool {
        match self.navigation.intercept_click(chain) {
            Some(href) => {
                self.navigate(&href);
                true
            }
            None => false,
        }
    }

    pub fn navigate(&mut self, path: &str) {
        let ticket =
            self.navigation.navigate(path, self.host.history.as_mut(), self.host.document.as_mut());
        self.outgoing.push(Outgoing::FetchFragment(ticket));
    }

    /// Retour/avance du navigateur : l'historique est déjà positionné.
    pub fn pop_state(&mut self, path: &str) {
        debug!("popstate vers {path}");
        self.load(path);
    }

    pub fn go_back(&mut self) {
        match self.host.history.back() {
            Some(path) => self.pop_state(&path),
            None => debug!("début de l'historique atteint"),
        }
    }

    pub fn go_forward(&mut self) {
        match self.host.history.forward() {
            Some(path) => self.pop_state(&path),
            None => debug!("fin de l'historique atteinte"),
        }
    }

    pub fn on_timer(&mut self, id: TimerId) {
        let now = self.now();
        let handled = self.metrics.on_timer(id, now, self.host.timers.as_mut(), self.host.document.as_mut())
            || self.notifier.on_timer(id, self.host.document.as_mut());
        if !handled {
            debug!("minuterie {:?} inconnue, ignorée", id);
        }
    }

    pub fn on_fragment(&mut self, ticket: &LoadTicket, result: Result<String, FetchError>) {
        match self.navigation.complete(ticket, result, self.host.document.as_mut()) {
            LoadOutcome::Rendered(Some(route)) => {
                let tickets = self.pages.init(route);
                self.outgoing.extend(tickets.into_iter().map(Outgoing::FetchPageData));
            }
            LoadOutcome::Rendered(None) => debug!("aucun initialiseur pour {}", ticket.path),
            LoadOutcome::Stale | LoadOutcome::MissingContent | LoadOutcome::Failed => {}
        }
    }

    pub fn on_page_data(&mut self, ticket: &DataTicket, result: Result<String, FetchError>) {
        match self.pages.complete(ticket, result, self.host.document.as_mut()) {
            Ok(DataOutcome::Rendered) => debug!("{:?} rendu", ticket.kind),
            Ok(DataOutcome::Skipped) => debug!("{:?} : conteneur absent, rendu ignoré", ticket.kind),
            Ok(DataOutcome::Stale) => {}
            Err(e) => error!("chargement {} échoué: {e}", ticket.kind.endpoint()),
        }
    }

    pub fn on_push(&mut self, event: PushEvent) {
        let now = self.now();
        let doc = self.host.document.as_mut();
        let timers = self.host.timers.as_mut();
        match event {
            PushEvent::SystemMetrics(update) => {
                if update.is_empty() {
                    warn!("system_metrics sans champ exploitable, lecture conservée");
                }
                self.metrics.apply_live(&update, now, timers, doc);
                if let Some(reading) = self.metrics.reading() {
                    render_live_stats(doc, &reading);
                }
            }
            PushEvent::ScanProgress { ip } => {
                render_progress(doc, &ip);
            }
            PushEvent::ScanComplete(outcome) => {
                render_results(doc, &outcome);
                if outcome.success {
                    let found = outcome.results.len();
                    let message = match outcome.duration {
                        Some(secs) => format!("Scan terminé : {found} hôte(s) trouvé(s) en {secs:.1}s"),
                        None => format!("Scan terminé : {found} hôte(s) trouvé(s)"),
                    };
                    self.notifier.show(&message, NotificationKind::Success, doc, timers);
                } else {
                    let reason = outcome.error.as_deref().unwrap_or("erreur inconnue");
                    self.notifier.show(&format!("Échec du scan : {reason}"), NotificationKind::Error, doc, timers);
                }
            }
            PushEvent::NetworkScan { devices } => {
                render_devices(doc, &devices);
            }
            PushEvent::Connected => {
                info!("canal temps réel connecté");
                doc.set_text(CONNECTION_STATUS_ID, "Connecté");
                self.notifier.show("Connecté au serveur", NotificationKind::Success, doc, timers);
            }
            PushEvent::Disconnected => {
                warn!("canal temps réel déconnecté");
                doc.set_text(CONNECTION_STATUS_ID, "Déconnecté");
                self.notifier.show("Déconnecté du serveur", NotificationKind::Warning, doc, timers);
            }
        }
    }

    pub fn start_scan(&mut self, request: ScanRequest) {
        let doc = self.host.document.as_mut();
        doc.set_inner_html(SCAN_PROGRESS_ID, "");
        doc.set_inner_html(SCAN_RESULTS_ID, "");
        info!("scan réseau {} ({} ports)", request.network, request.ports.len());
        self.outgoing.push(Outgoing::StartScan(request));
    }

    pub fn on_scan_ack(&mut self, result: Result<String, FetchError>) {
        match result {
            Ok(_) => {
                self.notifier.show(
                    "Scan réseau démarré",
                    NotificationKind::Info,
                    self.host.document.as_mut(),
                    self.host.timers.as_mut(),
                );
            }
            Err(e) => {
                error!("démarrage du scan échoué: {e}");
                self.notifier.show(
                    "Impossible de démarrer le scan",
                    NotificationKind::Error,
                    self.host.document.as_mut(),
                    self.host.timers.as_mut(),
                );
            }
        }
    }

    /// Travail réseau accumulé depuis le dernier appel.
    pub fn drain_outgoing(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.outgoing)
    }

    pub fn document(&self) -> &dyn Document {
        self.host.document.as_ref()
    }

    pub fn history(&self) -> &dyn History {
        self.host.history.as_ref()
    }

    pub fn metrics(&self) -> &MetricsEngine<R> {
        &self.metrics
    }

    pub fn navigation(&self) -> &NavigationEngine {
        &self.navigation
    }

    pub fn metrics_mode(&self) -> Mode {
        self.metrics.mode()
    }

    pub fn reading(&self) -> Option<MetricReading> {
        self.metrics.reading()
    }

    pub fn nav_display(&self) -> NavDisplay {
        let display = &self.metrics.config().display;
        let doc = self.document();
        NavDisplay {
            cpu: doc.inner_html(&display.cpu),
            memory: doc.inner_html(&display.memory),
            disk: doc.inner_html(&display.disk),
            simulated_badge: doc.is_visible(&display.badge).unwrap_or(false),
        }
    }

    fn report(&self) {
        let nav = self.nav_display();
        info!(
            path = self.navigation.current_path(),
            mode = ?self.metrics.mode(),
            cpu = nav.cpu.as_deref().unwrap_or("-"),
            memory = nav.memory.as_deref().unwrap_or("-"),
            disk = nav.disk.as_deref().unwrap_or("-"),
            simulated = nav.simulated_badge,
            "état de la coquille"
        );
    }

    fn load(&mut self, path: &str) {
        let ticket = self.navigation.load_route(path, self.host.document.as_mut());
        self.outgoing.push(Outgoing::FetchFragment(ticket));
    }

    fn now(&self) -> Millis {
        self.host.clock.now_ms()
    }
}
