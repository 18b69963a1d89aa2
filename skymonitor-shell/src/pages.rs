/**
 * INITIALISEURS DE PAGES - Chargement des données propres à chaque route
 *
 * RÔLE :
 * Après injection d'un fragment, la route courante déclenche ses requêtes
 * de données (`/api/...`) puis rend les résultats dans des conteneurs de la
 * page. Un conteneur absent (autre page affichée) => rendu ignoré.
 *
 * FONCTIONNEMENT :
 * - `page_data(route)` : correspondance exhaustive route -> types de données
 * - Chaque requête porte un numéro de séquence par type de données ;
 *   une réponse dépassée par une requête plus récente est jetée
 * - Échec réseau ou JSON invalide : journalisé, contenu précédent conservé
 */

use crate::dom::Document;
use crate::fetch::FetchError;
use crate::format::{escape_html, format_percentage};
use crate::metrics::MetricReading;
use crate::models::{Conteneur, NetworkDevice, Poste, Serveur, SystemStats};
use crate::routes::Route;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

pub const CPU_VALUE_ID: &str = "cpu-value";
pub const MEMORY_VALUE_ID: &str = "memory-value";
pub const DISK_VALUE_ID: &str = "disk-value";
pub const DEVICES_CONTAINER_ID: &str = "devices-container";
pub const SERVEURS_CONTAINER_ID: &str = "serveurs-container";
pub const POSTES_CONTAINER_ID: &str = "postes-container";
pub const CONTENEURS_CONTAINER_ID: &str = "conteneurs-container";
pub const METRICS_HISTORY_CONTAINER_ID: &str = "metrics-history-container";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    SystemStats,
    NetworkDevices,
    Serveurs,
    Postes,
    Conteneurs,
    MetricsHistory,
}

impl DataKind {
    pub fn endpoint(self) -> &'static str {
        match self {
            DataKind::SystemStats => "/api/system/stats",
            DataKind::NetworkDevices => "/api/network/devices",
            DataKind::Serveurs => "/api/serveurs",
            DataKind::Postes => "/api/postes",
            DataKind::Conteneurs => "/api/conteneurs",
            DataKind::MetricsHistory => "/api/metrics/history?range=1h",
        }
    }
}

/// Données chargées par chaque route
pub fn page_data(route: Route) -> &'static [DataKind] {
    match route {
        Route::Home => &[DataKind::SystemStats, DataKind::NetworkDevices],
        Route::Dashboard => &[],
        Route::Serveurs => &[DataKind::Serveurs],
        Route::Postes => &[DataKind::Postes],
        Route::Conteneurs => &[DataKind::Conteneurs],
        Route::Metriques => &[DataKind::MetricsHistory],
        Route::Parametres => &[],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTicket {
    pub kind: DataKind,
    pub seq: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum PageDataError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOutcome {
    Rendered,
    /// Conteneur absent : la page concernée n'est plus affichée
    Skipped,
    /// Une requête plus récente du même type a été émise
    Stale,
}

#[derive(Debug, Default)]
pub struct PageInitializers {
    next_seq: u64,
    latest: HashMap<DataKind, u64>,
}

impl PageInitializers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lance l'initialisation de `route` ; renvoie les requêtes à exécuter.
    pub fn init(&mut self, route: Route) -> Vec<DataTicket> {
        match route {
            Route::Dashboard => info!("initialisation dashboard"),
            Route::Parametres => info!("initialisation paramètres"),
            _ => debug!("initialisation page {}", route.page_id()),
        }
        page_data(route).iter().map(|&kind| self.issue(kind)).collect()
    }

    pub fn issue(&mut self, kind: DataKind) -> DataTicket {
        self.next_seq += 1;
        self.latest.insert(kind, self.next_seq);
        DataTicket { kind, seq: self.next_seq }
    }

    pub fn is_current(&self, ticket: &DataTicket) -> bool {
        self.latest.get(&ticket.kind) == Some(&ticket.seq)
    }

    pub fn complete(
        &mut self,
        ticket: &DataTicket,
        result: Result<String, FetchError>,
        doc: &mut dyn Document,
    ) -> Result<DataOutcome, PageDataError> {
        if !self.is_current(ticket) {
            debug!("réponse {:?} #{} périmée, ignorée", ticket.kind, ticket.seq);
            return Ok(DataOutcome::Stale);
        }
        let body = result?;
        let rendered = match ticket.kind {
            DataKind::SystemStats => render_system_stats(doc, &decode::<SystemStats>(&body)?),
            DataKind::NetworkDevices => render_devices(doc, &decode::<Vec<NetworkDevice>>(&body)?),
            DataKind::Serveurs => render_serveurs(doc, &decode::<Vec<Serveur>>(&body)?),
            DataKind::Postes => render_postes(doc, &decode::<Vec<Poste>>(&body)?),
            DataKind::Conteneurs => render_conteneurs(doc, &decode::<Vec<Conteneur>>(&body)?),
            DataKind::MetricsHistory => render_metrics_history(doc, &decode::<Value>(&body)?),
        };
        Ok(if rendered { DataOutcome::Rendered } else { DataOutcome::Skipped })
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(body)
}

pub fn render_system_stats(doc: &mut dyn Document, stats: &SystemStats) -> bool {
    if !doc.has_element(CPU_VALUE_ID) {
        return false;
    }
    doc.set_text(CPU_VALUE_ID, &format_percentage(stats.cpu_percent));
    doc.set_text(MEMORY_VALUE_ID, &format_percentage(stats.memory_percent));
    doc.set_text(DISK_VALUE_ID, &format_percentage(stats.disk_percent));
    true
}

/// Répercute la lecture live sur les tuiles de la page d'accueil si affichées.
pub fn render_live_stats(doc: &mut dyn Document, reading: &MetricReading) -> bool {
    if !doc.has_element(CPU_VALUE_ID) {
        return false;
    }
    doc.set_text(CPU_VALUE_ID, &format_percentage(reading.cpu));
    doc.set_text(MEMORY_VALUE_ID, &format_percentage(reading.memory));
    doc.set_text(DISK_VALUE_ID, &format_percentage(reading.disk));
    true
}

pub fn render_devices(doc: &mut dyn Document, devices: &[NetworkDevice]) -> bool {
    if !doc.has_element(DEVICES_CONTAINER_ID) {
        return false;
    }
    if devices.is_empty() {
        return doc.set_inner_html(DEVICES_CONTAINER_ID, r#"<p class="no-data">Aucun appareil détecté</p>"#);
    }

    let html: String = devices
        .iter()
        .map(|device| {
            let label = if device.status == "online" { "🟢 En ligne" } else { "🔴 Hors ligne" };
            format!(
                r#"<div class="device-item"><div class="device-info"><strong>{}</strong><span>{}</span></div><div class="device-status {}">{}</div></div>"#,
                escape_html(&device.ip),
                escape_html(device.hostname.as_deref().unwrap_or("Unknown")),
                escape_html(&device.status),
                label
            )
        })
        .collect();
    doc.set_inner_html(DEVICES_CONTAINER_ID, &html)
}

pub fn render_serveurs(doc: &mut dyn Document, serveurs: &[Serveur]) -> bool {
    let html: String = serveurs
        .iter()
        .map(|s| {
            format!(
                r#"<div class="server-item"><h3>{}</h3><p>IP: {}</p><p>Statut: <span class="status-{status}">{status}</span></p><div class="server-metrics"><span>CPU: {}%</span><span>RAM: {}%</span><span>Stockage: {}%</span></div></div>"#,
                escape_html(&s.name),
                escape_html(&s.ip_address),
                s.cpu_usage,
                s.memory_usage,
                s.storage_usage,
                status = escape_html(&s.status),
            )
        })
        .collect();
    doc.set_inner_html(SERVEURS_CONTAINER_ID, &html)
}

pub fn render_postes(doc: &mut dyn Document, postes: &[Poste]) -> bool {
    let html: String = postes
        .iter()
        .map(|p| {
            format!(
                r#"<div class="poste-item"><h3>{}</h3><p>IP: {}</p><p>Statut: <span class="status-{status}">{status}</span></p></div>"#,
                escape_html(&p.name),
                escape_html(&p.ip_address),
                status = escape_html(&p.status),
            )
        })
        .collect();
    doc.set_inner_html(POSTES_CONTAINER_ID, &html)
}

pub fn render_conteneurs(doc: &mut dyn Document, conteneurs: &[Conteneur]) -> bool {
    let html: String = conteneurs
        .iter()
        .map(|c| {
            format!(
                r#"<div class="conteneur-item"><h3>{}</h3><p>Image: {}</p><p>Statut: <span class="status-{status}">{status}</span></p></div>"#,
                escape_html(&c.name),
                escape_html(&c.image),
                status = escape_html(&c.status),
            )
        })
        .collect();
    doc.set_inner_html(CONTENEURS_CONTAINER_ID, &html)
}

pub fn render_metrics_history(doc: &mut dyn Document, history: &Value) -> bool {
    let points = match history {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => 0,
    };
    info!("métriques chargées : {points} points");
    doc.set_inner_html(
        METRICS_HISTORY_CONTAINER_ID,
        &format!(r#"<p class="metrics-count">{points} points sur la dernière heure</p>"#),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;

    fn page(container: &str) -> MemoryDocument {
        let mut doc = MemoryDocument::new().with_element("main-content", "");
        doc.set_inner_html("main-content", &format!(r#"<div id="{container}"></div>"#));
        doc
    }

    #[test]
    fn test_every_route_has_an_initializer_entry() {
        assert_eq!(page_data(Route::Home), &[DataKind::SystemStats, DataKind::NetworkDevices]);
        assert!(page_data(Route::Dashboard).is_empty());
        assert_eq!(page_data(Route::Metriques), &[DataKind::MetricsHistory]);
    }

    #[test]
    fn test_serveurs_rendered_into_container() {
        let mut pages = PageInitializers::new();
        let mut doc = page(SERVEURS_CONTAINER_ID);
        let tickets = pages.init(Route::Serveurs);
        assert_eq!(tickets.len(), 1);

        let body = r#"[{"name":"web-01","ip_address":"10.0.0.5","status":"online","cpu_usage":12.5,"memory_usage":40,"storage_usage":71}]"#;
        let outcome = pages.complete(&tickets[0], Ok(body.into()), &mut doc).unwrap();
        assert_eq!(outcome, DataOutcome::Rendered);

        let html = doc.inner_html(SERVEURS_CONTAINER_ID).unwrap();
        assert!(html.contains("<h3>web-01</h3>"));
        assert!(html.contains("CPU: 12.5%"));
        assert!(html.contains(r#"class="status-online""#));
    }

    #[test]
    fn test_missing_container_is_skipped() {
        let mut pages = PageInitializers::new();
        let mut doc = page(POSTES_CONTAINER_ID);
        let ticket = pages.issue(DataKind::Conteneurs);
        let outcome = pages.complete(&ticket, Ok("[]".into()), &mut doc).unwrap();
        assert_eq!(outcome, DataOutcome::Skipped);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut pages = PageInitializers::new();
        let mut doc = page(POSTES_CONTAINER_ID);
        let old = pages.issue(DataKind::Postes);
        let new = pages.issue(DataKind::Postes);

        let body = r#"[{"name":"pc-1","ip_address":"10.0.0.9","status":"offline"}]"#;
        assert_eq!(pages.complete(&old, Ok(body.into()), &mut doc).unwrap(), DataOutcome::Stale);
        assert_eq!(doc.inner_html(POSTES_CONTAINER_ID).as_deref(), Some(""));
        assert_eq!(pages.complete(&new, Ok(body.into()), &mut doc).unwrap(), DataOutcome::Rendered);
    }

    #[test]
    fn test_failures_keep_previous_content() {
        let mut pages = PageInitializers::new();
        let mut doc = page(DEVICES_CONTAINER_ID);
        doc.set_inner_html(DEVICES_CONTAINER_ID, "<p>ancien</p>");

        let ticket = pages.issue(DataKind::NetworkDevices);
        let err = pages.complete(&ticket, Ok("{pas du json".into()), &mut doc).unwrap_err();
        assert!(matches!(err, PageDataError::Json(_)));

        let ticket = pages.issue(DataKind::NetworkDevices);
        let err = pages.complete(&ticket, Err(FetchError::Status(500)), &mut doc).unwrap_err();
        assert!(matches!(err, PageDataError::Fetch(FetchError::Status(500))));
        assert_eq!(doc.inner_html(DEVICES_CONTAINER_ID).as_deref(), Some("<p>ancien</p>"));
    }

    #[test]
    fn test_empty_device_list_placeholder() {
        let mut doc = page(DEVICES_CONTAINER_ID);
        assert!(render_devices(&mut doc, &[]));
        assert!(doc.inner_html(DEVICES_CONTAINER_ID).unwrap().contains("Aucun appareil détecté"));
    }

    #[test]
    fn test_device_markup_is_escaped() {
        let mut doc = page(DEVICES_CONTAINER_ID);
        let devices = vec![NetworkDevice {
            ip: "10.0.0.1".into(),
            hostname: Some("<script>".into()),
            status: "online".into(),
        }];
        render_devices(&mut doc, &devices);
        let html = doc.inner_html(DEVICES_CONTAINER_ID).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("En ligne"));
    }
}
