/**
 * MOTEUR DE NAVIGATION - Navigation par fragments sans rechargement
 *
 * RÔLE :
 * Intercepte les clics sur les liens `data-route`, pousse l'historique,
 * récupère la page cible, en extrait la région de contenu et la substitue
 * au contenu principal, puis laisse la route initialiser sa page.
 *
 * FONCTIONNEMENT :
 * - `load_route` marque le lien actif, affiche le placeholder de chargement
 *   et émet un `LoadTicket` (séquence monotone) à exécuter par le runtime
 * - `complete` applique le résultat seulement si le ticket est le plus récent :
 *   un fragment lent ne peut pas écraser une navigation plus récente
 * - Échec réseau/statut => panneau d'erreur avec retour à l'accueil
 * - Fragment sans région de contenu => contenu précédent restauré
 *   (ou panneau d'erreur en mode strict)
 */

use crate::config::NavigationConf;
use crate::dom::Document;
use crate::fetch::FetchError;
use crate::fragment::extract_page_content;
use crate::host::History;
use crate::routes::Route;
use tracing::{debug, error, warn};

pub const MAIN_CONTENT_ID: &str = "main-content";

const LOADING_HTML: &str = r#"<div class="loading"><i class="fas fa-spinner fa-spin"></i><p>Chargement...</p></div>"#;

/// Requête de fragment en vol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub seq: u64,
    pub path: String,
}

/// Un élément de la chaîne cliquée (du plus interne vers la racine).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClickedElement {
    pub href: Option<String>,
    pub data_route: bool,
}

impl ClickedElement {
    pub fn route_link(href: &str) -> Self {
        Self { href: Some(href.to_string()), data_route: true }
    }

    pub fn plain() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Fragment injecté ; `Some(route)` si un initialiseur doit tourner
    Rendered(Option<Route>),
    Stale,
    MissingContent,
    Failed,
}

#[derive(Debug)]
struct PendingLoad {
    ticket: LoadTicket,
    // dernier contenu stable, avant tout placeholder
    previous: Option<String>,
}

#[derive(Debug)]
pub struct NavigationEngine {
    current_path: String,
    next_seq: u64,
    pending: Option<PendingLoad>,
    strict_fragments: bool,
}

pub fn error_panel(message: &str) -> String {
    format!(
        r#"<div class="error"><i class="fas fa-exclamation-triangle"></i><h3>Erreur</h3><p>{}</p><a class="btn btn-primary" data-route href="/">Retour à l'accueil</a></div>"#,
        crate::format::escape_html(message)
    )
}

impl NavigationEngine {
    pub fn new(conf: &NavigationConf, initial_path: &str) -> Self {
        Self {
            current_path: initial_path.to_string(),
            next_seq: 0,
            pending: None,
            strict_fragments: conf.strict_fragments,
        }
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    pub fn latest_seq(&self) -> u64 {
        self.next_seq
    }

    /// href du lien `data-route` le plus proche de la cible, si le clic
    /// doit être intercepté.
    pub fn intercept_click(&self, chain: &[ClickedElement]) -> Option<String> {
        let link = chain.iter().find(|el| el.data_route)?;
        match &link.href {
            Some(href) => Some(href.clone()),
            None => {
                warn!("lien data-route sans href, clic non intercepté");
                None
            }
        }
    }

    pub fn navigate(&mut self, path: &str, history: &mut dyn History, doc: &mut dyn Document) -> LoadTicket {
        history.push(path);
        self.load_route(path, doc)
    }

    pub fn load_route(&mut self, path: &str, doc: &mut dyn Document) -> LoadTicket {
        doc.clear_active_links();
        doc.activate_link(path);

        let previous = match self.pending.take() {
            Some(superseded) => {
                debug!("navigation #{} remplacée par {path}", superseded.ticket.seq);
                superseded.previous
            }
            None => doc.inner_html(MAIN_CONTENT_ID),
        };
        doc.set_inner_html(MAIN_CONTENT_ID, LOADING_HTML);

        self.next_seq += 1;
        let ticket = LoadTicket { seq: self.next_seq, path: path.to_string() };
        self.current_path = path.to_string();
        self.pending = Some(PendingLoad { ticket: ticket.clone(), previous });
        ticket
    }

    pub fn complete(
        &mut self,
        ticket: &LoadTicket,
        result: Result<String, FetchError>,
        doc: &mut dyn Document,
    ) -> LoadOutcome {
        let is_current = self.pending.as_ref().is_some_and(|p| p.ticket == *ticket);
        if !is_current {
            debug!("fragment {} #{} périmé, ignoré", ticket.path, ticket.seq);
            return LoadOutcome::Stale;
        }
        let Some(pending) = self.pending.take() else {
            return LoadOutcome::Stale;
        };

        let html = match result {
            Ok(html) => html,
            Err(e) => {
                error!("erreur chargement route {}: {e}", ticket.path);
                doc.set_inner_html(MAIN_CONTENT_ID, &error_panel("Erreur lors du chargement de la page"));
                return LoadOutcome::Failed;
            }
        };

        match extract_page_content(&html) {
            Some(content) => {
                doc.set_inner_html(MAIN_CONTENT_ID, &content);
                LoadOutcome::Rendered(Route::from_path(&ticket.path))
            }
            None if self.strict_fragments => {
                error!("fragment {} sans région de contenu", ticket.path);
                doc.set_inner_html(MAIN_CONTENT_ID, &error_panel("Réponse de page invalide"));
                LoadOutcome::Failed
            }
            None => {
                warn!("fragment {} sans région de contenu, contenu conservé", ticket.path);
                if let Some(previous) = pending.previous {
                    doc.set_inner_html(MAIN_CONTENT_ID, &previous);
                }
                LoadOutcome::MissingContent
            }
        }
    }
}
