/**
 * RUNTIME - Exécution de la coquille sur tokio
 *
 * RÔLE :
 * Relie les moteurs au monde réel : HTTP (reqwest), minuteries (tokio),
 * canal temps réel (MQTT), commandes stdin.
 *
 * FONCTIONNEMENT :
 * Une seule boucle consomme les `ShellEvent` ; les `Outgoing` produits sont
 * exécutés dans des tâches dont le résultat revient dans la même file.
 */

pub mod commands;
pub mod http;
pub mod mqtt;
pub mod timers;

use crate::fetch::Fetcher;
use crate::scan::SCAN_ENDPOINT;
use crate::shell::{Outgoing, Shell, ShellEvent};
use rand::Rng;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

/// Traite les événements jusqu'à fermeture de la file.
pub async fn run_event_loop<R: Rng>(
    shell: &mut Shell<R>,
    fetcher: Arc<dyn Fetcher>,
    tx: UnboundedSender<ShellEvent>,
    mut rx: UnboundedReceiver<ShellEvent>,
) {
    for outgoing in shell.drain_outgoing() {
        dispatch(outgoing, fetcher.clone(), tx.clone());
    }

    while let Some(event) = rx.recv().await {
        shell.handle(event);
        for outgoing in shell.drain_outgoing() {
            dispatch(outgoing, fetcher.clone(), tx.clone());
        }
    }
    info!("file d'événements fermée, arrêt");
}

/// Exécute une requête réseau dans une tâche ; son résultat revient en événement.
pub fn dispatch(outgoing: Outgoing, fetcher: Arc<dyn Fetcher>, tx: UnboundedSender<ShellEvent>) {
    tokio::spawn(async move {
        if let Some(event) = execute(outgoing, fetcher.as_ref()).await {
            let _ = tx.send(event);
        }
    });
}

/// Effectue la requête et construit l'événement de retour.
pub async fn execute(outgoing: Outgoing, fetcher: &dyn Fetcher) -> Option<ShellEvent> {
    let event = match outgoing {
        Outgoing::FetchFragment(ticket) => {
            let result = fetcher.get_text(&ticket.path).await;
            ShellEvent::FragmentFetched { ticket, result }
        }
        Outgoing::FetchPageData(ticket) => {
            let result = fetcher.get_text(ticket.kind.endpoint()).await;
            ShellEvent::PageDataFetched { ticket, result }
        }
        Outgoing::StartScan(request) => {
            let body = match serde_json::to_value(&request) {
                Ok(body) => body,
                Err(e) => {
                    error!("sérialisation de la requête de scan: {e}");
                    return None;
                }
            };
            ShellEvent::ScanAcknowledged(fetcher.post_json(SCAN_ENDPOINT, body).await)
        }
    };
    Some(event)
}
