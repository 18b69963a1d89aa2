//! Scan réseau : validation de la requête et rendu de la progression.

use crate::dom::Document;
use crate::format::escape_html;
use crate::models::{ScanComplete, ScanRequest};
use std::net::Ipv4Addr;

pub const SCAN_ENDPOINT: &str = "/api/scan/network";
pub const SCAN_PROGRESS_ID: &str = "scan-progress";
pub const SCAN_RESULTS_ID: &str = "scan-results";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("invalid CIDR network: {0}")]
    InvalidNetwork(String),
    #[error("no port to scan")]
    NoPorts,
}

impl ScanRequest {
    pub fn new(network: &str, ports: Vec<u16>, parallel: bool) -> Result<Self, ScanError> {
        validate_cidr(network)?;
        if ports.is_empty() {
            return Err(ScanError::NoPorts);
        }
        Ok(Self { network: network.to_string(), ports, parallel })
    }
}

fn validate_cidr(network: &str) -> Result<(), ScanError> {
    let invalid = || ScanError::InvalidNetwork(network.to_string());
    let (addr, prefix) = network.split_once('/').ok_or_else(invalid)?;
    addr.parse::<Ipv4Addr>().map_err(|_| invalid())?;
    let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
    if prefix > 32 {
        return Err(invalid());
    }
    Ok(())
}

/// Ajoute l'IP sondée à la liste de progression (si affichée).
pub fn render_progress(doc: &mut dyn Document, ip: &str) -> bool {
    let Some(current) = doc.inner_html(SCAN_PROGRESS_ID) else {
        return false;
    };
    let line = format!(r#"<div class="scan-host">{}</div>"#, escape_html(ip));
    doc.set_inner_html(SCAN_PROGRESS_ID, &format!("{current}{line}"))
}

pub fn render_results(doc: &mut dyn Document, outcome: &ScanComplete) -> bool {
    if !doc.has_element(SCAN_RESULTS_ID) {
        return false;
    }
    if outcome.results.is_empty() {
        return doc.set_inner_html(SCAN_RESULTS_ID, r#"<p class="no-data">Aucun hôte trouvé</p>"#);
    }

    let html: String = outcome
        .results
        .iter()
        .map(|host| {
            let ports = if host.open_ports.is_empty() {
                "aucun port ouvert".to_string()
            } else {
                host.open_ports.iter().map(u16::to_string).collect::<Vec<_>>().join(", ")
            };
            format!(
                r#"<div class="scan-result"><strong>{}</strong><span>{}</span></div>"#,
                escape_html(&host.ip),
                ports
            )
        })
        .collect();
    doc.set_inner_html(SCAN_RESULTS_ID, &html)
}
