//! Commandes texte (stdin) traduites en événements de la coquille.
//!
//! ```text
//! /postes            navigation (clic sur un lien data-route)
//! back | forward     boutons du navigateur
//! scan 10.0.0.0/24 22,80,443
//! show               état courant dans les logs
//! ```

use crate::models::ScanRequest;
use crate::navigation::ClickedElement;
use crate::shell::ShellEvent;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::{self, JoinHandle};
use tracing::warn;

const DEFAULT_SCAN_PORTS: [u16; 4] = [22, 80, 443, 3389];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("invalid port: {0}")]
    Port(String),
    #[error(transparent)]
    Scan(#[from] crate::scan::ScanError),
    #[error("usage: scan <cidr> [port,port,...]")]
    Usage,
}

pub fn parse_command(line: &str) -> Result<Option<ShellEvent>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let event = match head {
        path if path.starts_with('/') => ShellEvent::Click(vec![ClickedElement::route_link(path)]),
        "back" => ShellEvent::Back,
        "forward" => ShellEvent::Forward,
        "show" => ShellEvent::Report,
        "scan" => {
            let network = words.next().ok_or(CommandError::Usage)?;
            let ports = match words.next() {
                Some(list) => parse_ports(list)?,
                None => DEFAULT_SCAN_PORTS.to_vec(),
            };
            ShellEvent::StartScan(ScanRequest::new(network, ports, true)?)
        }
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(event))
}

fn parse_ports(list: &str) -> Result<Vec<u16>, CommandError> {
    list.split(',')
        .filter(|p| !p.is_empty())
        .map(|p| p.trim().parse::<u16>().map_err(|_| CommandError::Port(p.to_string())))
        .collect()
}

pub fn spawn_stdin_commands(tx: UnboundedSender<ShellEvent>) -> JoinHandle<()> {
    task::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_command(&line) {
                Ok(Some(event)) => {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("{e}"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_becomes_route_click() {
        match parse_command("/serveurs") {
            Ok(Some(ShellEvent::Click(chain))) => {
                assert_eq!(chain, vec![ClickedElement::route_link("/serveurs")]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_history_commands() {
        assert!(matches!(parse_command("back"), Ok(Some(ShellEvent::Back))));
        assert!(matches!(parse_command(" forward "), Ok(Some(ShellEvent::Forward))));
        assert!(matches!(parse_command(""), Ok(None)));
    }

    #[test]
    fn test_scan_command() {
        match parse_command("scan 192.168.1.0/24 22,80") {
            Ok(Some(ShellEvent::StartScan(req))) => {
                assert_eq!(req.network, "192.168.1.0/24");
                assert_eq!(req.ports, vec![22, 80]);
            }
            other => panic!("unexpected: {other:?}"),
        }
        match parse_command("scan 10.0.0.0/8") {
            Ok(Some(ShellEvent::StartScan(req))) => assert_eq!(req.ports, DEFAULT_SCAN_PORTS.to_vec()),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_commands() {
        assert_eq!(parse_command("scan").unwrap_err(), CommandError::Usage);
        assert!(matches!(parse_command("scan 10.0.0.0/24 22,http"), Err(CommandError::Port(_))));
        assert!(matches!(parse_command("scan 10.0.0/24"), Err(CommandError::Scan(_))));
        assert!(matches!(parse_command("reboot"), Err(CommandError::Unknown(_))));
    }
}
