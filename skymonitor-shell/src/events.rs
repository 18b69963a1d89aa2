//! Événements poussés par le canal temps réel (nom d'événement + JSON).

use crate::metrics::LiveMetrics;
use crate::models::{NetworkDevice, ScanComplete};
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    SystemMetrics(LiveMetrics),
    ScanProgress { ip: String },
    ScanComplete(ScanComplete),
    NetworkScan { devices: Vec<NetworkDevice> },
    Connected,
    Disconnected,
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("unknown event: {0}")]
    Unknown(String),
    #[error("invalid payload for {event}: {source}")]
    Payload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Champs gardés bruts : un champ illisible (ex. `1e999`) n'invalide
/// pas les autres.
#[derive(Deserialize)]
struct SystemMetricsIn<'a> {
    #[serde(borrow, default)]
    cpu_percent: Option<&'a RawValue>,
    #[serde(borrow, default)]
    memory_percent: Option<&'a RawValue>,
    #[serde(borrow, default)]
    disk_percent: Option<&'a RawValue>,
}

impl SystemMetricsIn<'_> {
    fn to_live(&self) -> LiveMetrics {
        let field = |raw: Option<&RawValue>| -> Value {
            raw.and_then(|r| serde_json::from_str(r.get()).ok()).unwrap_or(Value::Null)
        };
        LiveMetrics::from_payload(&json!({
            "cpu_percent": field(self.cpu_percent),
            "memory_percent": field(self.memory_percent),
            "disk_percent": field(self.disk_percent),
        }))
    }
}

#[derive(Deserialize)]
struct ScanProgressIn {
    ip: String,
}

#[derive(Deserialize)]
struct NetworkScanIn {
    #[serde(default)]
    devices: Vec<NetworkDevice>,
}

impl PushEvent {
    pub fn decode(name: &str, payload: &[u8]) -> Result<Self, EventError> {
        let parse_err = |source| EventError::Payload { event: name.to_string(), source };
        match name {
            "system_metrics" => {
                let p: SystemMetricsIn = serde_json::from_slice(payload).map_err(parse_err)?;
                Ok(PushEvent::SystemMetrics(p.to_live()))
            }
            "scan_progress" => {
                let p: ScanProgressIn = serde_json::from_slice(payload).map_err(parse_err)?;
                Ok(PushEvent::ScanProgress { ip: p.ip })
            }
            "network_scan_complete" => {
                Ok(PushEvent::ScanComplete(serde_json::from_slice(payload).map_err(parse_err)?))
            }
            "network_scan" => {
                let p: NetworkScanIn = serde_json::from_slice(payload).map_err(parse_err)?;
                Ok(PushEvent::NetworkScan { devices: p.devices })
            }
            // payload de cycle de vie ignoré
            "connected" | "connect" => Ok(PushEvent::Connected),
            "disconnected" | "disconnect" => Ok(PushEvent::Disconnected),
            other => Err(EventError::Unknown(other.to_string())),
        }
    }
}

/// Extrait le nom d'événement depuis le topic.
/// Ex: "skymonitor/events/system_metrics" -> "system_metrics"
pub fn extract_event_name(topic: &str) -> &str {
    topic.rsplit('/').next().unwrap_or(topic)
}
