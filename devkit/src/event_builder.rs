/*!
Builder d'événements temps réel

Construit les payloads tels que le backend les publie, puis les décode
par le même chemin que le listener MQTT.
*/

use anyhow::Result;
use serde_json::{json, Value};
use skymonitor_shell::events::PushEvent;
use skymonitor_shell::ShellEvent;

pub struct ShellEventBuilder;

impl ShellEventBuilder {
    /// Décode `payload` comme publié sur `skymonitor/events/<name>`.
    pub fn push(name: &str, payload: &Value) -> Result<ShellEvent> {
        let bytes = serde_json::to_vec(payload)?;
        Ok(ShellEvent::Push(PushEvent::decode(name, &bytes)?))
    }

    pub fn system_metrics(cpu: f64, memory: f64, disk: f64) -> Result<ShellEvent> {
        Self::push(
            "system_metrics",
            &json!({
                "cpu_percent": cpu,
                "memory_percent": memory,
                "disk_percent": disk,
                "timestamp": "2024-01-01T00:00:00Z"
            }),
        )
    }

    pub fn scan_progress(ip: &str) -> Result<ShellEvent> {
        Self::push("scan_progress", &json!({ "ip": ip }))
    }

    /// `hosts` : (ip, ports ouverts)
    pub fn scan_complete(hosts: &[(&str, &[u16])], duration: f64) -> Result<ShellEvent> {
        let results: Vec<Value> = hosts
            .iter()
            .map(|(ip, ports)| json!({ "ip": ip, "open_ports": ports }))
            .collect();
        Self::push("network_scan_complete", &json!({ "success": true, "duration": duration, "results": results }))
    }

    pub fn scan_failed(error: &str) -> Result<ShellEvent> {
        Self::push("network_scan_complete", &json!({ "success": false, "error": error, "results": [] }))
    }

    pub fn connected() -> Result<ShellEvent> {
        Self::push("connected", &Value::Null)
    }

    pub fn disconnected() -> Result<ShellEvent> {
        Self::push("disconnected", &Value::Null)
    }
}
