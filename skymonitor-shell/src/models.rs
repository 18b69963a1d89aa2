use serde::{Deserialize, Serialize};

// Payloads JSON des endpoints /api/* consommés par les initialiseurs de pages

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStats {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    #[serde(default)]
    pub memory_used_gb: Option<f64>,
    #[serde(default)]
    pub memory_total_gb: Option<f64>,
    #[serde(default)]
    pub disk_used_gb: Option<f64>,
    #[serde(default)]
    pub disk_total_gb: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDevice {
    pub ip: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub status: String, // online, offline
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Serveur {
    pub name: String,
    pub ip_address: String,
    pub status: String,
    #[serde(default)]
    pub cpu_usage: f64,
    #[serde(default)]
    pub memory_usage: f64,
    #[serde(default)]
    pub storage_usage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poste {
    pub name: String,
    pub ip_address: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conteneur {
    pub name: String,
    pub image: String,
    pub status: String,
}

// Scan réseau : requête POST + événements de progression/fin

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub network: String, // CIDR, ex: "10.236.155.0/24"
    pub ports: Vec<u16>,
    pub parallel: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanHostResult {
    pub ip: String,
    #[serde(default)]
    pub open_ports: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanComplete {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub duration: Option<f64>, // secondes
    #[serde(default)]
    pub results: Vec<ScanHostResult>,
    #[serde(default)]
    pub error: Option<String>,
}

fn default_success() -> bool {
    true
}
