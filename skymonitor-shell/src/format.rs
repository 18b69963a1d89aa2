//! Formatage des valeurs brutes pour l'affichage (tailles, pourcentages, HTML).

const BYTE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// `42.34` -> `"42.3%"`
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Taille en base 1024, deux décimales au plus, zéros finaux supprimés.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    while exponent < BYTE_UNITS.len() - 1 && bytes >= 1024u64.pow(exponent as u32 + 1) {
        exponent += 1;
    }
    let scaled = bytes as f64 / 1024u64.pow(exponent as u32) as f64;
    let rounded = (scaled * 100.0).round() / 100.0;

    format!("{} {}", trim_decimal(rounded), BYTE_UNITS[exponent])
}

fn trim_decimal(value: f64) -> String {
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Échappe le texte interpolé dans du balisage.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
