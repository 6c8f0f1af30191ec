use wasm_bindgen::prelude::*;

use crate::phishing;
use crate::types::{DomainContext, DomainSettings, ThreatIntelSnapshot};

fn parse_intel(intel_json: &str) -> ThreatIntelSnapshot {
    serde_json::from_str(intel_json).unwrap_or_else(|_| ThreatIntelSnapshot::bootstrap())
}

fn parse_settings(settings_json: Option<String>) -> Option<DomainSettings> {
    settings_json.and_then(|json| serde_json::from_str(&json).ok())
}

/// Analyze a domain against a threat-intel snapshot (both JSON-encoded).
/// A malformed snapshot falls back to the bootstrap one.
#[wasm_bindgen]
pub fn analyze_domain(
    domain: &str,
    intel_json: &str,
    settings_json: Option<String>,
    previously_dismissed: bool,
) -> JsValue {
    let intel = parse_intel(intel_json);
    let settings = parse_settings(settings_json);
    let ctx = DomainContext {
        threat_intel: &intel,
        domain_settings: settings.as_ref(),
        previously_dismissed,
    };

    let analysis = phishing::analyze_domain(domain, &ctx);
    serde_wasm_bindgen::to_value(&analysis).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen]
pub fn should_show_warning(domain: &str, intel_json: &str, settings_json: Option<String>) -> bool {
    let intel = parse_intel(intel_json);
    let settings = parse_settings(settings_json);
    let ctx = DomainContext {
        threat_intel: &intel,
        domain_settings: settings.as_ref(),
        previously_dismissed: false,
    };
    phishing::should_show_warning(domain, &ctx)
}

#[wasm_bindgen]
pub fn normalize_domain(raw: &str) -> String {
    phishing::normalize_domain(raw)
}
