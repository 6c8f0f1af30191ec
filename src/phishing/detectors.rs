//! The five independent domain signal detectors.
//!
//! Each detector sees the normalized domain and one threat-intel snapshot
//! and emits at most one signal. `typosquat` and `similar_to_known` both
//! use edit distance with overlapping thresholds and may co-fire on the
//! same legitimate domain; both behaviors are kept deliberately.

use strsim::levenshtein;

use crate::types::{DomainSettings, PhishingSignal, RiskLevel, SignalKind, ThreatIntelSnapshot};

const TYPOSQUAT_MAX_DISTANCE: usize = 2;
const SIMILARITY_MAX_DISTANCE: usize = 3;

/// Domain without its TLD: `"phantom.app"` -> `"phantom"`.
pub(crate) fn base_name(domain: &str) -> &str {
    domain.rsplit_once('.').map_or(domain, |(base, _)| base)
}

/// TLD with the leading dot: `"phantom.app"` -> `".app"`.
fn tld(domain: &str) -> Option<String> {
    domain.rsplit_once('.').map(|(_, t)| format!(".{t}"))
}

pub(crate) fn known_scam(domain: &str, intel: &ThreatIntelSnapshot) -> Option<PhishingSignal> {
    intel
        .scam_domains
        .iter()
        .any(|scam| scam == domain)
        .then(|| PhishingSignal {
            kind: SignalKind::KnownScam,
            severity: RiskLevel::High,
            description: format!("{domain} is on the known scam-domain list"),
            related_domain: None,
        })
}

/// Equal-length base-name comparison: every mismatched character must be a
/// listed homoglyph of the target character, and at least one substitution
/// is required. An exact match is identity, not impersonation.
pub(crate) fn homoglyph(domain: &str, intel: &ThreatIntelSnapshot) -> Option<PhishingSignal> {
    let base: Vec<char> = base_name(domain).chars().collect();

    for legit in &intel.legitimate_domains {
        let legit_base: Vec<char> = base_name(legit).chars().collect();
        if base.len() != legit_base.len() {
            continue;
        }

        let mut substitutions = 0usize;
        let mut impersonation = true;
        for (&have, &want) in base.iter().zip(&legit_base) {
            if have == want {
                continue;
            }
            substitutions += 1;
            let allowed = intel
                .homoglyph_map
                .get(&want)
                .is_some_and(|subs| subs.contains(&have));
            if !allowed {
                impersonation = false;
                break;
            }
        }

        if impersonation && substitutions > 0 {
            return Some(PhishingSignal {
                kind: SignalKind::Homoglyph,
                severity: RiskLevel::High,
                description: format!(
                    "{domain} impersonates {legit} using look-alike characters"
                ),
                related_domain: Some(legit.clone()),
            });
        }
    }
    None
}

pub(crate) fn typosquat(domain: &str, intel: &ThreatIntelSnapshot) -> Option<PhishingSignal> {
    closest_by_distance(domain, intel, TYPOSQUAT_MAX_DISTANCE).map(|(legit, distance)| {
        PhishingSignal {
            kind: SignalKind::Typosquat,
            severity: RiskLevel::Medium,
            description: format!("{domain} is {distance} edit(s) away from {legit}"),
            related_domain: Some(legit),
        }
    })
}

pub(crate) fn suspicious_tld(domain: &str, intel: &ThreatIntelSnapshot) -> Option<PhishingSignal> {
    let tld = tld(domain)?;
    if !intel.suspicious_tlds.contains(&tld) {
        return None;
    }

    let base = base_name(domain);
    let keyword = intel
        .ecosystem_keywords
        .iter()
        .find(|keyword| base.contains(keyword.as_str()))?;

    Some(PhishingSignal {
        kind: SignalKind::SuspiciousTld,
        severity: RiskLevel::Medium,
        description: format!(
            "{domain} combines the suspicious TLD {tld} with the ecosystem keyword \"{keyword}\""
        ),
        related_domain: None,
    })
}

pub(crate) fn similar_to_known(domain: &str, intel: &ThreatIntelSnapshot) -> Option<PhishingSignal> {
    closest_by_distance(domain, intel, SIMILARITY_MAX_DISTANCE).map(|(legit, _)| PhishingSignal {
        kind: SignalKind::SimilarToKnown,
        severity: RiskLevel::Low,
        description: format!("{domain} resembles the known domain {legit}"),
        related_domain: Some(legit),
    })
}

pub(crate) fn new_domain(settings: Option<&DomainSettings>) -> Option<PhishingSignal> {
    settings.is_none().then(|| PhishingSignal {
        kind: SignalKind::NewDomain,
        severity: RiskLevel::Low,
        description: "This domain has never connected to the wallet before".to_string(),
        related_domain: None,
    })
}

/// Closest legitimate base name within `max` edits; zero distance (identity)
/// never matches.
fn closest_by_distance(
    domain: &str,
    intel: &ThreatIntelSnapshot,
    max: usize,
) -> Option<(String, usize)> {
    let base = base_name(domain);
    let mut best: Option<(String, usize)> = None;

    for legit in &intel.legitimate_domains {
        let distance = levenshtein(base, base_name(legit));
        if distance == 0 || distance > max {
            continue;
        }
        match &best {
            Some((_, best_distance)) if distance >= *best_distance => {}
            _ => best = Some((legit.clone(), distance)),
        }
    }
    best
}
