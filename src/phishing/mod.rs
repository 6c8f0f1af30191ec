//! Domain analysis pipeline: normalize, detect, aggregate.

pub mod detectors;

use crate::types::{
    DomainContext, PhishingAnalysis, PhishingSignal, Recommendation, RiskLevel, SignalKind,
    TrustStatus,
};

/// Canonicalize a raw domain string: lowercase, drop scheme/path/port,
/// strip a leading `www.`.
pub fn normalize_domain(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut host = lowered.as_str();

    if let Some(rest) = host.strip_prefix("https://").or_else(|| host.strip_prefix("http://")) {
        host = rest;
    }
    if let Some((h, _)) = host.split_once('/') {
        host = h;
    }
    if let Some((h, _)) = host.split_once(':') {
        host = h;
    }
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

pub fn analyze_domain(domain: &str, ctx: &DomainContext<'_>) -> PhishingAnalysis {
    let normalized = normalize_domain(domain);
    let trust = ctx.domain_settings.map(|s| s.trust_status);

    // User trust wins outright; detectors never run for trusted domains.
    if trust == Some(TrustStatus::Trusted) {
        return PhishingAnalysis {
            domain: normalized,
            is_phishing: false,
            risk_level: RiskLevel::Low,
            signals: Vec::new(),
            recommendation: Recommendation::Proceed,
            previously_dismissed: ctx.previously_dismissed,
        };
    }

    let mut signals: Vec<PhishingSignal> = Vec::new();

    if trust == Some(TrustStatus::Blocked) {
        signals.push(PhishingSignal {
            kind: SignalKind::UserFlagged,
            severity: RiskLevel::High,
            description: format!("You previously blocked {normalized}"),
            related_domain: None,
        });
    }

    let intel = ctx.threat_intel;
    signals.extend(detectors::known_scam(&normalized, intel));
    signals.extend(detectors::homoglyph(&normalized, intel));
    signals.extend(detectors::typosquat(&normalized, intel));
    signals.extend(detectors::suspicious_tld(&normalized, intel));
    signals.extend(detectors::similar_to_known(&normalized, intel));
    signals.extend(detectors::new_domain(ctx.domain_settings));

    aggregate(normalized, signals, ctx.previously_dismissed)
}

/// Cheap pre-check for the connection prompt: only the short-circuit
/// sources and the two auto-block detectors, skipping the rest.
pub fn should_show_warning(domain: &str, ctx: &DomainContext<'_>) -> bool {
    let normalized = normalize_domain(domain);
    match ctx.domain_settings.map(|s| s.trust_status) {
        Some(TrustStatus::Trusted) => return false,
        Some(TrustStatus::Blocked) => return true,
        Some(TrustStatus::Neutral) | None => {}
    }

    detectors::known_scam(&normalized, ctx.threat_intel).is_some()
        || detectors::homoglyph(&normalized, ctx.threat_intel).is_some()
}

fn aggregate(
    domain: String,
    signals: Vec<PhishingSignal>,
    previously_dismissed: bool,
) -> PhishingAnalysis {
    let risk_level = signals
        .iter()
        .map(|s| s.severity)
        .max()
        .unwrap_or(RiskLevel::Low);

    // isPhishing is reserved for impersonation and scam-list hits; a high
    // risk level alone (e.g. user_flagged) only warns.
    let is_phishing = signals.iter().any(|s| {
        s.kind == SignalKind::KnownScam
            || (s.kind == SignalKind::Homoglyph && s.severity == RiskLevel::High)
    });

    let recommendation = if is_phishing {
        Recommendation::Block
    } else if risk_level >= RiskLevel::Medium {
        Recommendation::Warning
    } else {
        Recommendation::Proceed
    };

    PhishingAnalysis {
        domain,
        is_phishing,
        risk_level,
        signals,
        recommendation,
        previously_dismissed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DomainSettings, ThreatIntelSnapshot};

    fn intel_with_scam() -> ThreatIntelSnapshot {
        let mut intel = ThreatIntelSnapshot::bootstrap();
        intel.scam_domains = vec!["trusted.example".to_string(), "evil-drop.xyz".to_string()];
        intel
    }

    fn settings(domain: &str, trust: TrustStatus) -> DomainSettings {
        DomainSettings {
            domain: domain.to_string(),
            trust_status: trust,
            first_seen: 1_700_000_000_000,
            last_seen: 1_700_000_100_000,
            connection_count: 2,
        }
    }

    fn ctx<'a>(
        intel: &'a ThreatIntelSnapshot,
        domain_settings: Option<&'a DomainSettings>,
    ) -> DomainContext<'a> {
        DomainContext {
            threat_intel: intel,
            domain_settings,
            previously_dismissed: false,
        }
    }

    #[test]
    fn normalization_strips_scheme_path_and_www() {
        assert_eq!(normalize_domain("HTTPS://WWW.Phantom.App/claim?x=1"), "phantom.app");
        assert_eq!(normalize_domain("www.example.com:8443"), "example.com");
        assert_eq!(normalize_domain("  solana.com  "), "solana.com");
    }

    #[test]
    fn trusted_domain_short_circuits_even_when_scam_listed() {
        let intel = intel_with_scam();
        let record = settings("trusted.example", TrustStatus::Trusted);
        let analysis = analyze_domain("trusted.example", &ctx(&intel, Some(&record)));

        assert!(analysis.signals.is_empty());
        assert_eq!(analysis.risk_level, RiskLevel::Low);
        assert_eq!(analysis.recommendation, Recommendation::Proceed);
        assert!(!analysis.is_phishing);
    }

    #[test]
    fn blocked_domain_always_carries_user_flagged_and_still_runs_detectors() {
        let intel = intel_with_scam();
        let record = settings("evil-drop.xyz", TrustStatus::Blocked);
        let analysis = analyze_domain("evil-drop.xyz", &ctx(&intel, Some(&record)));

        assert!(analysis.signals.iter().any(|s| s.kind == SignalKind::UserFlagged));
        // the scam-list detector still ran
        assert!(analysis.signals.iter().any(|s| s.kind == SignalKind::KnownScam));
        assert!(analysis.is_phishing);
        assert_eq!(analysis.recommendation, Recommendation::Block);
    }

    #[test]
    fn user_flagged_alone_warns_but_is_not_phishing() {
        let intel = ThreatIntelSnapshot::bootstrap();
        let record = settings("some-neutral-site.com", TrustStatus::Blocked);
        let analysis = analyze_domain("some-neutral-site.com", &ctx(&intel, Some(&record)));

        assert_eq!(analysis.risk_level, RiskLevel::High);
        assert!(!analysis.is_phishing);
        assert_eq!(analysis.recommendation, Recommendation::Warning);
    }

    #[test]
    fn homoglyph_hit_blocks_and_marks_phishing() {
        let intel = ThreatIntelSnapshot::bootstrap();
        let record = settings("phant0m.app", TrustStatus::Neutral);
        let analysis = analyze_domain("phant0m.app", &ctx(&intel, Some(&record)));

        assert!(analysis.is_phishing);
        assert_eq!(analysis.risk_level, RiskLevel::High);
        assert_eq!(analysis.recommendation, Recommendation::Block);
    }

    #[test]
    fn unseen_benign_domain_is_low_risk_with_new_domain_signal() {
        let intel = ThreatIntelSnapshot::bootstrap();
        let analysis = analyze_domain("some-random-blog.com", &ctx(&intel, None));

        assert_eq!(analysis.risk_level, RiskLevel::Low);
        assert!(analysis.signals.iter().any(|s| s.kind == SignalKind::NewDomain));
        assert_eq!(analysis.recommendation, Recommendation::Proceed);
        assert!(!analysis.is_phishing);
    }

    #[test]
    fn typosquat_verdict_warns_without_blocking() {
        let intel = ThreatIntelSnapshot::bootstrap();
        let record = settings("phantmo.app", TrustStatus::Neutral);
        let analysis = analyze_domain("phantmo.app", &ctx(&intel, Some(&record)));

        assert!(analysis.signals.iter().any(|s| s.kind == SignalKind::Typosquat));
        assert_eq!(analysis.risk_level, RiskLevel::Medium);
        assert_eq!(analysis.recommendation, Recommendation::Warning);
        assert!(!analysis.is_phishing);
    }

    #[test]
    fn should_show_warning_matches_short_circuit_rules() {
        let intel = intel_with_scam();

        let trusted = settings("trusted.example", TrustStatus::Trusted);
        assert!(!should_show_warning("trusted.example", &ctx(&intel, Some(&trusted))));

        let blocked = settings("whatever.com", TrustStatus::Blocked);
        assert!(should_show_warning("whatever.com", &ctx(&intel, Some(&blocked))));

        assert!(should_show_warning("evil-drop.xyz", &ctx(&intel, None)));
        assert!(should_show_warning("phant0m.app", &ctx(&intel, None)));
        assert!(!should_show_warning("some-random-blog.com", &ctx(&intel, None)));
    }

    fn lcg_next(state: &mut u64) -> u64 {
        *state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        *state
    }

    fn random_domain(state: &mut u64) -> String {
        const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789-";
        let len = 1 + (lcg_next(state) % 24) as usize;
        let mut name: String = (0..len)
            .map(|_| CHARSET[(lcg_next(state) % CHARSET.len() as u64) as usize] as char)
            .collect();
        match lcg_next(state) % 4 {
            0 => name.push_str(".com"),
            1 => name.push_str(".app"),
            2 => name.push_str(".xyz"),
            _ => {}
        }
        name
    }

    #[test]
    fn verdict_invariants_hold_for_randomized_domains() {
        let intel = intel_with_scam();
        let mut seed = 0xDEAD_BEEF_u64;

        for _ in 0..10_000 {
            let domain = random_domain(&mut seed);
            assert_eq!(normalize_domain(&domain), normalize_domain(&normalize_domain(&domain)));

            let analysis = analyze_domain(&domain, &ctx(&intel, None));
            let max_severity = analysis
                .signals
                .iter()
                .map(|s| s.severity)
                .max()
                .unwrap_or(RiskLevel::Low);
            assert_eq!(analysis.risk_level, max_severity);
            if analysis.is_phishing {
                assert_eq!(analysis.recommendation, Recommendation::Block);
            }
            if analysis.recommendation == Recommendation::Proceed {
                assert!(!analysis.is_phishing);
                assert_eq!(analysis.risk_level, RiskLevel::Low);
            }
        }
    }

    #[test]
    fn analysis_is_idempotent_for_same_snapshot() {
        let intel = intel_with_scam();
        let first = analyze_domain("phantmo.app", &ctx(&intel, None));
        let second = analyze_domain("phantmo.app", &ctx(&intel, None));

        assert_eq!(first.risk_level, second.risk_level);
        assert_eq!(first.is_phishing, second.is_phishing);
        assert_eq!(first.recommendation, second.recommendation);
        assert_eq!(first.signals.len(), second.signals.len());
    }
}
