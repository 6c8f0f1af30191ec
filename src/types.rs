use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::registry::ProgramRegistry;

/// Overall severity verdict, also used as per-signal severity.
///
/// Ordered so that `max()` over signals yields the dominant severity.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Risk classification of an on-chain program, as resolved by the registry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProgramRiskLevel {
    Verified,
    Unknown,
    Flagged,
    Malicious,
}

/// User-assigned trust for a domain or a program address.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TrustStatus {
    Trusted,
    Neutral,
    Blocked,
}

/// Suggested user action derived from phishing signals.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Proceed,
    Warning,
    Block,
}

/// Coarse catalog category for a known program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProgramCategory {
    System,
    Token,
    Defi,
    Nft,
    Utility,
    Unknown,
}

/// Registry entry for an on-chain program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramInfo {
    /// Program address (base58).
    pub program_id: String,
    /// Human-readable name shown in summaries.
    pub name: String,
    pub category: ProgramCategory,
    pub risk_level: ProgramRiskLevel,
    /// True for programs shipped with the runtime (System, SPL Token, ...).
    pub is_native: bool,
}

/// One decoded instruction as extracted from the serialized transaction.
///
/// Account keys and the program id are base58 strings; `data` is the opaque
/// argument byte slice, interpreted (or not) by the classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawInstruction {
    pub program_id: String,
    pub account_keys: Vec<String>,
    pub data: Vec<u8>,
}

/// Semantic tag assigned to a classified instruction.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InstructionType {
    SolTransfer,
    CreateAccount,
    Assign,
    Allocate,
    NonceOperation,
    TokenTransfer,
    TokenApprove,
    TokenRevoke,
    SetAuthority,
    MintTo,
    Burn,
    CloseAccount,
    FreezeAccount,
    ThawAccount,
    InitializeMint,
    InitializeAccount,
    CreateTokenAccount,
    ComputeBudget,
    Unknown,
}

/// Delegate allowance granted by an approve instruction.
///
/// An absent amount and an amount of `u64::MAX` both mean "unlimited";
/// [`ApprovalAmount::from_raw`] is the only place that rule lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalAmount {
    Bounded(u64),
    Unlimited,
}

impl ApprovalAmount {
    pub fn from_raw(raw: Option<u64>) -> Self {
        match raw {
            None | Some(u64::MAX) => Self::Unlimited,
            Some(amount) => Self::Bounded(amount),
        }
    }

    pub fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

/// A token movement or delegate approval extracted from one instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenTransferSummary {
    /// Mint address when the instruction names one, `None` for unchecked
    /// transfers that only reference token accounts.
    pub mint: Option<String>,
    /// Display amount, scaled by decimals when the wire format carries them.
    pub amount: f64,
    /// Raw amount in the smallest unit, straight off the wire.
    pub raw_amount: u64,
    pub source: String,
    pub destination: String,
    pub is_approval: bool,
    /// `Some` only when `is_approval`.
    pub approval: Option<ApprovalAmount>,
}

/// Which authority of an account or mint is being changed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuthorityKind {
    Mint,
    Freeze,
    Owner,
    Close,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityChange {
    pub kind: AuthorityKind,
    /// Account or mint whose authority is changing.
    pub account: String,
    /// `None` when the authority is being removed.
    pub new_authority: Option<String>,
    /// True iff `new_authority` equals the caller's own wallet address.
    pub is_wallet_authority: bool,
}

/// One classified instruction inside a [`TransactionSummary`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionSummary {
    pub program_id: String,
    pub program_name: String,
    pub program_risk: ProgramRiskLevel,
    pub kind: InstructionType,
    pub description: String,
    pub accounts: Vec<String>,
    pub warnings: Vec<String>,
}

/// Full verdict for one analyzed transaction. Created fresh per call and
/// never mutated after return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSummary {
    /// Content-derived analysis id, unique per call.
    pub id: String,
    /// Unix milliseconds at analysis time.
    pub analyzed_at: u64,
    /// Requesting domain, as supplied by the host.
    pub domain: String,
    pub instructions: Vec<InstructionSummary>,
    /// Total SOL moved by System transfers, in SOL.
    pub total_sol_transfer: f64,
    pub token_transfers: Vec<TokenTransferSummary>,
    pub authority_changes: Vec<AuthorityChange>,
    pub risk_level: RiskLevel,
    pub warnings: Vec<String>,
    /// Program ids touched that the registry has no entry for.
    pub unknown_programs: Vec<String>,
    pub requires_confirmation: bool,
    /// Base64 echo of the input bytes.
    pub raw_serialized: String,
}

/// Kind tag for a phishing signal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Homoglyph,
    Typosquat,
    SuspiciousTld,
    KnownScam,
    UserFlagged,
    NewDomain,
    SimilarToKnown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhishingSignal {
    pub kind: SignalKind,
    pub severity: RiskLevel,
    pub description: String,
    /// The legitimate domain this one resembles, when applicable.
    pub related_domain: Option<String>,
}

/// Full verdict for one analyzed domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhishingAnalysis {
    /// Normalized domain the detectors ran against.
    pub domain: String,
    /// True only for impersonation or scam-list hits, not for every
    /// high-risk verdict; gates auto-block vs. warning UI.
    pub is_phishing: bool,
    pub risk_level: RiskLevel,
    pub signals: Vec<PhishingSignal>,
    pub recommendation: Recommendation,
    pub previously_dismissed: bool,
}

/// Per-domain record kept by the host's connection store. Read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainSettings {
    pub domain: String,
    pub trust_status: TrustStatus,
    /// Unix milliseconds.
    pub first_seen: i64,
    /// Unix milliseconds.
    pub last_seen: i64,
    pub connection_count: u32,
}

/// Host security preferences.
///
/// The `warn_on_*` toggles suppress warning text only; risk escalation in
/// the aggregator cascade is never gated by them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecuritySettings {
    /// Large-transfer threshold in SOL.
    pub large_transfer_threshold: f64,
    pub warn_on_unknown_programs: bool,
    pub warn_on_large_transfers: bool,
    pub warn_on_authority_changes: bool,
    pub warn_on_unlimited_approvals: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            large_transfer_threshold: 10.0,
            warn_on_unknown_programs: true,
            warn_on_large_transfers: true,
            warn_on_authority_changes: true,
            warn_on_unlimited_approvals: true,
        }
    }
}

/// One consistent snapshot of threat-intel data.
///
/// Supplied by an external collaborator that may refresh in the background;
/// a call never observes a mid-call mutation. [`Default`] yields the
/// bootstrap snapshot so analysis degrades instead of failing when the
/// upstream fetch is unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatIntelSnapshot {
    pub legitimate_domains: Vec<String>,
    pub scam_domains: Vec<String>,
    /// TLDs with the leading dot, e.g. `".xyz"`.
    pub suspicious_tlds: Vec<String>,
    /// target character -> visually confusable substitutes.
    pub homoglyph_map: HashMap<char, Vec<char>>,
    pub ecosystem_keywords: Vec<String>,
}

impl Default for ThreatIntelSnapshot {
    fn default() -> Self {
        Self::bootstrap()
    }
}

impl ThreatIntelSnapshot {
    /// Seeded snapshot used until the first intel refresh lands.
    pub fn bootstrap() -> Self {
        let legitimate_domains = [
            "phantom.app",
            "solflare.com",
            "backpack.app",
            "solana.com",
            "solscan.io",
            "solanabeach.io",
            "magiceden.io",
            "tensor.trade",
            "jup.ag",
            "raydium.io",
            "orca.so",
            "marinade.finance",
            "kamino.finance",
            "metaplex.com",
            "drift.trade",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let suspicious_tlds = [
            ".xyz", ".top", ".click", ".link", ".live", ".icu", ".online", ".site", ".gq", ".tk",
            ".ml", ".cf", ".ga", ".buzz", ".rest",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let ecosystem_keywords = [
            "solana", "phantom", "solflare", "wallet", "airdrop", "claim", "mint", "jupiter",
            "raydium", "magiceden", "drift", "tensor",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let homoglyph_map: HashMap<char, Vec<char>> = [
            ('a', vec!['4', '@', 'а']),
            ('b', vec!['6', 'ь']),
            ('c', vec!['с', '(']),
            ('e', vec!['3', 'е', 'ё']),
            ('g', vec!['9', 'q']),
            ('i', vec!['1', 'l', 'í', '!']),
            ('l', vec!['1', 'i', '|']),
            ('m', vec!['м']),
            ('n', vec!['п']),
            ('o', vec!['0', 'о', 'ο']),
            ('p', vec!['р']),
            ('s', vec!['5', '$']),
            ('t', vec!['7', '+']),
            ('u', vec!['ц', 'v']),
            ('v', vec!['u', 'ν']),
            ('x', vec!['х']),
            ('y', vec!['у']),
            ('z', vec!['2']),
        ]
        .into_iter()
        .collect();

        Self {
            legitimate_domains,
            scam_domains: Vec::new(),
            suspicious_tlds,
            homoglyph_map,
            ecosystem_keywords,
        }
    }
}

/// Caller-supplied snapshots for the transaction pipeline.
pub struct AnalysisContext<'a> {
    pub registry: &'a ProgramRegistry,
    /// The caller's own wallet address; `None` when no wallet is unlocked.
    pub wallet_address: Option<&'a str>,
    pub settings: &'a SecuritySettings,
}

/// Caller-supplied snapshots for the domain pipeline.
pub struct DomainContext<'a> {
    pub threat_intel: &'a ThreatIntelSnapshot,
    /// Connection-store record for this domain, `None` if never seen.
    pub domain_settings: Option<&'a DomainSettings>,
    /// True when the user already dismissed a warning for this domain.
    pub previously_dismissed: bool,
}
