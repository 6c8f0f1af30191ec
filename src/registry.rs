use std::collections::HashMap;

use crate::types::{ProgramCategory, ProgramInfo, ProgramRiskLevel, TrustStatus};

pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";
pub const ASSOCIATED_TOKEN_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";
pub const COMPUTE_BUDGET_PROGRAM_ID: &str = "ComputeBudget111111111111111111111111111111";
pub const MEMO_PROGRAM_ID: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";

/// User override for one program address.
#[derive(Debug, Clone)]
pub struct CustomProgramTrust {
    pub trust: TrustStatus,
    /// Overrides the catalog name when present.
    pub label: Option<String>,
}

/// Address -> program metadata, with per-address user trust layered on top.
///
/// An explicit value injected by the caller rather than a global cache:
/// the host replaces the catalog on registry refresh and writes trust
/// overrides on user action, both last-write-wins.
#[derive(Debug, Clone)]
pub struct ProgramRegistry {
    catalog: HashMap<String, ProgramInfo>,
    overrides: HashMap<String, CustomProgramTrust>,
}

impl Default for ProgramRegistry {
    fn default() -> Self {
        Self::bootstrap()
    }
}

impl ProgramRegistry {
    pub fn empty() -> Self {
        Self {
            catalog: HashMap::new(),
            overrides: HashMap::new(),
        }
    }

    /// Registry seeded with the static catalog of well-known programs.
    pub fn bootstrap() -> Self {
        let mut registry = Self::empty();
        for info in bootstrap_catalog() {
            registry.catalog.insert(info.program_id.clone(), info);
        }
        registry
    }

    /// Resolution order: user trust override, then static catalog, then
    /// `None` (callers treat a miss as unknown risk).
    pub fn lookup(&self, program_id: &str) -> Option<ProgramInfo> {
        let base = self.catalog.get(program_id).cloned();

        if let Some(custom) = self.overrides.get(program_id) {
            let mut info = base.unwrap_or_else(|| ProgramInfo {
                program_id: program_id.to_string(),
                name: program_id.to_string(),
                category: ProgramCategory::Unknown,
                risk_level: ProgramRiskLevel::Unknown,
                is_native: false,
            });
            info.risk_level = trust_to_risk(custom.trust);
            if let Some(label) = &custom.label {
                info.name = label.clone();
            }
            return Some(info);
        }

        if base.is_none() {
            tracing::debug!(program_id, "registry miss");
        }
        base
    }

    /// Swap in a freshly fetched catalog, dropping the previous one.
    /// User trust overrides survive the swap.
    pub fn replace_catalog(&mut self, entries: impl IntoIterator<Item = ProgramInfo>) {
        self.catalog = entries
            .into_iter()
            .map(|info| (info.program_id.clone(), info))
            .collect();
    }

    pub fn upsert(&mut self, info: ProgramInfo) {
        self.catalog.insert(info.program_id.clone(), info);
    }

    pub fn set_trust(&mut self, program_id: &str, trust: TrustStatus, label: Option<String>) {
        self.overrides
            .insert(program_id.to_string(), CustomProgramTrust { trust, label });
    }

    pub fn clear_trust(&mut self, program_id: &str) {
        self.overrides.remove(program_id);
    }
}

fn trust_to_risk(trust: TrustStatus) -> ProgramRiskLevel {
    match trust {
        TrustStatus::Trusted => ProgramRiskLevel::Verified,
        TrustStatus::Neutral => ProgramRiskLevel::Unknown,
        TrustStatus::Blocked => ProgramRiskLevel::Malicious,
    }
}

fn bootstrap_catalog() -> Vec<ProgramInfo> {
    let native = |id: &str, name: &str, category: ProgramCategory| ProgramInfo {
        program_id: id.to_string(),
        name: name.to_string(),
        category,
        risk_level: ProgramRiskLevel::Verified,
        is_native: true,
    };
    let verified = |id: &str, name: &str, category: ProgramCategory| ProgramInfo {
        program_id: id.to_string(),
        name: name.to_string(),
        category,
        risk_level: ProgramRiskLevel::Verified,
        is_native: false,
    };

    vec![
        native(SYSTEM_PROGRAM_ID, "System Program", ProgramCategory::System),
        native(TOKEN_PROGRAM_ID, "SPL Token", ProgramCategory::Token),
        native(TOKEN_2022_PROGRAM_ID, "Token-2022", ProgramCategory::Token),
        native(
            ASSOCIATED_TOKEN_PROGRAM_ID,
            "Associated Token Account",
            ProgramCategory::Token,
        ),
        native(
            COMPUTE_BUDGET_PROGRAM_ID,
            "Compute Budget",
            ProgramCategory::System,
        ),
        native(MEMO_PROGRAM_ID, "Memo", ProgramCategory::Utility),
        verified(
            "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4",
            "Jupiter Aggregator v6",
            ProgramCategory::Defi,
        ),
        verified(
            "DCA265Vj8a9CEuX1eb1LWRnDT7uK6q1xMipnNyatn23M",
            "Jupiter DCA",
            ProgramCategory::Defi,
        ),
        verified(
            "jupoNjAxXgZ4rjzxzPMP4oxduvQsQtZzyknqvzYNrNu",
            "Jupiter Limit Order",
            ProgramCategory::Defi,
        ),
        verified(
            "j1o2qRpjcyUwEvwtcfhEQefh773ZgjxcVRry7LDqg5X",
            "Jupiter Limit Order v2",
            ProgramCategory::Defi,
        ),
        verified(
            "LiMoM9rMhrdYrfzUCxQppvxCSG1FcrUK9G8uLq4A1GF",
            "Kamino Limit Order",
            ProgramCategory::Defi,
        ),
        verified(
            "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8",
            "Raydium AMM v4",
            ProgramCategory::Defi,
        ),
        verified(
            "whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc",
            "Orca Whirlpools",
            ProgramCategory::Defi,
        ),
        verified(
            "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s",
            "Metaplex Token Metadata",
            ProgramCategory::Nft,
        ),
    ]
}
