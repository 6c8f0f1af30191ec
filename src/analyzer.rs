//! Public transaction-analysis surface.
//!
//! Every call returns a complete, typed summary; decode failure produces a
//! synthetic high-risk verdict instead of an error, so nothing throws past
//! this boundary.

use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use crate::classify::{self, LAMPORTS_PER_SOL};
use crate::decoder;
use crate::risk::{self, RiskInputs};
use crate::types::{AnalysisContext, RiskLevel, TransactionSummary};

pub fn analyze_transaction(
    serialized: &[u8],
    domain: &str,
    ctx: &AnalysisContext<'_>,
) -> TransactionSummary {
    let analyzed_at = now_millis();
    let id = summary_id(serialized, analyzed_at);
    let raw_serialized = base64::encode(serialized);

    let raw_instructions = match decoder::decode(serialized) {
        Ok(instructions) => instructions,
        Err(e) => {
            tracing::warn!(%e, "transaction failed to decode, returning synthetic verdict");
            return undecodable_summary(id, analyzed_at, domain, raw_serialized);
        }
    };

    let mut instructions = Vec::with_capacity(raw_instructions.len());
    let mut token_transfers = Vec::new();
    let mut authority_changes = Vec::new();
    let mut unknown_programs: Vec<String> = Vec::new();
    let mut lamports_total: u64 = 0;

    for raw in &raw_instructions {
        let classified = classify::classify_instruction(raw, ctx);
        if classified.registry_miss && !unknown_programs.contains(&raw.program_id) {
            unknown_programs.push(raw.program_id.clone());
        }
        lamports_total = lamports_total.saturating_add(classified.lamports);
        token_transfers.extend(classified.token_transfer);
        authority_changes.extend(classified.authority_change);
        instructions.push(classified.summary);
    }

    let total_sol_transfer = lamports_total as f64 / LAMPORTS_PER_SOL;
    let verdict = risk::aggregate(&RiskInputs {
        instructions: &instructions,
        token_transfers: &token_transfers,
        authority_changes: &authority_changes,
        total_sol_transfer,
        unknown_programs: &unknown_programs,
        settings: ctx.settings,
    });

    TransactionSummary {
        id,
        analyzed_at,
        domain: domain.to_string(),
        instructions,
        total_sol_transfer,
        token_transfers,
        authority_changes,
        risk_level: verdict.risk_level,
        warnings: verdict.warnings,
        unknown_programs,
        requires_confirmation: verdict.requires_confirmation,
        raw_serialized,
    }
}

/// Analyze a batch; output order matches input order.
pub fn analyze_transactions<T: AsRef<[u8]>>(
    serialized: &[T],
    domain: &str,
    ctx: &AnalysisContext<'_>,
) -> Vec<TransactionSummary> {
    serialized
        .iter()
        .map(|tx| analyze_transaction(tx.as_ref(), domain, ctx))
        .collect()
}

fn undecodable_summary(
    id: String,
    analyzed_at: u64,
    domain: &str,
    raw_serialized: String,
) -> TransactionSummary {
    TransactionSummary {
        id,
        analyzed_at,
        domain: domain.to_string(),
        instructions: Vec::new(),
        total_sol_transfer: 0.0,
        token_transfers: Vec::new(),
        authority_changes: Vec::new(),
        risk_level: RiskLevel::High,
        warnings: vec![
            "Transaction could not be decoded".to_string(),
            "Do not sign unless you fully trust this site".to_string(),
        ],
        unknown_programs: Vec::new(),
        requires_confirmation: true,
        raw_serialized,
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn summary_id(serialized: &[u8], analyzed_at: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(serialized);
    hasher.update(analyzed_at.to_le_bytes());
    let digest = hasher.finalize();

    let mut id = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        let _ = write!(id, "{byte:02x}");
    }
    id
}
