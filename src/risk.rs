//! Transaction-level risk aggregation.
//!
//! The severity rules are an ordered table evaluated top to bottom, first
//! match wins. Warning text is collected independently and gated by the
//! host's `warn_on_*` toggles; the severity escalation itself never is.

use crate::types::{
    AuthorityChange, InstructionSummary, ProgramRiskLevel, RiskLevel, SecuritySettings,
    TokenTransferSummary,
};

/// Everything the cascade looks at, borrowed from the in-flight analysis.
pub struct RiskInputs<'a> {
    pub instructions: &'a [InstructionSummary],
    pub token_transfers: &'a [TokenTransferSummary],
    pub authority_changes: &'a [AuthorityChange],
    /// Total SOL moved by System transfers.
    pub total_sol_transfer: f64,
    pub unknown_programs: &'a [String],
    pub settings: &'a SecuritySettings,
}

#[derive(Debug, Clone)]
pub struct RiskVerdict {
    pub risk_level: RiskLevel,
    pub warnings: Vec<String>,
    pub requires_confirmation: bool,
}

struct RiskRule {
    #[expect(dead_code, reason = "rule names document the table and aid debugging")]
    name: &'static str,
    level: RiskLevel,
    applies: fn(&RiskInputs<'_>) -> bool,
}

/// Ordered severity cascade, first match wins. Mirrors the priority the
/// UI promises: malicious program > authority loss > unlimited approval >
/// huge transfer > unknown > flagged > large transfer > any authority change.
static CASCADE: &[RiskRule] = &[
    RiskRule {
        name: "malicious_program",
        level: RiskLevel::High,
        applies: |inputs| {
            inputs
                .instructions
                .iter()
                .any(|ix| ix.program_risk == ProgramRiskLevel::Malicious)
        },
    },
    RiskRule {
        name: "authority_leaves_wallet",
        level: RiskLevel::High,
        applies: |inputs| {
            inputs
                .authority_changes
                .iter()
                .any(|change| !change.is_wallet_authority)
        },
    },
    RiskRule {
        name: "unlimited_approval",
        level: RiskLevel::High,
        applies: |inputs| inputs.token_transfers.iter().any(is_unlimited_approval),
    },
    RiskRule {
        name: "very_large_transfer",
        level: RiskLevel::High,
        applies: |inputs| {
            inputs.settings.large_transfer_threshold > 0.0
                && inputs.total_sol_transfer >= inputs.settings.large_transfer_threshold * 10.0
        },
    },
    RiskRule {
        name: "unknown_program",
        level: RiskLevel::Medium,
        applies: |inputs| {
            !inputs.unknown_programs.is_empty()
                || inputs
                    .instructions
                    .iter()
                    .any(|ix| ix.program_risk == ProgramRiskLevel::Unknown)
        },
    },
    RiskRule {
        name: "flagged_program",
        level: RiskLevel::Medium,
        applies: |inputs| {
            inputs
                .instructions
                .iter()
                .any(|ix| ix.program_risk == ProgramRiskLevel::Flagged)
        },
    },
    RiskRule {
        name: "large_transfer",
        level: RiskLevel::Medium,
        applies: |inputs| {
            inputs.settings.large_transfer_threshold > 0.0
                && inputs.total_sol_transfer >= inputs.settings.large_transfer_threshold
        },
    },
    RiskRule {
        name: "any_authority_change",
        level: RiskLevel::Medium,
        applies: |inputs| !inputs.authority_changes.is_empty(),
    },
];

pub fn aggregate(inputs: &RiskInputs<'_>) -> RiskVerdict {
    let risk_level = CASCADE
        .iter()
        .find(|rule| (rule.applies)(inputs))
        .map_or(RiskLevel::Low, |rule| rule.level);

    let warnings = collect_warnings(inputs);
    let requires_confirmation = risk_level != RiskLevel::Low || !warnings.is_empty();

    RiskVerdict {
        risk_level,
        warnings,
        requires_confirmation,
    }
}

fn collect_warnings(inputs: &RiskInputs<'_>) -> Vec<String> {
    let mut warnings = Vec::new();
    let settings = inputs.settings;

    for ix in inputs.instructions {
        match ix.program_risk {
            ProgramRiskLevel::Malicious => warnings.push(format!(
                "Transaction calls a program flagged as malicious: {}",
                ix.program_name
            )),
            ProgramRiskLevel::Flagged => warnings.push(format!(
                "Transaction calls a program flagged as risky: {}",
                ix.program_name
            )),
            ProgramRiskLevel::Verified | ProgramRiskLevel::Unknown => {}
        }
    }

    if settings.warn_on_unknown_programs && !inputs.unknown_programs.is_empty() {
        warnings.push(format!(
            "Transaction calls {} program(s) not in the registry",
            inputs.unknown_programs.len()
        ));
    }

    if settings.warn_on_unlimited_approvals {
        for transfer in inputs.token_transfers.iter().filter(|t| is_unlimited_approval(t)) {
            warnings.push(format!(
                "Unlimited token approval granted to {}",
                transfer.destination
            ));
        }
    }

    if settings.warn_on_large_transfers
        && settings.large_transfer_threshold > 0.0
        && inputs.total_sol_transfer >= settings.large_transfer_threshold
    {
        warnings.push(format!(
            "Large transfer of {} SOL exceeds your {} SOL threshold",
            inputs.total_sol_transfer, settings.large_transfer_threshold
        ));
    }

    if settings.warn_on_authority_changes {
        for change in inputs.authority_changes {
            if change.is_wallet_authority {
                warnings.push(format!(
                    "Sets {} authority of {} to your own wallet",
                    change.kind, change.account
                ));
            } else {
                warnings.push(format!(
                    "Transfers {} authority of {} away from your wallet",
                    change.kind, change.account
                ));
            }
        }
    }

    warnings
}

fn is_unlimited_approval(transfer: &TokenTransferSummary) -> bool {
    transfer.is_approval && transfer.approval.is_some_and(|a| a.is_unlimited())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApprovalAmount, AuthorityKind, InstructionType};

    fn instruction(risk: ProgramRiskLevel) -> InstructionSummary {
        InstructionSummary {
            program_id: "prog".to_string(),
            program_name: "Program".to_string(),
            program_risk: risk,
            kind: InstructionType::Unknown,
            description: String::new(),
            accounts: vec![],
            warnings: vec![],
        }
    }

    fn approval(approval: ApprovalAmount) -> TokenTransferSummary {
        TokenTransferSummary {
            mint: None,
            amount: 0.0,
            raw_amount: 0,
            source: "src".to_string(),
            destination: "delegate".to_string(),
            is_approval: true,
            approval: Some(approval),
        }
    }

    fn authority_change(is_wallet_authority: bool) -> AuthorityChange {
        AuthorityChange {
            kind: AuthorityKind::Owner,
            account: "acct".to_string(),
            new_authority: Some("someone".to_string()),
            is_wallet_authority,
        }
    }

    fn base_inputs<'a>(settings: &'a SecuritySettings) -> RiskInputs<'a> {
        RiskInputs {
            instructions: &[],
            token_transfers: &[],
            authority_changes: &[],
            total_sol_transfer: 0.0,
            unknown_programs: &[],
            settings,
        }
    }

    #[test]
    fn empty_transaction_is_low_risk_without_confirmation() {
        let settings = SecuritySettings::default();
        let verdict = aggregate(&base_inputs(&settings));
        assert_eq!(verdict.risk_level, RiskLevel::Low);
        assert!(verdict.warnings.is_empty());
        assert!(!verdict.requires_confirmation);
    }

    #[test]
    fn malicious_program_dominates_everything_else() {
        let settings = SecuritySettings::default();
        let instructions = vec![
            instruction(ProgramRiskLevel::Verified),
            instruction(ProgramRiskLevel::Malicious),
        ];
        let transfers = vec![approval(ApprovalAmount::Bounded(5))];

        let mut inputs = base_inputs(&settings);
        inputs.instructions = &instructions;
        inputs.token_transfers = &transfers;
        inputs.total_sol_transfer = 0.001;

        let verdict = aggregate(&inputs);
        assert_eq!(verdict.risk_level, RiskLevel::High);
        assert!(verdict.requires_confirmation);
        assert!(verdict.warnings.iter().any(|w| w.contains("malicious")));
    }

    #[test]
    fn authority_change_away_from_wallet_is_high() {
        let settings = SecuritySettings::default();
        let changes = vec![authority_change(false)];
        let mut inputs = base_inputs(&settings);
        inputs.authority_changes = &changes;

        let verdict = aggregate(&inputs);
        assert_eq!(verdict.risk_level, RiskLevel::High);
        assert!(verdict.warnings.iter().any(|w| w.contains("away from your wallet")));
    }

    #[test]
    fn authority_change_to_self_is_medium() {
        let settings = SecuritySettings::default();
        let changes = vec![authority_change(true)];
        let mut inputs = base_inputs(&settings);
        inputs.authority_changes = &changes;

        let verdict = aggregate(&inputs);
        assert_eq!(verdict.risk_level, RiskLevel::Medium);
        assert!(verdict.requires_confirmation);
    }

    #[test]
    fn unlimited_approval_is_high_and_bounded_is_not() {
        let settings = SecuritySettings::default();

        let unlimited = vec![approval(ApprovalAmount::Unlimited)];
        let mut inputs = base_inputs(&settings);
        inputs.token_transfers = &unlimited;
        assert_eq!(aggregate(&inputs).risk_level, RiskLevel::High);

        let bounded = vec![approval(ApprovalAmount::Bounded(1_000))];
        let mut inputs = base_inputs(&settings);
        inputs.token_transfers = &bounded;
        assert_eq!(aggregate(&inputs).risk_level, RiskLevel::Low);
    }

    #[test]
    fn transfer_thresholds_escalate_in_two_steps() {
        let settings = SecuritySettings {
            large_transfer_threshold: 100.0,
            ..SecuritySettings::default()
        };

        let mut inputs = base_inputs(&settings);
        inputs.total_sol_transfer = 1.5;
        assert_eq!(aggregate(&inputs).risk_level, RiskLevel::Low);

        let mut inputs = base_inputs(&settings);
        inputs.total_sol_transfer = 150.0;
        let verdict = aggregate(&inputs);
        assert_eq!(verdict.risk_level, RiskLevel::Medium);
        assert!(verdict.warnings.iter().any(|w| w.contains("Large transfer")));
        assert!(verdict.requires_confirmation);

        let mut inputs = base_inputs(&settings);
        inputs.total_sol_transfer = 1_000.0;
        assert_eq!(aggregate(&inputs).risk_level, RiskLevel::High);
    }

    #[test]
    fn toggles_suppress_warning_text_but_never_escalation() {
        let settings = SecuritySettings {
            warn_on_unlimited_approvals: false,
            warn_on_authority_changes: false,
            warn_on_large_transfers: false,
            warn_on_unknown_programs: false,
            ..SecuritySettings::default()
        };

        let transfers = vec![approval(ApprovalAmount::Unlimited)];
        let mut inputs = base_inputs(&settings);
        inputs.token_transfers = &transfers;

        let verdict = aggregate(&inputs);
        assert_eq!(verdict.risk_level, RiskLevel::High);
        assert!(verdict.warnings.is_empty());
        // risk alone still forces confirmation
        assert!(verdict.requires_confirmation);
    }

    fn lcg_next(state: &mut u64) -> u64 {
        *state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        *state
    }

    #[test]
    fn confirmation_invariant_holds_for_randomized_inputs() {
        let mut seed = 0x00C0_FFEE_u64;
        for _ in 0..20_000 {
            let settings = SecuritySettings {
                large_transfer_threshold: (lcg_next(&mut seed) % 1_000) as f64,
                warn_on_unknown_programs: lcg_next(&mut seed) % 2 == 0,
                warn_on_large_transfers: lcg_next(&mut seed) % 2 == 0,
                warn_on_authority_changes: lcg_next(&mut seed) % 2 == 0,
                warn_on_unlimited_approvals: lcg_next(&mut seed) % 2 == 0,
            };

            let transfers = match lcg_next(&mut seed) % 3 {
                0 => vec![],
                1 => vec![approval(ApprovalAmount::Bounded(lcg_next(&mut seed)))],
                _ => vec![approval(ApprovalAmount::Unlimited)],
            };
            let changes = match lcg_next(&mut seed) % 3 {
                0 => vec![],
                1 => vec![authority_change(true)],
                _ => vec![authority_change(false)],
            };

            let mut inputs = base_inputs(&settings);
            inputs.token_transfers = &transfers;
            inputs.authority_changes = &changes;
            inputs.total_sol_transfer = (lcg_next(&mut seed) % 10_000) as f64;

            let verdict = aggregate(&inputs);
            assert_eq!(
                verdict.requires_confirmation,
                verdict.risk_level != RiskLevel::Low || !verdict.warnings.is_empty()
            );
            if transfers.iter().any(is_unlimited_approval)
                || changes.iter().any(|c| !c.is_wallet_authority)
            {
                assert_eq!(verdict.risk_level, RiskLevel::High);
            }
            if !changes.is_empty() {
                assert!(verdict.risk_level >= RiskLevel::Medium);
            }
        }
    }

    #[test]
    fn unknown_and_flagged_programs_are_medium() {
        let settings = SecuritySettings::default();

        let unknown = vec!["Mystery".to_string()];
        let mut inputs = base_inputs(&settings);
        inputs.unknown_programs = &unknown;
        assert_eq!(aggregate(&inputs).risk_level, RiskLevel::Medium);

        let flagged = vec![instruction(ProgramRiskLevel::Flagged)];
        let mut inputs = base_inputs(&settings);
        inputs.instructions = &flagged;
        let verdict = aggregate(&inputs);
        assert_eq!(verdict.risk_level, RiskLevel::Medium);
        assert!(verdict.warnings.iter().any(|w| w.contains("risky")));
    }
}
