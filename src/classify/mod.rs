//! Raw instruction -> semantic summary.
//!
//! Dispatch is a tagged union over the program families the engine
//! understands; everything else is `Unknown`. A per-instruction layout
//! failure degrades to a placeholder summary and never aborts the
//! surrounding analysis.

pub mod system;
pub mod token;

use crate::registry::{
    ASSOCIATED_TOKEN_PROGRAM_ID, COMPUTE_BUDGET_PROGRAM_ID, MEMO_PROGRAM_ID, SYSTEM_PROGRAM_ID,
    TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use crate::types::{
    AnalysisContext, ApprovalAmount, AuthorityChange, InstructionSummary, InstructionType,
    ProgramRiskLevel, RawInstruction, TokenTransferSummary,
};

pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Program family an instruction dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramFamily {
    System,
    Token,
    ComputeBudget,
    AssociatedTokenAccount,
    Memo,
    Unknown,
}

impl ProgramFamily {
    pub fn from_program_id(program_id: &str) -> Self {
        match program_id {
            SYSTEM_PROGRAM_ID => Self::System,
            TOKEN_PROGRAM_ID | TOKEN_2022_PROGRAM_ID => Self::Token,
            COMPUTE_BUDGET_PROGRAM_ID => Self::ComputeBudget,
            ASSOCIATED_TOKEN_PROGRAM_ID => Self::AssociatedTokenAccount,
            MEMO_PROGRAM_ID => Self::Memo,
            _ => Self::Unknown,
        }
    }
}

/// Everything the classifier extracted from one instruction.
#[derive(Debug, Clone)]
pub struct Classification {
    pub summary: InstructionSummary,
    pub token_transfer: Option<TokenTransferSummary>,
    pub authority_change: Option<AuthorityChange>,
    /// Lamports moved by System transfers; zero otherwise.
    pub lamports: u64,
    /// True when the registry had no entry for the program.
    pub registry_miss: bool,
}

pub fn classify_instruction(ix: &RawInstruction, ctx: &AnalysisContext) -> Classification {
    let info = ctx.registry.lookup(&ix.program_id);
    let registry_miss = info.is_none();
    let (program_name, program_risk) = match &info {
        Some(info) => (info.name.clone(), info.risk_level),
        None => ("Unknown Program".to_string(), ProgramRiskLevel::Unknown),
    };

    let mut classification = Classification {
        summary: InstructionSummary {
            program_id: ix.program_id.clone(),
            program_name,
            program_risk,
            kind: InstructionType::Unknown,
            description: String::new(),
            accounts: ix.account_keys.clone(),
            warnings: Vec::new(),
        },
        token_transfer: None,
        authority_change: None,
        lamports: 0,
        registry_miss,
    };

    match ProgramFamily::from_program_id(&ix.program_id) {
        ProgramFamily::System => classify_system(ix, &mut classification),
        ProgramFamily::Token => classify_token(ix, ctx, &mut classification),
        ProgramFamily::ComputeBudget => {
            classification.summary.kind = InstructionType::ComputeBudget;
            classification.summary.description = "Set compute budget limits".to_string();
        }
        ProgramFamily::AssociatedTokenAccount => {
            classification.summary.kind = InstructionType::CreateTokenAccount;
            classification.summary.description =
                "Create associated token account".to_string();
        }
        ProgramFamily::Memo => {
            classification.summary.kind = InstructionType::Unknown;
            classification.summary.description = "Attach memo".to_string();
        }
        ProgramFamily::Unknown => {
            classification.summary.description =
                format!("Unknown instruction for program {}", ix.program_id);
            if registry_miss && ctx.settings.warn_on_unknown_programs {
                classification
                    .summary
                    .warnings
                    .push("Program is not in the known-program registry".to_string());
            }
        }
    }

    classification
}

fn classify_system(ix: &RawInstruction, out: &mut Classification) {
    let summary = &mut out.summary;
    match system::decode(&ix.data) {
        Ok(system::SystemInstruction::Transfer { lamports })
        | Ok(system::SystemInstruction::TransferWithSeed { lamports }) => {
            let sol = lamports as f64 / LAMPORTS_PER_SOL;
            summary.kind = InstructionType::SolTransfer;
            summary.description = format!(
                "Transfer {sol} SOL from {} to {}",
                account(ix, 0),
                account(ix, 1)
            );
            out.lamports = lamports;
        }
        Ok(system::SystemInstruction::CreateAccount { lamports }) => {
            let sol = lamports as f64 / LAMPORTS_PER_SOL;
            summary.kind = InstructionType::CreateAccount;
            summary.description = format!("Create account {} funded with {sol} SOL", account(ix, 1));
        }
        Ok(system::SystemInstruction::CreateAccountWithSeed) => {
            summary.kind = InstructionType::CreateAccount;
            summary.description = "Create account with seed".to_string();
        }
        Ok(system::SystemInstruction::Assign)
        | Ok(system::SystemInstruction::AssignWithSeed) => {
            summary.kind = InstructionType::Assign;
            summary.description = format!("Assign account {} to a program", account(ix, 0));
        }
        Ok(system::SystemInstruction::Allocate)
        | Ok(system::SystemInstruction::AllocateWithSeed) => {
            summary.kind = InstructionType::Allocate;
            summary.description = format!("Allocate space for account {}", account(ix, 0));
        }
        Ok(system::SystemInstruction::AdvanceNonce)
        | Ok(system::SystemInstruction::WithdrawNonce { .. })
        | Ok(system::SystemInstruction::InitializeNonce)
        | Ok(system::SystemInstruction::AuthorizeNonce) => {
            summary.kind = InstructionType::NonceOperation;
            summary.description = "Durable nonce operation".to_string();
        }
        Err(e) => placeholder(summary, "System Program", &e),
    }
}

fn classify_token(ix: &RawInstruction, ctx: &AnalysisContext, out: &mut Classification) {
    match token::decode(&ix.data) {
        Ok(decoded) => apply_token(ix, ctx, decoded, out),
        Err(e) => placeholder(&mut out.summary, "SPL Token", &e),
    }
}

fn apply_token(
    ix: &RawInstruction,
    ctx: &AnalysisContext,
    decoded: token::TokenInstruction,
    out: &mut Classification,
) {
    use token::TokenInstruction as T;

    let summary = &mut out.summary;
    match decoded {
        T::Transfer { amount } => {
            summary.kind = InstructionType::TokenTransfer;
            summary.description = format!(
                "Transfer {amount} tokens from {} to {}",
                account(ix, 0),
                account(ix, 1)
            );
            out.token_transfer = Some(TokenTransferSummary {
                mint: None,
                amount: amount as f64,
                raw_amount: amount,
                source: account(ix, 0),
                destination: account(ix, 1),
                is_approval: false,
                approval: None,
            });
        }
        T::TransferChecked { amount, decimals } => {
            let display = token::scale_amount(amount, decimals);
            summary.kind = InstructionType::TokenTransfer;
            summary.description = format!(
                "Transfer {display} tokens of mint {} to {}",
                account(ix, 1),
                account(ix, 2)
            );
            out.token_transfer = Some(TokenTransferSummary {
                mint: Some(account(ix, 1)),
                amount: display,
                raw_amount: amount,
                source: account(ix, 0),
                destination: account(ix, 2),
                is_approval: false,
                approval: None,
            });
        }
        T::Approve { approval } => {
            summary.kind = InstructionType::TokenApprove;
            summary.description = approve_description(approval, &account(ix, 1));
            out.token_transfer = Some(approval_summary(
                approval,
                None,
                account(ix, 0),
                account(ix, 1),
            ));
        }
        T::ApproveChecked { approval, decimals } => {
            summary.kind = InstructionType::TokenApprove;
            summary.description = approve_description(approval, &account(ix, 2));
            let mut transfer = approval_summary(
                approval,
                Some(account(ix, 1)),
                account(ix, 0),
                account(ix, 2),
            );
            if let ApprovalAmount::Bounded(raw) = approval {
                transfer.amount = token::scale_amount(raw, decimals);
            }
            out.token_transfer = Some(transfer);
        }
        T::Revoke => {
            summary.kind = InstructionType::TokenRevoke;
            summary.description = format!("Revoke delegate on {}", account(ix, 0));
        }
        T::SetAuthority {
            kind,
            new_authority,
        } => {
            summary.kind = InstructionType::SetAuthority;
            let target = account(ix, 0);
            summary.description = match &new_authority {
                Some(addr) => format!("Change {kind} authority of {target} to {addr}"),
                None => format!("Remove {kind} authority of {target}"),
            };
            let is_wallet_authority = matches!(
                (ctx.wallet_address, new_authority.as_deref()),
                (Some(wallet), Some(addr)) if wallet == addr
            );
            out.authority_change = Some(AuthorityChange {
                kind,
                account: target,
                new_authority,
                is_wallet_authority,
            });
        }
        T::MintTo { amount } | T::MintToChecked { amount, .. } => {
            summary.kind = InstructionType::MintTo;
            summary.description = format!("Mint {amount} tokens to {}", account(ix, 1));
        }
        T::Burn { amount } | T::BurnChecked { amount, .. } => {
            summary.kind = InstructionType::Burn;
            summary.description = format!("Burn {amount} tokens from {}", account(ix, 0));
        }
        T::CloseAccount => {
            summary.kind = InstructionType::CloseAccount;
            summary.description = format!(
                "Close token account {} and send rent to {}",
                account(ix, 0),
                account(ix, 1)
            );
        }
        T::FreezeAccount => {
            summary.kind = InstructionType::FreezeAccount;
            summary.description = format!("Freeze token account {}", account(ix, 0));
        }
        T::ThawAccount => {
            summary.kind = InstructionType::ThawAccount;
            summary.description = format!("Thaw token account {}", account(ix, 0));
        }
        T::InitializeMint => {
            summary.kind = InstructionType::InitializeMint;
            summary.description = format!("Initialize mint {}", account(ix, 0));
        }
        T::InitializeAccount | T::InitializeMultisig => {
            summary.kind = InstructionType::InitializeAccount;
            summary.description = format!("Initialize token account {}", account(ix, 0));
        }
    }
}

fn approve_description(approval: ApprovalAmount, delegate: &str) -> String {
    match approval {
        ApprovalAmount::Bounded(amount) => {
            format!("Approve delegate {delegate} for {amount} tokens")
        }
        ApprovalAmount::Unlimited => {
            format!("Approve delegate {delegate} for UNLIMITED tokens")
        }
    }
}

fn approval_summary(
    approval: ApprovalAmount,
    mint: Option<String>,
    source: String,
    delegate: String,
) -> TokenTransferSummary {
    let raw_amount = match approval {
        ApprovalAmount::Bounded(raw) => raw,
        ApprovalAmount::Unlimited => u64::MAX,
    };
    TokenTransferSummary {
        mint,
        amount: raw_amount as f64,
        raw_amount,
        source,
        destination: delegate,
        is_approval: true,
        approval: Some(approval),
    }
}

fn placeholder(summary: &mut InstructionSummary, program: &str, error: &crate::error::Error) {
    tracing::debug!(program, %error, "instruction layout mismatch, using placeholder");
    summary.kind = InstructionType::Unknown;
    summary.description = format!("{program} instruction with unreadable data");
    summary
        .warnings
        .push("Instruction data did not match the expected layout".to_string());
}

fn account(ix: &RawInstruction, idx: usize) -> String {
    ix.account_keys
        .get(idx)
        .cloned()
        .unwrap_or_else(|| "unknown".to_string())
}
