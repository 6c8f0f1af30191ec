#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod classify;
pub mod error;
pub mod phishing;
pub mod registry;
pub mod risk;
pub mod types;

#[cfg(feature = "native")]
pub mod analyzer;
#[cfg(feature = "native")]
pub mod decoder;

#[cfg(feature = "wasm")]
pub mod wasm;

#[cfg(feature = "native")]
pub use analyzer::{analyze_transaction, analyze_transactions};
pub use classify::{Classification, ProgramFamily, classify_instruction};
pub use error::Error;
pub use phishing::{analyze_domain, normalize_domain, should_show_warning};
pub use registry::{CustomProgramTrust, ProgramRegistry};
pub use risk::{RiskInputs, RiskVerdict, aggregate};
pub use types::{
    AnalysisContext, ApprovalAmount, AuthorityChange, AuthorityKind, DomainContext,
    DomainSettings, InstructionSummary, InstructionType, PhishingAnalysis, PhishingSignal,
    ProgramCategory, ProgramInfo, ProgramRiskLevel, RawInstruction, Recommendation, RiskLevel,
    SecuritySettings, SignalKind, ThreatIntelSnapshot, TokenTransferSummary, TransactionSummary,
    TrustStatus,
};
