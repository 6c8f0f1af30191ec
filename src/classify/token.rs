//! SPL Token (and Token-2022) instruction decoding.
//!
//! The leading byte is the opcode; amounts are little-endian u64 in the
//! token's smallest unit. Checked variants append a decimals byte, which is
//! the only place the wire carries display scaling.

use crate::error::Error;
use crate::types::{ApprovalAmount, AuthorityKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenInstruction {
    InitializeMint,
    InitializeAccount,
    InitializeMultisig,
    Transfer { amount: u64 },
    /// An absent amount decodes as an unlimited approval, same as u64::MAX.
    Approve { approval: ApprovalAmount },
    Revoke,
    SetAuthority {
        kind: AuthorityKind,
        new_authority: Option<String>,
    },
    MintTo { amount: u64 },
    Burn { amount: u64 },
    CloseAccount,
    FreezeAccount,
    ThawAccount,
    TransferChecked { amount: u64, decimals: u8 },
    ApproveChecked { approval: ApprovalAmount, decimals: u8 },
    MintToChecked { amount: u64, decimals: u8 },
    BurnChecked { amount: u64, decimals: u8 },
}

pub fn decode(data: &[u8]) -> Result<TokenInstruction, Error> {
    let opcode = *data.first().ok_or_else(|| Error::InstructionLayout {
        reason: "empty token instruction".to_string(),
    })?;

    match opcode {
        0 => Ok(TokenInstruction::InitializeMint),
        1 => Ok(TokenInstruction::InitializeAccount),
        2 => Ok(TokenInstruction::InitializeMultisig),
        3 => Ok(TokenInstruction::Transfer {
            amount: require_amount(data, "transfer")?,
        }),
        4 => Ok(TokenInstruction::Approve {
            approval: ApprovalAmount::from_raw(super::system::read_u64_le(data, 1)),
        }),
        5 => Ok(TokenInstruction::Revoke),
        6 => decode_set_authority(data),
        7 => Ok(TokenInstruction::MintTo {
            amount: require_amount(data, "mint_to")?,
        }),
        8 => Ok(TokenInstruction::Burn {
            amount: require_amount(data, "burn")?,
        }),
        9 => Ok(TokenInstruction::CloseAccount),
        10 => Ok(TokenInstruction::FreezeAccount),
        11 => Ok(TokenInstruction::ThawAccount),
        12 => {
            let (amount, decimals) = require_checked(data, "transfer_checked")?;
            Ok(TokenInstruction::TransferChecked { amount, decimals })
        }
        13 => {
            let decimals = *data.get(9).ok_or_else(|| Error::InstructionLayout {
                reason: "missing approve_checked decimals".to_string(),
            })?;
            Ok(TokenInstruction::ApproveChecked {
                approval: ApprovalAmount::from_raw(super::system::read_u64_le(data, 1)),
                decimals,
            })
        }
        14 => {
            let (amount, decimals) = require_checked(data, "mint_to_checked")?;
            Ok(TokenInstruction::MintToChecked { amount, decimals })
        }
        15 => {
            let (amount, decimals) = require_checked(data, "burn_checked")?;
            Ok(TokenInstruction::BurnChecked { amount, decimals })
        }
        other => Err(Error::InstructionLayout {
            reason: format!("unknown token opcode {other}"),
        }),
    }
}

fn decode_set_authority(data: &[u8]) -> Result<TokenInstruction, Error> {
    let kind = match data.get(1) {
        Some(0) => AuthorityKind::Mint,
        Some(1) => AuthorityKind::Freeze,
        Some(2) => AuthorityKind::Owner,
        Some(3) => AuthorityKind::Close,
        Some(other) => {
            return Err(Error::InstructionLayout {
                reason: format!("unknown authority type {other}"),
            });
        }
        None => {
            return Err(Error::InstructionLayout {
                reason: "missing authority type".to_string(),
            });
        }
    };

    // COption<Pubkey>: one tag byte, then 32 key bytes when the tag is 1.
    let new_authority = match data.get(2) {
        Some(0) => None,
        Some(1) => {
            let key = data.get(3..35).ok_or_else(|| Error::InstructionLayout {
                reason: "truncated new authority key".to_string(),
            })?;
            Some(bs58::encode(key).into_string())
        }
        _ => {
            return Err(Error::InstructionLayout {
                reason: "missing new authority tag".to_string(),
            });
        }
    };

    Ok(TokenInstruction::SetAuthority {
        kind,
        new_authority,
    })
}

fn require_amount(data: &[u8], what: &str) -> Result<u64, Error> {
    super::system::read_u64_le(data, 1).ok_or_else(|| Error::InstructionLayout {
        reason: format!("missing {what} amount"),
    })
}

fn require_checked(data: &[u8], what: &str) -> Result<(u64, u8), Error> {
    let amount = require_amount(data, what)?;
    let decimals = *data.get(9).ok_or_else(|| Error::InstructionLayout {
        reason: format!("missing {what} decimals"),
    })?;
    Ok((amount, decimals))
}

/// Scale a raw amount by the token's decimals for display.
pub fn scale_amount(raw: u64, decimals: u8) -> f64 {
    raw as f64 / 10f64.powi(i32::from(decimals))
}
