//! System-program instruction decoding.
//!
//! The leading four bytes are a little-endian u32 opcode; amounts are
//! little-endian u64 lamports in the positions fixed by the program.

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemInstruction {
    CreateAccount { lamports: u64 },
    Assign,
    Transfer { lamports: u64 },
    CreateAccountWithSeed,
    AdvanceNonce,
    WithdrawNonce { lamports: u64 },
    InitializeNonce,
    AuthorizeNonce,
    Allocate,
    AllocateWithSeed,
    AssignWithSeed,
    TransferWithSeed { lamports: u64 },
}

pub fn decode(data: &[u8]) -> Result<SystemInstruction, Error> {
    let opcode = read_u32_le(data, 0).ok_or_else(|| Error::InstructionLayout {
        reason: "system instruction shorter than opcode".to_string(),
    })?;

    match opcode {
        0 => Ok(SystemInstruction::CreateAccount {
            lamports: require_u64(data, 4, "create_account lamports")?,
        }),
        1 => Ok(SystemInstruction::Assign),
        2 => Ok(SystemInstruction::Transfer {
            lamports: require_u64(data, 4, "transfer lamports")?,
        }),
        3 => Ok(SystemInstruction::CreateAccountWithSeed),
        4 => Ok(SystemInstruction::AdvanceNonce),
        5 => Ok(SystemInstruction::WithdrawNonce {
            lamports: require_u64(data, 4, "withdraw_nonce lamports")?,
        }),
        6 => Ok(SystemInstruction::InitializeNonce),
        7 => Ok(SystemInstruction::AuthorizeNonce),
        8 => Ok(SystemInstruction::Allocate),
        9 => Ok(SystemInstruction::AllocateWithSeed),
        10 => Ok(SystemInstruction::AssignWithSeed),
        11 => Ok(SystemInstruction::TransferWithSeed {
            lamports: require_u64(data, 4, "transfer_with_seed lamports")?,
        }),
        other => Err(Error::InstructionLayout {
            reason: format!("unknown system opcode {other}"),
        }),
    }
}

pub(crate) fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    let bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

pub(crate) fn read_u64_le(data: &[u8], offset: usize) -> Option<u64> {
    let bytes: [u8; 8] = data.get(offset..offset + 8)?.try_into().ok()?;
    Some(u64::from_le_bytes(bytes))
}

fn require_u64(data: &[u8], offset: usize, what: &str) -> Result<u64, Error> {
    read_u64_le(data, offset).ok_or_else(|| Error::InstructionLayout {
        reason: format!("missing {what}"),
    })
}
