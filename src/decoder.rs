//! Serialized transaction -> ordered raw instructions.
//!
//! The wire format carries no schema tag, so decoding probes formats in a
//! fixed order: base58 text, base64 text, then the versioned binary layout,
//! then the legacy one. Decoding fails only on structurally invalid byte
//! streams; instruction data it cannot semantically interpret passes through
//! untouched for the classifier to deal with.

use solana_message::compiled_instruction::CompiledInstruction;
use solana_pubkey::Pubkey;
use solana_transaction::Transaction;
use solana_transaction::versioned::VersionedTransaction;

use crate::error::Error;
use crate::types::RawInstruction;

pub fn decode(serialized: &[u8]) -> Result<Vec<RawInstruction>, Error> {
    if serialized.is_empty() {
        return Err(Error::Decode {
            reason: "empty input".to_string(),
        });
    }

    if let Ok(text) = std::str::from_utf8(serialized) {
        let trimmed = text.trim();

        if let Ok(bytes) = bs58::decode(trimmed).into_vec() {
            match decode_binary(&bytes) {
                Ok(instructions) => return Ok(instructions),
                Err(e) => tracing::debug!("base58 payload is not a transaction: {e}"),
            }
        }

        if let Ok(bytes) = base64::decode(trimmed) {
            match decode_binary(&bytes) {
                Ok(instructions) => return Ok(instructions),
                Err(e) => tracing::debug!("base64 payload is not a transaction: {e}"),
            }
        }
    }

    decode_binary(serialized)
}

fn decode_binary(bytes: &[u8]) -> Result<Vec<RawInstruction>, Error> {
    match bincode::deserialize::<VersionedTransaction>(bytes) {
        Ok(tx) => Ok(extract(
            tx.message.static_account_keys(),
            tx.message.instructions(),
        )),
        Err(versioned_err) => match bincode::deserialize::<Transaction>(bytes) {
            Ok(tx) => Ok(extract(&tx.message.account_keys, &tx.message.instructions)),
            Err(_) => Err(Error::Decode {
                reason: format!("not a versioned or legacy transaction: {versioned_err}"),
            }),
        },
    }
}

fn extract(account_keys: &[Pubkey], instructions: &[CompiledInstruction]) -> Vec<RawInstruction> {
    let mut result = Vec::with_capacity(instructions.len());
    for compiled in instructions {
        let program_idx = compiled.program_id_index as usize;
        let Some(program_id) = account_keys.get(program_idx) else {
            // Index into an address lookup table we cannot resolve offline.
            tracing::debug!(program_idx, "skipping instruction with unresolvable program id");
            continue;
        };

        // Indices into lookup-table-loaded keys cannot be resolved offline;
        // keep their positions so account roles do not shift.
        let keys = compiled
            .accounts
            .iter()
            .map(|idx| {
                account_keys
                    .get(*idx as usize)
                    .map_or_else(|| "unknown".to_string(), |key| key.to_string())
            })
            .collect();

        result.push(RawInstruction {
            program_id: program_id.to_string(),
            account_keys: keys,
            data: compiled.data.clone(),
        });
    }
    result
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use solana_instruction::{AccountMeta, Instruction};
    use solana_message::{Message, MessageHeader, VersionedMessage, v0};

    fn transfer_tx(lamports: u64) -> Transaction {
        let payer = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let system_program: Pubkey = crate::registry::SYSTEM_PROGRAM_ID.parse().unwrap();

        let mut data = 2u32.to_le_bytes().to_vec();
        data.extend_from_slice(&lamports.to_le_bytes());

        let ix = Instruction {
            program_id: system_program,
            accounts: vec![
                AccountMeta::new(payer, true),
                AccountMeta::new(recipient, false),
            ],
            data,
        };
        let message = Message::new(&[ix], Some(&payer));
        Transaction::new_unsigned(message)
    }

    #[test]
    fn decodes_legacy_binary_transaction() {
        let tx = transfer_tx(1_500_000_000);
        let bytes = bincode::serialize(&tx).unwrap();

        let instructions = decode(&bytes).unwrap();
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].program_id, crate::registry::SYSTEM_PROGRAM_ID);
        assert_eq!(instructions[0].account_keys.len(), 2);
        assert_eq!(instructions[0].data[..4], 2u32.to_le_bytes());
    }

    #[test]
    fn decodes_versioned_transaction() {
        let tx = transfer_tx(42);
        let versioned = VersionedTransaction {
            signatures: tx.signatures.clone(),
            message: VersionedMessage::Legacy(tx.message),
        };
        let bytes = bincode::serialize(&versioned).unwrap();

        let instructions = decode(&bytes).unwrap();
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].program_id, crate::registry::SYSTEM_PROGRAM_ID);
    }

    #[test]
    fn lookup_table_account_indices_keep_their_positions() {
        let payer = Pubkey::new_unique();
        let destination = Pubkey::new_unique();
        let token_program: Pubkey = crate::registry::TOKEN_PROGRAM_ID.parse().unwrap();

        let mut data = vec![12u8];
        data.extend_from_slice(&1_250_000u64.to_le_bytes());
        data.push(6);

        // TransferChecked accounts [source, mint, destination, authority];
        // the mint (index 3) resolves through an address lookup table.
        let message = v0::Message {
            header: MessageHeader {
                num_required_signatures: 1,
                num_readonly_signed_accounts: 0,
                num_readonly_unsigned_accounts: 1,
            },
            account_keys: vec![payer, destination, token_program],
            recent_blockhash: Default::default(),
            instructions: vec![CompiledInstruction {
                program_id_index: 2,
                accounts: vec![0, 3, 1, 0],
                data,
            }],
            address_table_lookups: vec![v0::MessageAddressTableLookup {
                account_key: Pubkey::new_unique(),
                writable_indexes: vec![],
                readonly_indexes: vec![0],
            }],
        };
        let versioned = VersionedTransaction {
            signatures: vec![],
            message: VersionedMessage::V0(message),
        };
        let bytes = bincode::serialize(&versioned).unwrap();

        let instructions = decode(&bytes).unwrap();
        assert_eq!(instructions.len(), 1);
        let keys = &instructions[0].account_keys;
        assert_eq!(keys.len(), 4);
        assert_eq!(keys[0], payer.to_string());
        assert_eq!(keys[1], "unknown");
        assert_eq!(keys[2], destination.to_string());
        assert_eq!(keys[3], payer.to_string());
    }

    #[test]
    fn decodes_base58_and_base64_text_payloads() {
        let tx = transfer_tx(7);
        let bytes = bincode::serialize(&tx).unwrap();

        let b58 = bs58::encode(&bytes).into_string();
        assert_eq!(decode(b58.as_bytes()).unwrap().len(), 1);

        let b64 = base64::encode(&bytes);
        assert_eq!(decode(b64.as_bytes()).unwrap().len(), 1);
    }

    #[test]
    fn opaque_instruction_data_is_not_a_decode_failure() {
        let payer = Pubkey::new_unique();
        let ix = Instruction {
            program_id: Pubkey::new_unique(),
            accounts: vec![AccountMeta::new(payer, true)],
            data: vec![0xde, 0xad, 0xbe, 0xef, 0x99],
        };
        let message = Message::new(&[ix], Some(&payer));
        let bytes = bincode::serialize(&Transaction::new_unsigned(message)).unwrap();

        let instructions = decode(&bytes).unwrap();
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].data, vec![0xde, 0xad, 0xbe, 0xef, 0x99]);
    }

    #[test]
    fn malformed_bytes_fail_with_decode_error() {
        let result = decode(&[0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(Error::Decode { .. })));

        assert!(matches!(decode(&[]), Err(Error::Decode { .. })));
        assert!(matches!(
            decode(b"definitely not a transaction"),
            Err(Error::Decode { .. })
        ));
    }
}
