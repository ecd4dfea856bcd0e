//! The deposit locking script.

use bitcoin::{
    opcodes::all::{
        OP_CHECKSIG, OP_CLTV, OP_DROP, OP_DUP, OP_ELSE, OP_ENDIF, OP_EQUAL, OP_EQUALVERIFY,
        OP_HASH160, OP_IF,
    },
    script::Builder,
    ScriptBuf,
};

use crate::deposit::DepositReceipt;

/// Create the script that locks a deposit.
///
/// The script has two spending paths:
///
/// 1. the wallet whose public key hashes to `wallet_public_key_hash` can spend at any time with
///    `<sig> <wallet pubkey>`,
/// 2. the refund key can spend with `<sig> <refund pubkey>` once the transaction locktime is past
///    `refund_locktime`.
///
/// The depositor and blinding factor are pushed and dropped right away, they only make the script
/// (and so the address) unique to the receipt.
pub fn deposit_script(receipt: &DepositReceipt) -> ScriptBuf {
    Builder::new()
        .push_slice(receipt.depositor.as_bytes())
        .push_opcode(OP_DROP)
        .push_slice(receipt.blinding_factor)
        .push_opcode(OP_DROP)
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_slice(receipt.wallet_public_key_hash)
        .push_opcode(OP_EQUAL)
        .push_opcode(OP_IF)
        .push_opcode(OP_CHECKSIG)
        .push_opcode(OP_ELSE)
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_slice(receipt.refund_public_key_hash)
        .push_opcode(OP_EQUALVERIFY)
        .push_slice(receipt.refund_locktime)
        .push_opcode(OP_CLTV)
        .push_opcode(OP_DROP)
        .push_opcode(OP_CHECKSIG)
        .push_opcode(OP_ENDIF)
        .into_script()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixture_receipt;

    #[test]
    fn test_locktime_is_pushed_as_raw_bytes() {
        let script = deposit_script(&fixture_receipt());
        let bytes = script.as_bytes();

        // <4-byte push> <locktime> OP_CLTV OP_DROP OP_CHECKSIG OP_ENDIF
        let tail = &bytes[bytes.len() - 9..];
        assert_eq!(tail, [0x04, 0x60, 0xbc, 0xea, 0x61, 0xb1, 0x75, 0xac, 0x68]);
    }

    #[test]
    fn test_blinding_factor_changes_script() {
        let receipt = fixture_receipt();
        let other = DepositReceipt {
            blinding_factor: [0u8; 8],
            ..receipt.clone()
        };

        assert_ne!(deposit_script(&receipt), deposit_script(&other));
        assert_eq!(deposit_script(&receipt).len(), deposit_script(&other).len());
    }
}
