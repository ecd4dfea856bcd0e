//! Test utilities for the primitives.
//!
//! These utilities are not written in the `test-utils` crate to keep the primitives crate
//! completely independent. The values come from real testnet transactions.

use crate::{deposit::DepositReceipt, types::ChainIdentifier};

/// Raw P2WSH deposit funding transaction
/// `9eb901fc68f0d9bcaf575f23783b7d30ac5dd8d95f3c83dceaa13dce17de816a`.
pub(crate) const DEPOSIT_FUNDING_P2WSH_TX: &str = "010000000001018348cdeb551134fe1f19d378a8adec9b146671cb67b945b71bf56b20dc2b952f0100000000ffffffff021027000000000000220020df74a2e385542c87acfafa564ea4bc4fc4eb87d2b6a37d6c3b64722be83c636f10d73b00000000001600147ac2d9378a1c47e589dfb8095ca95ed2140d272602483045022100ac3d41482338262654418825c37a4c7b327ed4e0b1dfb80eba0c98f264a6cc2e02201cd321f1b806cc946141d71b229dd0a440917c9f429b5f8840f7be59d70dbfee012102ee067a0273f2e3ba88d23140a24fdb290f27bbcd0f94117a9c65be3911c5c04e00000000";

/// Raw legacy (non-segwit) refund of a P2SH deposit
/// `7df9ed885525899ccbe144fd129062cec59be43d428b85fb847808b8790ad262`.
pub(crate) const P2SH_REFUND_TX: &str = "010000000143012f742b4e449c123b90d8a86f298659f6d1d752dca0b589bf67f36204656000000000c847304402204fc34e5607a3993b8690a7316d5bb4739ee63154dc397c62397711b4e1e81d0602205a484657a4d52c1730681fce0f11a8e5cf6307e1b73be05fa5c1b2471d519a6a012103a0677d620a980f1a6035a16d08312793d6717b71b12a948c5b64671beee220634c5c14934b98637ca318a4d6e7ca6ffd1690b8e77df6377508f9f0c90d000395237576a9148db50eb52063ea9d98b3eac91489a90f738986f68763ac6776a9141b67f27537c7b30a23d8ccefb96a4cacfc72d9a18804d0cad363b175ac68feffffff01a0590100000000001600141b67f27537c7b30a23d8ccefb96a4cacfc72d9a1d0cad363";

/// Deposit script derived from [`fixture_receipt`].
pub(crate) const FIXTURE_DEPOSIT_SCRIPT: &str = "14934b98637ca318a4d6e7ca6ffd1690b8e77df6377508f9f0c90d000395237576a9148db50eb52063ea9d98b3eac91489a90f738986f68763ac6776a91428e081f285138ccbe389c1eb8985716230129f89880460bcea61b175ac68";

fn decode<const N: usize>(hex_str: &str) -> [u8; N] {
    let bytes = hex::decode(hex_str).expect("must be valid hex");

    bytes.try_into().expect("must have the right length")
}

/// The deposit receipt used by the funding fixtures, with a refund locktime of
/// `1640181600 + 2592000`.
pub(crate) fn fixture_receipt() -> DepositReceipt {
    DepositReceipt {
        depositor: ChainIdentifier::new(decode("934b98637ca318a4d6e7ca6ffd1690b8e77df637")),
        blinding_factor: decode("f9f0c90d00039523"),
        wallet_public_key_hash: decode("8db50eb52063ea9d98b3eac91489a90f738986f6"),
        refund_public_key_hash: decode("28e081f285138ccbe389c1eb8985716230129f89"),
        refund_locktime: decode("60bcea61"),
        vault: None,
        extra_data: None,
    }
}
