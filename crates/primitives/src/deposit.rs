//! Deposit receipts and the scripts and addresses derived from them.

use bitcoin::{Address, ScriptBuf};

use crate::{
    errors::{PrimitivesError, PrimitivesResult},
    hash::{hash160, sha256},
    network::BitcoinNetwork,
    scripts::deposit::deposit_script,
    types::{parse_fixed_hex, ChainIdentifier},
};

/// Default time, in seconds, after which a deposit can be refunded to the depositor.
pub const DEFAULT_REFUND_LOCKTIME_DURATION: u32 = 2_592_000;

/// Everything needed to derive a deposit script and to later sweep or refund the deposit.
///
/// The blinding factor must be unique per depositor, wallet and refund key, otherwise two deposits
/// end up locked to the same address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DepositReceipt {
    /// Host chain account that receives the minted tokens.
    pub depositor: ChainIdentifier,

    /// Random 8 bytes that make the deposit script unique.
    pub blinding_factor: [u8; 8],

    /// HASH160 of the compressed public key of the wallet that controls the deposit.
    pub wallet_public_key_hash: [u8; 20],

    /// HASH160 of the compressed public key that can refund the deposit.
    pub refund_public_key_hash: [u8; 20],

    /// Unix timestamp after which the refund branch becomes spendable, 4 bytes little-endian.
    pub refund_locktime: [u8; 4],

    /// Optional vault the minted tokens are routed to.
    pub vault: Option<ChainIdentifier>,

    /// Optional 32 bytes of data passed along when the deposit is revealed.
    pub extra_data: Option<[u8; 32]>,
}

impl DepositReceipt {
    /// Builds a receipt from hex encoded fields, checking every field length.
    pub fn from_hex(
        depositor: &str,
        blinding_factor: &str,
        wallet_public_key_hash: &str,
        refund_public_key_hash: &str,
        refund_locktime: &str,
    ) -> PrimitivesResult<Self> {
        Ok(Self {
            depositor: depositor.parse()?,
            blinding_factor: parse_fixed_hex("blinding factor", blinding_factor)?,
            wallet_public_key_hash: parse_fixed_hex(
                "wallet public key hash",
                wallet_public_key_hash,
            )?,
            refund_public_key_hash: parse_fixed_hex(
                "refund public key hash",
                refund_public_key_hash,
            )?,
            refund_locktime: parse_fixed_hex("refund locktime", refund_locktime)?,
            vault: None,
            extra_data: None,
        })
    }

    /// Routes the minted tokens to `vault`.
    pub fn with_vault(mut self, vault: ChainIdentifier) -> Self {
        self.vault = Some(vault);
        self
    }

    /// Decodes the refund locktime into a Unix timestamp.
    pub const fn refund_locktime_timestamp(&self) -> u32 {
        u32::from_le_bytes(self.refund_locktime)
    }

    /// The deposit locking script.
    pub fn script(&self) -> ScriptBuf {
        deposit_script(self)
    }

    /// Hash of the deposit script: SHA-256 for P2WSH and HASH160 for P2SH.
    pub fn script_hash(&self, witness: bool) -> Vec<u8> {
        let script = self.script();

        if witness {
            sha256(script.as_bytes()).to_vec()
        } else {
            hash160(script.as_bytes()).to_vec()
        }
    }

    /// The output script that locks funds to this deposit.
    pub fn output_script(&self, witness: bool) -> ScriptBuf {
        let script = self.script();

        if witness {
            script.to_p2wsh()
        } else {
            script.to_p2sh()
        }
    }

    /// The address funds must be sent to, for the given network.
    pub fn address(&self, witness: bool, network: BitcoinNetwork) -> PrimitivesResult<Address> {
        let network = network.to_bitcoin_network()?;

        Ok(Address::from_script(&self.output_script(witness), network)?)
    }
}

/// Computes the refund locktime as `deposit_created_at + duration`, encoded as 4 bytes
/// little-endian.
pub fn calculate_refund_locktime(
    deposit_created_at: u32,
    duration: u32,
) -> PrimitivesResult<[u8; 4]> {
    deposit_created_at
        .checked_add(duration)
        .map(u32::to_le_bytes)
        .ok_or(PrimitivesError::LocktimeOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fixture_receipt, FIXTURE_DEPOSIT_SCRIPT};

    #[test]
    fn test_calculate_refund_locktime() {
        let locktime =
            calculate_refund_locktime(1_640_181_600, DEFAULT_REFUND_LOCKTIME_DURATION)
                .expect("must fit");

        assert_eq!(hex::encode(locktime), "60bcea61");
        assert!(calculate_refund_locktime(u32::MAX, 1).is_err());
    }

    #[test]
    fn test_deposit_script() {
        let receipt = fixture_receipt();

        assert_eq!(hex::encode(receipt.script().as_bytes()), FIXTURE_DEPOSIT_SCRIPT);
        assert_eq!(receipt.refund_locktime_timestamp(), 1_642_773_600);
    }

    #[test]
    fn test_script_hashes() {
        let receipt = fixture_receipt();

        assert_eq!(
            hex::encode(receipt.script_hash(true)),
            "df74a2e385542c87acfafa564ea4bc4fc4eb87d2b6a37d6c3b64722be83c636f"
        );
        assert_eq!(
            hex::encode(receipt.script_hash(false)),
            "2c1444d23936c57bdd8b3e67e5938a5440cda455"
        );
    }

    #[test]
    fn test_addresses() {
        let receipt = fixture_receipt();
        let cases = [
            (
                true,
                BitcoinNetwork::Mainnet,
                "bc1qma629cu92skg0t86lftyaf9uflzwhp7jk63h6mpmv3ezh6puvdhsdxuv4m",
            ),
            (
                true,
                BitcoinNetwork::Testnet,
                "tb1qma629cu92skg0t86lftyaf9uflzwhp7jk63h6mpmv3ezh6puvdhs6w2r05",
            ),
            (false, BitcoinNetwork::Mainnet, "35i5wHdLir1hdjCr6hiQNk3yTH9ufe61eH"),
            (false, BitcoinNetwork::Testnet, "2MwGJ12ZNLJX3qWqPmqLGzh3EfdN5XAEGQ8"),
        ];

        for (witness, network, expected) in cases {
            let address = receipt.address(witness, network).expect("must derive");
            assert_eq!(address.to_string(), expected);
        }
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let receipt = fixture_receipt();
        let again = fixture_receipt();

        assert_eq!(
            receipt.address(true, BitcoinNetwork::Testnet).expect("must derive"),
            again.address(true, BitcoinNetwork::Testnet).expect("must derive"),
        );
        assert_ne!(receipt.output_script(true), receipt.output_script(false));
        assert!(receipt.address(true, BitcoinNetwork::Unknown).is_err());
    }

    #[test]
    fn test_from_hex_validates_lengths() {
        let receipt = DepositReceipt::from_hex(
            "934b98637ca318a4d6e7ca6ffd1690b8e77df637",
            "f9f0c90d00039523",
            "8db50eb52063ea9d98b3eac91489a90f738986f6",
            "28e081f285138ccbe389c1eb8985716230129f89",
            "60bcea61",
        )
        .expect("must be valid");
        assert_eq!(receipt, fixture_receipt());

        let bad_blinding = DepositReceipt::from_hex(
            "934b98637ca318a4d6e7ca6ffd1690b8e77df637",
            "f9f0c90d000395",
            "8db50eb52063ea9d98b3eac91489a90f738986f6",
            "28e081f285138ccbe389c1eb8985716230129f89",
            "60bcea61",
        );
        assert!(matches!(
            bad_blinding,
            Err(PrimitivesError::InvalidLength {
                field: "blinding factor",
                ..
            })
        ));

        let bad_locktime = DepositReceipt::from_hex(
            "934b98637ca318a4d6e7ca6ffd1690b8e77df637",
            "f9f0c90d00039523",
            "8db50eb52063ea9d98b3eac91489a90f738986f6",
            "28e081f285138ccbe389c1eb8985716230129f89",
            "60bcea6100",
        );
        assert!(bad_locktime.is_err());
    }
}
