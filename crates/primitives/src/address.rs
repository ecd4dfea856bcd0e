//! Conversions between addresses, output scripts and public key hashes.
//!
//! Every conversion is network-aware: an address is only accepted for the network it was encoded
//! for.

use bitcoin::{address::NetworkUnchecked, Address, Script, ScriptBuf};

use crate::{
    errors::{PrimitivesError, PrimitivesResult},
    network::BitcoinNetwork,
    scripts::general::{public_key_hash_script, ScriptType},
};

/// Parses a bitcoin address from a string, requiring it to belong to `network`.
pub fn parse_address(address: &str, network: BitcoinNetwork) -> PrimitivesResult<Address> {
    let network = network.to_bitcoin_network()?;
    let address = address
        .parse::<Address<NetworkUnchecked>>()?
        .require_network(network)?;

    Ok(address)
}

/// Encodes a public key hash as a P2WPKH (`witness`) or P2PKH address.
pub fn public_key_hash_to_address(
    public_key_hash: &[u8; 20],
    witness: bool,
    network: BitcoinNetwork,
) -> PrimitivesResult<Address> {
    output_script_to_address(&public_key_hash_script(public_key_hash, witness), network)
}

/// Extracts the public key hash from a P2PKH or P2WPKH address.
pub fn address_to_public_key_hash(
    address: &str,
    network: BitcoinNetwork,
) -> PrimitivesResult<[u8; 20]> {
    let script = address_to_output_script(address, network)?;
    let bytes = script.as_bytes();

    let hash = match ScriptType::classify(&script) {
        ScriptType::P2pkh => &bytes[3..23],
        ScriptType::P2wpkh => &bytes[2..22],
        _ => return Err(PrimitivesError::NotPublicKeyHashAddress),
    };

    let mut public_key_hash = [0u8; 20];
    public_key_hash.copy_from_slice(hash);

    Ok(public_key_hash)
}

/// Returns the output script that pays to `address`.
pub fn address_to_output_script(
    address: &str,
    network: BitcoinNetwork,
) -> PrimitivesResult<ScriptBuf> {
    Ok(parse_address(address, network)?.script_pubkey())
}

/// Returns the address that `script` pays to.
pub fn output_script_to_address(
    script: &Script,
    network: BitcoinNetwork,
) -> PrimitivesResult<Address> {
    let network = network.to_bitcoin_network()?;

    Ok(Address::from_script(script, network)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET_PKH: &str = "8db50eb52063ea9d98b3eac91489a90f738986f6";

    fn wallet_pkh() -> [u8; 20] {
        hex::decode(WALLET_PKH)
            .expect("must be valid hex")
            .try_into()
            .expect("must be 20 bytes")
    }

    #[test]
    fn test_public_key_hash_to_address() {
        let cases = [
            (true, BitcoinNetwork::Testnet, "tb1q3k6sadfqv04fmx9naty3fzdfpaecnphkfm3cf3"),
            (true, BitcoinNetwork::Mainnet, "bc1q3k6sadfqv04fmx9naty3fzdfpaecnphkra2tjz"),
            (false, BitcoinNetwork::Testnet, "mtSEUCE7G8om9zJttG9twtjoiSsUz7QnY9"),
        ];

        for (witness, network, expected) in cases {
            let address =
                public_key_hash_to_address(&wallet_pkh(), witness, network).expect("must encode");
            assert_eq!(address.to_string(), expected);
        }
    }

    #[test]
    fn test_address_to_public_key_hash() {
        for address in [
            "tb1q3k6sadfqv04fmx9naty3fzdfpaecnphkfm3cf3",
            "mtSEUCE7G8om9zJttG9twtjoiSsUz7QnY9",
        ] {
            let hash = address_to_public_key_hash(address, BitcoinNetwork::Testnet)
                .expect("must decode");
            assert_eq!(hex::encode(hash), WALLET_PKH);
        }

        let script_hash_address = "2MwGJ12ZNLJX3qWqPmqLGzh3EfdN5XAEGQ8";
        assert!(matches!(
            address_to_public_key_hash(script_hash_address, BitcoinNetwork::Testnet),
            Err(PrimitivesError::NotPublicKeyHashAddress)
        ));
    }

    #[test]
    fn test_address_network_is_enforced() {
        assert!(parse_address(
            "tb1q3k6sadfqv04fmx9naty3fzdfpaecnphkfm3cf3",
            BitcoinNetwork::Mainnet
        )
        .is_err());
        assert!(parse_address("not an address", BitcoinNetwork::Testnet).is_err());
    }

    #[test]
    fn test_output_script_round_trip() {
        let script = address_to_output_script(
            "tb1qgycg0ys3c4xlgc8ysnwln2kqp89n3mn5ts7z3l",
            BitcoinNetwork::Testnet,
        )
        .expect("must decode");

        assert_eq!(
            hex::encode(script.as_bytes()),
            "00144130879211c54df460e484ddf9aac009cb38ee74"
        );
        assert_eq!(
            output_script_to_address(&script, BitcoinNetwork::Testnet)
                .expect("must encode")
                .to_string(),
            "tb1qgycg0ys3c4xlgc8ysnwln2kqp89n3mn5ts7z3l"
        );
    }
}
