//! Real testnet transactions used to check the transaction assemblers byte for byte.
//!
//! Every `*_TX` constant is a raw transaction. The ones spent by another fixture are listed next to
//! the transaction that spends them.

use bitcoin::{consensus::encode::deserialize_hex, Transaction};
use tbtc_bridge_primitives::{
    deposit::{calculate_refund_locktime, DepositReceipt},
    key::SigningKey,
    network::BitcoinNetwork,
    types::{Utxo, UtxoWithTx},
};

/// Key of the depositor funding the deposits, P2WPKH `7ac2d937…140d2726`.
pub const DEPOSITOR_WIF: &str = "cRJvyxtoggjAm9A94cB86hZ7Y62z2ei5VNJHLksFi2xdnz1GJ6xt";

/// Key of the wallet sweeping deposits and handling redemptions, PKH `8db50eb5…738986f6`.
pub const WALLET_WIF: &str = "cRk1zdau3jp2X3XsrRKDdviYLuC32fHfyU186wLBEbZWx4uQWW3v";

/// Key able to refund the refund fixtures, PKH `1b67f275…fc72d9a1`.
pub const REFUNDER_WIF: &str = "cTWhf1nXc7aW8BN2qLtWcPtcgcWYKfzRXkCJNsuQ86HR8uJBYfMc";

/// Parent of the depositor's P2WPKH output `2f952bdc…ebcd4883:1`.
pub const FUNDING_PARENT_TX: &str = "0100000000010162cae24e74ad64f9f0493b09f3964908b3b3038f4924882d3dbd853b4c9bc7390100000000ffffffff02102700000000000017a914867120d5480a9cc0c11c1193fa59b3a92e852da78710043c00000000001600147ac2d9378a1c47e589dfb8095ca95ed2140d272602483045022100b70bd9b7f5d230444a542c7971bea79786b4ebde6703cee7b6ee8cd16e115ebf02204d50ea9d1ee08de9741498c2cc64266e40d52c4adb9ef68e65aa2727cd4208b5012102ee067a0273f2e3ba88d23140a24fdb290f27bbcd0f94117a9c65be3911c5c04e00000000";

/// P2WSH deposit funding `9eb901fc68f0d9bcaf575f23783b7d30ac5dd8d95f3c83dceaa13dce17de816a`.
pub const FUNDING_P2WSH_TX: &str = "010000000001018348cdeb551134fe1f19d378a8adec9b146671cb67b945b71bf56b20dc2b952f0100000000ffffffff021027000000000000220020df74a2e385542c87acfafa564ea4bc4fc4eb87d2b6a37d6c3b64722be83c636f10d73b00000000001600147ac2d9378a1c47e589dfb8095ca95ed2140d272602483045022100ac3d41482338262654418825c37a4c7b327ed4e0b1dfb80eba0c98f264a6cc2e02201cd321f1b806cc946141d71b229dd0a440917c9f429b5f8840f7be59d70dbfee012102ee067a0273f2e3ba88d23140a24fdb290f27bbcd0f94117a9c65be3911c5c04e00000000";

/// P2SH deposit funding `f21a9922c0c136c6d288cf1258b732d0f84a7d50d14a01d7d81cb6cd810f3517`.
pub const FUNDING_P2SH_TX: &str = "010000000001018348cdeb551134fe1f19d378a8adec9b146671cb67b945b71bf56b20dc2b952f0100000000ffffffff02102700000000000017a9142c1444d23936c57bdd8b3e67e5938a5440cda455877ed73b00000000001600147ac2d9378a1c47e589dfb8095ca95ed2140d27260247304402204582016a3cd3fa61fae1e1911b575625fe2ca75319de72349089724e80fb4a2f02207e76f992f64d0615779af763b157699a0d37270e136122408196084c1753a19e012102ee067a0273f2e3ba88d23140a24fdb290f27bbcd0f94117a9c65be3911c5c04e00000000";

/// Funds the P2SH deposit `74d0e353…e67b18bc:0` of 25000 sat.
pub const SWEEP_P2SH_DEPOSIT_TX: &str = "01000000000101d9fdf44eb0874a31a462dc0aedce55c0b5be6d20956b4cdfbe1c16761f7c4aa60100000000ffffffff02a86100000000000017a9143ec459d0f3c29286ae5df5fcc421e2786024277e8716a1110000000000160014e257eccafbc07c381642ce6e7e55120fb077fbed0247304402204e779706c5134032f6be73633a4d32de084154a7fd16c82810325584eea6406a022068bf855004476b8776f5a902a4d518a486ff7ebc6dc12fc31cd94e3e9b4220bb0121039d61d62dcd048d3f8550d22eb90b4af908db60231d117aeede04e7bc11907bfa00000000";

/// Funds the P2WSH deposit `5c54ecdf…737e55dc:0` of 12000 sat.
pub const SWEEP_P2WSH_DEPOSIT_TX: &str = "01000000000101a0367a0790e3dfc199df34ca9ce5c35591510b6525d2d5869166728a5ed554be0100000000ffffffff02e02e00000000000022002086a303cdd2e2eab1d1679f1a813835dc5a1b65321077cdccaf08f98cbf04ca962c2c110000000000160014e257eccafbc07c381642ce6e7e55120fb077fbed0247304402206dafd502aac9d4d542416664063533b1fed1d16877f0295740e1b09ec2abe05102200be28d9dd76863796addef4b9595aad23b2e9363ac2d64f75c21beb0e2ade5df0121039d61d62dcd048d3f8550d22eb90b4af908db60231d117aeede04e7bc11907bfa00000000";

/// Sweep of the two deposits above into a P2WPKH output,
/// `f8eaf242a55ea15e602f9f990e33f67f99dfbe25d1802bbde63cc1caabf99668`.
pub const SWEEP_WITHOUT_MAIN_UTXO_TX: &str = "01000000000102bc187be612bc3db8cfcdec56b75e9bc0262ab6eacfe27cc1a699bacd53e3d07400000000c948304502210089a89aaf3fec97ac9ffa91cdff59829f0cb3ef852a468153e2c0e2b473466d2e022072902bb923ef016ac52e941ced78f816bf27991c2b73211e227db27ec200bc0a012103989d253b17a6a0f41838b84ff0d20e8898f9d7b1a98f2564da4cc29dcf8581d94c5c14934b98637ca318a4d6e7ca6ffd1690b8e77df6377508f9f0c90d000395237576a9148db50eb52063ea9d98b3eac91489a90f738986f68763ac6776a914e257eccafbc07c381642ce6e7e55120fb077fbed8804e0250162b175ac68ffffffffdc557e737b6688c5712649b86f7757a722dc3d42786f23b2fa826394dfec545c0000000000ffffffff01488a0000000000001600148db50eb52063ea9d98b3eac91489a90f738986f6000347304402203747f5ee31334b11ebac6a2a156b1584605de8d91a654cd703f9c8438634997402202059d680211776f93c25636266b02e059ed9fcc6209f7d3d9926c49a0d8750ed012103989d253b17a6a0f41838b84ff0d20e8898f9d7b1a98f2564da4cc29dcf8581d95c14934b98637ca318a4d6e7ca6ffd1690b8e77df6377508f9f0c90d000395237576a9148db50eb52063ea9d98b3eac91489a90f738986f68763ac6776a914e257eccafbc07c381642ce6e7e55120fb077fbed8804e0250162b175ac6800000000";

/// Funds the P2SH deposit `4cdd899d…3c7a8426:0` of 15000 sat.
pub const LEGACY_SWEEP_DEPOSIT_TX: &str = "01000000000101dcd1de7b256376f1e05b3c20846868401aee2a85c27990b95886e0d2970a3fc40100000000ffffffff02983a00000000000017a914a9a5f97d5d3c4687a52e90718168270005b369c487f065120000000000160014e257eccafbc07c381642ce6e7e55120fb077fbed02483045022100baccb37cb46a20d79ccd3875162ab8b614a671cc64dc37d3477e24ef5eb61d7102204c68c5a5caff7e5089c1cacaa173fb5aad9529642773501b5e8d88abe7b4fc9c0121039d61d62dcd048d3f8550d22eb90b4af908db60231d117aeede04e7bc11907bfa00000000";

/// Sweep of the deposit above into a P2PKH output,
/// `1c42b0568d88bb4d21ae138769fd06199dd3ec689911972792e678be8516d58d`.
pub const LEGACY_SWEEP_TX: &str = "010000000126847a3c22a8a87a16195b0c45f7a14dd309afb3804edc1b68cd33719d89dd4c00000000c9483045022100d0e9c2e38db714c29c6b48eaf6369adb4b33fbc73fe63fbc03d28bebf3a41122022051bdfd31829571b69b788f84defcb256a7de7db3b7bdb2356100ccfd1c16378f012103989d253b17a6a0f41838b84ff0d20e8898f9d7b1a98f2564da4cc29dcf8581d94c5c14934b98637ca318a4d6e7ca6ffd1690b8e77df6377508f9f0c90d000395237576a9148db50eb52063ea9d98b3eac91489a90f738986f68763ac6776a914e257eccafbc07c381642ce6e7e55120fb077fbed880448f2b262b175ac68ffffffff0158340000000000001976a9148db50eb52063ea9d98b3eac91489a90f738986f688ac00000000";

/// Funds the P2SH deposit `d4fe2ef9…4de90aed:0` of 17000 sat.
pub const SWEEP_WITH_MAIN_UTXO_P2SH_DEPOSIT_TX: &str = "01000000000101e37f552fc23fa0032bfd00c8eef5f5c22bf85fe4c6e735857719ff8a4ff66eb80100000000ffffffff02684200000000000017a9143ec459d0f3c29286ae5df5fcc421e2786024277e8742b7100000000000160014e257eccafbc07c381642ce6e7e55120fb077fbed0248304502210084eb60347b9aa48d9a53c6ab0fc2c2357a0df430d193507facfb2238e46f034502202a29d11e128dba3ff3a8ad9a1e820a3b58e89e37fa90d1cc2b3f05207599fef00121039d61d62dcd048d3f8550d22eb90b4af908db60231d117aeede04e7bc11907bfa00000000";

/// Funds the P2WSH deposit `b86ef64f…2f557fe3:0` of 10000 sat.
pub const SWEEP_WITH_MAIN_UTXO_P2WSH_DEPOSIT_TX: &str = "01000000000101dc557e737b6688c5712649b86f7757a722dc3d42786f23b2fa826394dfec545c0100000000ffffffff02102700000000000022002086a303cdd2e2eab1d1679f1a813835dc5a1b65321077cdccaf08f98cbf04ca962cff100000000000160014e257eccafbc07c381642ce6e7e55120fb077fbed02473044022050759dde2c84bccf3c1502b0e33a6acb570117fd27a982c0c2991c9f9737508e02201fcba5d6f6c0ab780042138a9110418b3f589d8d09a900f20ee28cfcdb14d2970121039d61d62dcd048d3f8550d22eb90b4af908db60231d117aeede04e7bc11907bfa00000000";

/// Sweep of a P2WPKH main UTXO and the two deposits above,
/// `435d4aff6d4bc34134877bd3213c17970142fdd04d4113d534120033b9eecb2e`.
pub const SWEEP_WITH_MAIN_UTXO_TX: &str = "010000000001036896f9abcac13ce6bd2b80d125bedf997ff6330e999f2f605ea15ea542f2eaf80000000000ffffffffed0ae94da996c6f3b89dfe967675d4808251db93e81022ae9e038d06f92efed400000000c948304502210092327ddff69a2b8c7ae787c5d590a2f14586089e6339e942d56e82aa42052cd902204c0d1700ba1ac617da27fee032a57937c9607f0187199ed3c46954df845643d7012103989d253b17a6a0f41838b84ff0d20e8898f9d7b1a98f2564da4cc29dcf8581d94c5c14934b98637ca318a4d6e7ca6ffd1690b8e77df6377508f9f0c90d000395237576a9148db50eb52063ea9d98b3eac91489a90f738986f68763ac6776a914e257eccafbc07c381642ce6e7e55120fb077fbed8804e0250162b175ac68ffffffffe37f552fc23fa0032bfd00c8eef5f5c22bf85fe4c6e735857719ff8a4ff66eb80000000000ffffffff0180ed0000000000001600148db50eb52063ea9d98b3eac91489a90f738986f602483045022100baf754252d0d6a49aceba7eb0ec40b4cc568e8c659e168b96598a11cf56dc078022051117466ee998a3fc72221006817e8cfe9c2e71ad622ff811a0bf100d888d49c012103989d253b17a6a0f41838b84ff0d20e8898f9d7b1a98f2564da4cc29dcf8581d90003473044022014a535eb334656665ac69a678dbf7c019c4f13262e9ea4d195c61a00cd5f698d022023c0062913c4614bdff07f94475ceb4c585df53f71611776c3521ed8f8785913012103989d253b17a6a0f41838b84ff0d20e8898f9d7b1a98f2564da4cc29dcf8581d95c14934b98637ca318a4d6e7ca6ffd1690b8e77df6377508f9f0c90d000395237576a9148db50eb52063ea9d98b3eac91489a90f738986f68763ac6776a914e257eccafbc07c381642ce6e7e55120fb077fbed8804e0250162b175ac6800000000";

/// Holds the wallet main UTXO `09f894a4…56f7b231:1` of 1552680 sat.
pub const REDEMPTION_MAIN_UTXO_TX: &str = "01000000000101f8a28c903ec78f15c9202f186acd8645e5139b6cd2c39f75ba97ecf5b705e9f10100000000ffffffff02d0200000000000001600144130879211c54df460e484ddf9aac009cb38ee7428b11700000000001600148db50eb52063ea9d98b3eac91489a90f738986f602473044022024d6aa19ce62444f3ace7b5194ee481d2accf4452adbf76c1d2b060767a0dbee0220452df45ac5e28f10cc8a42df347d900db0e256b5828e8d98c862365138fef95c012103989d253b17a6a0f41838b84ff0d20e8898f9d7b1a98f2564da4cc29dcf8581d900000000";

/// Redemption to a P2PKH address,
/// `67f19c3c33a0735f64786afdf3627a9ae8b17af3fc691759abb5a88a9472c234`.
pub const P2PKH_REDEMPTION_TX: &str = "0100000000010131b2f756b118667ac1d6e854e2e38e43801cc4ead2dedfefc2dda703a494f8090100000000ffffffff02d0200000000000001976a9144130879211c54df460e484ddf9aac009cb38ee7488ac188a1700000000001600148db50eb52063ea9d98b3eac91489a90f738986f602483045022100ce19036320ae26386711645fa895ce88aaf9f52fa7fcab69219042dc8634625202205a60a2d1eed4440c86b6b28c517fbca526ebf631298af044f3f3b2e477dee81f012103989d253b17a6a0f41838b84ff0d20e8898f9d7b1a98f2564da4cc29dcf8581d900000000";

/// Redemption to a P2WPKH address spending the change of [`P2PKH_REDEMPTION_TX`],
/// `580e38c17668463257c7602cdd92baa7488fc5aac6701e0b4724e6039704c0b2`.
pub const P2WPKH_REDEMPTION_TX: &str = "0100000000010134c272948aa8b5ab591769fcf37ab1e89a7a62f3fd6a78645f73a0333c9cf1670100000000ffffffff02f4330000000000001600144130879211c54df460e484ddf9aac009cb38ee74804f1700000000001600148db50eb52063ea9d98b3eac91489a90f738986f602483045022100c5599fd5e8d0657f101d1fdaceee326f4a0c3e4995d38df6de2dbcc682a7c71a022079704a8560551c462858e4d95caf539c6a885334dead518355bb84e5e949192c012103989d253b17a6a0f41838b84ff0d20e8898f9d7b1a98f2564da4cc29dcf8581d900000000";

/// Funds the P2WSH deposit `6430be26…c01d3c6d:0` of 100000 sat.
pub const REFUND_P2WSH_DEPOSIT_TX: &str = "010000000001012b426822cb1900caef0d3bb8dc91227c77dc79305cc93984348725fb18a24b4d0100000000ffffffff02a086010000000000220020809dc931518260bb00abe54cc2d8c16e5f4f11529abf3de53f3e745298b5a85f74671c0000000000160014e257eccafbc07c381642ce6e7e55120fb077fbed02483045022100cac2b693e4897d4b1a007718ff8ddd74cf8e5c610dfeb429a67826d6d4f1f71b02200e0ac998e630f51b6904106015bc6126973fda257cc5292afa20047439a279570121039d61d62dcd048d3f8550d22eb90b4af908db60231d117aeede04e7bc11907bfa00000000";

/// Refund of the P2WSH deposit above to a P2WPKH address,
/// `b49bd6c0219066f0c76d85818b047e4685425844cda42dae9b9508b9bfbb483d`.
pub const P2WSH_REFUND_TX: &str = "010000000001016d3c1dc05f1203a2e4d657719c5ed6e9dc7d4a4ef7f03fbf584656d826be30640000000000feffffff01b0800100000000001600141b67f27537c7b30a23d8ccefb96a4cacfc72d9a10348304502210089cccd9db8c1876295a0478373b683c55c055a1a7c895c75de6234cfd9b31f450220075478aee6c10ffc93a4e206adb3d9a619ee5d5710f36f9b1ab71fdd02f8690a012103a0677d620a980f1a6035a16d08312793d6717b71b12a948c5b64671beee220635c14934b98637ca318a4d6e7ca6ffd1690b8e77df6377508f9f0c90d000395237576a9148db50eb52063ea9d98b3eac91489a90f738986f68763ac6776a9141b67f27537c7b30a23d8ccefb96a4cacfc72d9a18804d0cad363b175ac68d0cad363";

/// Funds the P2SH deposit `60650462…742f0143:0` of 90000 sat.
pub const REFUND_P2SH_DEPOSIT_TX: &str = "01000000000101d5c5fb73a9a426c4d9c509954e11cc0f3070bb06bb7761c3600ec817fd63e90f0100000000ffffffff02905f01000000000017a9146447bec3083e53cb2822e03849186112a3ed33d98732c2170000000000160014e257eccafbc07c381642ce6e7e55120fb077fbed0247304402203251a73b1968fee062d5c0b0b5c71ae02c265ec29d162121615222e02465af71022054ad1a20c6f002ff65422125b3b7f0046613cae3cf7875aaae055d48ca6691700121039d61d62dcd048d3f8550d22eb90b4af908db60231d117aeede04e7bc11907bfa00000000";

/// Refund of the P2SH deposit above to a P2WPKH address,
/// `7df9ed885525899ccbe144fd129062cec59be43d428b85fb847808b8790ad262`.
pub const P2SH_REFUND_TX: &str = "010000000143012f742b4e449c123b90d8a86f298659f6d1d752dca0b589bf67f36204656000000000c847304402204fc34e5607a3993b8690a7316d5bb4739ee63154dc397c62397711b4e1e81d0602205a484657a4d52c1730681fce0f11a8e5cf6307e1b73be05fa5c1b2471d519a6a012103a0677d620a980f1a6035a16d08312793d6717b71b12a948c5b64671beee220634c5c14934b98637ca318a4d6e7ca6ffd1690b8e77df6377508f9f0c90d000395237576a9148db50eb52063ea9d98b3eac91489a90f738986f68763ac6776a9141b67f27537c7b30a23d8ccefb96a4cacfc72d9a18804d0cad363b175ac68feffffff01a0590100000000001600141b67f27537c7b30a23d8ccefb96a4cacfc72d9a1d0cad363";

/// Funds the P2WSH deposit `b1fb065a…6f64319f:0` of 150000 sat.
pub const REFUND_P2WSH_DEPOSIT_FOR_P2PKH_TX: &str = "0100000000010143012f742b4e449c123b90d8a86f298659f6d1d752dca0b589bf67f3620465600100000000ffffffff02f049020000000000220020809dc931518260bb00abe54cc2d8c16e5f4f11529abf3de53f3e745298b5a85f5272150000000000160014e257eccafbc07c381642ce6e7e55120fb077fbed02483045022100e9fce79b2d66d3fef5c8991e4466b0f6d316559bc8ca7e1e4f206e0c830c8bac022030481d47afaacd6a34e885e9c07e2f422edc36e6d44fe5557f232b1c7875b2ea0121039d61d62dcd048d3f8550d22eb90b4af908db60231d117aeede04e7bc11907bfa00000000";

/// Refund of the P2WSH deposit above to a P2PKH address,
/// `0400678f7ae0275338cb0418236960c04c016b980cb7d1763c1d957f534ae0eb`.
pub const P2WSH_REFUND_TO_P2PKH_TX: &str = "010000000001019f31646feed425ab09dbcf7b742fd26c2a500bd195fbca791240a6615a06fbb10000000000feffffff0100440200000000001976a9141b67f27537c7b30a23d8ccefb96a4cacfc72d9a188ac034730440220160a6ec8d34eb8e24800abc8bf912418ad41ecc6d53699eff731abf6f1a7fa1102207dc757c520b02bbfd678c06fff5cdfaa67b9d0563308da35b5d60ceda7560df1012103a0677d620a980f1a6035a16d08312793d6717b71b12a948c5b64671beee220635c14934b98637ca318a4d6e7ca6ffd1690b8e77df6377508f9f0c90d000395237576a9148db50eb52063ea9d98b3eac91489a90f738986f68763ac6776a9141b67f27537c7b30a23d8ccefb96a4cacfc72d9a18804d0cad363b175ac68d0cad363";

/// Parses a raw transaction.
pub fn parse_tx(raw: &str) -> Transaction {
    deserialize_hex(raw).expect("must be a valid transaction")
}

/// Builds the UTXO for output `vout` of the raw transaction `raw`.
pub fn utxo_with_tx(raw: &str, vout: u32) -> UtxoWithTx {
    let transaction = parse_tx(raw);
    let value = transaction.output[vout as usize].value;

    UtxoWithTx {
        utxo: Utxo::new(transaction.compute_txid(), vout, value),
        transaction,
    }
}

/// Decodes a testnet WIF key.
pub fn signing_key(wif: &str) -> SigningKey {
    SigningKey::from_wif(wif, BitcoinNetwork::Testnet).expect("must be a testnet key")
}

/// A receipt with the depositor and blinding factor shared by all fixtures.
pub fn receipt(
    wallet_public_key_hash: &str,
    refund_public_key_hash: &str,
    created_at: u32,
    locktime_duration: u32,
) -> DepositReceipt {
    let locktime =
        calculate_refund_locktime(created_at, locktime_duration).expect("must fit into 4 bytes");

    DepositReceipt::from_hex(
        "934b98637ca318a4d6e7ca6ffd1690b8e77df637",
        "f9f0c90d00039523",
        wallet_public_key_hash,
        refund_public_key_hash,
        &hex::encode(locktime),
    )
    .expect("must be a valid receipt")
}
