//! SPV proof fixtures taken from real Bitcoin blocks.

use std::str::FromStr;

use bitcoin::{consensus::encode::deserialize_hex, Transaction, TxMerkleNode, Txid};
use ethnum::U256;
use tbtc_bridge_primitives::{network::BitcoinNetwork, types::TxMerkleBranch};

use crate::bitcoin_client::InMemoryBitcoinClient;

/// A confirmed transaction along with everything a data source reports about it.
#[derive(Debug, Clone, Copy)]
pub struct ProofFixture {
    /// Display-order hash of the transaction.
    pub tx_hash: &'static str,

    /// The transaction without witness data.
    pub raw_tx: &'static str,

    /// Confirmations at the time the fixture was taken.
    pub confirmations: u32,

    /// Chain tip at the time the fixture was taken.
    pub latest_block_height: u64,

    /// Height of the block including the transaction.
    pub block_height: u64,

    /// Six concatenated headers starting with the block including the transaction.
    pub headers: &'static str,

    /// Display-order sibling hashes, deepest first.
    pub merkle: &'static [&'static str],

    /// Position of the transaction in its block.
    pub position: u32,

    /// Difficulty of the epoch before the current one.
    pub previous_difficulty: u128,

    /// Difficulty of the current epoch.
    pub current_difficulty: u128,
}

impl ProofFixture {
    /// The transaction hash.
    pub fn tx_hash(&self) -> Txid {
        Txid::from_str(self.tx_hash).expect("must be a valid txid")
    }

    /// The parsed transaction.
    pub fn transaction(&self) -> Transaction {
        deserialize_hex(self.raw_tx).expect("must be a valid transaction")
    }

    /// The raw header chain.
    pub fn headers(&self) -> Vec<u8> {
        hex::decode(self.headers).expect("must be valid hex")
    }

    /// The Merkle branch as a data source reports it.
    pub fn merkle_branch(&self) -> TxMerkleBranch {
        TxMerkleBranch {
            block_height: self.block_height,
            merkle: self
                .merkle
                .iter()
                .map(|node| TxMerkleNode::from_str(node).expect("must be a valid hash"))
                .collect(),
            position: self.position,
        }
    }

    /// Difficulty of the previous epoch.
    pub fn previous_difficulty(&self) -> U256 {
        U256::new(self.previous_difficulty)
    }

    /// Difficulty of the current epoch.
    pub fn current_difficulty(&self) -> U256 {
        U256::new(self.current_difficulty)
    }

    /// A client that knows the transaction, its confirmations, its block and the headers after it.
    pub fn client(&self) -> InMemoryBitcoinClient {
        let client = InMemoryBitcoinClient::new(BitcoinNetwork::Mainnet);
        let tx_hash = self.tx_hash();

        client.add_transaction(self.transaction());
        client.set_confirmations(tx_hash, self.confirmations);
        client.set_latest_block_height(self.latest_block_height);
        client.set_headers_chain(self.headers());
        client.set_transaction_merkle(tx_hash, self.merkle_branch());

        client
    }
}

/// Mainnet transaction whose six headers all belong to one difficulty epoch.
pub const ONE_EPOCH: ProofFixture = ProofFixture {
    tx_hash: "713525ee9d9ab23433cd6ad470566ba1f47cac2d7f119cc50119128a84d718aa",
    raw_tx: ONE_EPOCH_RAW_TX,
    confirmations: 1798,
    latest_block_height: 777_963,
    block_height: 776_166,
    headers: ONE_EPOCH_HEADERS,
    merkle: ONE_EPOCH_MERKLE,
    position: 17,
    previous_difficulty: 39_156_400_059_293,
    current_difficulty: 39_350_942_467_772,
};

/// Mainnet transaction whose headers span a difficulty adjustment.
pub const TWO_EPOCHS: ProofFixture = ProofFixture {
    tx_hash: "e073636400e132b8c1082133ab2b48866919153998f4f04877b580e9932d5a17",
    raw_tx: TWO_EPOCHS_RAW_TX,
    confirmations: 3838,
    latest_block_height: 777_979,
    block_height: 774_142,
    headers: TWO_EPOCHS_HEADERS,
    merkle: TWO_EPOCHS_MERKLE,
    position: 262,
    previous_difficulty: 37_590_453_655_497,
    current_difficulty: 39_350_942_467_772,
};

/// Testnet transaction; its headers mix difficulty 1 blocks with regular ones.
pub const TESTNET: ProofFixture = ProofFixture {
    tx_hash: "b78636ae08e6c17261a9f3134109c13c2eb69f6df52e591cc0e0780f5ebf6472",
    raw_tx: TESTNET_RAW_TX,
    confirmations: 18,
    latest_block_height: 2_421_198,
    block_height: 2_421_181,
    headers: TESTNET_HEADERS,
    merkle: TESTNET_MERKLE,
    position: 4,
    previous_difficulty: 1,
    current_difficulty: 1,
};

const ONE_EPOCH_RAW_TX: &str = "0100000001a5a2c479465b80e8d5593aef6b150faf01355dac0e207ae8a1d5323f443db891030000006a473044022008bfea0e9b8e24b0ab04de42db2dd8aea9e6f764f9f94aa88e284d5c2800706d02200d793f7441ea17802da993914da732e2f4e354e54dd168636be73e6b60a39eab012103e356007964fc225a44c38352899c41e6293a97f8d8115998ae7e97184704c092fdffffff047c15000000000000536a4c5058325b63f33166b9786bdd34b2be8160d5e4fbef9a0a45e773c4201a82a4b1eb44793a61d19892a7f8aede51b70953a210e9e8dba54375e4a06d95d68f90aa3c6e8914000bd7e50056000bd775012528d2be0000000000001976a914953490146c3ae270d66e09c4d12df4573d24c75b88acd2be00000000000017a914352481ec2fecfde0c5cdc635a383c4ac27b9f71e87237cc000000000001976a914b00de0cc7b5e518f7d1e43d6e5ecbd52e0cd0c2f88ac00000000";
const ONE_EPOCH_HEADERS: &str = "00e0ff2f5ad9c09e1d8aae777a58bf29c41621eb629032598f79000000000000000000004dea17724c3b7e67d4cf1ac41a4c7527b884f7406575eaf5b8efaf2fb12572ecb1ace86339300717760098100000ff3fd3ab40174610c286e569edd20fa713bd98bab53bee83050000000000000000002345f5ef807cf75de7b30ccfe493c46c6e07aca044aa2aa106141637f1bb8500a6ade863393007177fbbd4b300800120646d493817f0ac9886a0a194ca3a957f70c3eb642ffd05000000000000000000d95674b737f097f042eebeb970c09b274df7e72a9c202ff2292ed72b056ee90967aee863393007172e2bb92e00603b27a391d248c258ef628dfb8c710ce44c8017667a0794140200000000000000000035214e58eb018dea1efa7eaf1b7f19ff2d6f0310c122be6dc8c0258d9524ae9382aee863393007173e82b2000000002003c7003ff9a79f16d956fc764b43b35080efe3a820af050000000000000000007808e96809cd46d5898d86faabc8f28a8b6572eb839979670b2851d78fc1f75f17b3e86339300717450f17650400e020fb9b6a28bb2e9cea36d340588f19ffa4e944b050e73f03000000000000000000bbd7534f2550ee99f31efcd77564f1b5b3f3966a76847896a8d9f9ee964d670ba2b4e8633930071777b10cfc";
const ONE_EPOCH_MERKLE: &[&str] = &[
    "f6ce0e34cc5b2a4b8cd4fd02a65d7cf62013206969e8e5cf1df18f994abcf1ff",
    "08899ec43299b324583722f3e7d0938446a1f31a6ab34c8e24cb4ea9ba6cd384",
    "9677b6075dfa2da8bcc98aa10ae7d30f81e6506215eadd3f3739a5d987e62b35",
    "aa6712d8820c06ec8ce99f9c19d580ab54bb45f69b426935153b81e7d412ddba",
    "b38be47e1dd9a7324ad81a395a133f26fc88cb736a4998dbba6cbabca10629a8",
    "13bdefbf92421aa7861528e16e7046b569d25ee0f4b7649492e42e9ea2331c39",
    "df429494c5eef971a7ab80c8a0f7f9cdfa30148afef706f07923bd93d5a7e22a",
    "c8a3f1bc73146bd4a1a0e848f2b0b4a21be86e4930f239d856af8e9646014236",
    "1f514df87fe2c400e508e01cd8967657ef76db9681f65dc82b0bc6d4004b575f",
    "e463950c8efd9114237189f07ddf1cfdb72658bad23bce667c269652bd0ade3c",
    "3d7ae6df787807320fdc397a7055e86c932a7c36ab1d1f942b92c53bf2a1d2f9",
];

const TWO_EPOCHS_RAW_TX: &str = "020000000190b92527c9456f0791f164bcd2f9b750318f53ffaa0a1d8f2efd075d56a660f10000000000feffffff0283b84902000000001600145ade2be870b440e171644f22973db748a20023055c492100000000001976a914dbdbe7f1c2ba3dfe38c32b9261f5d8fcb36b689788acfdcf0b00";
const TWO_EPOCHS_HEADERS: &str = "0040f224871a401b605e02c475e05e147bd418e5e2ae9eb599e200000000000000000000193dc07aea4388a163ed0e3e5234ef54594cfc046bce727d2d6b3445d3ce0e8c440dd663e27c07170c0d54de00e0682c9c27df3b2a1b011753c986c290ce22c60d09a053707100000000000000000000ddf3b023ed6368bdac8578bd55d0c3fad7f234ae971b902b155bee7318bf0919b30dd663e27c0717be025f2b00000020514a9bd87c51caedd45a20c495f0ba1983b6f3f51639050000000000000000001f4c60a97f4127b4f90fbb7a6a1041881b10d4f7351340b6770301f62b36725ce10dd66320270717c11c5e7b0020002043e99cc906d52209796ecb37b252e4514f197d727ea701000000000000000000274ecaf37779be81c23748d33ef4a0cad36a8abd935a11f0e0a71640c6dd1deaf10dd66320270717846927aa0000c02090a4a88ab1ad55e235932fe0adc7b4c822b4322f589305000000000000000000decc945dc9cdf595715ffeee3bffc0ec0c8c5ff77e43b8e91213e21a9975c99ddc10d663202707179f93251000203229e618c1eb9274a1acbb74d44bfe9a4ecfae236ea35e8b0300000000000000000029a9f7b4f6671dec5d6ba05acb060fcd2ffc6e46a992189c6f60d770d9c5a5cda31cd66320270717542691a2";
const TWO_EPOCHS_MERKLE: &[&str] = &[
    "e80f706f53d5abd77070ea6c8a60c141748400e09fc9b373d5cdb0129cbce5ec",
    "20d22506199cf00caf2e32e240c77a23c226d5a74de4dc9150ccd6f5200b4dd7",
    "8b446693fadaae7479725f0e98430c24f8bf8936f5a5cab7c725692cd78e61e3",
    "93e61f1ac82cf6a66e321c60410ae4bdfcc0ab45b7efd50353d7b08104758403",
    "1dc52561092701978f1e48a10bc4da5464e668f0f4b3a940853c941474ee52de",
    "84aca5ec5b339b69a50b93d35c2fd7b146c037842ca76b33cbf835b9e6c86f0c",
    "ebcd1bb7039d40ac0d477af58964b4582c6741d1c901ab4a2b0de15e600cba69",
    "38d458a70805902a52342cfc552d374bdb217cd389e9550adfc4f86df6fdce82",
    "07781ff50552aefea962f0f4972fe882cb38a281ebdd533c2886d5137b80fbeb",
    "e7e530e181683d272293f19fe18a33f1dc05eded12ec27945b49311b2e14ee42",
];

const TESTNET_RAW_TX: &str = "0200000001ba1a84d90919d19484872d66fa79890fa6adb32609fa2063da87826052eb30b20100000000feffffff02767b140000000000160014ffadb0a5ab3f58e651383b478acdc7cd0008e351e28445ae010000001600143c258d94e7abf4695585911b0420c24c1c78213eb7f12400";
const TESTNET_HEADERS: &str = "000000203528cf6e8112d970a1adeb9743937d2e980afb43cb8ce36001000000000000007bacd9aa2249c74fdba75dd651a16755e9b4dc3c1953f2baa01d657f317e3eb93662f763ffff001d7045e837000040207184a40ae97e64b2bce8fed41f967eac210e0369a66855bd2b37c86200000000fe261c184d19c15c7b66c284d5f65e79595f65d576cc40f20cccf0fcbae3c063a866f7639cde2c193ed763b904e000209885f5bb4bc96f8ffed3bf31c6f526f1f71fc6dd3f9bb0ed0200000000000000720c67b13ee8805763110fb345cbfb5369836344e6a990e4ac0c363211362b2c6168f7639cde2c19294a1006000040200aafa9b9e947a9bd6fe2e9f04dece7753863d59b11e5c63b15000000000000007a63f980ffc1f993c0d7dbe0670e71be2eeae8710a7906f758d3b400dd6a1e6b3c69f7639cde2c1940a3735000008020ba335b0d58de55cf227fdd35ba380a4a288d4f79268be6a01800000000000000ffdc211cb41a97249e18a54aa4861a77f43093d6716995a9f659370ee1cf8aea406af7639cde2c19254197450000002069b318d3a7c7c154651f23ac4c3a51c7ec5158f40a62783c0400000000000000f452ef784d467c9f54133155232d005bdd0f2d323933646976ef2b7275206d7ff96ef763ffff001db18d224b";
const TESTNET_MERKLE: &[&str] = &[
    "33610df4f460e1338d9f6a055de18d5c694edf590722211b6feeec77a9479846",
    "0fd7e0afdde99bdfbfdc0d0e6f5ccda4cd1873eee315bb989622fd58bd5c4446",
    "2d4ab6c53cedc1a447e21ad2f38c6d9d0d9c761426975a65f83fe10f12e3c9e0",
    "0eebd6daa03f6db4a27541a91bcf86612c97d100bc37c3eb321d64d943adb2a5",
    "b25854f31fc046eb0f53cddbf2b6de3d54d52710acd79a796c78c3be235f031a",
    "1fc5ab77039f59ac2494791fc05c75fb53e2dacf57a20f67e7d6727b38778825",
    "5b0acfdbb89af64a583a88e92252b8634bd4da06ee102ecd34c2662955e9f1c7",
];
