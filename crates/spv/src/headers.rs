//! Validation of the header chain that carries a transaction's confirmations.

use bitcoin::BlockHash;
use ethnum::U256;
use tbtc_bridge_primitives::block::BlockHeader;

use crate::errors::{SpvError, SpvResult};

/// Checks that `headers` form a chain of blocks mined at the difficulty of the previous or the
/// current epoch.
///
/// Each header must reference the hash of the header before it and hash below its own target.
/// The chain can cross at most one retarget: once a header carries `current_difficulty`, no later
/// header may carry `previous_difficulty` again. This is stricter than accepting each header at
/// either difficulty on its own, and rejects chains that flip back to the previous epoch.
///
/// When both difficulties are 1 the difficulty checks are skipped, since testnet blocks can fall
/// back to the minimum difficulty at any time.
pub fn validate_headers_chain(
    headers: &[BlockHeader],
    previous_difficulty: U256,
    current_difficulty: U256,
) -> SpvResult<()> {
    let skip_difficulty = previous_difficulty == U256::ONE && current_difficulty == U256::ONE;

    let mut parent: Option<BlockHash> = None;
    let mut reached_current_epoch = false;

    for (index, header) in headers.iter().enumerate() {
        if let Some(expected) = parent {
            if header.previous_block_header_hash != expected {
                return Err(SpvError::BrokenChain {
                    index,
                    expected,
                    found: header.previous_block_header_hash,
                });
            }
        }

        let block_hash = header.hash();
        if !header.meets_target()? {
            return Err(SpvError::InsufficientWork { index, block_hash });
        }
        parent = Some(block_hash);

        if skip_difficulty {
            continue;
        }

        let difficulty = header.difficulty()?;
        if difficulty == current_difficulty {
            reached_current_epoch = true;
        } else if difficulty == previous_difficulty {
            if reached_current_epoch {
                return Err(SpvError::DifficultyRegression { index });
            }
        } else {
            return Err(SpvError::UnexpectedDifficulty { index, difficulty });
        }
    }

    Ok(())
}
