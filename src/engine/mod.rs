pub mod parallel;
pub mod single;

pub use parallel::ParallelEngine;
pub use single::SingleThreadedEngine;

use crate::deflate::tokens::parse_tokens;
use crate::error::{Error, Result};
use crate::huffman::{BlockEncoder, BlockTables};
use crate::{BlockDescriptor, MIN_BLOCK_SIZE};

/// Check the per-invocation contract before touching any block
pub(crate) fn validate_request(
    input: &[u8],
    tables: &[BlockTables],
    descriptor: &BlockDescriptor,
) -> Result<()> {
    descriptor.validate()?;

    if input.len() as u64 != descriptor.input_size {
        return Err(Error::InputLengthMismatch {
            expected: descriptor.input_size,
            found: input.len(),
        });
    }
    if tables.len() != descriptor.block_count() {
        return Err(Error::TableCountMismatch {
            blocks: descriptor.block_count(),
            tables: tables.len(),
        });
    }
    Ok(())
}

/// Encode one block: parse its packed tokens, check the uncompressed
/// floor and ceiling, and pack the bitstream
pub(crate) fn encode_one_block(
    encoder: &mut BlockEncoder,
    index: usize,
    packed: &[u8],
    tables: &BlockTables,
    max_block_bytes: usize,
) -> Result<Vec<u8>> {
    let tokens = parse_tokens(packed)?;

    let uncompressed: usize = tokens.iter().map(|t| t.uncompressed_size()).sum();
    if uncompressed < MIN_BLOCK_SIZE {
        return Err(Error::BlockTooSmall { index, size: uncompressed, min: MIN_BLOCK_SIZE });
    }
    if uncompressed > max_block_bytes {
        return Err(Error::BlockTooLarge { index, size: uncompressed, max: max_block_bytes });
    }

    encoder.encode_block(&tokens, tables)
}
