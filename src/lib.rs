pub mod bits;
pub mod deflate;
pub mod engine;
pub mod error;
pub mod gzip;
pub mod huffman;
pub mod lz77;

pub use deflate::tokens::Lz77Token;
pub use engine::{parallel::ParallelEngine, single::SingleThreadedEngine};
pub use error::{Error, Result};
pub use huffman::{build_block_tables, BlockEncoder, BlockTables};

use std::io::Write;

/// Minimum meaningful uncompressed block size in bytes.
///
/// Blocks below this floor carry more table overhead than payload;
/// they are rejected rather than encoded into degenerate output.
pub const MIN_BLOCK_SIZE: usize = 116;

/// Describes how one invocation's input is partitioned into blocks.
///
/// `in_block_size` holds the packed input byte count of each block, in
/// encoding order; the entries must sum to `input_size`.
/// `block_size_in_kb` is the uncompressed-size ceiling per block.
#[derive(Clone, Debug)]
pub struct BlockDescriptor {
    /// Encoding granularity: uncompressed bytes per block, in KiB
    pub block_size_in_kb: u32,
    /// Total packed input bytes for this invocation
    pub input_size: u64,
    /// Packed input byte count per block
    pub in_block_size: Vec<u32>,
}

impl BlockDescriptor {
    pub fn new(block_size_in_kb: u32, input_size: u64, in_block_size: Vec<u32>) -> Self {
        Self { block_size_in_kb, input_size, in_block_size }
    }

    /// Build a descriptor whose `input_size` is the sum of the block sizes
    pub fn from_block_sizes(block_size_in_kb: u32, in_block_size: Vec<u32>) -> Self {
        let input_size = in_block_size.iter().map(|&s| s as u64).sum();
        Self { block_size_in_kb, input_size, in_block_size }
    }

    pub fn block_count(&self) -> usize {
        self.in_block_size.len()
    }

    /// Uncompressed-size ceiling per block, in bytes
    pub fn max_block_bytes(&self) -> usize {
        self.block_size_in_kb as usize * 1024
    }

    /// Check descriptor invariants: a non-zero granularity and block
    /// sizes that sum to `input_size`
    pub fn validate(&self) -> Result<()> {
        if self.block_size_in_kb == 0 {
            return Err(Error::ZeroBlockSize);
        }
        let total: u64 = self.in_block_size.iter().map(|&s| s as u64).sum();
        if total != self.input_size {
            return Err(Error::BlockSizeMismatch { expected: self.input_size, found: total });
        }
        Ok(())
    }
}

/// Configuration for block encoding
#[derive(Clone, Debug)]
pub struct EncoderConfig {
    /// Number of threads for parallel encoding (0 = auto, 1 = single-threaded)
    pub num_threads: usize,
    /// Buffer size for I/O operations
    pub buffer_size: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self { num_threads: 1, buffer_size: 128 * 1024 }
    }
}

/// Statistics from an encode invocation
#[derive(Clone, Debug, Default)]
pub struct EncodeStats {
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub blocks_encoded: u64,
    /// Bytes produced per block, in `in_block_size` order
    pub compressed_size: Vec<u32>,
}

/// Trait for the complete block-encoding operation.
///
/// `input` is the byte-packed LZ77 token stream, partitioned by the
/// descriptor's `in_block_size`; `tables` supplies one canonical table
/// set per block, in the same order.
pub trait Engine {
    fn encode<W: Write>(
        &mut self,
        input: &[u8],
        tables: &[BlockTables],
        descriptor: &BlockDescriptor,
        output: W,
    ) -> Result<EncodeStats>;
}
