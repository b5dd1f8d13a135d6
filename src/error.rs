use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Block descriptor errors
    #[error("Block sizes sum to {found} bytes but input_size is {expected}")]
    BlockSizeMismatch { expected: u64, found: u64 },

    #[error("Input buffer holds {found} bytes but descriptor declares {expected}")]
    InputLengthMismatch { expected: u64, found: usize },

    #[error("Descriptor declares {blocks} blocks but {tables} table sets were supplied")]
    TableCountMismatch { blocks: usize, tables: usize },

    #[error("Block {index} uncompressed size {size} below minimum {min} bytes")]
    BlockTooSmall { index: usize, size: usize, min: usize },

    #[error("Block {index} uncompressed size {size} exceeds ceiling {max} bytes")]
    BlockTooLarge { index: usize, size: usize, max: usize },

    #[error("Block size granularity must be at least 1 KiB")]
    ZeroBlockSize,

    // Token stream errors
    #[error("Truncated token record at input offset {offset}")]
    TruncatedTokenRecord { offset: usize },

    #[error("Invalid match length: {0} (supported range 3-258)")]
    InvalidMatchLength(u16),

    #[error("Invalid match distance: {0} (supported range 1-32768)")]
    InvalidDistance(u32),

    // Code table errors
    #[error("Code table shape mismatch: {codes} codes but {lengths} bit lengths")]
    TableShapeMismatch { codes: usize, lengths: usize },

    #[error("Invalid {alphabet} alphabet size: {count} (expected {min}-{max})")]
    InvalidAlphabetSize { alphabet: &'static str, count: usize, min: usize, max: usize },

    #[error("Code length {length} for symbol {symbol} exceeds maximum {max}")]
    CodeTooLong { symbol: usize, length: u8, max: u8 },

    #[error("No code assigned for symbol {0} required by the token stream")]
    MissingCode(usize),

    #[error("Symbol {symbol} out of range for table with {max_code} codes")]
    SymbolOutOfRange { symbol: usize, max_code: usize },

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
