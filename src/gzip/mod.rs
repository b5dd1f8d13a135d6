pub mod member;

pub use member::GzipMemberWriter;

/// Fixed gzip member header size (no optional fields)
pub const GZIP_HEADER_SIZE: usize = 10;

/// Gzip member footer size: CRC32 + ISIZE
pub const GZIP_FOOTER_SIZE: usize = 8;
