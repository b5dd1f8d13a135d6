pub mod tables;
pub mod tokens;

pub use tokens::Lz77Token;
