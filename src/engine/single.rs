use std::io::{BufWriter, Write};

use super::{encode_one_block, validate_request};
use crate::error::Result;
use crate::huffman::{BlockEncoder, BlockTables};
use crate::{BlockDescriptor, EncodeStats, EncoderConfig, Engine};

/// Single-threaded engine: one logical pipeline, blocks encoded in
/// descriptor order
pub struct SingleThreadedEngine {
    config: EncoderConfig,
}

impl SingleThreadedEngine {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }
}

impl Engine for SingleThreadedEngine {
    fn encode<W: Write>(
        &mut self,
        input: &[u8],
        tables: &[BlockTables],
        descriptor: &BlockDescriptor,
        output: W,
    ) -> Result<EncodeStats> {
        validate_request(input, tables, descriptor)?;

        let mut writer = BufWriter::with_capacity(self.config.buffer_size, output);
        let mut encoder = BlockEncoder::new();
        let mut stats = EncodeStats {
            input_bytes: input.len() as u64,
            compressed_size: Vec::with_capacity(descriptor.block_count()),
            ..Default::default()
        };

        let max_block_bytes = descriptor.max_block_bytes();
        let mut offset = 0usize;

        for (index, (&size, block_tables)) in
            descriptor.in_block_size.iter().zip(tables).enumerate()
        {
            let packed = &input[offset..offset + size as usize];
            offset += size as usize;

            let data = encode_one_block(&mut encoder, index, packed, block_tables, max_block_bytes)?;

            writer.write_all(&data)?;
            stats.compressed_size.push(data.len() as u32);
            stats.output_bytes += data.len() as u64;
            stats.blocks_encoded += 1;
        }

        writer.flush()?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deflate::tokens::pack_tokens;
    use crate::huffman::build_block_tables;
    use crate::lz77;

    fn make_request(data: &[u8]) -> (Vec<u8>, Vec<BlockTables>, BlockDescriptor) {
        let tokens = lz77::tokenize(data);
        let tables = build_block_tables(&tokens).unwrap();
        let packed = pack_tokens(&tokens).unwrap();
        let descriptor = BlockDescriptor::from_block_sizes(1024, vec![packed.len() as u32]);
        (packed, vec![tables], descriptor)
    }

    #[test]
    fn test_encode_single_block() {
        let data = vec![b'x'; 500];
        let (packed, tables, descriptor) = make_request(&data);

        let mut engine = SingleThreadedEngine::new(EncoderConfig::default());
        let mut output = Vec::new();
        let stats = engine.encode(&packed, &tables, &descriptor, &mut output).unwrap();

        assert_eq!(stats.blocks_encoded, 1);
        assert_eq!(stats.compressed_size.len(), 1);
        assert_eq!(stats.output_bytes as usize, output.len());
        assert_eq!(stats.compressed_size[0] as usize, output.len());
    }

    #[test]
    fn test_rejects_input_length_mismatch() {
        let data = vec![b'x'; 500];
        let (packed, tables, mut descriptor) = make_request(&data);
        descriptor.input_size += 4;
        descriptor.in_block_size[0] += 4;

        let mut engine = SingleThreadedEngine::new(EncoderConfig::default());
        let err = engine.encode(&packed, &tables, &descriptor, Vec::new()).unwrap_err();
        assert!(matches!(err, crate::Error::InputLengthMismatch { .. }));
    }

    #[test]
    fn test_rejects_table_count_mismatch() {
        let data = vec![b'x'; 500];
        let (packed, mut tables, descriptor) = make_request(&data);
        tables.push(tables[0].clone());

        let mut engine = SingleThreadedEngine::new(EncoderConfig::default());
        let err = engine.encode(&packed, &tables, &descriptor, Vec::new()).unwrap_err();
        assert!(matches!(err, crate::Error::TableCountMismatch { blocks: 1, tables: 2 }));
    }
}
