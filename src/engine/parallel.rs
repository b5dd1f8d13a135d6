//! Parallel engine using a producer-consumer pipeline.
//!
//! Architecture:
//! - Main thread: slice the packed input per the descriptor, send jobs
//! - Worker pool: parse and encode blocks in parallel
//! - Main thread: receive encoded blocks in order, write to output
//!
//! Blocks are independent, so output bytes and per-block sizes are
//! identical to the single-threaded engine.

use std::collections::BTreeMap;
use std::io::{BufWriter, Write};

use crossbeam::channel::{bounded, Receiver, Sender};

use super::{encode_one_block, validate_request};
use crate::error::{Error, Result};
use crate::huffman::{BlockEncoder, BlockTables};
use crate::{BlockDescriptor, EncodeStats, EncoderConfig, Engine};

/// A job for encoding a single block
#[derive(Clone, Copy)]
struct EncodingJob<'a> {
    /// Sequence number for ordering output
    block_id: usize,
    /// Packed token records for this block
    packed: &'a [u8],
    /// Table set for this block
    tables: &'a BlockTables,
}

/// Result of encoding a single block
struct EncodedBlock {
    block_id: usize,
    data: Vec<u8>,
}

/// Parallel engine implementation
pub struct ParallelEngine {
    config: EncoderConfig,
}

impl ParallelEngine {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    fn effective_threads(&self) -> usize {
        match self.config.num_threads {
            0 => num_cpus::get().clamp(1, 32),
            n => n.clamp(1, 32),
        }
    }
}

impl Engine for ParallelEngine {
    fn encode<W: Write>(
        &mut self,
        input: &[u8],
        tables: &[BlockTables],
        descriptor: &BlockDescriptor,
        output: W,
    ) -> Result<EncodeStats> {
        let num_threads = self.effective_threads();

        // For single thread, delegate to the single-threaded engine
        if num_threads == 1 {
            let mut single = super::single::SingleThreadedEngine::new(self.config.clone());
            return single.encode(input, tables, descriptor, output);
        }

        validate_request(input, tables, descriptor)?;
        self.encode_parallel(input, tables, descriptor, output, num_threads)
    }
}

impl ParallelEngine {
    fn encode_parallel<W: Write>(
        &mut self,
        input: &[u8],
        tables: &[BlockTables],
        descriptor: &BlockDescriptor,
        mut output: W,
        num_threads: usize,
    ) -> Result<EncodeStats> {
        // Channel capacity - enough to keep workers busy without
        // excessive memory
        let channel_capacity = num_threads * 4;

        let (job_tx, job_rx): (Sender<EncodingJob>, Receiver<EncodingJob>) =
            bounded(channel_capacity);
        let (result_tx, result_rx): (Sender<Result<EncodedBlock>>, Receiver<Result<EncodedBlock>>) =
            bounded(channel_capacity);

        let max_block_bytes = descriptor.max_block_bytes();

        let result = crossbeam::scope(|scope| {
            for _ in 0..num_threads {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();

                scope.spawn(move |_| {
                    worker_thread(job_rx, result_tx, max_block_bytes);
                });
            }

            // Drop our copies of the channels that workers use
            drop(job_rx);
            drop(result_tx);

            self.dispatch_and_write(input, tables, descriptor, &mut output, job_tx, result_rx)
        });

        result.map_err(|_| Error::Internal("Thread panicked".to_string()))?
    }

    fn dispatch_and_write<W: Write>(
        &self,
        input: &[u8],
        tables: &[BlockTables],
        descriptor: &BlockDescriptor,
        output: &mut W,
        job_tx: Sender<EncodingJob>,
        result_rx: Receiver<Result<EncodedBlock>>,
    ) -> Result<EncodeStats> {
        let mut writer = BufWriter::with_capacity(self.config.buffer_size, output);

        let block_count = descriptor.block_count();
        let mut compressed_size = vec![0u32; block_count];
        let mut output_bytes: u64 = 0;
        let mut blocks_written: usize = 0;

        // Buffer for out-of-order blocks
        let mut pending_blocks: BTreeMap<usize, EncodedBlock> = BTreeMap::new();
        let mut next_write_id: usize = 0;

        let mut offset = 0usize;
        for (block_id, (&size, block_tables)) in
            descriptor.in_block_size.iter().zip(tables).enumerate()
        {
            let packed = &input[offset..offset + size as usize];
            offset += size as usize;

            let job = EncodingJob { block_id, packed, tables: block_tables };

            // Send the job, draining results as needed to prevent deadlock
            let mut job_to_send = Some(job);
            while job_to_send.is_some() {
                crossbeam::channel::select! {
                    send(job_tx, job_to_send.unwrap()) -> res => {
                        match res {
                            Ok(()) => { job_to_send = None; }
                            Err(_) => {
                                return Err(Error::Internal("Workers disconnected".to_string()));
                            }
                        }
                    }
                    recv(result_rx) -> res => {
                        match res {
                            Ok(result) => {
                                let block = result?;
                                Self::buffer_and_write_block(
                                    &mut writer,
                                    block,
                                    &mut pending_blocks,
                                    &mut next_write_id,
                                    &mut blocks_written,
                                    &mut output_bytes,
                                    &mut compressed_size,
                                )?;
                            }
                            Err(_) => {
                                return Err(Error::Internal(
                                    "Result channel disconnected".to_string(),
                                ));
                            }
                        }
                    }
                }
            }
        }

        // Signal workers we're done
        drop(job_tx);

        // Drain remaining results
        while blocks_written + pending_blocks.len() < block_count {
            match result_rx.recv() {
                Ok(result) => {
                    let block = result?;
                    Self::buffer_and_write_block(
                        &mut writer,
                        block,
                        &mut pending_blocks,
                        &mut next_write_id,
                        &mut blocks_written,
                        &mut output_bytes,
                        &mut compressed_size,
                    )?;
                }
                Err(_) => break,
            }
        }

        // Write any remaining buffered blocks
        while let Some(block) = pending_blocks.remove(&next_write_id) {
            output_bytes += block.data.len() as u64;
            compressed_size[block.block_id] = block.data.len() as u32;
            writer.write_all(&block.data)?;
            blocks_written += 1;
            next_write_id += 1;
        }

        writer.flush()?;

        Ok(EncodeStats {
            input_bytes: input.len() as u64,
            output_bytes,
            blocks_encoded: blocks_written as u64,
            compressed_size,
        })
    }

    fn buffer_and_write_block<W: Write>(
        writer: &mut W,
        block: EncodedBlock,
        pending: &mut BTreeMap<usize, EncodedBlock>,
        next_write_id: &mut usize,
        blocks_written: &mut usize,
        output_bytes: &mut u64,
        compressed_size: &mut [u32],
    ) -> Result<()> {
        if block.block_id == *next_write_id {
            *output_bytes += block.data.len() as u64;
            compressed_size[block.block_id] = block.data.len() as u32;
            writer.write_all(&block.data)?;
            *blocks_written += 1;
            *next_write_id += 1;

            // Write any consecutive buffered blocks
            while let Some(buffered) = pending.remove(next_write_id) {
                *output_bytes += buffered.data.len() as u64;
                compressed_size[buffered.block_id] = buffered.data.len() as u32;
                writer.write_all(&buffered.data)?;
                *blocks_written += 1;
                *next_write_id += 1;
            }
        } else {
            // Buffer out-of-order block
            pending.insert(block.block_id, block);
        }
        Ok(())
    }
}

/// Worker thread function: parses and encodes blocks
fn worker_thread(
    job_rx: Receiver<EncodingJob>,
    result_tx: Sender<Result<EncodedBlock>>,
    max_block_bytes: usize,
) {
    let mut encoder = BlockEncoder::new();

    while let Ok(job) = job_rx.recv() {
        let result =
            encode_one_block(&mut encoder, job.block_id, job.packed, job.tables, max_block_bytes)
                .map(|data| EncodedBlock { block_id: job.block_id, data });

        if result_tx.send(result).is_err() {
            // Main thread has stopped, exit
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deflate::tokens::pack_tokens;
    use crate::huffman::build_block_tables;
    use crate::lz77;
    use crate::SingleThreadedEngine;

    fn block_request(chunks: &[&[u8]]) -> (Vec<u8>, Vec<BlockTables>, BlockDescriptor) {
        let mut packed = Vec::new();
        let mut tables = Vec::new();
        let mut sizes = Vec::new();
        for chunk in chunks {
            let tokens = lz77::tokenize(chunk);
            tables.push(build_block_tables(&tokens).unwrap());
            let block = pack_tokens(&tokens).unwrap();
            sizes.push(block.len() as u32);
            packed.extend_from_slice(&block);
        }
        (packed, tables, BlockDescriptor::from_block_sizes(1024, sizes))
    }

    #[test]
    fn test_parallel_matches_single() {
        let chunk_a = vec![b'a'; 400];
        let chunk_b: Vec<u8> = (0..600u32).map(|i| (i % 251) as u8).collect();
        let chunk_c = b"the quick brown fox jumps over the lazy dog ".repeat(12);
        let (packed, tables, descriptor) =
            block_request(&[&chunk_a, &chunk_b, &chunk_c]);

        let mut single_out = Vec::new();
        let mut single = SingleThreadedEngine::new(EncoderConfig::default());
        let single_stats = single.encode(&packed, &tables, &descriptor, &mut single_out).unwrap();

        let mut parallel_out = Vec::new();
        let config = EncoderConfig { num_threads: 3, ..Default::default() };
        let mut parallel = ParallelEngine::new(config);
        let parallel_stats =
            parallel.encode(&packed, &tables, &descriptor, &mut parallel_out).unwrap();

        assert_eq!(single_out, parallel_out);
        assert_eq!(single_stats.compressed_size, parallel_stats.compressed_size);
        assert_eq!(parallel_stats.blocks_encoded, 3);
    }

    #[test]
    fn test_effective_threads() {
        let config = EncoderConfig { num_threads: 0, ..Default::default() };
        let engine = ParallelEngine::new(config);
        let threads = engine.effective_threads();
        assert!(threads >= 1);
        assert!(threads <= 32);

        let config2 = EncoderConfig { num_threads: 100, ..Default::default() };
        let engine2 = ParallelEngine::new(config2);
        assert_eq!(engine2.effective_threads(), 32); // Capped at 32
    }

    #[test]
    fn test_parallel_propagates_block_errors() {
        // Second block is below the uncompressed floor
        let chunk_a = vec![b'a'; 400];
        let chunk_b = vec![b'b'; 50];
        let (packed, tables, descriptor) = block_request(&[&chunk_a, &chunk_b]);

        let config = EncoderConfig { num_threads: 2, ..Default::default() };
        let mut engine = ParallelEngine::new(config);
        let err = engine.encode(&packed, &tables, &descriptor, Vec::new()).unwrap_err();
        assert!(matches!(err, Error::BlockTooSmall { size: 50, .. }));
    }
}
