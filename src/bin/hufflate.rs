use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use hufflate::gzip::GzipMemberWriter;
use hufflate::huffman::build_block_tables;
use hufflate::{
    deflate::tokens::pack_tokens, lz77, BlockDescriptor, EncoderConfig, Engine, ParallelEngine,
    SingleThreadedEngine, MIN_BLOCK_SIZE,
};

#[derive(Parser, Debug)]
#[command(name = "hufflate")]
#[command(about = "Compress files with per-block dynamic Huffman coding (gzip-compatible output)")]
#[command(version)]
struct Args {
    /// Input file (use - for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Output gzip file (use - for stdout)
    #[arg(short, long)]
    output: PathBuf,

    /// Uncompressed block size in KiB
    #[arg(long, default_value = "1024")]
    block_size_kb: u32,

    /// Number of threads (0 = auto, 1 = single-threaded)
    #[arg(short = 't', long, default_value = "1")]
    threads: usize,

    /// Show verbose statistics
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.block_size_kb == 0 {
        return Err("block size must be at least 1 KiB".into());
    }

    // Read input
    let data = if args.input.to_str() == Some("-") {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf)?;
        buf
    } else {
        std::fs::read(&args.input)?
    };

    if data.len() < MIN_BLOCK_SIZE {
        return Err(format!(
            "input is {} bytes; minimum encodable size is {}",
            data.len(),
            MIN_BLOCK_SIZE
        )
        .into());
    }

    let start = std::time::Instant::now();

    // Chunk the input by uncompressed size. A tail below the minimum
    // block size is folded into the last chunk, so the descriptor
    // ceiling gets one extra KiB of headroom.
    let chunk_size = args.block_size_kb as usize * 1024;
    let mut chunks: Vec<&[u8]> = data.chunks(chunk_size).collect();
    let mut granularity_kb = args.block_size_kb;
    if chunks.len() > 1 && chunks[chunks.len() - 1].len() < MIN_BLOCK_SIZE {
        let tail_start = (chunks.len() - 2) * chunk_size;
        chunks.pop();
        let last = chunks.len() - 1;
        chunks[last] = &data[tail_start..];
        granularity_kb += 1;
    }

    // Tokenize and build per-block tables
    let mut packed = Vec::new();
    let mut tables = Vec::with_capacity(chunks.len());
    let mut sizes = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        let tokens = lz77::tokenize(chunk);
        tables.push(build_block_tables(&tokens)?);
        let block = pack_tokens(&tokens)?;
        sizes.push(block.len() as u32);
        packed.extend_from_slice(&block);
    }
    let descriptor = BlockDescriptor::from_block_sizes(granularity_kb, sizes);

    // Encode all blocks
    let config = EncoderConfig { num_threads: args.threads, ..Default::default() };
    let mut deflate_out = Vec::new();
    let stats = if config.num_threads == 1 {
        let mut engine = SingleThreadedEngine::new(config);
        engine.encode(&packed, &tables, &descriptor, &mut deflate_out)?
    } else {
        let mut engine = ParallelEngine::new(config);
        engine.encode(&packed, &tables, &descriptor, &mut deflate_out)?
    };

    // Wrap each block as a gzip member
    let output: Box<dyn Write> = if args.output.to_str() == Some("-") {
        Box::new(io::stdout().lock())
    } else {
        Box::new(BufWriter::new(File::create(&args.output)?))
    };

    let mut member_writer = GzipMemberWriter::new(output);
    let mut offset = 0usize;
    for (chunk, &size) in chunks.iter().zip(&stats.compressed_size) {
        let block = &deflate_out[offset..offset + size as usize];
        offset += size as usize;
        member_writer.write_member(block, chunk)?;
    }
    let mut output = member_writer.finish()?;
    output.flush()?;

    let elapsed = start.elapsed();

    if args.verbose {
        let member_overhead = chunks.len() as u64 * 18;
        let output_bytes = stats.output_bytes + member_overhead;
        eprintln!("Encoding complete:");
        eprintln!("  Input bytes:      {}", data.len());
        eprintln!("  Output bytes:     {}", output_bytes);
        eprintln!("  Blocks:           {}", stats.blocks_encoded);
        eprintln!("  Ratio:            {:.3}", data.len() as f64 / output_bytes as f64);
        eprintln!("  Time:             {:.2?}", elapsed);
        eprintln!(
            "  Throughput:       {:.1} MB/s",
            data.len() as f64 / elapsed.as_secs_f64() / 1_000_000.0
        );
    }

    Ok(())
}
