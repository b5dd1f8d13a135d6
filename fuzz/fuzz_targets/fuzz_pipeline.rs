#![no_main]

use std::io::Read;

use flate2::read::DeflateDecoder;
use hufflate::huffman::{build_block_tables, BlockEncoder};
use hufflate::lz77;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Full pipeline: tokenize, build tables, encode, then inflate with
    // a reference decoder and compare
    let tokens = lz77::tokenize(data);
    assert_eq!(lz77::tokens_to_bytes(&tokens), data);

    let tables = build_block_tables(&tokens).expect("pipeline tables must validate");
    let mut encoder = BlockEncoder::new();
    let block = encoder.encode_block(&tokens, &tables).expect("pipeline tokens must encode");

    let mut decoder = DeflateDecoder::new(block.as_slice());
    let mut inflated = Vec::new();
    decoder.read_to_end(&mut inflated).expect("output must be a valid DEFLATE stream");
    assert_eq!(inflated, data);
});
