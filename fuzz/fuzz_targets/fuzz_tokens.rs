#![no_main]

use hufflate::deflate::tokens::parse_tokens;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes may be an invalid token stream - that's OK.
    // We're looking for panics/crashes, not errors.
    let _ = parse_tokens(data);
});
