#![no_main]

use libfuzzer_sys::fuzz_target;

use ubjson_draft8::{DecodeLimits, DecodeOptions, Decoded, Decoder};

fn fuzz_options(input_len: usize) -> DecodeOptions {
    let mut limits = DecodeLimits::for_bytes(input_len.min(1 << 20));
    limits.max_depth = 64;
    DecodeOptions::new().limits(limits).allow_noop(input_len % 2 == 0)
}

fuzz_target!(|data: &[u8]| {
    let mut dec = Decoder::from_slice(data, fuzz_options(data.len()));
    loop {
        match dec.decode() {
            Ok(Decoded::Value(v)) => {
                let _ = v.kind();
            }
            Ok(Decoded::Array(items)) => {
                for item in items.take(64) {
                    if item.is_err() {
                        break;
                    }
                }
                break;
            }
            Ok(Decoded::Object(entries)) => {
                for entry in entries.take(64) {
                    if entry.is_err() {
                        break;
                    }
                }
                break;
            }
            Err(_) => break,
        }
    }
});
