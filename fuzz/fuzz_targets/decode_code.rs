#![no_main]

use classscope::disassembler::{decode_code, encode_stream};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(sequence) = decode_code(data) {
        assert_eq!(sequence.byte_len(), data.len());
        let encoded = encode_stream(sequence.instructions()).unwrap();
        assert_eq!(encoded.len(), data.len());
        let _ = sequence.iter().map(ToString::to_string).count();
    }
});
