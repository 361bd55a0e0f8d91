#![no_main]

use libfuzzer_sys::fuzz_target;
use oracle_datum::{DatumCodec, InitiateDatum, OracleDatum};

fuzz_target!(|data: &[u8]| {
    // Decoding arbitrary bytes must never panic, and whatever decodes must
    // re-encode to something that decodes to the same value.
    if let Ok(d) = InitiateDatum::from_cbor(data) {
        if let Ok(bytes) = d.to_cbor() {
            assert_eq!(InitiateDatum::from_cbor(&bytes).ok(), Some(d));
        }
    }
    if let Ok(d) = OracleDatum::from_cbor(data) {
        if let Ok(bytes) = d.to_cbor() {
            assert_eq!(OracleDatum::from_cbor(&bytes).ok(), Some(d));
        }
    }
});
