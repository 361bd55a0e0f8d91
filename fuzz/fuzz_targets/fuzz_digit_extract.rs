#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (String, u8)| {
    let (raw, len) = input;
    let out = oracle_vrf::extract(&raw, len as usize);
    assert!(out.len() <= len as usize);
    assert!(out.bytes().all(|b| b.is_ascii_digit()));
});
