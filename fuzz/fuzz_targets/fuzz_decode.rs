#![no_main]
use datapack::DataPack;
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes must decode or fail with an error, never panic
fuzz_target!(|data: &[u8]| {
    let pack = match DataPack::from_bytes(data) {
        Ok(pack) => pack,
        Err(_) => return,
    };

    // Anything that decodes and fits the current limits re-encodes losslessly
    if let Ok(bytes) = pack.to_bytes() {
        assert_eq!(DataPack::from_bytes(&bytes).ok(), Some(pack));
    }
});
